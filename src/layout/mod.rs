// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Layouts for formatting log records.

use std::fmt;

use crate::Error;
use crate::record::Record;

mod json;
mod text;

pub use self::json::JsonLayout;
#[cfg(feature = "colored")]
pub use self::text::LevelColor;
pub use self::text::TextLayout;

/// A layout for formatting log records.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Format a log record into the bytes of a single line, without the trailing newline.
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error>;
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

fn local_time(record: &Record, tz: Option<&jiff::tz::TimeZone>) -> Result<jiff::Zoned, Error> {
    let ts = jiff::Timestamp::try_from(record.time())
        .map_err(|err| Error::new("record time out of range").with_source(err))?;
    let tz = tz.cloned().unwrap_or_else(jiff::tz::TimeZone::system);
    Ok(ts.to_zoned(tz))
}
