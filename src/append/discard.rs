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

use crate::Error;
use crate::append::Append;
use crate::record::Record;

/// An appender that drops every record.
///
/// Loggers for modules without a configuration write here, which keeps them usable
/// while silencing them.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct Discard {}

impl Append for Discard {
    fn append(&self, _: &Record) -> Result<(), Error> {
        Ok(())
    }
}
