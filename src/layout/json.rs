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

use jiff::tz::TimeZone;
use serde::Serialize;

use crate::Error;
use crate::layout::Layout;
use crate::layout::local_time;
use crate::record::Record;

/// A JSON layout for formatting log records.
///
/// Output format:
///
/// ```json
/// {"timestamp":"2024-08-11T22:44:57.172051+08:00","level":"ERROR","module":"db","file":"src/db.rs","line":51,"message":"replica lost"}
/// {"timestamp":"2024-08-11T22:44:57.172187+08:00","level":"INFO","file":"src/main.rs","line":12,"message":"started"}
/// ```
///
/// # Examples
///
/// ```
/// use deferlog::layout::JsonLayout;
///
/// let json_layout = JsonLayout::default();
/// ```
#[derive(Default, Debug, Clone)]
pub struct JsonLayout {
    tz: Option<TimeZone>,
}

impl JsonLayout {
    /// Set the timezone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use deferlog::layout::JsonLayout;
    /// use jiff::tz::TimeZone;
    ///
    /// let layout = JsonLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct RecordLine<'a> {
    timestamp: String,
    level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    message: &'a str,
}

impl Layout for JsonLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = local_time(record, self.tz.as_ref())?;

        let record_line = RecordLine {
            timestamp: time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z").to_string(),
            level: record.level().as_str(),
            module: record.module(),
            file: record.file(),
            line: record.line(),
            message: record.payload(),
        };

        serde_json::to_vec(&record_line).map_err(Error::from_json_error)
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use insta::assert_snapshot;

    use super::*;
    use crate::record::Level;

    #[test]
    fn module_record_as_json() {
        let record = Record::builder()
            .time(SystemTime::UNIX_EPOCH)
            .level(Level::Error)
            .module(Some("db"))
            .file(Some("src/db.rs"))
            .line(Some(51))
            .payload("replica lost: \"r1\"")
            .build();
        let layout = JsonLayout::default().timezone(TimeZone::UTC);
        let line = String::from_utf8(layout.format(&record).unwrap()).unwrap();
        assert_snapshot!(
            line,
            @r#"{"timestamp":"1970-01-01T00:00:00.000000+00:00","level":"ERROR","module":"db","file":"src/db.rs","line":51,"message":"replica lost: \"r1\""}"#
        );
    }

    #[test]
    fn root_record_omits_module() {
        let record = Record::builder().payload("started").build();
        let line = JsonLayout::default().format(&record).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&line).unwrap();
        assert!(value.get("module").is_none());
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "started");
    }
}
