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

//! Built-in formatters.

use std::any::Any;
use std::time::SystemTime;

use jiff::Timestamp;
use jiff::Zoned;
use jiff::tz::TimeZone;
use serde::Serialize;

use crate::formatter::FormatterEntry;
use crate::formatter::INVALID;

/// Values that can be rendered as an ISO-8601 timestamp.
pub trait TimeLike {
    /// The value as a zoned datetime, or `None` if it is out of range.
    fn as_zoned(&self) -> Option<Zoned>;
}

impl TimeLike for Timestamp {
    fn as_zoned(&self) -> Option<Zoned> {
        Some(self.to_zoned(TimeZone::UTC))
    }
}

impl TimeLike for Zoned {
    fn as_zoned(&self) -> Option<Zoned> {
        Some(self.clone())
    }
}

impl TimeLike for SystemTime {
    fn as_zoned(&self) -> Option<Zoned> {
        let ts = Timestamp::try_from(*self).ok()?;
        Some(ts.to_zoned(TimeZone::UTC))
    }
}

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone> TimeLike for chrono::DateTime<Tz> {
    fn as_zoned(&self) -> Option<Zoned> {
        use chrono::Offset;

        let offset = jiff::tz::Offset::from_seconds(self.offset().fix().local_minus_utc()).ok()?;
        let nanos = i32::try_from(self.timestamp_subsec_nanos()).ok()?;
        let ts = Timestamp::new(self.timestamp(), nanos).ok()?;
        Some(ts.to_zoned(TimeZone::fixed(offset)))
    }
}

impl<T: TimeLike + ?Sized> TimeLike for &T {
    fn as_zoned(&self) -> Option<Zoned> {
        (**self).as_zoned()
    }
}

/// Render a time value in RFC 3339 at second precision, or with `pattern` if it is not empty.
///
/// A zero UTC offset is written as `Z`. Out of range values and malformed patterns render
/// as [`INVALID`].
pub fn iso_time(time: &dyn TimeLike, pattern: &str) -> String {
    let Some(zoned) = time.as_zoned() else {
        return INVALID.to_owned();
    };

    let pattern = if !pattern.is_empty() {
        pattern
    } else if zoned.offset().seconds() == 0 {
        "%Y-%m-%dT%H:%M:%SZ"
    } else {
        "%Y-%m-%dT%H:%M:%S%:z"
    };
    jiff::fmt::strtime::format(pattern, &zoned).unwrap_or_else(|_| INVALID.to_owned())
}

fn time_like(input: &dyn Any) -> Option<&dyn TimeLike> {
    if let Some(t) = input.downcast_ref::<Timestamp>() {
        return Some(t);
    }
    if let Some(t) = input.downcast_ref::<Zoned>() {
        return Some(t);
    }
    if let Some(t) = input.downcast_ref::<SystemTime>() {
        return Some(t);
    }
    #[cfg(feature = "chrono")]
    {
        if let Some(t) = input.downcast_ref::<chrono::DateTime<chrono::Utc>>() {
            return Some(t);
        }
        if let Some(t) = input.downcast_ref::<chrono::DateTime<chrono::FixedOffset>>() {
            return Some(t);
        }
        if let Some(t) = input.downcast_ref::<chrono::DateTime<chrono::Local>>() {
            return Some(t);
        }
    }
    None
}

/// Format a time value as ISO-8601.
///
/// Any value that is not one of the supported time types renders as [`INVALID`]. The hint,
/// when not empty, is used as a strftime pattern.
pub fn to_iso_time(input: &dyn Any, hint: &str) -> String {
    match time_like(input) {
        Some(time) => iso_time(time, hint),
        None => INVALID.to_owned(),
    }
}

/// Format a value as compact JSON.
///
/// A value serializing to `null` renders as an empty string; a serialization failure as
/// [`INVALID`].
pub fn to_json<T: Serialize + ?Sized>(input: &T, _hint: &str) -> String {
    match serde_json::to_string(input) {
        Ok(json) if json == "null" => String::new(),
        Ok(json) => json,
        Err(_) => INVALID.to_owned(),
    }
}

pub(crate) fn to_json_pretty<T: Serialize + ?Sized>(input: &T) -> String {
    match serde_json::to_string_pretty(input) {
        Ok(json) if json == "null" => String::new(),
        Ok(json) => json,
        Err(_) => INVALID.to_owned(),
    }
}

pub(crate) fn seeds() -> Vec<FormatterEntry> {
    #[allow(unused_mut)]
    let mut seeds = vec![
        FormatterEntry::dynamic::<Timestamp>(to_iso_time),
        FormatterEntry::dynamic::<Zoned>(to_iso_time),
        FormatterEntry::dynamic::<SystemTime>(to_iso_time),
        FormatterEntry::json::<serde_json::Value>(),
    ];
    #[cfg(feature = "chrono")]
    seeds.extend([
        FormatterEntry::dynamic::<chrono::DateTime<chrono::Utc>>(to_iso_time),
        FormatterEntry::dynamic::<chrono::DateTime<chrono::FixedOffset>>(to_iso_time),
        FormatterEntry::dynamic::<chrono::DateTime<chrono::Local>>(to_iso_time),
    ]);
    seeds
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn iso_time_for_utc_uses_z() {
        let ts: Timestamp = "2024-03-10T08:15:30.250Z".parse().unwrap();
        assert_eq!(to_iso_time(&ts, ""), "2024-03-10T08:15:30Z");

        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(to_iso_time(&t, ""), "1970-01-02T00:00:00Z");
    }

    #[test]
    fn iso_time_keeps_the_zone_offset() {
        let zoned: Zoned = "2024-03-10T16:15:30+08:00[+08:00]".parse().unwrap();
        assert_eq!(to_iso_time(&zoned, ""), "2024-03-10T16:15:30+08:00");
    }

    #[test]
    fn iso_time_honors_a_pattern_hint() {
        let ts: Timestamp = "2024-03-10T08:15:30Z".parse().unwrap();
        assert_eq!(to_iso_time(&ts, "%Y/%m/%d"), "2024/03/10");
        assert_eq!(to_iso_time(&ts, "%Y %"), INVALID);
    }

    #[test]
    fn iso_time_rejects_other_types() {
        assert_eq!(to_iso_time(&"2024-03-10", ""), INVALID);
        assert_eq!(to_iso_time(&42u64, ""), INVALID);
    }

    #[test]
    fn json_is_compact() {
        let value = serde_json::json!({"id": 7, "tags": ["a", "b"]});
        assert_snapshot!(to_json(&value, ""), @r#"{"id":7,"tags":["a","b"]}"#);
    }

    #[test]
    fn json_of_null_is_empty() {
        assert_eq!(to_json(&None::<u32>, ""), "");
        assert_eq!(to_json_pretty(&()), "");
    }

    #[test]
    fn json_failure_is_invalid() {
        let mut keyed = HashMap::new();
        keyed.insert((1, 2), "tuple keys are not valid json object keys");
        assert_eq!(to_json(&keyed, ""), INVALID);
        assert_eq!(to_json_pretty(&keyed), INVALID);
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn iso_time_for_chrono() {
        let dt = chrono::DateTime::parse_from_rfc3339("2024-03-10T16:15:30+08:00").unwrap();
        assert_eq!(to_iso_time(&dt, ""), "2024-03-10T16:15:30+08:00");
        assert_eq!(to_iso_time(&dt.to_utc(), ""), "2024-03-10T08:15:30Z");
    }
}
