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

//! Values whose text is only produced if a log line is actually written.
//!
//! A [`Deferred`] wraps a closure returning a `String`. Loggers materialize it after the
//! level check passes, so wrapping an expensive value costs nothing for a filtered call.
//!
//! ```
//! use deferlog::deferred::as_json;
//!
//! let config = serde_json::json!({"replicas": 3});
//! let deferred = as_json(&config);
//! assert_eq!(deferred.materialize(), "{\n  \"replicas\": 3\n}");
//! ```

use std::error::Error;
use std::fmt;
use std::iter;

use serde::Serialize;

use crate::DetailedError;
use crate::formatter::TimeLike;
use crate::formatter::guarded;
use crate::formatter::iso_time;
use crate::formatter::to_json_pretty;

/// A string produced on demand.
pub struct Deferred<'a> {
    f: Box<dyn Fn() -> String + 'a>,
}

impl fmt::Debug for Deferred<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

impl<'a> Deferred<'a> {
    /// Wrap a closure.
    pub fn new(f: impl Fn() -> String + 'a) -> Self {
        Self { f: Box::new(f) }
    }

    /// Produce the string. A panic inside the closure yields [`INVALID`](crate::INVALID).
    pub fn materialize(&self) -> String {
        guarded(|| (self.f)())
    }
}

/// Defer rendering `object` as indented JSON.
///
/// A value serializing to `null`, such as `None`, renders as an empty string; a
/// serialization failure renders as [`INVALID`](crate::INVALID).
pub fn as_json<'a, T: Serialize + ?Sized>(object: &'a T) -> Deferred<'a> {
    Deferred::new(move || to_json_pretty(object))
}

/// Defer rendering `time` as an RFC 3339 timestamp.
///
/// The time is captured now, not when the line is written.
///
/// ```
/// use deferlog::deferred::as_iso_time;
///
/// let ts: jiff::Timestamp = "2024-03-10T08:15:30Z".parse().unwrap();
/// assert_eq!(as_iso_time(ts).materialize(), "2024-03-10T08:15:30Z");
/// ```
pub fn as_iso_time<'a, T: TimeLike + 'a>(time: T) -> Deferred<'a> {
    Deferred::new(move || iso_time(&time, ""))
}

/// Defer rendering an error.
///
/// An error that is, or is caused by, a [`DetailedError`] renders as
/// `"<message>: <json payload>"`, anything else as its message. The message is always the
/// outermost one.
///
/// ```
/// use deferlog::DetailedError;
/// use deferlog::deferred::as_error_trace;
///
/// let err = DetailedError::new("quota exceeded").with_code("Q1");
/// assert_eq!(
///     as_error_trace(&err).materialize(),
///     r#"quota exceeded: {"code":"Q1","message":"quota exceeded"}"#
/// );
/// ```
pub fn as_error_trace<'a>(err: &'a (dyn Error + 'static)) -> Deferred<'a> {
    Deferred::new(move || {
        let detailed = iter::successors(Some(err), |&err: &&'a (dyn Error + 'static)| err.source())
            .find_map(|err| err.downcast_ref::<DetailedError>());
        match detailed.map(serde_json::to_string) {
            Some(Ok(payload)) => format!("{err}: {payload}"),
            _ => err.to_string(),
        }
    })
}

/// Defer taking the last `length` characters of `value`.
///
/// ```
/// use deferlog::deferred::last;
///
/// assert_eq!(last("request-7f3a9c", 6).materialize(), "7f3a9c");
/// assert_eq!(last("short", 64).materialize(), "short");
/// ```
pub fn last(value: &str, length: usize) -> Deferred<'_> {
    Deferred::new(move || last_chars(value, length).to_owned())
}

fn last_chars(value: &str, length: usize) -> &str {
    let Some(skip) = length.checked_sub(1) else {
        return "";
    };
    match value.char_indices().rev().nth(skip) {
        Some((start, _)) => &value[start..],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use std::collections::HashMap;
    use std::io;

    use insta::assert_snapshot;
    use rand::Rng;

    use super::*;
    use crate::INVALID;

    #[derive(Serialize)]
    struct Order {
        id: u64,
        customer: String,
        lines: Vec<(String, u32)>,
        notes: Option<String>,
    }

    fn random_order(rng: &mut impl Rng) -> Order {
        let lines = (0..rng.random_range(0..5))
            .map(|i| (format!("sku-{i}"), rng.random_range(1..100)))
            .collect();
        Order {
            id: rng.random(),
            customer: format!("customer-{}", rng.random::<u16>()),
            lines,
            notes: rng.random_bool(0.5).then(|| "leave at door".to_owned()),
        }
    }

    #[test]
    fn json_is_stable_and_valid() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let order = random_order(&mut rng);
            let deferred = as_json(&order);
            let first = deferred.materialize();
            assert_eq!(first, deferred.materialize());
            serde_json::from_str::<serde_json::Value>(&first).unwrap();
        }
    }

    #[test]
    fn json_is_indented_in_field_order() {
        let order = Order {
            id: 9,
            customer: "ada".to_owned(),
            lines: vec![],
            notes: None,
        };
        assert_snapshot!(as_json(&order).materialize(), @r#"
        {
          "id": 9,
          "customer": "ada",
          "lines": [],
          "notes": null
        }
        "#);
    }

    #[test]
    fn json_of_absent_value_is_empty() {
        assert_eq!(as_json(&None::<Order>).materialize(), "");
    }

    #[test]
    fn json_failure_is_invalid() {
        let mut by_pair: HashMap<(u8, u8), &str> = HashMap::new();
        by_pair.insert((0, 1), "edge");
        assert_eq!(as_json(&by_pair).materialize(), INVALID);
    }

    #[test]
    fn closure_runs_only_when_materialized() {
        let calls = Cell::new(0);
        let deferred = Deferred::new(|| {
            calls.set(calls.get() + 1);
            "done".to_owned()
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(deferred.materialize(), "done");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn panicking_closure_is_invalid() {
        let deferred = Deferred::new(|| panic!("cannot render"));
        assert_eq!(deferred.materialize(), INVALID);
    }

    #[test]
    fn iso_time_is_captured_at_wrap_time() {
        let deferred = as_iso_time(jiff::Timestamp::now());
        let first = deferred.materialize();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(first, deferred.materialize());
        first.parse::<jiff::Timestamp>().unwrap();
    }

    #[test]
    fn plain_error_renders_its_message() {
        let err = io::Error::new(io::ErrorKind::NotFound, "config.toml missing");
        assert_eq!(as_error_trace(&err).materialize(), "config.toml missing");
    }

    #[test]
    fn detailed_error_renders_its_payload() {
        let mut limits = BTreeMap::new();
        limits.insert("daily", 500);
        let err = DetailedError::new("payment declined")
            .with_code("E402")
            .with_detail("limits", limits);
        assert_snapshot!(
            as_error_trace(&err).materialize(),
            @r#"payment declined: {"code":"E402","message":"payment declined","details":{"limits":{"daily":500}}}"#
        );
    }

    #[test]
    fn detailed_error_behind_anyhow() {
        let err = anyhow::Error::new(DetailedError::new("locked").with_code("L1"));
        let err: &(dyn Error + 'static) = err.as_ref();
        assert_eq!(
            as_error_trace(err).materialize(),
            r#"locked: {"code":"L1","message":"locked"}"#
        );
    }

    #[derive(Debug)]
    struct Charging(DetailedError);

    impl fmt::Display for Charging {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("charging order 17")
        }
    }

    impl Error for Charging {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn detailed_error_found_in_source_chain() {
        let err = Charging(DetailedError::new("card declined").with_code("E402"));
        assert_eq!(
            as_error_trace(&err).materialize(),
            r#"charging order 17: {"code":"E402","message":"card declined"}"#
        );
    }

    #[test]
    fn detailed_error_behind_anyhow_context() {
        let err = anyhow::Error::new(DetailedError::new("locked").with_code("L1"))
            .context("releasing seat");
        let err: &(dyn Error + 'static) = err.as_ref();
        assert_eq!(
            as_error_trace(err).materialize(),
            r#"releasing seat: {"code":"L1","message":"locked"}"#
        );
    }

    #[test]
    fn last_counts_characters() {
        assert_eq!(last("héllo wörld", 5).materialize(), "wörld");
        assert_eq!(last("abc", 0).materialize(), "");
        assert_eq!(last("abc", 3).materialize(), "abc");
        assert_eq!(last("", 2).materialize(), "");
    }
}
