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

//! Loggers obtained from the process-wide registry after `initialize`.

use std::fmt;

use deferlog::Config;
use deferlog::DetailedError;
use deferlog::Level;
use deferlog::append::Capture;
use deferlog::args;
use deferlog::deferred::as_json;

#[derive(Debug)]
struct Invoice {
    id: u32,
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invoice #{}", self.id)
    }
}

// One test function, since the registry is shared by the whole binary.
#[test]
fn configured_registry_end_to_end() {
    let capture = Capture::default();
    deferlog::initialize(
        Config::new(Level::Warn)
            .with_package("end_to_end")
            .with_module("billing", Level::Warn)
            .with_module("tests", Level::Debug)
            .with_append(capture.clone()),
    );
    assert!(deferlog::is_initialized());

    let logger = deferlog::get_logger("billing");
    assert!(logger.is_level(Level::Warn));
    assert!(!logger.is_level(Level::Error));

    logger.info("processing {}", &[deferlog::Arg::display(&Invoice { id: 7 })]);
    assert!(capture.is_empty());

    let err = DetailedError::new("card declined").with_code("E402");
    logger.error(
        "charge failed for {}",
        Some(&err),
        &[deferlog::Arg::display(&Invoice { id: 7 })],
    );
    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    let expected = r#"charge failed for invoice #7: card declined: {"code":"E402","message":"card declined"}"#;
    assert!(lines[0].contains(expected), "{lines:?}");
    assert!(lines[0].contains("module=billing"), "{lines:?}");
    capture.clear();

    // unconfigured modules are discarded, whatever the level
    let orphan = deferlog::get_logger("shipping");
    orphan.error("lost {}", None, args![1]);
    assert!(capture.is_empty());

    // module path and type based lookups
    let by_path = deferlog::logger!();
    assert_eq!(by_path.module(), Some(""));
    let by_type = deferlog::get_logger_for::<tests::Marker>();
    assert_eq!(by_type.module(), Some("tests"));
    let payload = serde_json::json!({"lines": 3});
    by_type.debug("payload {}", args![as_json(&payload)]);
    assert!(capture.contains("payload {"), "{:?}", capture.lines());

    // initialize can be called again
    deferlog::initialize(Config::new(Level::Info).with_append(capture.clone()));
    capture.clear();
    deferlog::get_root().info("reconfigured", args![]);
    deferlog::get_logger("billing").error("gone", None, args![]);
    assert_eq!(capture.lines().len(), 1);
    assert!(capture.contains("reconfigured"));
}

mod tests {
    pub struct Marker;
}
