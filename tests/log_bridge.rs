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

use deferlog::Level;
use deferlog::Logger;
use deferlog::append::Capture;
use deferlog::engine::Engine;

#[test]
fn log_crate_records_reach_the_logger() {
    let capture = Capture::default();
    let engine = Engine::builder()
        .level(Level::Info)
        .append(capture.clone())
        .build();
    Logger::new(engine).install().unwrap();
    assert_eq!(log::max_level(), log::LevelFilter::Info);

    log::info!(target: "bridge", "hello {}", "log");
    log::debug!("dropped");
    log::error!("failed with {}", 42);
    log::logger().flush();

    let lines = capture.lines();
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert!(lines[0].contains("INFO tests/log_bridge.rs:"), "{lines:?}");
    assert!(lines[0].ends_with("hello log module=bridge"), "{lines:?}");
    assert!(lines[1].contains("ERROR"), "{lines:?}");
    assert!(lines[1].ends_with("failed with 42 module=log_bridge"), "{lines:?}");

    let again = Logger::new(Engine::builder().discard().build());
    assert!(again.install().is_err());
}
