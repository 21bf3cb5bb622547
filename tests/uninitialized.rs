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

use deferlog::Config;
use deferlog::Level;

#[test]
#[should_panic(expected = "set_formatter called before deferlog::initialize")]
fn set_formatter_requires_initialize() {
    deferlog::set_formatter::<u32>(|value, _| format!("{value:#x}"));
}

#[test]
fn loggers_are_available_before_initialize() {
    assert!(!deferlog::is_initialized());

    let logger = deferlog::get_logger("anything");
    assert_eq!(logger.module(), Some("anything"));
    assert_eq!(logger.level(), deferlog::DEFAULT_LEVEL);
    logger.error("discarded", None, deferlog::args![]);

    let config = deferlog::registry().config();
    assert_eq!(config.level(), Config::default().level());
    assert!(config.modules().is_empty());
    assert_eq!(deferlog::get_root().level(), Level::Trace);
}
