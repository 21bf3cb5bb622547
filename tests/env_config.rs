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

use std::env;

use deferlog::Config;
use deferlog::DEFAULT_LEVEL;
use deferlog::ENV_VAR;
use deferlog::Level;

// The only test in this binary, so nothing else reads the environment concurrently.
#[test]
fn config_from_environment() {
    // SAFETY: no other thread reads or writes the environment
    unsafe { env::remove_var(ENV_VAR) };
    let config = Config::from_env().unwrap();
    assert_eq!(config.level(), DEFAULT_LEVEL);
    assert!(config.modules().is_empty());

    unsafe { env::set_var(ENV_VAR, "info,db=trace,http") };
    let config = Config::from_env().unwrap();
    assert_eq!(config.level(), Level::Info);
    assert_eq!(config.module_config("db").unwrap().level(), Level::Trace);
    assert_eq!(config.module_config("http").unwrap().level(), Level::Info);

    unsafe { env::set_var(ENV_VAR, "db=loud") };
    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains(r#""db=loud": malformed level: "loud""#), "{err}");
}
