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

//! Deferlog hands out per-module loggers whose arguments are formatted only when a line is
//! actually written.
//!
//! # Overview
//!
//! A process configures a [`Config`] once with [`initialize`]: a default level, the modules
//! that may write and at which level, and where lines go. Code then asks for a [`Logger`] by
//! module name, by module path, or by type. Modules that are not configured get a logger
//! whose output is discarded.
//!
//! Arguments are passed as a slice of [`Arg`]. Expensive renderings are wrapped in a
//! [`Deferred`], which is not evaluated unless the call passes the level check. Values of
//! any type can be passed with [`Arg::value`] and are written by the formatter registered
//! for their type with [`set_formatter`], or through `Debug` if there is none.
//!
//! # Examples
//!
//! ```
//! use deferlog::Config;
//! use deferlog::Level;
//! use deferlog::append::Capture;
//! use deferlog::args;
//! use deferlog::deferred::as_json;
//!
//! #[derive(Debug)]
//! struct Cents(u64);
//!
//! let capture = Capture::default();
//! deferlog::initialize(
//!     Config::new(Level::Info)
//!         .with_module("billing", Level::Info)
//!         .with_append(capture.clone()),
//! );
//! deferlog::set_formatter::<Cents>(|c, hint| format!("{}.{:02} {hint}", c.0 / 100, c.0 % 100));
//!
//! let logger = deferlog::get_logger("billing");
//! let order = serde_json::json!({"id": 42});
//! logger.debug("order {}", args![as_json(&order)]);
//! logger.info(
//!     "charged {}",
//!     &[deferlog::Arg::value_with_hint(&Cents(1999), "EUR")],
//! );
//!
//! assert_eq!(capture.len(), 1);
//! assert!(capture.contains("charged 19.99 EUR"));
//! ```
//!
//! Loggers can also be set up without the process-wide registry:
//!
//! ```
//! use deferlog::Level;
//! use deferlog::Logger;
//! use deferlog::append;
//! use deferlog::args;
//! use deferlog::engine::Engine;
//!
//! let engine = Engine::builder()
//!     .level(Level::Warn)
//!     .module("db")
//!     .append(append::Stdout::default())
//!     .build();
//! let logger = Logger::new(engine);
//! logger.warn("slow query took {}ms", None, args![1200]);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod deferred;
pub mod engine;
pub mod formatter;
pub mod layout;
pub mod trap;

mod arg;
mod config;
mod detailed;
mod error;
mod logger;
mod record;
mod registry;

pub use self::append::Append;
pub use self::arg::Arg;
pub use self::arg::Loggable;
pub use self::config::Config;
pub use self::config::ENV_VAR;
pub use self::config::ModuleConfig;
pub use self::deferred::Deferred;
pub use self::detailed::DetailedError;
pub use self::error::Error;
pub use self::formatter::FormatterRegistry;
pub use self::formatter::INVALID;
pub use self::layout::Layout;
pub use self::logger::FATAL_EXIT_CODE;
pub use self::logger::Logger;
pub use self::record::DEFAULT_LEVEL;
pub use self::record::Level;
pub use self::record::Record;
pub use self::record::RecordBuilder;
pub use self::registry::Registry;
pub use self::registry::get_logger;
pub use self::registry::get_logger_by_path;
pub use self::registry::get_logger_for;
pub use self::registry::get_root;
pub use self::registry::initialize;
pub use self::registry::is_initialized;
pub use self::registry::registry;
pub use self::registry::set_formatter;

/// Build a `&[Arg]` from a list of values, each converted with [`Arg::from`].
///
/// # Examples
///
/// ```
/// use deferlog::args;
/// use deferlog::deferred::last;
///
/// let token = "a0f3c9e1";
/// let args = args!["login", 3, last(token, 4)];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        &[] as &[$crate::Arg<'_>]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$($crate::Arg::from($arg)),+]
    };
}

/// Get the logger for the calling module from the process-wide registry.
///
/// Expands to [`get_logger_by_path(module_path!())`](get_logger_by_path).
#[macro_export]
macro_rules! logger {
    () => {
        $crate::get_logger_by_path(::std::module_path!())
    };
}
