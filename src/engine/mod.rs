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

//! The leveled logging engine that loggers delegate to.
//!
//! An [`Engine`] is an independent instance bound to a minimum severity and an optional
//! module field. It renders a format string against already resolved parameters and hands
//! the resulting [`Record`] to its appends. It knows nothing about deferred values or
//! formatters; the [`Logger`](crate::Logger) facade resolves those before calling in.

use std::panic::Location;
use std::sync::Arc;

use crate::append::Append;
use crate::append::Discard;
use crate::append::Stderr;
use crate::record::DEFAULT_LEVEL;
use crate::record::Level;
use crate::record::Record;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

mod template;

pub use self::template::Param;
pub use self::template::render;

/// A leveled writer with its own appends.
#[derive(Debug)]
pub struct Engine {
    level: Level,
    module: Option<String>,
    appends: Vec<Arc<dyn Append>>,
    trap: Arc<dyn Trap>,
}

impl Engine {
    /// Create a new [`EngineBuilder`].
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The least severe level this engine writes.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The module field attached to every record.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Render `format` with `params` and write it at `level`.
    ///
    /// Returns without rendering anything if `level` is not [enabled](Engine::enabled).
    pub fn log(
        &self,
        level: Level,
        format: &str,
        params: &[Param<'_>],
        location: Option<&Location<'_>>,
    ) {
        if !self.enabled(level) {
            return;
        }

        let payload = render(format, params);
        let record = Record::builder()
            .level(level)
            .module(self.module())
            .file(location.map(|l| l.file()))
            .line(location.map(|l| l.line()))
            .payload(&payload)
            .build();
        self.dispatch(&record);
    }

    /// Write a record built elsewhere, subject to the same level check.
    pub fn log_record(&self, record: &Record) {
        if self.enabled(record.level()) {
            self.dispatch(record);
        }
    }

    /// Flush every append.
    pub fn flush(&self) {
        for append in &self.appends {
            if let Err(err) = append.flush() {
                self.trap.trap(&err);
            }
        }
    }

    fn dispatch(&self, record: &Record) {
        for append in &self.appends {
            if let Err(err) = append.append(record) {
                self.trap.trap(&err);
            }
        }
    }
}

/// A builder for configuring an [`Engine`].
///
/// # Examples
///
/// ```
/// use deferlog::Level;
/// use deferlog::engine::Engine;
///
/// let engine = Engine::builder().level(Level::Warn).module("db").build();
/// assert!(engine.enabled(Level::Error));
/// assert!(!engine.enabled(Level::Info));
/// ```
#[must_use = "call `build` to construct the engine"]
#[derive(Debug)]
pub struct EngineBuilder {
    level: Level,
    module: Option<String>,
    appends: Vec<Arc<dyn Append>>,
    trap: Option<Arc<dyn Trap>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            module: None,
            appends: vec![],
            trap: None,
        }
    }
}

impl EngineBuilder {
    /// Set the least severe level to write. Default to [`DEFAULT_LEVEL`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Attach a module field to every record.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Add an [`Append`].
    ///
    /// If no append is added, the engine writes to [`Stderr`].
    pub fn append(mut self, append: impl Append) -> Self {
        self.appends.push(Arc::new(append));
        self
    }

    /// Add an [`Append`] that is shared with other engines.
    pub fn shared_append(mut self, append: Arc<dyn Append>) -> Self {
        self.appends.push(append);
        self
    }

    /// Replace the appends configured so far with a single [`Discard`].
    pub fn discard(mut self) -> Self {
        self.appends = vec![Arc::new(Discard::default())];
        self
    }

    /// Set the [`Trap`] for append failures. Default to [`DefaultTrap`].
    pub fn trap(self, trap: impl Trap) -> Self {
        self.shared_trap(Arc::new(trap))
    }

    /// Set a [`Trap`] that is shared with other engines.
    pub fn shared_trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = Some(trap);
        self
    }

    /// Construct the [`Engine`].
    pub fn build(self) -> Engine {
        let appends = if self.appends.is_empty() {
            vec![Arc::new(Stderr::default()) as Arc<dyn Append>]
        } else {
            self.appends
        };
        let trap = self
            .trap
            .unwrap_or_else(|| Arc::new(DefaultTrap::default()));

        Engine {
            level: self.level,
            module: self.module,
            appends,
            trap,
        }
    }
}
