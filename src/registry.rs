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

//! The module registry: loggers handed out by module name.
//!
//! A [`Registry`] owns the active [`Config`] and the [`FormatterRegistry`] its loggers
//! share. The free functions in this module operate on a process-wide registry, created
//! on first use and configured by [`initialize`].

use std::any::Any;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Logger;
use crate::config::Config;
use crate::engine::Engine;
use crate::engine::EngineBuilder;
use crate::formatter::FormatterRegistry;

/// A source of loggers built from one [`Config`].
///
/// # Examples
///
/// ```
/// use deferlog::Config;
/// use deferlog::Level;
/// use deferlog::Registry;
/// use deferlog::append::Capture;
/// use deferlog::args;
///
/// let capture = Capture::default();
/// let registry = Registry::new(
///     Config::new(Level::Info)
///         .with_module("db", Level::Debug)
///         .with_append(capture.clone()),
/// );
///
/// registry.get_logger("db").debug("pool size {}", args![8]);
/// registry.get_logger("cache").error("ignored", None, args![]);
/// assert_eq!(capture.len(), 1);
/// ```
#[derive(Debug)]
pub struct Registry {
    config: RwLock<Arc<Config>>,
    formatters: Arc<FormatterRegistry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Registry {
    /// Create a registry from `config`, with the built-in formatters registered.
    pub fn new(config: Config) -> Self {
        let registry = Self {
            config: RwLock::new(Arc::new(Config::default())),
            formatters: Arc::new(FormatterRegistry::new()),
        };
        registry.configure(config);
        registry
    }

    /// Replace the active configuration and register its formatters.
    ///
    /// Loggers obtained before the call keep the configuration they were built with.
    pub fn configure(&self, config: Config) {
        for entry in config.formatters() {
            self.formatters.insert(entry.clone());
        }
        let mut slot = self.config.write().unwrap_or_else(|e| e.into_inner());
        *slot = Arc::new(config);
    }

    /// The active configuration.
    pub fn config(&self) -> Arc<Config> {
        let slot = self.config.read().unwrap_or_else(|e| e.into_inner());
        slot.clone()
    }

    /// The formatter registry shared by every logger of this registry.
    pub fn formatters(&self) -> &Arc<FormatterRegistry> {
        &self.formatters
    }

    /// Register the formatter for `T`. The last registration for a type wins.
    pub fn set_formatter<T: Any>(&self, f: impl Fn(&T, &str) -> String + Send + Sync + 'static) {
        self.formatters.set_formatter::<T>(f);
    }

    /// Get the logger for `module`.
    ///
    /// A configured module gets its configured level and the configured appends. Any other
    /// module gets a logger at the default level whose output is discarded.
    pub fn get_logger(&self, module: &str) -> Logger {
        let config = self.config();
        let builder = Engine::builder().module(module);
        let builder = match config.module_config(module) {
            Some(module_config) => with_outputs(builder.level(module_config.level()), &config),
            None => with_outputs(builder.level(config.level()), &config).discard(),
        };
        Logger::with_formatters(builder.build(), self.formatters.clone())
    }

    /// Get the root logger: no module, the default level, and the configured appends.
    pub fn get_root(&self) -> Logger {
        let config = self.config();
        let builder = with_outputs(Engine::builder().level(config.level()), &config);
        Logger::with_formatters(builder.build(), self.formatters.clone())
    }

    /// Get the logger for a module path such as `module_path!()`.
    pub fn get_logger_by_path(&self, path: &str) -> Logger {
        let config = self.config();
        self.get_logger(config.module_for_path(path))
    }

    /// Get the logger for the module that defines `T`.
    pub fn get_logger_for<T: ?Sized>(&self) -> Logger {
        let config = self.config();
        self.get_logger(config.module_for_type::<T>())
    }
}

fn with_outputs(mut builder: EngineBuilder, config: &Config) -> EngineBuilder {
    for append in config.appends() {
        builder = builder.shared_append(append.clone());
    }
    if let Some(trap) = config.trap() {
        builder = builder.shared_trap(trap.clone());
    }
    builder
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::default);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    &GLOBAL
}

/// Configure the process-wide registry.
///
/// May be called more than once; each call replaces the configuration for loggers
/// obtained afterwards.
pub fn initialize(config: Config) {
    GLOBAL.configure(config);
    INITIALIZED.store(true, Ordering::Release);
}

/// Whether [`initialize`] has been called.
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Register the formatter for `T` on the process-wide registry.
///
/// # Panics
///
/// Panics if [`initialize`] has not been called yet.
pub fn set_formatter<T: Any>(f: impl Fn(&T, &str) -> String + Send + Sync + 'static) {
    assert!(
        is_initialized(),
        "deferlog::set_formatter called before deferlog::initialize"
    );
    GLOBAL.set_formatter::<T>(f);
}

/// Get the logger for `module` from the process-wide registry.
pub fn get_logger(module: &str) -> Logger {
    GLOBAL.get_logger(module)
}

/// Get the root logger from the process-wide registry.
pub fn get_root() -> Logger {
    GLOBAL.get_root()
}

/// Get the logger for a module path from the process-wide registry.
///
/// See also [`logger!`](crate::logger!).
pub fn get_logger_by_path(path: &str) -> Logger {
    GLOBAL.get_logger_by_path(path)
}

/// Get the logger for the module that defines `T` from the process-wide registry.
pub fn get_logger_for<T: ?Sized>() -> Logger {
    GLOBAL.get_logger_for::<T>()
}
