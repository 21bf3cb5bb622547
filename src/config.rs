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

//! Process configuration: the default level, per-module levels, and where lines go.

use std::any::Any;
use std::any::type_name;
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use serde::Serialize;

use crate::Error;
use crate::append::Append;
use crate::formatter::FormatterEntry;
use crate::record::DEFAULT_LEVEL;
use crate::record::Level;
use crate::trap::Trap;

/// The environment variable read by [`Config::from_env`].
pub const ENV_VAR: &str = "DEFERLOG";

/// The configuration of a single module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleConfig {
    level: Level,
}

impl ModuleConfig {
    /// Create a module configuration at `level`.
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// The least severe level the module writes.
    pub fn level(&self) -> Level {
        self.level
    }
}

/// The configuration a [`Registry`](crate::Registry) builds loggers from.
///
/// Only modules named here get a working logger; any other module gets a logger that
/// discards its output.
///
/// # Examples
///
/// ```
/// use deferlog::Config;
/// use deferlog::Level;
/// use deferlog::append::Stdout;
///
/// let config = Config::new(Level::Info)
///     .with_package("shop")
///     .with_module("db", Level::Debug)
///     .with_module("http", Level::Warn)
///     .with_append(Stdout::default());
///
/// assert_eq!(config.module_config("db").unwrap().level(), Level::Debug);
/// assert!(config.module_config("cache").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    level: Level,
    package: Option<String>,
    modules: BTreeMap<String, ModuleConfig>,
    hierarchical: bool,
    appends: Vec<Arc<dyn Append>>,
    trap: Option<Arc<dyn Trap>>,
    formatters: Vec<FormatterEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Config {
    /// Create a configuration with `level` as the default level, no configured modules,
    /// and output to stderr.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            package: None,
            modules: BTreeMap::new(),
            hierarchical: false,
            appends: vec![],
            trap: None,
            formatters: vec![],
        }
    }

    /// Build a configuration from a directive list such as `"warn,db=debug,http"`.
    ///
    /// Directives are separated by commas:
    ///
    /// * `<level>` sets the default level;
    /// * `<module>=<level>` configures a module;
    /// * `<module>` configures a module at the default level.
    ///
    /// Every malformed directive is reported in the returned error.
    ///
    /// # Examples
    ///
    /// ```
    /// use deferlog::Config;
    /// use deferlog::Level;
    ///
    /// let config = Config::parse("db=debug,http,warn").unwrap();
    /// assert_eq!(config.level(), Level::Warn);
    /// assert_eq!(config.module_config("db").unwrap().level(), Level::Debug);
    /// assert_eq!(config.module_config("http").unwrap().level(), Level::Warn);
    /// ```
    pub fn parse(spec: &str) -> Result<Config, Error> {
        let mut config = Config::default();
        let mut bare_modules = vec![];
        let mut problems = vec![];

        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            let mut parts = directive.split('=').map(str::trim);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), None, None) => match name.parse::<Level>() {
                    Ok(level) => config.level = level,
                    Err(_) => bare_modules.push(name),
                },
                (Some(name), Some(level), None) if !name.is_empty() => match level.parse() {
                    Ok(level) => config = config.with_module(name, level),
                    Err(err) => problems.push(format!("{directive:?}: {}", Error::message(&err))),
                },
                _ => problems.push(format!("{directive:?}: malformed directive")),
            }
        }

        if !problems.is_empty() {
            let mut err = Error::new("malformed logging spec").with_context("spec", spec);
            for problem in problems {
                err = err.with_context("problem", problem);
            }
            return Err(err);
        }

        let level = config.level;
        for name in bare_modules {
            config = config.with_module(name, level);
        }
        Ok(config)
    }

    /// Build a configuration from the [`ENV_VAR`] environment variable with
    /// [`Config::parse`], or the default configuration if it is unset.
    pub fn from_env() -> Result<Config, Error> {
        match env::var(ENV_VAR) {
            Ok(spec) => Config::parse(&spec),
            Err(env::VarError::NotPresent) => Ok(Config::default()),
            Err(err) => Err(Error::new("malformed environment variable")
                .with_context("name", ENV_VAR)
                .with_source(err)),
        }
    }

    /// Set the default level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the root package, stripped from module paths when deriving module names.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Configure `module` at `level`, replacing an earlier configuration for it.
    pub fn with_module(mut self, module: impl Into<String>, level: Level) -> Self {
        self.modules.insert(module.into(), ModuleConfig::new(level));
        self
    }

    /// Let a module without its own configuration inherit its closest configured parent,
    /// so `db::pool` falls back to `db`. Off by default.
    pub fn with_hierarchy(mut self, hierarchical: bool) -> Self {
        self.hierarchical = hierarchical;
        self
    }

    /// Add an [`Append`] shared by every enabled logger. Without any, loggers write to
    /// stderr.
    pub fn with_append(mut self, append: impl Append) -> Self {
        self.appends.push(Arc::new(append));
        self
    }

    /// Set the [`Trap`] for append failures.
    pub fn with_trap(mut self, trap: impl Trap) -> Self {
        self.trap = Some(Arc::new(trap));
        self
    }

    /// Register a formatter for `T` when this configuration is applied.
    pub fn with_formatter<T: Any>(
        mut self,
        f: impl Fn(&T, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatters.push(FormatterEntry::new::<T>(f));
        self
    }

    /// Register the JSON formatter for `T` when this configuration is applied.
    pub fn with_json_formatter<T: Any + Serialize>(mut self) -> Self {
        self.formatters.push(FormatterEntry::json::<T>());
        self
    }

    /// The default level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The root package, if any.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// The explicitly configured modules.
    pub fn modules(&self) -> &BTreeMap<String, ModuleConfig> {
        &self.modules
    }

    /// Whether modules inherit their parent's configuration.
    pub fn hierarchical(&self) -> bool {
        self.hierarchical
    }

    /// The configured appends.
    pub fn appends(&self) -> &[Arc<dyn Append>] {
        &self.appends
    }

    /// The configured trap, if any.
    pub fn trap(&self) -> Option<&Arc<dyn Trap>> {
        self.trap.as_ref()
    }

    /// The formatters registered on application.
    pub fn formatters(&self) -> &[FormatterEntry] {
        &self.formatters
    }

    /// Resolve the configuration of `module`.
    ///
    /// `None` means the module is not configured, which is distinct from a module
    /// configured at the default level.
    pub fn module_config(&self, module: &str) -> Option<&ModuleConfig> {
        if let Some(config) = self.modules.get(module) {
            return Some(config);
        }
        if !self.hierarchical {
            return None;
        }

        let mut name = module;
        while let Some((parent, _)) = name.rsplit_once("::") {
            if let Some(config) = self.modules.get(parent) {
                return Some(config);
            }
            name = parent;
        }
        None
    }

    /// Derive a module name from a module path such as `module_path!()`, stripping the
    /// root package.
    ///
    /// # Examples
    ///
    /// ```
    /// use deferlog::Config;
    ///
    /// let config = Config::default().with_package("shop");
    /// assert_eq!(config.module_for_path("shop::db::pool"), "db::pool");
    /// assert_eq!(config.module_for_path("shopping::cart"), "shopping::cart");
    /// ```
    pub fn module_for_path<'a>(&self, path: &'a str) -> &'a str {
        let Some(package) = self.package.as_deref().filter(|p| !p.is_empty()) else {
            return path;
        };
        match path.strip_prefix(package) {
            Some(rest) if rest.is_empty() || rest.starts_with("::") => rest.trim_start_matches("::"),
            _ => path,
        }
    }

    /// Derive a module name from the module that defines `T`, stripping the root package.
    ///
    /// Generic parameters are ignored. A type without a module path, such as a primitive,
    /// maps to the empty module name.
    pub fn module_for_type<T: ?Sized>(&self) -> &'static str {
        let name = type_name::<T>().trim_start_matches('&');
        let name = name.split('<').next().unwrap_or(name);
        let path = name.rsplit_once("::").map_or("", |(path, _)| path);
        self.module_for_path(path)
    }
}
