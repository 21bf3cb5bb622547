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

//! Map value types to formatting functions.
//!
//! A [`FormatterRegistry`] keys formatters by [`TypeId`]. Loggers consult it when they
//! meet an [`Arg::Value`](crate::Arg::Value); a value whose type has no formatter is
//! written through its `Debug` implementation instead.

use std::any::Any;
use std::any::TypeId;
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use serde::Serialize;

mod builtin;

pub use self::builtin::TimeLike;
pub use self::builtin::iso_time;
pub use self::builtin::to_iso_time;
pub use self::builtin::to_json;
pub(crate) use self::builtin::to_json_pretty;

/// The marker written in place of a value that could not be formatted.
pub const INVALID: &str = "!invalid";

/// A function from a value and a format hint to its text.
///
/// Formatters must not fail. A formatter called with a value of a type it does not handle
/// returns [`INVALID`], and [`FormatterRegistry::format`] turns a panic into [`INVALID`].
pub type Formatter = Arc<dyn Fn(&dyn Any, &str) -> String + Send + Sync>;

/// A formatter together with the type it is registered for.
#[derive(Clone)]
pub struct FormatterEntry {
    type_id: TypeId,
    type_name: &'static str,
    formatter: Formatter,
}

impl fmt::Debug for FormatterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterEntry")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl FormatterEntry {
    /// Wrap a typed formatting function for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// use deferlog::formatter::FormatterEntry;
    ///
    /// let entry = FormatterEntry::new::<Ipv4Addr>(|addr, _| format!("ip:{addr}"));
    /// assert_eq!((entry.formatter())(&Ipv4Addr::LOCALHOST, ""), "ip:127.0.0.1");
    /// ```
    pub fn new<T: Any>(f: impl Fn(&T, &str) -> String + Send + Sync + 'static) -> Self {
        Self::dynamic::<T>(move |value: &dyn Any, hint: &str| match value.downcast_ref::<T>() {
            Some(value) => f(value, hint),
            None => INVALID.to_owned(),
        })
    }

    /// Register [`to_json`] for `T`.
    pub fn json<T: Any + Serialize>() -> Self {
        Self::new::<T>(to_json::<T>)
    }

    /// Register an untyped formatter for `T`. The formatter does its own downcasting.
    pub fn dynamic<T: Any>(
        formatter: impl Fn(&dyn Any, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            formatter: Arc::new(formatter),
        }
    }

    /// The type this entry formats.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The name of the type this entry formats, for diagnostics only.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The formatting function.
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }
}

/// A concurrent map from value types to formatters.
///
/// Reads vastly outnumber writes: formatters are usually registered once at startup and
/// resolved on every log call that carries a typed value.
#[derive(Debug)]
pub struct FormatterRegistry {
    entries: RwLock<HashMap<TypeId, FormatterEntry>>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterRegistry {
    /// Create a registry seeded with the built-in formatters: ISO-8601 for `jiff::Timestamp`,
    /// `jiff::Zoned`, `SystemTime` (and `chrono::DateTime` with the `chrono` feature), and
    /// JSON for `serde_json::Value`.
    pub fn new() -> Self {
        let registry = Self::empty();
        for entry in builtin::seeds() {
            registry.insert(entry);
        }
        registry
    }

    /// Create a registry with no formatters at all.
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register an entry, replacing any formatter previously registered for its type.
    pub fn insert(&self, entry: FormatterEntry) {
        self.write().insert(entry.type_id, entry);
    }

    /// Register a formatter for `T`, replacing any previous one.
    ///
    /// # Examples
    ///
    /// ```
    /// use deferlog::formatter::FormatterRegistry;
    ///
    /// struct UserId(u64);
    ///
    /// let registry = FormatterRegistry::new();
    /// registry.set_formatter::<UserId>(|id, _| format!("user#{}", id.0));
    /// assert_eq!(registry.format(&UserId(7), "").as_deref(), Some("user#7"));
    /// ```
    pub fn set_formatter<T: Any>(&self, f: impl Fn(&T, &str) -> String + Send + Sync + 'static) {
        self.insert(FormatterEntry::new::<T>(f));
    }

    /// Register [`to_json`] as the formatter for `T`.
    pub fn set_json_formatter<T: Any + Serialize>(&self) {
        self.insert(FormatterEntry::json::<T>());
    }

    /// Look up the formatter registered for `type_id`.
    pub fn resolve(&self, type_id: TypeId) -> Option<Formatter> {
        self.read()
            .get(&type_id)
            .map(|entry| entry.formatter.clone())
    }

    /// Look up the formatter registered for `T`.
    pub fn resolve_for<T: Any>(&self) -> Option<Formatter> {
        self.resolve(TypeId::of::<T>())
    }

    /// Format `value` with the formatter registered for its concrete type.
    ///
    /// Returns `None` if no formatter is registered. A panicking formatter yields
    /// [`INVALID`].
    pub fn format(&self, value: &dyn Any, hint: &str) -> Option<String> {
        let formatter = self.resolve(Any::type_id(value))?;
        Some(guarded(|| formatter(value, hint)))
    }

    /// The number of registered formatters.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no formatter is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The names of the registered types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.read().values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    // formatters run outside the lock, so a poisoned lock still holds a consistent map
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, FormatterEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, FormatterEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Run a formatting closure, turning a panic into [`INVALID`].
pub(crate) fn guarded(f: impl FnOnce() -> String) -> String {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| INVALID.to_owned())
}

/// Render `args`, or [`INVALID`] if a `Display` or `Debug` implementation returns an error.
pub(crate) fn render_args(args: fmt::Arguments<'_>) -> String {
    let mut out = String::new();
    match out.write_fmt(args) {
        Ok(()) => out,
        Err(_) => INVALID.to_owned(),
    }
}
