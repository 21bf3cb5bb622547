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

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::arg::Arg;
use crate::arg::Loggable;
use crate::deferred::as_error_trace;
use crate::engine::Engine;
use crate::engine::Param;
use crate::formatter::FormatterRegistry;
use crate::formatter::guarded;
use crate::formatter::render_args;
use crate::record::Level;

/// The exit status of a process terminated by [`Logger::fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

fn exit_process(code: i32) {
    std::process::exit(code)
}

/// A logger bound to a module and a level.
///
/// Cloning is cheap and a logger never changes after construction, so it can be shared
/// freely between threads. Obtain one from [`get_logger`](crate::get_logger) or a
/// [`Registry`](crate::Registry).
///
/// Arguments are resolved just before a line is written, and only if the call passes the
/// level check:
///
/// * a [`Deferred`](crate::Deferred) is materialized;
/// * an [`Arg::Value`] is written by the formatter registered for its type, or through
///   `Debug` if there is none;
/// * everything else is written as is.
///
/// # Examples
///
/// ```
/// use deferlog::Level;
/// use deferlog::Logger;
/// use deferlog::append::Capture;
/// use deferlog::args;
/// use deferlog::deferred::as_json;
/// use deferlog::engine::Engine;
///
/// let capture = Capture::default();
/// let engine = Engine::builder().level(Level::Info).append(capture.clone()).build();
/// let logger = Logger::new(engine);
///
/// let payload = serde_json::json!({"id": 1});
/// logger.debug("skipped {}", args![as_json(&payload)]);
/// logger.info("user {} signed in", args!["ada"]);
/// assert_eq!(capture.len(), 1);
/// ```
#[derive(Clone)]
pub struct Logger {
    engine: Arc<Engine>,
    formatters: Arc<FormatterRegistry>,
    exit: fn(i32),
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("module", &self.engine.module())
            .field("level", &self.engine.level())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Wrap an engine, with a fresh [`FormatterRegistry`] seeded with the built-ins.
    pub fn new(engine: Engine) -> Self {
        Self::with_formatters(engine, Arc::new(FormatterRegistry::new()))
    }

    /// Wrap an engine, resolving typed values through a shared registry.
    pub fn with_formatters(engine: Engine, formatters: Arc<FormatterRegistry>) -> Self {
        Self {
            engine: Arc::new(engine),
            formatters,
            exit: exit_process,
        }
    }

    /// Replace what [`Logger::fatal`] calls after writing. Default to
    /// [`std::process::exit`].
    pub fn with_exit(mut self, exit: fn(i32)) -> Self {
        self.exit = exit;
        self
    }

    /// The module this logger is bound to, or `None` for the root logger.
    pub fn module(&self) -> Option<&str> {
        self.engine.module()
    }

    /// The least severe level this logger writes.
    pub fn level(&self) -> Level {
        self.engine.level()
    }

    /// The engine this logger writes through.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// The registry typed values are resolved against.
    pub fn formatters(&self) -> &Arc<FormatterRegistry> {
        &self.formatters
    }

    /// Whether the logger's level is exactly `level`.
    ///
    /// This is an equality check: a logger at `Info` answers `false` for `Warn` even though
    /// it writes warnings. Use [`Logger::enabled`] to ask whether a call would be written.
    pub fn is_level(&self, level: Level) -> bool {
        self.engine.level() == level
    }

    /// Whether a call at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        self.engine.enabled(level)
    }

    /// Log at [`Level::Trace`].
    #[track_caller]
    pub fn trace(&self, format: &str, args: &[Arg<'_>]) {
        self.log(Level::Trace, format, args);
    }

    /// Log at [`Level::Debug`].
    #[track_caller]
    pub fn debug(&self, format: &str, args: &[Arg<'_>]) {
        self.log(Level::Debug, format, args);
    }

    /// Log at [`Level::Debug`], appending `err` if there is one.
    #[track_caller]
    pub fn debug_with_error(
        &self,
        format: &str,
        err: Option<&(dyn Error + 'static)>,
        args: &[Arg<'_>],
    ) {
        self.log_with_error(Level::Debug, format, err, args);
    }

    /// Log at [`Level::Info`].
    #[track_caller]
    pub fn info(&self, format: &str, args: &[Arg<'_>]) {
        self.log(Level::Info, format, args);
    }

    /// Log at [`Level::Warn`], appending `err` if there is one.
    #[track_caller]
    pub fn warn(&self, format: &str, err: Option<&(dyn Error + 'static)>, args: &[Arg<'_>]) {
        self.log_with_error(Level::Warn, format, err, args);
    }

    /// Log at [`Level::Error`], appending `err` if there is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// use deferlog::Logger;
    /// use deferlog::append::Capture;
    /// use deferlog::args;
    /// use deferlog::engine::Engine;
    ///
    /// let capture = Capture::default();
    /// let logger = Logger::new(Engine::builder().append(capture.clone()).build());
    ///
    /// let err = io::Error::other("connection reset");
    /// logger.error("failed to sync {}", Some(&err), args!["orders"]);
    /// assert!(capture.lines()[0].contains("failed to sync orders: connection reset"));
    /// ```
    #[track_caller]
    pub fn error(&self, format: &str, err: Option<&(dyn Error + 'static)>, args: &[Arg<'_>]) {
        self.log_with_error(Level::Error, format, err, args);
    }

    /// Log at [`Level::Fatal`], appending `err` if there is one, then terminate the process
    /// with [`FATAL_EXIT_CODE`].
    ///
    /// The engine is flushed before exiting. The exit can be replaced with
    /// [`Logger::with_exit`], in which case this returns after calling it.
    #[track_caller]
    pub fn fatal(&self, format: &str, err: Option<&(dyn Error + 'static)>, args: &[Arg<'_>]) {
        self.log_with_error(Level::Fatal, format, err, args);
        self.engine.flush();
        (self.exit)(FATAL_EXIT_CODE);
    }

    /// Log at `level`.
    #[track_caller]
    pub fn log(&self, level: Level, format: &str, args: &[Arg<'_>]) {
        self.log_with_error(level, format, None, args);
    }

    /// Log at `level`, appending `": {}"` and the rendered `err` if there is one.
    #[track_caller]
    pub fn log_with_error(
        &self,
        level: Level,
        format: &str,
        err: Option<&(dyn Error + 'static)>,
        args: &[Arg<'_>],
    ) {
        if !self.engine.enabled(level) {
            return;
        }

        let trace = err.map(|err| Arg::Deferred(as_error_trace(err)));
        let mut params = self.refine_args(args);
        let format = match &trace {
            Some(trace) => {
                params.push(self.refine(trace));
                Cow::Owned(format!("{format}: {{}}"))
            }
            None => Cow::Borrowed(format),
        };

        self.engine
            .log(level, &format, &params, Some(Location::caller()));
    }

    fn refine_args<'a>(&self, args: &'a [Arg<'_>]) -> Vec<Param<'a>> {
        args.iter().map(|arg| self.refine(arg)).collect()
    }

    // every path into caller code is guarded, so a bad argument becomes INVALID
    fn refine<'a>(&self, arg: &'a Arg<'_>) -> Param<'a> {
        let rendered = match arg {
            Arg::Str(s) => return Param::Str(Cow::Borrowed(s)),
            Arg::Display(d) => guarded(|| render_args(format_args!("{d}"))),
            Arg::Deferred(d) => d.materialize(),
            Arg::Value { value, hint } => {
                match self.formatters.format(Loggable::as_any(*value), hint) {
                    Some(formatted) => formatted,
                    None => {
                        let debug = Loggable::as_debug(*value);
                        guarded(|| render_args(format_args!("{debug:?}")))
                    }
                }
            }
        };
        Param::Str(Cow::Owned(rendered))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;
    use std::sync::atomic::AtomicI32;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::Deferred;
    use crate::DetailedError;
    use crate::append::Capture;
    use crate::args;

    fn logger_at(level: Level) -> (Logger, Capture) {
        let capture = Capture::default();
        let engine = Engine::builder()
            .level(level)
            .module("billing")
            .append(capture.clone())
            .build();
        (Logger::new(engine), capture)
    }

    #[test]
    fn is_level_is_strict_equality() {
        let (logger, _) = logger_at(Level::Info);
        assert!(logger.is_level(Level::Info));
        assert!(!logger.is_level(Level::Warn));
        assert!(!logger.is_level(Level::Debug));
        assert!(logger.enabled(Level::Warn));
        assert!(!logger.enabled(Level::Debug));
    }

    #[test]
    fn filtered_calls_skip_deferred_values() {
        let (logger, capture) = logger_at(Level::Warn);
        let calls = Cell::new(0);
        let deferred = Deferred::new(|| {
            calls.set(calls.get() + 1);
            "expensive".to_owned()
        });

        logger.info("value {}", args![deferred]);
        assert_eq!(calls.get(), 0);
        assert!(capture.is_empty());
    }

    #[test]
    fn deferred_values_are_materialized_once() {
        let (logger, capture) = logger_at(Level::Trace);
        let calls = Cell::new(0);
        let deferred = Deferred::new(|| {
            calls.set(calls.get() + 1);
            "expensive".to_owned()
        });

        logger.debug("value {} and {}", args![deferred, 7]);
        assert_eq!(calls.get(), 1);
        assert!(capture.lines()[0].contains("DEBUG"));
        assert!(capture.contains("value expensive and 7 module=billing"));
    }

    #[test]
    fn typed_values_use_registered_formatters() {
        #[derive(Debug)]
        struct Cents(i64);
        #[derive(Debug)]
        struct Unregistered(u8);

        let (logger, capture) = logger_at(Level::Info);
        logger
            .formatters()
            .set_formatter::<Cents>(|c, hint| format!("{}.{:02} {hint}", c.0 / 100, c.0 % 100));

        logger.info(
            "charged {} for {}",
            &[Arg::value_with_hint(&Cents(1250), "EUR"), Arg::value(&Unregistered(3))],
        );
        assert!(capture.contains("charged 12.50 EUR for Unregistered(3)"));
    }

    #[test]
    fn builtin_time_formatter_applies_to_values() {
        let (logger, capture) = logger_at(Level::Info);
        let ts: jiff::Timestamp = "2024-03-10T08:15:30Z".parse().unwrap();
        logger.info("due {}", &[Arg::value(&ts)]);
        assert!(capture.contains("due 2024-03-10T08:15:30Z"));
    }

    #[test]
    fn error_is_appended_to_the_message() {
        let (logger, capture) = logger_at(Level::Info);
        let err = DetailedError::new("card expired").with_code("E1");

        logger.warn("charge {} failed", Some(&err), args!["#42"]);
        logger.error("no error here", None, &[]);

        let lines = capture.lines();
        let expected = r#"charge #42 failed: card expired: {"code":"E1","message":"card expired"}"#;
        assert!(lines[0].contains(" WARN "), "{}", lines[0]);
        assert!(lines[0].contains(expected), "{}", lines[0]);
        assert!(lines[1].contains("no error here module=billing"));
    }

    #[test]
    fn debug_with_error_respects_level() {
        let (logger, capture) = logger_at(Level::Info);
        let err = io::Error::other("timeout");
        logger.debug_with_error("retrying", Some(&err), &[]);
        assert!(capture.is_empty());
    }

    struct FailingDisplay;

    impl fmt::Display for FailingDisplay {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    struct PanickingDisplay;

    impl fmt::Display for PanickingDisplay {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("display exploded")
        }
    }

    struct FailingDebug;

    impl fmt::Debug for FailingDebug {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("half")?;
            Err(fmt::Error)
        }
    }

    struct PanickingDebug;

    impl fmt::Debug for PanickingDebug {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("debug exploded")
        }
    }

    #[test]
    fn failing_display_is_invalid() {
        let (logger, capture) = logger_at(Level::Info);
        logger.info("value {}", &[Arg::display(&FailingDisplay)]);
        assert!(capture.contains("value !invalid module=billing"), "{:?}", capture.lines());
    }

    #[test]
    fn panicking_display_is_invalid() {
        let (logger, capture) = logger_at(Level::Info);
        logger.warn("value {}", None, &[Arg::display(&PanickingDisplay)]);
        assert!(capture.contains("value !invalid module=billing"), "{:?}", capture.lines());
    }

    #[test]
    fn failing_debug_fallback_is_invalid() {
        let (logger, capture) = logger_at(Level::Info);
        logger.info("value {} then {}", &[Arg::value(&FailingDebug), "next".into()]);
        assert!(capture.contains("value !invalid then next"), "{:?}", capture.lines());
    }

    #[test]
    fn panicking_debug_fallback_is_invalid() {
        let (logger, capture) = logger_at(Level::Info);
        let err = io::Error::other("still reported");
        logger.error("value {}", Some(&err), &[Arg::value(&PanickingDebug)]);
        assert!(
            capture.contains("value !invalid: still reported"),
            "{:?}",
            capture.lines()
        );
    }

    #[test]
    fn call_site_is_recorded() {
        let (logger, capture) = logger_at(Level::Info);
        logger.info("here", &[]);
        assert!(capture.contains("src/logger.rs:"));
    }

    #[test]
    fn fatal_writes_flushes_and_exits() {
        static EXIT_CODE: AtomicI32 = AtomicI32::new(-1);

        let (logger, capture) = logger_at(Level::Error);
        let logger = logger.with_exit(|code| EXIT_CODE.store(code, Ordering::SeqCst));
        let err = io::Error::other("disk corrupted");

        logger.fatal("cannot continue", Some(&err), &[]);

        assert_eq!(EXIT_CODE.load(Ordering::SeqCst), FATAL_EXIT_CODE);
        assert!(capture.contains("FATAL"));
        assert!(capture.contains("cannot continue: disk corrupted"));
    }
}
