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

use crate::Level;
use crate::Logger;
use crate::record::Record;

struct LogCrateLogger {
    logger: Logger,
}

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.logger.enabled(Level::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if !self.logger.enabled(level) {
            return;
        }

        let payload = record.args().to_string();
        let record = Record::builder()
            .level(level)
            .module(self.logger.module().or(Some(record.target())))
            .file(record.file())
            .line(record.line())
            .payload(&payload)
            .build();
        self.logger.engine().log_record(&record);
    }

    fn flush(&self) {
        self.logger.engine().flush();
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_boxed_logger`] so that all records from the log crate are
/// written by `logger`. The log crate's maximum level is set to the logger's level.
///
/// A record from a logger without a module is written with the record's target as its
/// module.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// use deferlog::Level;
/// use deferlog::Logger;
/// use deferlog::engine::Engine;
///
/// let logger = Logger::new(Engine::builder().level(Level::Info).build());
/// deferlog::bridge::try_setup_log_crate(logger).unwrap();
/// log::info!("This is an info message.");
/// ```
pub fn try_setup_log_crate(logger: Logger) -> Result<(), log::SetLoggerError> {
    let max_level = log::LevelFilter::from(logger.level());
    log::set_boxed_logger(Box::new(LogCrateLogger { logger }))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`].
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate(logger: Logger) {
    try_setup_log_crate(logger).expect(
        "deferlog::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}

impl Logger {
    /// Install this logger as the log crate global logger.
    ///
    /// See [`try_setup_log_crate`].
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        try_setup_log_crate(self)
    }
}
