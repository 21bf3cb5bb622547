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

use std::fmt::Write;

use jiff::tz::TimeZone;

use crate::Error;
use crate::layout::Layout;
use crate::layout::local_time;
use crate::record::Level;
use crate::record::Record;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR src/db.rs:51 replica lost: timeout module=db
/// 2024-08-11T22:44:57.172219+08:00  WARN src/db.rs:52 slow query module=db
/// 2024-08-11T22:44:57.172276+08:00  INFO src/main.rs:12 started
/// ```
///
/// The ` module=<name>` suffix is only present for module loggers.
///
/// With the `colored` feature, levels are colored unless [`TextLayout::no_color`] is set.
///
/// # Examples
///
/// ```
/// use deferlog::layout::TextLayout;
///
/// let layout = TextLayout::default().no_color();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    #[cfg(feature = "colored")]
    colors: LevelColor,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
    tz: Option<TimeZone>,
}

/// Customize the color of each log level.
#[cfg(feature = "colored")]
#[derive(Debug, Clone)]
pub struct LevelColor {
    pub fatal: colored::Color,
    pub error: colored::Color,
    pub warn: colored::Color,
    pub info: colored::Color,
    pub debug: colored::Color,
    pub trace: colored::Color,
}

#[cfg(feature = "colored")]
impl Default for LevelColor {
    fn default() -> Self {
        use colored::Color;

        Self {
            fatal: Color::BrightRed,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

impl TextLayout {
    /// Customize the level colors.
    #[cfg(feature = "colored")]
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Disable level coloring.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Set the timezone for timestamps. Defaults to the system timezone.
    ///
    /// # Examples
    ///
    /// ```
    /// use deferlog::layout::TextLayout;
    /// use jiff::tz::TimeZone;
    ///
    /// let layout = TextLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    fn format_level(&self, level: Level) -> String {
        let text = format!("{level:>5}");

        #[cfg(feature = "colored")]
        if !self.no_color {
            use colored::Colorize;

            let color = match level {
                Level::Fatal => self.colors.fatal,
                Level::Error => self.colors.error,
                Level::Warn => self.colors.warn,
                Level::Info => self.colors.info,
                Level::Debug => self.colors.debug,
                Level::Trace => self.colors.trace,
            };
            return text.color(color).to_string();
        }

        text
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = local_time(record, self.tz.as_ref())?;
        let level = self.format_level(record.level());

        let mut text = String::new();
        // SAFETY: write to a string always succeeds
        write!(&mut text, "{} {level} ", time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z")).unwrap();
        if let Some(file) = record.file() {
            let line = record.line().unwrap_or_default();
            write!(&mut text, "{file}:{line} ").unwrap();
        }
        text.push_str(record.payload());
        if let Some(module) = record.module() {
            write!(&mut text, " module={module}").unwrap();
        }

        Ok(text.into_bytes())
    }
}
