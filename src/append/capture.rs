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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Append;
use crate::layout::Layout;
use crate::layout::TextLayout;
use crate::record::Record;

/// An appender that keeps formatted lines in memory.
///
/// Clones share the same buffer, so a handle can be kept to inspect what a logger wrote.
///
/// # Examples
///
/// ```
/// use deferlog::Level;
/// use deferlog::append::Capture;
/// use deferlog::engine::Engine;
///
/// let capture = Capture::default();
/// let engine = Engine::builder()
///     .level(Level::Info)
///     .append(capture.clone())
///     .build();
/// engine.log(Level::Info, "hello {}", &["world".into()], None);
/// assert!(capture.lines()[0].ends_with("hello world"));
/// ```
#[derive(Debug, Clone)]
pub struct Capture {
    lines: Arc<Mutex<Vec<String>>>,
    layout: Arc<dyn Layout>,
}

impl Default for Capture {
    fn default() -> Self {
        Self {
            lines: Arc::default(),
            layout: Arc::new(TextLayout::default().no_color()),
        }
    }
}

impl Capture {
    /// Set the layout. Default to [`TextLayout`] without colors.
    pub fn with_layout(mut self, layout: impl Layout) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    /// A snapshot of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.buffer().clone()
    }

    /// Whether any written line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.buffer().iter().any(|line| line.contains(needle))
    }

    /// The number of lines written so far.
    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Drop every captured line.
    pub fn clear(&self) {
        self.buffer().clear();
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Append for Capture {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let bytes = self.layout.format(record)?;
        let line = String::from_utf8_lossy(&bytes).into_owned();
        self.buffer().push(line);
        Ok(())
    }
}
