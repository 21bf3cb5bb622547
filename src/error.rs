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

use std::fmt;
use std::io;

/// An error from setting up logging: a malformed level or configuration, or an append
/// failing to write.
///
/// Log calls themselves never return one; failures while logging are handed to a
/// [`Trap`](crate::trap::Trap) instead.
pub struct Error {
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;

        for (i, (k, v)) in self.context.iter().enumerate() {
            let open = if i == 0 { " [" } else { "; " };
            write!(f, "{open}{k}: {v}")?;
        }
        if !self.context.is_empty() {
            f.write_str("]")?;
        }

        match &self.source {
            Some(source) => write!(f, ": {source}"),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("message", &self.message)
            .field("context", &self.context)
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

impl Error {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: vec![],
            source: None,
        }
    }

    /// Attach a context pair. A key may be repeated, as for the problems of a config.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set the underlying cause.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The error message, without context or source.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The attached context pairs, in insertion order.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    pub(crate) fn from_io_error(err: io::Error) -> Error {
        Error::new("failed to write log record").with_source(err)
    }

    pub(crate) fn from_json_error(err: serde_json::Error) -> Error {
        Error::new("failed to encode log record as json").with_source(err)
    }
}
