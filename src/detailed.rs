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

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::formatter::INVALID;

/// An error that carries a structured payload next to its message.
///
/// When logged through [`as_error_trace`](crate::deferred::as_error_trace), it renders as
/// `"<message>: <payload as json>"`; any other error renders as its message alone.
///
/// # Examples
///
/// ```
/// use deferlog::DetailedError;
///
/// let err = DetailedError::new("payment declined")
///     .with_code("E402")
///     .with_detail("order", 1042);
/// assert_eq!(err.to_string(), "payment declined");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedError {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    details: Map<String, Value>,
}

impl DetailedError {
    /// Create an error with a message and no payload.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Set a machine readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a detail. A value that fails to serialize is stored as [`INVALID`].
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|_| Value::from(INVALID));
        self.details.insert(key.into(), value);
        self
    }

    /// The machine readable code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The attached details.
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

impl fmt::Display for DetailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DetailedError {}
