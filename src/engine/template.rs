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
use std::fmt;
use std::fmt::Write;

use crate::formatter::INVALID;

/// A resolved argument, ready to be substituted into a format string.
///
/// The engine never evaluates anything lazily: by the time a [`Param`] exists the value is
/// either a string or something cheap to display.
pub enum Param<'a> {
    /// A string, borrowed or already materialized.
    Str(Cow<'a, str>),
    /// A value rendered through its `Display` implementation.
    Display(&'a dyn fmt::Display),
    /// A value rendered through its `Debug` implementation.
    Debug(&'a dyn fmt::Debug),
}

impl fmt::Display for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Str(s) => f.write_str(s),
            Param::Display(d) => fmt::Display::fmt(d, f),
            Param::Debug(d) => fmt::Debug::fmt(d, f),
        }
    }
}

impl fmt::Debug for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Param::Display(d) => f.debug_tuple("Display").field(&format_args!("{d}")).finish(),
            Param::Debug(d) => f.debug_tuple("Debug").field(d).finish(),
        }
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(s: &'a str) -> Self {
        Param::Str(Cow::Borrowed(s))
    }
}

impl From<String> for Param<'_> {
    fn from(s: String) -> Self {
        Param::Str(Cow::Owned(s))
    }
}

/// Substitute `params` into `format`.
///
/// Each `{}` takes the next parameter in order; `{{` and `}}` are literal braces. A `{}`
/// left without a parameter is kept verbatim and surplus parameters are ignored. Any other
/// brace is copied as is. A parameter whose `Display` or `Debug` fails is written as
/// [`INVALID`].
pub fn render(format: &str, params: &[Param<'_>]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut params = params.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) => {
                chars.next();
                out.push('{');
            }
            ('}', Some('}')) => {
                chars.next();
                out.push('}');
            }
            ('{', Some('}')) => {
                chars.next();
                match params.next() {
                    Some(param) => {
                        let start = out.len();
                        if write!(&mut out, "{param}").is_err() {
                            out.truncate(start);
                            out.push_str(INVALID);
                        }
                    }
                    None => out.push_str("{}"),
                }
            }
            (c, _) => out.push(c),
        }
    }

    out
}
