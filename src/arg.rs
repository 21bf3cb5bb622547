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

//! Arguments accepted by [`Logger`](crate::Logger) calls.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use crate::deferred::Deferred;

/// A value that can be passed to [`Arg::value`] and matched against the
/// [`FormatterRegistry`](crate::formatter::FormatterRegistry).
///
/// Implemented for every `'static` type with a `Debug` implementation; `Debug` is the
/// fallback when no formatter is registered for the type.
pub trait Loggable: Any + fmt::Debug {
    /// Upcast to `&dyn Any` for formatter lookup.
    fn as_any(&self) -> &dyn Any;

    /// Upcast to `&dyn Debug` for the fallback rendering.
    fn as_debug(&self) -> &dyn fmt::Debug;
}

impl<T: Any + fmt::Debug> Loggable for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }
}

/// One argument of a log call.
///
/// Build them with `From` conversions, the constructors below, or the
/// [`args!`](crate::args) macro.
pub enum Arg<'a> {
    /// Written as is.
    Str(Cow<'a, str>),
    /// Written through `Display`.
    Display(&'a dyn fmt::Display),
    /// Written by the formatter registered for its type, or through `Debug` if there is none.
    Value {
        /// The value.
        value: &'a dyn Loggable,
        /// Passed to the formatter.
        hint: &'a str,
    },
    /// Materialized only if the call passes the level check.
    Deferred(Deferred<'a>),
}

impl<'a> Arg<'a> {
    /// Write `value` through its `Display` implementation.
    pub fn display<T: fmt::Display>(value: &'a T) -> Self {
        Arg::Display(value)
    }

    /// Write `value` with the formatter registered for `T`.
    pub fn value<T: Loggable>(value: &'a T) -> Self {
        Arg::Value { value, hint: "" }
    }

    /// Write `value` with the formatter registered for `T`, passing `hint` along.
    ///
    /// The built-in time formatter reads the hint as a strftime pattern.
    pub fn value_with_hint<T: Loggable>(value: &'a T, hint: &'a str) -> Self {
        Arg::Value { value, hint }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Arg::Display(d) => f.debug_tuple("Display").field(&format_args!("{d}")).finish(),
            Arg::Value { value, hint } => f
                .debug_struct("Value")
                .field("value", Loggable::as_debug(*value))
                .field("hint", hint)
                .finish(),
            Arg::Deferred(d) => f.debug_tuple("Deferred").field(d).finish(),
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Str(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(s: &'a String) -> Self {
        Arg::Str(Cow::Borrowed(s))
    }
}

impl From<String> for Arg<'_> {
    fn from(s: String) -> Self {
        Arg::Str(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Arg<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Arg::Str(s)
    }
}

impl<'a> From<Deferred<'a>> for Arg<'a> {
    fn from(d: Deferred<'a>) -> Self {
        Arg::Deferred(d)
    }
}

macro_rules! impl_from_to_string {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg<'_> {
                fn from(v: $ty) -> Self {
                    Arg::Str(Cow::Owned(v.to_string()))
                }
            }
        )*
    };
}

impl_from_to_string!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);
