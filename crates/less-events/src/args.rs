//! Arg: a dynamically typed argument passed to listeners.
//!
//! Emission is variadic: every listener receives `&[Arg]`. Plain data travels
//! as [`serde_json::Value`]; listeners themselves (e.g. in `"removeListener"`
//! notifications) and async continuations travel as their own variants so they
//! stay callable on the receiving side.

use std::fmt;

use serde_json::Value;

use crate::{listener::Listener, pipeline::Next};

/// A single argument of an emission.
#[derive(Clone)]
pub enum Arg {
    /// Plain data.
    Value(Value),
    /// A listener handle (identity preserved).
    Listener(Listener),
    /// The continuation appended by [`Emitter::emit_async`](crate::Emitter::emit_async).
    Next(Next),
}

impl Arg {
    /// Whether this argument can be registered as a listener.
    ///
    /// A continuation counts: registering it forwards the first argument of
    /// each call as the continuation's error.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Listener(_) | Self::Next(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_next(&self) -> Option<&Next> {
        match self {
            Self::Next(n) => Some(n),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "boolean",
            Self::Value(Value::Number(_)) => "number",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_)) => "array",
            Self::Value(Value::Object(_)) => "object",
            Self::Listener(_) => "listener",
            Self::Next(_) => "continuation",
        }
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Listener(l) => fmt::Debug::fmt(l, f),
            Self::Next(n) => fmt::Debug::fmt(n, f),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Listener(a), Self::Listener(b)) => a == b,
            (Self::Next(a), Self::Next(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<Listener> for Arg {
    fn from(l: Listener) -> Self {
        Self::Listener(l)
    }
}

impl From<Next> for Arg {
    fn from(n: Next) -> Self {
        Self::Next(n)
    }
}

macro_rules! impl_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Self::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_from_value!(&str, String, bool, i32, i64, u32, u64, f64);
