//! Listener-count threshold and emitter options.
//!
//! The process-wide default lives in an atomic so every emitter constructed
//! without an override can read it. Changing it never touches emitters that
//! already exist: each one captures the default at construction.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{EmitterError, Result};

/// Initial value of the shared default threshold.
pub const DEFAULT_MAX_LISTENERS: i64 = 10;

/// Shared default, stored in the `-1 = unlimited` encoding.
static SHARED_DEFAULT: AtomicI64 = AtomicI64::new(DEFAULT_MAX_LISTENERS);

// ============================================================================
// MaxListeners
// ============================================================================

/// Soft limit on listeners per event name.
///
/// Exceeding a limit only logs a warning. Zero and negative integer inputs
/// mean [`MaxListeners::Unlimited`]. A fractional input in `(0, 1)` is
/// `Limit(0)`, which warns on every registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxListeners {
    Unlimited,
    Limit(usize),
}

impl MaxListeners {
    pub fn from_i64(value: i64) -> Self {
        if value <= 0 {
            Self::Unlimited
        } else {
            Self::Limit(usize::try_from(value).unwrap_or(usize::MAX))
        }
    }

    fn from_f64(value: f64) -> Self {
        if value <= 0.0 || value.is_infinite() {
            Self::Unlimited
        } else {
            // Saturating float-to-int cast.
            Self::Limit(value.floor() as usize)
        }
    }

    /// Coerce a dynamic value the way unary `+` would: numbers, numeric
    /// strings, booleans and `null` are accepted.
    pub fn from_value(value: &Value) -> Result<Self> {
        coerce_number(value)
            .map(Self::from_f64)
            .ok_or_else(|| EmitterError::InvalidArgument {
                received: value.to_string(),
            })
    }

    /// Inverse of [`as_i64`](Self::as_i64): negative is unlimited, `0` stays
    /// `Limit(0)`.
    pub(crate) fn from_stored(value: i64) -> Self {
        usize::try_from(value).map_or(Self::Unlimited, Self::Limit)
    }

    /// `-1` for unlimited, the limit otherwise.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unlimited => -1,
            Self::Limit(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }

    /// Whether `count` listeners on one event exceed this threshold.
    pub fn is_exceeded_by(self, count: usize) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limit(n) => count > n,
        }
    }
}

impl Default for MaxListeners {
    fn default() -> Self {
        Self::from_i64(DEFAULT_MAX_LISTENERS)
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(0.0);
            }
            s.parse::<f64>().ok().filter(|f| !f.is_nan())
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

// ============================================================================
// Shared default
// ============================================================================

pub(crate) fn shared_default() -> MaxListeners {
    MaxListeners::from_stored(SHARED_DEFAULT.load(Ordering::Relaxed))
}

pub(crate) fn set_shared_default(value: MaxListeners) -> MaxListeners {
    SHARED_DEFAULT.store(value.as_i64(), Ordering::Relaxed);
    value
}

// ============================================================================
// EmitterOptions
// ============================================================================

/// Construction options for an [`Emitter`](crate::Emitter).
///
/// Deserializable so embedding components can keep emitter settings in their
/// own config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmitterOptions {
    /// Threshold override; `None` captures the shared default.
    pub max_listeners: Option<i64>,
}

impl EmitterOptions {
    pub fn with_max_listeners(mut self, value: i64) -> Self {
        self.max_listeners = Some(value);
        self
    }

    pub(crate) fn resolve_max_listeners(&self) -> MaxListeners {
        self.max_listeners
            .map(MaxListeners::from_i64)
            .unwrap_or_else(shared_default)
    }
}
