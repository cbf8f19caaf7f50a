use thiserror::Error;

// ---------------------------------------------------------------------------
// EmitterError
// ---------------------------------------------------------------------------

/// Contract violations raised synchronously by the emitter API.
///
/// These are programming errors, not transient failures. Errors reported by
/// listeners through an async continuation are plain data and never surface
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitterError {
    #[error("Listener for \"{event}\" must be callable, received {received}")]
    InvalidListener { event: String, received: String },

    #[error(
        "emit_async(\"{event}\", ..) requires a callable completion callback as its last argument"
    )]
    InvalidCallback { event: String },

    #[error("Max listeners must be a number, received {received}")]
    InvalidArgument { received: String },

    #[error("listen_to(source, \"{event}\") source no longer exposes an on(name, listener) capability")]
    InvalidSource { event: String },
}

pub type Result<T> = std::result::Result<T, EmitterError>;
