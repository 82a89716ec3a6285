//! Error types for net state retrieval.

use std::path::PathBuf;
use std::str::Utf8Error;
use std::time::Duration;
use thiserror::Error;

/// Result type for net state operations.
pub type NetStateResult<T> = Result<T, NetStateError>;

/// Errors that can occur while retrieving net state.
#[derive(Debug, Error)]
pub enum NetStateError {
    /// The native library returned a non-zero code.
    #[error("failed retrieving net state with rc {code}{}", describe(.kind, .message))]
    Native {
        /// Return code from the native call.
        code: i32,
        /// Error kind reported by the native library, if any.
        kind: Option<String>,
        /// Error message reported by the native library, if any.
        message: Option<String>,
    },

    /// The native call succeeded but produced no payload.
    #[error("native library reported success without a net state payload")]
    MissingState,

    /// The payload is not valid UTF-8.
    #[error("net state payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    /// The native library could not be loaded.
    #[error("failed to load native library {}: {source}", .path.display())]
    Library {
        /// Path or name that was loaded.
        path: PathBuf,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },

    /// A required symbol is missing from the native library.
    #[error("native library has no symbol {symbol}: {source}")]
    Symbol {
        /// Symbol name.
        symbol: String,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },

    /// The retrieval did not finish within the deadline.
    #[error("net state retrieval timed out after {0:?}")]
    Timeout(Duration),

    /// The retrieval worker could not be started.
    #[error("failed to spawn net state retrieval worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The worker running the retrieval panicked.
    #[error("net state retrieval worker panicked")]
    WorkerPanicked,
}

fn describe(kind: &Option<String>, message: &Option<String>) -> String {
    match (kind, message) {
        (Some(kind), Some(message)) => format!(": {kind}: {message}"),
        (Some(kind), None) => format!(": {kind}"),
        (None, Some(message)) => format!(": {message}"),
        (None, None) => String::new(),
    }
}

impl NetStateError {
    /// Returns the native return code, if this is a native failure.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the native error kind, if one was reported.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Native { kind, .. } => kind.as_deref(),
            _ => None,
        }
    }

    /// Returns the native error message, if one was reported.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Native { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_display_includes_diagnostics() {
        let err = NetStateError::Native {
            code: 1,
            kind: Some("InvalidArgument".into()),
            message: Some("bad filter".into()),
        };
        assert_eq!(
            err.to_string(),
            "failed retrieving net state with rc 1: InvalidArgument: bad filter"
        );
    }

    #[test]
    fn native_display_without_diagnostics() {
        let err = NetStateError::Native {
            code: 7,
            kind: None,
            message: None,
        };
        assert_eq!(err.to_string(), "failed retrieving net state with rc 7");
        assert_eq!(err.code(), Some(7));
        assert!(err.kind().is_none());
        assert!(err.message().is_none());
    }

    #[test]
    fn accessors_on_other_variants() {
        let err = NetStateError::MissingState;
        assert!(err.kind().is_none());
        assert!(err.code().is_none());
    }
}
