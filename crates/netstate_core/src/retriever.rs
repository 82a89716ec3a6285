//! Net state retrieval.

use crate::config::LibraryConfig;
use crate::error::{NetStateError, NetStateResult};
use crate::loader::DynamicLibrary;
use crate::native::{BufferKind, NativeLibrary, NISPOR_PASS};
use crate::slots::NativeSlots;
use tracing::{debug, trace};

/// Retrieves JSON snapshots of host network state from a native library.
///
/// Each call is independent: no caching, no retries, no state shared between
/// calls. Calls from several threads are passed straight through to the
/// native library.
#[derive(Debug)]
pub struct NetStateRetriever<L: NativeLibrary = DynamicLibrary> {
    library: L,
}

impl<L: NativeLibrary> NetStateRetriever<L> {
    /// Creates a retriever over `library`.
    pub fn new(library: L) -> Self {
        Self { library }
    }

    /// Returns the underlying native library.
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Retrieves the current net state as a JSON string.
    ///
    /// The returned string is an owned copy; all native buffers are released
    /// before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`NetStateError::Native`] if the native call returns non-zero,
    ///   carrying the code and any error kind/message it reported
    /// - [`NetStateError::MissingState`] if the call succeeds without a payload
    /// - [`NetStateError::InvalidUtf8`] if the payload is not UTF-8
    pub fn retrieve(&self) -> NetStateResult<String> {
        let mut slots = NativeSlots::new(&self.library);
        let code = slots.collect();
        trace!(code, "native net state call returned");

        if code != NISPOR_PASS {
            let kind = slots.copy_lossy(BufferKind::ErrKind);
            let message = slots.copy_lossy(BufferKind::ErrMsg);
            debug!(code, ?kind, ?message, "native net state retrieval failed");
            return Err(NetStateError::Native {
                code,
                kind,
                message,
            });
        }

        if !slots.is_null(BufferKind::ErrKind) || !slots.is_null(BufferKind::ErrMsg) {
            debug!("native library reported success with error buffers set");
        }

        let state = slots
            .get(BufferKind::State)
            .ok_or(NetStateError::MissingState)?;
        if state.is_empty() {
            return Err(NetStateError::MissingState);
        }
        Ok(state.to_str()?.to_owned())
    }
}

impl NetStateRetriever<DynamicLibrary> {
    /// Loads the native library described by `config`.
    pub fn open(config: &LibraryConfig) -> NetStateResult<Self> {
        DynamicLibrary::load(config).map(Self::new)
    }
}

/// Loads libnispor from [`LibraryConfig::from_env`] and retrieves the current
/// net state as a JSON string.
pub fn retrieve_net_state_json() -> NetStateResult<String> {
    NetStateRetriever::<DynamicLibrary>::open(&LibraryConfig::from_env())?.retrieve()
}
