//! The native library seam.
//!
//! libnispor exports one collection entry point and three matching free
//! functions:
//!
//! ```c
//! int nispor_net_state_retrieve(char **state, char **err_kind, char **err_msg);
//! void nispor_net_state_free(char *state);
//! void nispor_err_kind_free(char *err_kind);
//! void nispor_err_msg_free(char *err_msg);
//! ```
//!
//! [`NativeLibrary`] mirrors that contract so the retriever can run against
//! the real library or a test double.

use std::ffi::{c_char, c_int};
use std::fmt;

/// Return code for a successful native call.
pub const NISPOR_PASS: c_int = 0;

/// Return code the native library uses for a generic failure.
pub const NISPOR_FAIL: c_int = 1;

/// Signature of the native state-collection entry point.
pub type CollectStateFn =
    unsafe extern "C" fn(*mut *mut c_char, *mut *mut c_char, *mut *mut c_char) -> c_int;

/// Signature of the native free functions.
pub type FreeFn = unsafe extern "C" fn(*mut c_char);

/// Identifies one of the three out-buffers of a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// JSON-encoded net state.
    State,
    /// Error kind string.
    ErrKind,
    /// Error message string.
    ErrMsg,
}

impl BufferKind {
    /// All buffer kinds in release order.
    pub const ALL: [BufferKind; 3] = [BufferKind::State, BufferKind::ErrKind, BufferKind::ErrMsg];
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BufferKind::State => "state",
            BufferKind::ErrKind => "err_kind",
            BufferKind::ErrMsg => "err_msg",
        };
        f.write_str(name)
    }
}

/// A native library implementing the net state C ABI.
///
/// Implementations must be `Send + Sync`. Whether concurrent calls into the
/// native side are safe is up to the library; callers are not serialized.
///
/// # Safety
///
/// The safe [`crate::NetStateRetriever::retrieve`] reads whatever
/// `collect_state` writes, so implementors must guarantee:
///
/// - `collect_state` writes either null or a pointer to a freshly allocated,
///   NUL-terminated buffer into each out slot
/// - Each buffer stays valid until released through the free function
///   matching its slot, and is not touched by the library after that
/// - Free functions accept null as a no-op
///
/// A plain `impl` is rejected:
///
/// ```compile_fail
/// use netstate_core::NativeLibrary;
/// use std::ffi::{c_char, c_int};
///
/// struct Unchecked;
///
/// impl NativeLibrary for Unchecked {
///     unsafe fn collect_state(
///         &self,
///         _: *mut *mut c_char,
///         _: *mut *mut c_char,
///         _: *mut *mut c_char,
///     ) -> c_int {
///         0
///     }
///     unsafe fn free_state(&self, _: *mut c_char) {}
///     unsafe fn free_err_kind(&self, _: *mut c_char) {}
///     unsafe fn free_err_msg(&self, _: *mut c_char) {}
/// }
/// ```
pub unsafe trait NativeLibrary: Send + Sync {
    /// Collects the current net state.
    ///
    /// # Safety
    ///
    /// All three pointers must be valid for writes of one pointer each.
    unsafe fn collect_state(
        &self,
        state: *mut *mut c_char,
        err_kind: *mut *mut c_char,
        err_msg: *mut *mut c_char,
    ) -> c_int;

    /// Releases a state buffer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a state buffer from this library not yet freed.
    unsafe fn free_state(&self, ptr: *mut c_char);

    /// Releases an error kind buffer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or an error kind buffer from this library not yet freed.
    unsafe fn free_err_kind(&self, ptr: *mut c_char);

    /// Releases an error message buffer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or an error message buffer from this library not yet freed.
    unsafe fn free_err_msg(&self, ptr: *mut c_char);

    /// Releases a buffer through the free function matching `kind`.
    ///
    /// # Safety
    ///
    /// Same as the matching `free_*` function.
    unsafe fn release(&self, kind: BufferKind, ptr: *mut c_char) {
        match kind {
            BufferKind::State => self.free_state(ptr),
            BufferKind::ErrKind => self.free_err_kind(ptr),
            BufferKind::ErrMsg => self.free_err_msg(ptr),
        }
    }
}

// SAFETY: delegates to an implementation that upholds the contract.
unsafe impl<L: NativeLibrary + ?Sized> NativeLibrary for &L {
    unsafe fn collect_state(
        &self,
        state: *mut *mut c_char,
        err_kind: *mut *mut c_char,
        err_msg: *mut *mut c_char,
    ) -> c_int {
        (**self).collect_state(state, err_kind, err_msg)
    }

    unsafe fn free_state(&self, ptr: *mut c_char) {
        (**self).free_state(ptr);
    }

    unsafe fn free_err_kind(&self, ptr: *mut c_char) {
        (**self).free_err_kind(ptr);
    }

    unsafe fn free_err_msg(&self, ptr: *mut c_char) {
        (**self).free_err_msg(ptr);
    }
}

// SAFETY: delegates to an implementation that upholds the contract.
unsafe impl<L: NativeLibrary + ?Sized> NativeLibrary for std::sync::Arc<L> {
    unsafe fn collect_state(
        &self,
        state: *mut *mut c_char,
        err_kind: *mut *mut c_char,
        err_msg: *mut *mut c_char,
    ) -> c_int {
        (**self).collect_state(state, err_kind, err_msg)
    }

    unsafe fn free_state(&self, ptr: *mut c_char) {
        (**self).free_state(ptr);
    }

    unsafe fn free_err_kind(&self, ptr: *mut c_char) {
        (**self).free_err_kind(ptr);
    }

    unsafe fn free_err_msg(&self, ptr: *mut c_char) {
        (**self).free_err_msg(ptr);
    }
}
