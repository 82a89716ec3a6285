//! Scoped ownership of native out-buffers.

use crate::native::{BufferKind, NativeLibrary};
use std::ffi::{c_char, CStr};
use std::ptr;

/// The three out-slots of one native call.
///
/// The slots start null and are handed to the native call as out-parameters.
/// Whatever the native side writes into them is owned by this guard until it
/// drops, at which point every non-null buffer is released exactly once
/// through its matching free function. Reads borrow from the guard, so no
/// copy can outlive the release.
pub struct NativeSlots<'lib, L: NativeLibrary + ?Sized> {
    library: &'lib L,
    state: *mut c_char,
    err_kind: *mut c_char,
    err_msg: *mut c_char,
}

impl<'lib, L: NativeLibrary + ?Sized> NativeSlots<'lib, L> {
    /// Creates empty slots bound to `library`.
    pub fn new(library: &'lib L) -> Self {
        Self {
            library,
            state: ptr::null_mut(),
            err_kind: ptr::null_mut(),
            err_msg: ptr::null_mut(),
        }
    }

    /// Runs the native collection call, filling the slots.
    ///
    /// Buffers left over from an earlier call on the same slots are released
    /// first.
    pub fn collect(&mut self) -> i32 {
        self.release_all();
        // SAFETY: the three pointers address fields of `self`, which stay
        // valid and exclusively borrowed for the whole call.
        unsafe {
            self.library.collect_state(
                ptr::addr_of_mut!(self.state),
                ptr::addr_of_mut!(self.err_kind),
                ptr::addr_of_mut!(self.err_msg),
            )
        }
    }

    /// Returns true if the native side left `kind` null.
    pub fn is_null(&self, kind: BufferKind) -> bool {
        self.slot(kind).is_null()
    }

    /// Borrows the buffer in `kind` as a C string.
    pub fn get(&self, kind: BufferKind) -> Option<&CStr> {
        let ptr = self.slot(kind);
        if ptr.is_null() {
            return None;
        }
        // SAFETY: non-null slots hold NUL-terminated buffers from the native
        // library that are not released before `self` drops.
        Some(unsafe { CStr::from_ptr(ptr) })
    }

    /// Copies the buffer in `kind` into an owned string, replacing invalid
    /// UTF-8.
    pub fn copy_lossy(&self, kind: BufferKind) -> Option<String> {
        self.get(kind)
            .map(|cstr| cstr.to_string_lossy().into_owned())
    }

    fn slot(&self, kind: BufferKind) -> *mut c_char {
        match kind {
            BufferKind::State => self.state,
            BufferKind::ErrKind => self.err_kind,
            BufferKind::ErrMsg => self.err_msg,
        }
    }

    fn take(&mut self, kind: BufferKind) -> *mut c_char {
        let slot = match kind {
            BufferKind::State => &mut self.state,
            BufferKind::ErrKind => &mut self.err_kind,
            BufferKind::ErrMsg => &mut self.err_msg,
        };
        std::mem::replace(slot, ptr::null_mut())
    }

    fn release_all(&mut self) {
        for kind in BufferKind::ALL {
            let ptr = self.take(kind);
            if !ptr.is_null() {
                // SAFETY: `ptr` came from the native library for this slot and
                // has been taken out of the slot, so it cannot be freed again.
                unsafe { self.library.release(kind, ptr) };
            }
        }
    }
}

impl<L: NativeLibrary + ?Sized> Drop for NativeSlots<'_, L> {
    fn drop(&mut self) {
        self.release_all();
    }
}
