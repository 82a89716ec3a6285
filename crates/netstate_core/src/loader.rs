//! Runtime loading of libnispor.

use crate::config::LibraryConfig;
use crate::error::{NetStateError, NetStateResult};
use crate::native::{CollectStateFn, FreeFn, NativeLibrary};
use libloading::Library;
use std::ffi::{c_char, c_int};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// libnispor loaded at runtime.
///
/// The resolved function pointers stay valid for as long as the library
/// handle is held, which is the lifetime of this value.
pub struct DynamicLibrary {
    collect_state: CollectStateFn,
    free_state: FreeFn,
    free_err_kind: FreeFn,
    free_err_msg: FreeFn,
    path: PathBuf,
    _library: Library,
}

impl DynamicLibrary {
    /// Loads the library described by `config`.
    pub fn load(config: &LibraryConfig) -> NetStateResult<Self> {
        // SAFETY: loading runs the library's initializers; libnispor has none
        // with preconditions on the host process.
        let library = unsafe { Library::new(&config.library) }.map_err(|source| {
            NetStateError::Library {
                path: config.library.clone(),
                source,
            }
        })?;

        let symbols = &config.symbols;
        // SAFETY: the declared signatures match the libnispor C header.
        let (collect_state, free_state, free_err_kind, free_err_msg) = unsafe {
            (
                resolve::<CollectStateFn>(&library, &symbols.collect_state)?,
                resolve::<FreeFn>(&library, &symbols.free_state)?,
                resolve::<FreeFn>(&library, &symbols.free_err_kind)?,
                resolve::<FreeFn>(&library, &symbols.free_err_msg)?,
            )
        };

        debug!(path = %config.library.display(), "loaded native net state library");

        Ok(Self {
            collect_state,
            free_state,
            free_err_kind,
            free_err_msg,
            path: config.library.clone(),
            _library: library,
        })
    }

    /// Loads the library at `path` with the default symbol names.
    pub fn open(path: impl AsRef<Path>) -> NetStateResult<Self> {
        Self::load(&LibraryConfig::new(path.as_ref()))
    }

    /// Returns the path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves `name` to a function pointer of type `T`.
///
/// # Safety
///
/// `T` must match the symbol's real signature, and the returned pointer must
/// not outlive `library`.
unsafe fn resolve<T: Copy>(library: &Library, name: &str) -> NetStateResult<T> {
    library
        .get::<T>(name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|source| NetStateError::Symbol {
            symbol: name.to_string(),
            source,
        })
}

impl fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// SAFETY: the function pointers were resolved from libnispor, whose C ABI
// makes these guarantees, and `_library` keeps them loaded.
unsafe impl NativeLibrary for DynamicLibrary {
    unsafe fn collect_state(
        &self,
        state: *mut *mut c_char,
        err_kind: *mut *mut c_char,
        err_msg: *mut *mut c_char,
    ) -> c_int {
        (self.collect_state)(state, err_kind, err_msg)
    }

    unsafe fn free_state(&self, ptr: *mut c_char) {
        (self.free_state)(ptr);
    }

    unsafe fn free_err_kind(&self, ptr: *mut c_char) {
        (self.free_err_kind)(ptr);
    }

    unsafe fn free_err_msg(&self, ptr: *mut c_char) {
        (self.free_err_msg)(ptr);
    }
}
