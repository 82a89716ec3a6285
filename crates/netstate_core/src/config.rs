//! Configuration for loading the native library.

use std::path::PathBuf;

/// Environment variable overriding the library to load.
pub const LIBRARY_ENV: &str = "NETSTATE_LIBRARY";

/// Library name resolved through the system loader by default.
pub const DEFAULT_LIBRARY: &str = "libnispor.so.1";

/// Names of the four C ABI symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNames {
    /// State-collection entry point.
    pub collect_state: String,
    /// Free function for the state buffer.
    pub free_state: String,
    /// Free function for the error kind buffer.
    pub free_err_kind: String,
    /// Free function for the error message buffer.
    pub free_err_msg: String,
}

impl SymbolNames {
    /// Symbols exported by the libnispor C library.
    pub fn nispor() -> Self {
        Self {
            collect_state: "nispor_net_state_retrieve".into(),
            free_state: "nispor_net_state_free".into(),
            free_err_kind: "nispor_err_kind_free".into(),
            free_err_msg: "nispor_err_msg_free".into(),
        }
    }

    /// Symbols declared by the `nispor_state_get` variant of the header.
    pub fn nispor_state_get() -> Self {
        Self {
            collect_state: "nispor_state_get".into(),
            free_state: "nispor_state_free".into(),
            ..Self::nispor()
        }
    }
}

impl Default for SymbolNames {
    fn default() -> Self {
        Self::nispor()
    }
}

/// Configuration for [`crate::DynamicLibrary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Path or soname of the library.
    pub library: PathBuf,
    /// Symbol names to resolve.
    pub symbols: SymbolNames,
}

impl LibraryConfig {
    /// Creates a configuration for the library at `library`.
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
            symbols: SymbolNames::default(),
        }
    }

    /// Creates a configuration from `NETSTATE_LIBRARY`, falling back to
    /// [`DEFAULT_LIBRARY`].
    pub fn from_env() -> Self {
        match std::env::var_os(LIBRARY_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }

    /// Sets the library path.
    pub fn with_library(mut self, library: impl Into<PathBuf>) -> Self {
        self.library = library.into();
        self
    }

    /// Sets the symbol names.
    pub fn with_symbols(mut self, symbols: SymbolNames) -> Self {
        self.symbols = symbols;
        self
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LibraryConfig::default();
        assert_eq!(config.library, PathBuf::from(DEFAULT_LIBRARY));
        assert_eq!(config.symbols.collect_state, "nispor_net_state_retrieve");
    }

    #[test]
    fn builder() {
        let config = LibraryConfig::default()
            .with_library("/usr/local/lib64/libnispor.so")
            .with_symbols(SymbolNames::nispor_state_get());
        assert_eq!(config.library, PathBuf::from("/usr/local/lib64/libnispor.so"));
        assert_eq!(config.symbols.collect_state, "nispor_state_get");
        assert_eq!(config.symbols.free_state, "nispor_state_free");
        assert_eq!(config.symbols.free_err_msg, "nispor_err_msg_free");
    }
}
