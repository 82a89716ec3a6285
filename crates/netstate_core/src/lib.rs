//! # netstate core
//!
//! Safe binding to the libnispor C ABI for retrieving a point-in-time
//! snapshot of host network state (interfaces, addresses, routes) as JSON.
//!
//! The native library hands back three independently-owned buffers
//! (state, error kind, error message) through out-parameters. This crate:
//! - Owns those buffers for exactly one call through [`NativeSlots`]
//! - Copies them into owned Rust strings before release
//! - Releases every non-null buffer exactly once, on every exit path
//! - Maps the return code and side-channel strings into [`NetStateError`]
//!
//! The JSON payload is treated as opaque. Schema handling belongs to callers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netstate_core::{LibraryConfig, NetStateRetriever};
//!
//! let retriever: NetStateRetriever = NetStateRetriever::open(&LibraryConfig::from_env()).unwrap();
//! let json = retriever.retrieve().unwrap();
//! println!("{json}");
//! ```

#![warn(missing_docs)]

mod config;
mod deadline;
mod error;
mod loader;
mod native;
mod retriever;
mod slots;

pub use config::{LibraryConfig, SymbolNames, DEFAULT_LIBRARY, LIBRARY_ENV};
pub use deadline::retrieve_with_timeout;
pub use error::{NetStateError, NetStateResult};
pub use loader::DynamicLibrary;
pub use native::{BufferKind, CollectStateFn, FreeFn, NativeLibrary, NISPOR_FAIL, NISPOR_PASS};
pub use retriever::{retrieve_net_state_json, NetStateRetriever};
pub use slots::NativeSlots;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
