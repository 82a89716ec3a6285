//! # netstate testkit
//!
//! Test utilities for netstate.
//!
//! This crate provides:
//! - [`CountingNative`], a native library double that allocates real C
//!   strings and records every allocation and release
//! - Fixtures for the common native outcomes
//! - Property-based generators using proptest
//! - Concurrent stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use netstate_core::NetStateRetriever;
//! use netstate_testkit::prelude::*;
//!
//! let native = CountingNative::new(Outcome::success(ETH0_STATE));
//! let retriever = NetStateRetriever::new(&native);
//! assert_eq!(retriever.retrieve().unwrap(), ETH0_STATE);
//! assert!(native.report().is_balanced());
//! ```

#![warn(missing_docs)]

pub mod double;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::double::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use double::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
