//! # Fabula Testkit
//!
//! Test utilities for fabula.
//!
//! This crate provides:
//! - Temp-rooted engine fixtures with automatic cleanup
//! - Pre-seeded workspace scenarios
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fabula_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_engine() {
//!     with_engine(|engine| {
//!         engine.register("w.novies", Default::default()).unwrap();
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
