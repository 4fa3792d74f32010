//! # Fabula Core
//!
//! A path-addressable document store for structured fictional universes:
//! works (collections) hold narrative, ruleset, persona, and artifact
//! documents, addressed by dotted paths and combined under explicit merge,
//! mix, and derivation semantics.
//!
//! This crate provides:
//! - Namespace resolution with persistent/temporary routing
//! - A file-backed entity store (atomic writes, per-work manifests)
//! - Merge strategies: overlay, strict, patch, interactive
//! - Weighted multi-source mixing
//! - Lineage-preserving cloning (mirror, transmute)
//! - The verb-level [`Engine`] facade and the generation collaborator
//!   contract

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod body;
pub mod config;
pub mod dir;
pub mod engine;
pub mod error;
pub mod generate;
pub mod lineage;
pub mod manifest;
pub mod merge;
pub mod mix;
pub mod namespace;
pub mod store;
pub mod types;

pub use body::Body;
pub use config::Config;
pub use engine::{Engine, RegisterRequest, SearchHit};
pub use error::{CoreError, CoreResult};
pub use generate::{FieldValue, GenerateError, Generator, NullGenerator};
pub use manifest::Manifest;
pub use merge::ConflictResolver;
pub use namespace::ResolvedPath;
pub use store::{CollectionHandle, EntityStore};
pub use types::{Kind, MergeStrategy, PersistenceClass};

/// Crate version, surfaced by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
