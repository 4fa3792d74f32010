//! Error types for the fabula core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in fabula core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Namespace contains invalid characters or collides with a reserved keyword.
    #[error("invalid namespace: {name}")]
    NamespaceInvalid {
        /// The rejected namespace.
        name: String,
    },

    /// A collection already exists at this namespace within the persistence class.
    #[error("namespace collision: {namespace} already exists")]
    NamespaceCollision {
        /// The colliding namespace.
        namespace: String,
    },

    /// A path needs at least a collection segment and a document id.
    #[error("path too short: need at least 2 segments, got {got}")]
    PathTooShort {
        /// Number of segments supplied.
        got: usize,
    },

    /// Collection not found.
    #[error("collection not found: {namespace}")]
    CollectionNotFound {
        /// The namespace searched.
        namespace: String,
    },

    /// Document not found.
    #[error("entity not found: {kind}/{id} in {namespace}")]
    EntityNotFound {
        /// The collection searched.
        namespace: String,
        /// Kind directory searched.
        kind: String,
        /// The document id that was not found.
        id: String,
    },

    /// A mix or derivation source does not exist.
    #[error("source missing: {missing_source}")]
    SourceMissing {
        /// The first missing source, as `namespace` or `namespace/id`.
        missing_source: String,
    },

    /// The target of a fresh write already exists.
    #[error("target exists: {target}")]
    TargetExists {
        /// The occupied target.
        target: String,
    },

    /// A strict merge hit an existing document.
    #[error("merge conflict: {kind}/{id} already exists in {namespace}")]
    MergeConflict {
        /// The collection written to.
        namespace: String,
        /// Kind directory written to.
        kind: String,
        /// The conflicting document id.
        id: String,
    },

    /// Mix weights are unusable (negative weight or zero sum).
    #[error("invalid weights: {message}")]
    InvalidWeights {
        /// Description of the problem.
        message: String,
    },

    /// Unknown document kind name.
    #[error("invalid kind: {name}")]
    InvalidKind {
        /// The rejected kind name.
        name: String,
    },

    /// Unknown merge strategy name.
    #[error("invalid merge strategy: {name}")]
    InvalidStrategy {
        /// The rejected strategy name.
        name: String,
    },

    /// An on-disk document exists but cannot be parsed.
    #[error("corrupt document at {path}: {message}")]
    CorruptDocument {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Parse failure description.
        message: String,
    },
}

impl CoreError {
    /// Creates a namespace invalid error.
    pub fn namespace_invalid(name: impl Into<String>) -> Self {
        Self::NamespaceInvalid { name: name.into() }
    }

    /// Creates a namespace collision error.
    pub fn namespace_collision(namespace: impl Into<String>) -> Self {
        Self::NamespaceCollision {
            namespace: namespace.into(),
        }
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(namespace: impl Into<String>) -> Self {
        Self::CollectionNotFound {
            namespace: namespace.into(),
        }
    }

    /// Creates a source missing error.
    pub fn source_missing(source: impl Into<String>) -> Self {
        Self::SourceMissing {
            missing_source: source.into(),
        }
    }

    /// Creates a target exists error.
    pub fn target_exists(target: impl Into<String>) -> Self {
        Self::TargetExists {
            target: target.into(),
        }
    }

    /// Creates an invalid weights error.
    pub fn invalid_weights(message: impl Into<String>) -> Self {
        Self::InvalidWeights {
            message: message.into(),
        }
    }

    /// Creates an invalid kind error.
    pub fn invalid_kind(name: impl Into<String>) -> Self {
        Self::InvalidKind { name: name.into() }
    }

    /// Creates an invalid strategy error.
    pub fn invalid_strategy(name: impl Into<String>) -> Self {
        Self::InvalidStrategy { name: name.into() }
    }

    /// Creates a corrupt document error.
    pub fn corrupt_document(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptDocument {
            path: path.into(),
            message: message.into(),
        }
    }
}
