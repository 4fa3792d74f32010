//! Document bodies.
//!
//! A document body is an arbitrary string-keyed JSON object. The store
//! treats bodies opaquely; only the merge logic inspects them, and only
//! structurally (objects recurse, everything else is a leaf).

use serde_json::Value;

/// A document body: a string-keyed mapping of scalar or nested values.
pub type Body = serde_json::Map<String, Value>;

/// Provenance keys attached by producing operations.
///
/// These are append-only from the point of view of derivation: no merge
/// strategy may drop one that is already present unless the incoming body
/// explicitly overwrites it.
pub mod provenance {
    /// Set by register on documents declared from scratch.
    pub const REGISTERED_FROM: &str = "registered_from";
    /// Set by core/persona extraction.
    pub const EXTRACTED_FROM: &str = "extracted_from";
    /// Set by mirror: the source persona id.
    pub const MIRROR_OF: &str = "mirror_of";
    /// Set by mirror: the fate change description.
    pub const FATE_CHANGE: &str = "fate_change";
    /// Set by mix: the ordered source labels.
    pub const MIXED_FROM: &str = "mixed_from";
    /// Set by mix: the normalized weight vector.
    pub const WEIGHTS: &str = "weights";
    /// Set by transmute on the target manifest and bodies that carry it.
    pub const DERIVED_FROM: &str = "derived_from";
    /// Set by transmute: free-text lineage description.
    pub const LINEAGE_DESC: &str = "lineage_desc";

    /// Every provenance key, for preservation sweeps.
    pub const KEYS: &[&str] = &[
        REGISTERED_FROM,
        EXTRACTED_FROM,
        MIRROR_OF,
        FATE_CHANGE,
        MIXED_FROM,
        WEIGHTS,
        DERIVED_FROM,
        LINEAGE_DESC,
    ];
}

/// Turns a free-text label into a document id: lowercase, whitespace to
/// underscores, anything outside the legal id alphabet dropped.
#[must_use]
pub fn slugify(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}
