//! Per-collection manifest.
//!
//! Every collection carries exactly one `manifest.json`, created together
//! with the collection directory and mutated in place (never replaced
//! wholesale) by derivation operations.

use serde::{Deserialize, Serialize};

/// File name of the manifest within a collection directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Manifest version written for new collections.
pub const MANIFEST_VERSION: &str = "1.0";

/// Collection metadata, including lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Collection name (the namespace, without any `temps` prefix).
    pub name: String,
    /// Manifest format version.
    pub version: String,
    /// Where the collection originally came from.
    pub canonical_source: String,
    /// Namespace this collection was derived from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
    /// Free-text description of the derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_desc: Option<String>,
}

impl Manifest {
    /// Creates a manifest for a freshly created collection.
    #[must_use]
    pub fn new(name: impl Into<String>, canonical_source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: MANIFEST_VERSION.to_string(),
            canonical_source: canonical_source.into(),
            derived_from: None,
            lineage_desc: None,
        }
    }

    /// Rewrites the name and appends lineage after a collection clone.
    /// Existing fields other than `name` are kept as copied from the source.
    pub fn derive(&mut self, name: impl Into<String>, source: impl Into<String>, desc: impl Into<String>) {
        self.name = name.into();
        self.derived_from = Some(source.into());
        self.lineage_desc = Some(desc.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manifest_has_no_lineage() {
        let manifest = Manifest::new("dune", "local_creation");
        assert_eq!(manifest.name, "dune");
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert!(manifest.derived_from.is_none());
        assert!(manifest.lineage_desc.is_none());
    }

    #[test]
    fn lineage_fields_absent_from_json_until_set() {
        let manifest = Manifest::new("dune", "local_creation");
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("derived_from"));
        assert!(!json.contains("lineage_desc"));
    }

    #[test]
    fn derive_rewrites_name_and_appends_lineage() {
        let mut manifest = Manifest::new("dune", "official_repo/dune");
        manifest.derive("dune_v2", "dune", "what-if fork");

        assert_eq!(manifest.name, "dune_v2");
        assert_eq!(manifest.canonical_source, "official_repo/dune");
        assert_eq!(manifest.derived_from.as_deref(), Some("dune"));
        assert_eq!(manifest.lineage_desc.as_deref(), Some("what-if fork"));
    }

    #[test]
    fn round_trips_through_json() {
        let mut manifest = Manifest::new("dune", "local_creation");
        manifest.derive("dune_v2", "dune", "fork");

        let json = serde_json::to_string_pretty(&manifest).unwrap();
        let decoded: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, manifest);
    }
}
