//! Lineage tracker: clones that stamp provenance without touching sources.

use crate::body::provenance;
use crate::dir::WorkspaceDir;
use crate::error::{CoreError, CoreResult};
use crate::merge::{self, ConflictResolver};
use crate::store::{CollectionHandle, EntityStore};
use crate::types::{Kind, MergeStrategy, PersistenceClass};
use serde_json::Value;
use tracing::info;

/// Collection-level and document-level cloning with provenance.
pub struct LineageTracker<'a> {
    store: &'a EntityStore,
}

impl<'a> LineageTracker<'a> {
    /// Creates a tracker over a store.
    #[must_use]
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Derives a whole new collection from `source`.
    ///
    /// Every document is copied byte-for-byte; the target manifest starts as
    /// a copy of the source's, then has its `name` rewritten and
    /// `derived_from` / `lineage_desc` appended. The source is left
    /// untouched.
    pub fn transmute(
        &self,
        source: &CollectionHandle,
        target_namespace: &str,
        target_class: PersistenceClass,
        lineage_desc: &str,
    ) -> CoreResult<CollectionHandle> {
        if !self
            .store
            .collection_exists(&source.namespace, source.class)
        {
            return Err(CoreError::source_missing(source.qualified_name()));
        }
        if self.store.collection_exists(target_namespace, target_class) {
            return Err(CoreError::target_exists(target_namespace));
        }

        let source_manifest = self.store.read_manifest(source)?;
        let target = self.store.create_collection(
            target_namespace,
            target_class,
            &source_manifest.canonical_source,
        )?;

        for kind in Kind::ALL {
            for id in self.store.list_ids(source, kind)? {
                let from = source
                    .path()
                    .join(kind.dir_name())
                    .join(format!("{id}.json"));
                let to = target
                    .path()
                    .join(kind.dir_name())
                    .join(format!("{id}.json"));
                WorkspaceDir::copy_file_atomic(&from, &to)?;
            }
        }

        let mut manifest = source_manifest;
        manifest.derive(target_namespace, source.qualified_name(), lineage_desc);
        self.store.write_manifest(&target, &manifest)?;

        info!(
            source = %source.qualified_name(),
            target = %target.qualified_name(),
            "transmuted collection"
        );
        Ok(target)
    }

    /// Creates a fate variant of a single persona.
    ///
    /// Copies the source persona's body, sets `mirror_of` and `fate_change`,
    /// and writes it at `new_id` under the active merge strategy. The source
    /// document is unchanged.
    pub fn mirror(
        &self,
        collection: &CollectionHandle,
        source_persona_id: &str,
        fate_change: &str,
        new_id: &str,
        strategy: MergeStrategy,
        resolver: Option<&dyn ConflictResolver>,
    ) -> CoreResult<crate::body::Body> {
        let mut body = self
            .store
            .get(collection, Kind::Persona, source_persona_id)?
            .ok_or_else(|| CoreError::EntityNotFound {
                namespace: collection.namespace.clone(),
                kind: Kind::Persona.name().to_string(),
                id: source_persona_id.to_string(),
            })?;

        body.insert(
            provenance::MIRROR_OF.to_string(),
            Value::String(source_persona_id.to_string()),
        );
        body.insert(
            provenance::FATE_CHANGE.to_string(),
            Value::String(fate_change.to_string()),
        );

        merge::apply(
            self.store,
            collection,
            Kind::Persona,
            new_id,
            body,
            strategy,
            resolver,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn body(value: serde_json::Value) -> Body {
        value.as_object().unwrap().clone()
    }

    fn fixture() -> (tempfile::TempDir, EntityStore, CollectionHandle) {
        let temp = tempdir().unwrap();
        let store = EntityStore::open(temp.path()).unwrap();
        let coll = store
            .create_collection("dune", PersistenceClass::Persistent, "official_repo/dune")
            .unwrap();
        store
            .put(&coll, Kind::Persona, "paul", &body(json!({"traits": ["prescient"]})))
            .unwrap();
        store
            .put(&coll, Kind::Ruleset, "spice", &body(json!({"axioms": ["spice flows"]})))
            .unwrap();
        (temp, store, coll)
    }

    #[test]
    fn transmute_copies_documents_byte_for_byte() {
        let (_temp, store, source) = fixture();
        let tracker = LineageTracker::new(&store);

        let target = tracker
            .transmute(&source, "dune_v2", PersistenceClass::Persistent, "fork")
            .unwrap();

        for (kind, id) in [(Kind::Persona, "paul"), (Kind::Ruleset, "spice")] {
            let original = fs::read(
                source
                    .path()
                    .join(kind.dir_name())
                    .join(format!("{id}.json")),
            )
            .unwrap();
            let copied = fs::read(
                target
                    .path()
                    .join(kind.dir_name())
                    .join(format!("{id}.json")),
            )
            .unwrap();
            assert_eq!(original, copied);
        }

        let manifest = store.read_manifest(&target).unwrap();
        assert_eq!(manifest.name, "dune_v2");
        assert_eq!(manifest.derived_from.as_deref(), Some("dune"));
        assert_eq!(manifest.lineage_desc.as_deref(), Some("fork"));
        assert_eq!(manifest.canonical_source, "official_repo/dune");
    }

    #[test]
    fn transmute_leaves_source_untouched() {
        let (_temp, store, source) = fixture();
        let manifest_before = store.read_manifest(&source).unwrap();
        let body_before = store.get(&source, Kind::Persona, "paul").unwrap();

        LineageTracker::new(&store)
            .transmute(&source, "dune_v2", PersistenceClass::Persistent, "fork")
            .unwrap();

        assert_eq!(store.read_manifest(&source).unwrap(), manifest_before);
        assert_eq!(store.get(&source, Kind::Persona, "paul").unwrap(), body_before);
    }

    #[test]
    fn transmute_refuses_occupied_target() {
        let (_temp, store, source) = fixture();
        store
            .create_collection("dune_v2", PersistenceClass::Persistent, "x")
            .unwrap();

        let err = LineageTracker::new(&store)
            .transmute(&source, "dune_v2", PersistenceClass::Persistent, "fork")
            .unwrap_err();
        assert!(matches!(err, CoreError::TargetExists { .. }));
    }

    #[test]
    fn mirror_stamps_provenance_and_keeps_source() {
        let (_temp, store, coll) = fixture();
        let tracker = LineageTracker::new(&store);

        let mirrored = tracker
            .mirror(
                &coll,
                "paul",
                "never left Caladan",
                "paul_of_caladan",
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();

        assert_eq!(mirrored.get("mirror_of"), Some(&json!("paul")));
        assert_eq!(mirrored.get("fate_change"), Some(&json!("never left Caladan")));
        assert_eq!(mirrored.get("traits"), Some(&json!(["prescient"])));

        // Source persona unchanged.
        let source = store.get(&coll, Kind::Persona, "paul").unwrap().unwrap();
        assert!(!source.contains_key("mirror_of"));
    }

    #[test]
    fn mirror_of_missing_persona_fails() {
        let (_temp, store, coll) = fixture();
        let err = LineageTracker::new(&store)
            .mirror(&coll, "ghost", "x", "ghost_2", MergeStrategy::Overlay, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::EntityNotFound { .. }));
    }
}
