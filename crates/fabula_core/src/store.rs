//! Entity store: maps `(collection, kind, id)` to document bodies.
//!
//! Pure storage, no policy. Merge decisions live in [`crate::merge`]; the
//! store's `put` is an unconditional overwrite used after policy resolution.

use crate::body::Body;
use crate::dir::WorkspaceDir;
use crate::error::{CoreError, CoreResult};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::types::{Kind, PersistenceClass};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle to an existing collection.
#[derive(Debug, Clone)]
pub struct CollectionHandle {
    /// Persistence class the collection lives in.
    pub class: PersistenceClass,
    /// Namespace, without any `temps` prefix.
    pub namespace: String,
    /// Collection directory.
    path: PathBuf,
}

impl CollectionHandle {
    /// The collection directory on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The namespace as a caller would spell it, `temps.`-prefixed for
    /// temporary collections.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self.class {
            PersistenceClass::Persistent => self.namespace.clone(),
            PersistenceClass::Temporary => format!("temps.{}", self.namespace),
        }
    }

    fn document_path(&self, kind: Kind, id: &str) -> PathBuf {
        self.path.join(kind.dir_name()).join(format!("{id}.json"))
    }
}

/// File-backed document store.
pub struct EntityStore {
    dir: WorkspaceDir,
}

impl EntityStore {
    /// Opens a store rooted at `root`, creating the layout if needed.
    pub fn open(root: &Path) -> CoreResult<Self> {
        Ok(Self {
            dir: WorkspaceDir::open(root)?,
        })
    }

    /// The underlying workspace directory.
    #[must_use]
    pub fn dir(&self) -> &WorkspaceDir {
        &self.dir
    }

    /// Creates a collection, its four kind subdirectories, and its manifest.
    ///
    /// The top-level directory creation is exclusive and fails with
    /// `NamespaceCollision` if the namespace is taken within the class; the
    /// kind subdirectories are created idempotently.
    pub fn create_collection(
        &self,
        namespace: &str,
        class: PersistenceClass,
        canonical_source: &str,
    ) -> CoreResult<CollectionHandle> {
        let path = self.dir.create_collection_dir(class, namespace)?;
        for kind in Kind::ALL {
            fs::create_dir_all(path.join(kind.dir_name()))?;
        }

        let handle = CollectionHandle {
            class,
            namespace: namespace.to_string(),
            path,
        };
        self.write_manifest(&handle, &Manifest::new(namespace, canonical_source))?;
        debug!(namespace, %class, "created collection");
        Ok(handle)
    }

    /// Opens an existing collection.
    pub fn open_collection(
        &self,
        namespace: &str,
        class: PersistenceClass,
    ) -> CoreResult<CollectionHandle> {
        let path = self.dir.collection_dir(class, namespace);
        if !path.is_dir() {
            return Err(CoreError::collection_not_found(namespace));
        }
        Ok(CollectionHandle {
            class,
            namespace: namespace.to_string(),
            path,
        })
    }

    /// Opens a collection, creating it (with the given canonical source)
    /// if it does not exist yet.
    pub fn open_or_create_collection(
        &self,
        namespace: &str,
        class: PersistenceClass,
        canonical_source: &str,
    ) -> CoreResult<CollectionHandle> {
        if self.collection_exists(namespace, class) {
            self.open_collection(namespace, class)
        } else {
            self.create_collection(namespace, class, canonical_source)
        }
    }

    /// Checks whether a collection exists in a class.
    #[must_use]
    pub fn collection_exists(&self, namespace: &str, class: PersistenceClass) -> bool {
        self.dir.collection_dir(class, namespace).is_dir()
    }

    /// Unconditionally writes a document body.
    ///
    /// Callers outside this crate should go through the merge engine, which
    /// decides whether the write is allowed to replace an existing document.
    pub fn put(
        &self,
        collection: &CollectionHandle,
        kind: Kind,
        id: &str,
        body: &Body,
    ) -> CoreResult<()> {
        let path = collection.document_path(kind, id);
        // Kind directories normally exist from creation; tolerate a missing
        // one when a collection was imported from a partial package.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        WorkspaceDir::write_json_atomic(&path, body)?;
        debug!(namespace = %collection.namespace, %kind, id, "wrote document");
        Ok(())
    }

    /// Reads a document body.
    ///
    /// Returns `Ok(None)` when absent; a present-but-unparseable file is a
    /// `CorruptDocument` error, never a silently empty result.
    pub fn get(
        &self,
        collection: &CollectionHandle,
        kind: Kind,
        id: &str,
    ) -> CoreResult<Option<Body>> {
        WorkspaceDir::read_json(&collection.document_path(kind, id))
    }

    /// Checks whether a document exists without parsing it.
    #[must_use]
    pub fn contains(&self, collection: &CollectionHandle, kind: Kind, id: &str) -> bool {
        collection.document_path(kind, id).is_file()
    }

    /// Lists document ids of a kind.
    ///
    /// Order is directory iteration order and not guaranteed stable;
    /// callers must not depend on it.
    pub fn list_ids(&self, collection: &CollectionHandle, kind: Kind) -> CoreResult<Vec<String>> {
        let dir = collection.path.join(kind.dir_name());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        Ok(ids)
    }

    /// Lists the namespaces of all collections in a class.
    pub fn list_collections(&self, class: PersistenceClass) -> CoreResult<Vec<String>> {
        let dir = self.dir.class_dir(class);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Reads a collection's manifest.
    ///
    /// A collection directory without a manifest violates the store
    /// invariant and surfaces as `CorruptDocument`.
    pub fn read_manifest(&self, collection: &CollectionHandle) -> CoreResult<Manifest> {
        let path = collection.path.join(MANIFEST_FILE);
        WorkspaceDir::read_json(&path)?
            .ok_or_else(|| CoreError::corrupt_document(&path, "manifest missing"))
    }

    /// Writes a collection's manifest atomically.
    pub fn write_manifest(
        &self,
        collection: &CollectionHandle,
        manifest: &Manifest,
    ) -> CoreResult<()> {
        WorkspaceDir::write_json_atomic(&collection.path.join(MANIFEST_FILE), manifest)
    }

    /// Deletes a collection tree. Used only by the temporary bulk clear.
    pub fn delete_collection(&self, collection: &CollectionHandle) -> CoreResult<()> {
        fs::remove_dir_all(&collection.path)?;
        Ok(())
    }

    /// Erases every collection in the temporary class, returning how many
    /// were removed. Persistent collections are untouched.
    pub fn clear_temporary(&self) -> CoreResult<usize> {
        let names = self.list_collections(PersistenceClass::Temporary)?;
        for name in &names {
            let collection = self.open_collection(name, PersistenceClass::Temporary)?;
            self.delete_collection(&collection)?;
        }
        debug!(count = names.len(), "cleared temporary class");
        Ok(names.len())
    }
}
