//! Workspace directory management.
//!
//! This module owns the file system layout:
//!
//! ```text
//! <root>/
//! ├─ works/<namespace>/manifest.json
//! │        └─ {novies|cores|personas|tech}/<id>.json
//! └─ temps/works/<namespace>/...        # same subtree shape
//! ```
//!
//! All JSON writes go through write-to-temp-then-atomic-rename so a reader
//! never observes a partially written file, and the containing directory is
//! fsynced afterwards so the rename is durable.

use crate::error::{CoreError, CoreResult};
use crate::types::PersistenceClass;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Directory for persistent collections.
const WORKS_DIR: &str = "works";
/// Directory prefix for the temporary persistence class.
const TEMPS_DIR: &str = "temps";

/// Manages the workspace root and its two persistence-class trees.
#[derive(Debug, Clone)]
pub struct WorkspaceDir {
    /// Root directory path.
    root: PathBuf,
}

impl WorkspaceDir {
    /// Opens or creates a workspace root.
    ///
    /// Creation is idempotent: both class trees are created with
    /// `create_dir_all`, so calling this on an existing root is safe.
    pub fn open(root: &Path) -> CoreResult<Self> {
        fs::create_dir_all(root.join(WORKS_DIR))?;
        fs::create_dir_all(root.join(TEMPS_DIR).join(WORKS_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns the workspace root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the tree holding collections of the given class.
    #[must_use]
    pub fn class_dir(&self, class: PersistenceClass) -> PathBuf {
        match class {
            PersistenceClass::Persistent => self.root.join(WORKS_DIR),
            PersistenceClass::Temporary => self.root.join(TEMPS_DIR).join(WORKS_DIR),
        }
    }

    /// Returns the directory of a collection (which may not exist yet).
    #[must_use]
    pub fn collection_dir(&self, class: PersistenceClass, namespace: &str) -> PathBuf {
        self.class_dir(class).join(namespace)
    }

    /// Creates a collection directory, failing if it already exists.
    ///
    /// `fs::create_dir` is the atomic create-if-absent primitive here: two
    /// concurrent creations of the same namespace cannot both succeed.
    pub fn create_collection_dir(
        &self,
        class: PersistenceClass,
        namespace: &str,
    ) -> CoreResult<PathBuf> {
        let dir = self.collection_dir(class, namespace);
        match fs::create_dir(&dir) {
            Ok(()) => Ok(dir),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(CoreError::namespace_collision(namespace))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes a value as pretty-printed JSON, atomically.
    ///
    /// Uses write-then-rename for crash safety:
    /// 1. Write to a sibling temporary file
    /// 2. Sync the temporary file to disk
    /// 3. Rename it over the destination
    /// 4. Fsync the containing directory
    pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
        let temp_path = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(value)
            .map_err(|err| CoreError::corrupt_document(path, err.to_string()))?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path)?;
        if let Some(parent) = path.parent() {
            sync_directory(parent)?;
        }
        Ok(())
    }

    /// Reads a JSON file.
    ///
    /// Returns `Ok(None)` if the file does not exist, and `CorruptDocument`
    /// if it exists but cannot be parsed.
    pub fn read_json<T: DeserializeOwned>(path: &Path) -> CoreResult<Option<T>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value = serde_json::from_slice(&data)
            .map_err(|err| CoreError::corrupt_document(path, err.to_string()))?;
        Ok(Some(value))
    }

    /// Copies a single file byte-for-byte, atomically at the destination.
    pub fn copy_file_atomic(source: &Path, target: &Path) -> CoreResult<()> {
        let temp_path = target.with_extension("json.tmp");
        fs::copy(source, &temp_path)?;
        fs::rename(&temp_path, target)?;
        if let Some(parent) = target.parent() {
            sync_directory(parent)?;
        }
        Ok(())
    }
}

/// Fsyncs a directory so renames and deletions within it are durable.
///
/// On Windows, NTFS journaling provides equivalent metadata durability and
/// directory fsync is not supported, so this is a no-op there.
#[cfg(unix)]
fn sync_directory(path: &Path) -> CoreResult<()> {
    let dir = File::open(path)?;
    dir.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_path: &Path) -> CoreResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_both_class_trees() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("fabula");

        let dir = WorkspaceDir::open(&root).unwrap();
        assert!(dir.class_dir(PersistenceClass::Persistent).is_dir());
        assert!(dir.class_dir(PersistenceClass::Temporary).is_dir());

        // Idempotent reopen.
        WorkspaceDir::open(&root).unwrap();
    }

    #[test]
    fn collection_dir_creation_is_exclusive() {
        let temp = tempdir().unwrap();
        let dir = WorkspaceDir::open(temp.path()).unwrap();

        dir.create_collection_dir(PersistenceClass::Persistent, "dune")
            .unwrap();
        let err = dir
            .create_collection_dir(PersistenceClass::Persistent, "dune")
            .unwrap_err();
        assert!(matches!(err, CoreError::NamespaceCollision { .. }));

        // Same spelling in the other class is a different path.
        dir.create_collection_dir(PersistenceClass::Temporary, "dune")
            .unwrap();
    }

    #[test]
    fn json_write_read_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("doc.json");

        let value = serde_json::json!({"traits": ["stoic"], "x": 5});
        WorkspaceDir::write_json_atomic(&path, &value).unwrap();

        let loaded: Option<serde_json::Value> = WorkspaceDir::read_json(&path).unwrap();
        assert_eq!(loaded.unwrap(), value);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let temp = tempdir().unwrap();
        let loaded: Option<serde_json::Value> =
            WorkspaceDir::read_json(&temp.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn garbage_file_is_corrupt_not_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();

        let err = WorkspaceDir::read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, CoreError::CorruptDocument { .. }));
    }
}
