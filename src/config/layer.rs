//! Layer Loader
//!
//! A layer is every normalised record found under one configuration tree,
//! keyed by composite key. Two files in the same tree may not claim the
//! same key.

use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::LoadError;
use super::normalize::{normalize, CompositeKey, NormalizedRecord};
use super::reader::{self, ConfigDir, ParsedFile};

/// Which tree a layer was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeOrigin {
    /// OS-shipped defaults, e.g. `/usr/lib/rkt`
    System,
    /// Administrator overrides, e.g. `/etc/rkt`
    User,
}

/// A configuration tree rooted at a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTree {
    pub origin: TreeOrigin,
    pub base: PathBuf,
}

impl ConfigTree {
    pub fn new(origin: TreeOrigin, base: impl Into<PathBuf>) -> Self {
        Self {
            origin,
            base: base.into(),
        }
    }

    pub fn system(base: impl Into<PathBuf>) -> Self {
        Self::new(TreeOrigin::System, base)
    }

    pub fn user(base: impl Into<PathBuf>) -> Self {
        Self::new(TreeOrigin::User, base)
    }

    /// Path of one of the tree's `*.d` directories.
    pub fn dir(&self, dir: ConfigDir) -> PathBuf {
        self.base.join(dir.dir_name())
    }
}

/// The file a normalised record was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSource {
    pub origin: TreeOrigin,
    pub path: PathBuf,
    /// SHA-256 of the file bytes
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub record: NormalizedRecord,
    pub source: RecordSource,
}

/// Normalised records of one tree.
#[derive(Debug, Clone)]
pub struct Layer {
    origin: TreeOrigin,
    entries: BTreeMap<CompositeKey, LayerEntry>,
}

impl Layer {
    pub fn empty(origin: TreeOrigin) -> Self {
        Self {
            origin,
            entries: BTreeMap::new(),
        }
    }

    /// Load every `*.d` directory of `tree`.
    ///
    /// Missing directories, including a missing base, load as empty.
    pub fn load(tree: &ConfigTree) -> Result<Self, LoadError> {
        let mut layer = Self::empty(tree.origin);
        for dir in ConfigDir::ALL {
            for file in reader::read_dir(&tree.dir(dir), dir)? {
                layer.insert_file(file)?;
            }
        }
        info!(
            origin = ?tree.origin,
            base = %tree.base.display(),
            records = layer.len(),
            "loaded config layer"
        );
        Ok(layer)
    }

    /// Build a layer from in-memory documents.
    ///
    /// Paths are used for diagnostics and provenance only; no directory
    /// placement check is made.
    pub fn from_documents<I, P, B>(origin: TreeOrigin, documents: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<PathBuf>,
        B: AsRef<[u8]>,
    {
        let mut layer = Self::empty(origin);
        for (path, bytes) in documents {
            let path = path.into();
            let bytes = bytes.as_ref();
            let record = reader::parse_document(&path, bytes)?;
            layer.insert_file(ParsedFile {
                digest: reader::sha256_hex(bytes),
                path,
                record,
            })?;
        }
        Ok(layer)
    }

    fn insert_file(&mut self, file: ParsedFile) -> Result<(), LoadError> {
        let source = RecordSource {
            origin: self.origin,
            path: file.path,
            digest: file.digest,
        };
        for record in normalize(file.record) {
            self.insert(record, source.clone())?;
        }
        Ok(())
    }

    /// Add one normalised record, failing if its key is already taken.
    pub fn insert(&mut self, record: NormalizedRecord, source: RecordSource) -> Result<(), LoadError> {
        match self.entries.entry(record.key()) {
            btree_map::Entry::Occupied(existing) => Err(LoadError::LayerConflict {
                key: existing.key().clone(),
                first: existing.get().source.path.clone(),
                second: source.path,
            }),
            btree_map::Entry::Vacant(slot) => {
                debug!(key = %slot.key(), path = %source.path.display(), "normalised record");
                slot.insert(LayerEntry { record, source });
                Ok(())
            }
        }
    }

    pub fn origin(&self) -> TreeOrigin {
        self.origin
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&LayerEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &CompositeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in composite-key order.
    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompositeKey, &LayerEntry)> {
        self.entries.iter()
    }

    /// Paths of all files that contributed to this layer, deduplicated.
    pub fn files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = self
            .entries
            .values()
            .map(|entry| entry.source.path.as_path())
            .collect();
        files.sort();
        files.dedup();
        files
    }
}

impl IntoIterator for Layer {
    type Item = (CompositeKey, LayerEntry);
    type IntoIter = btree_map::IntoIter<CompositeKey, LayerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn write(base: &Path, dir: ConfigDir, name: &str, contents: &str) {
        let dir = base.join(dir.dir_name());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_base_loads_empty() {
        let temp = TempDir::new().unwrap();
        let layer = Layer::load(&ConfigTree::user(temp.path().join("absent"))).unwrap();
        assert!(layer.is_empty());
        assert_eq!(layer.origin(), TreeOrigin::User);
    }

    #[test]
    fn test_empty_directories_load_empty() {
        let temp = TempDir::new().unwrap();
        for dir in ConfigDir::ALL {
            fs::create_dir_all(temp.path().join(dir.dir_name())).unwrap();
        }
        let layer = Layer::load(&ConfigTree::system(temp.path())).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_multi_domain_file_fills_one_key_per_domain() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ConfigDir::Auth,
            "basic.json",
            r#"{"rktVersion":"v1","rktKind":"auth","type":"basic","domains":["tectonic.com","coreos.com"],"credentials":{"user":"user","password":"userPassword"}}"#,
        );

        let layer = Layer::load(&ConfigTree::user(temp.path())).unwrap();
        assert_eq!(layer.len(), 2);
        assert!(layer.contains_key(&CompositeKey::Auth("tectonic.com".to_string())));
        assert!(layer.contains_key(&CompositeKey::Auth("coreos.com".to_string())));
        assert_eq!(layer.files().len(), 1);
    }

    #[test]
    fn test_same_domain_in_two_files_conflicts() {
        let temp = TempDir::new().unwrap();
        let doc = r#"{"rktVersion":"v1","rktKind":"auth","type":"oauth","domains":["coreos.com"],"credentials":{"token":"t"}}"#;
        write(temp.path(), ConfigDir::Auth, "a.json", doc);
        write(temp.path(), ConfigDir::Auth, "b.json", doc);

        let err = Layer::load(&ConfigTree::user(temp.path())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LayerConflict);
        let LoadError::LayerConflict { key, first, second } = err else {
            unreachable!();
        };
        assert_eq!(key, CompositeKey::Auth("coreos.com".to_string()));
        assert!(first.ends_with("a.json"));
        assert!(second.ends_with("b.json"));
    }

    #[test]
    fn test_two_paths_files_conflict() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ConfigDir::Paths,
            "a.json",
            r#"{"rktVersion":"v1","rktKind":"paths","data":"/a"}"#,
        );
        write(
            temp.path(),
            ConfigDir::Paths,
            "b.json",
            r#"{"rktVersion":"v1","rktKind":"paths","stage1-images":"/b"}"#,
        );

        let err = Layer::load(&ConfigTree::system(temp.path())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LayerConflict);
    }

    #[test]
    fn test_auth_and_docker_auth_keys_do_not_collide() {
        let layer = Layer::from_documents(
            TreeOrigin::System,
            [
                (
                    "auth.json",
                    r#"{"rktVersion":"v1","rktKind":"auth","type":"oauth","domains":["quay.io"],"credentials":{"token":"t"}}"#,
                ),
                (
                    "docker.json",
                    r#"{"rktVersion":"v1","rktKind":"dockerAuth","registries":["quay.io"],"credentials":{"user":"u","password":"p"}}"#,
                ),
            ],
        )
        .unwrap();
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn test_source_tracks_origin_and_digest() {
        let doc = r#"{"rktVersion":"v1","rktKind":"stage1","name":"example.com/rkt/stage1"}"#;
        let layer = Layer::from_documents(TreeOrigin::System, [("stage1.json", doc)]).unwrap();

        let entry = layer.get(&CompositeKey::Stage1).unwrap();
        assert_eq!(entry.source.origin, TreeOrigin::System);
        assert_eq!(entry.source.path, PathBuf::from("stage1.json"));
        assert_eq!(entry.source.digest, reader::sha256_hex(doc.as_bytes()));
    }
}
