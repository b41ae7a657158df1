//! Local-filesystem component store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/components/
//! └── ab/
//!     └── 3f9e…c1.json   # ComponentRecord, one file per content hash
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cardbox_types::ComponentHash;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::canonical::{ComponentRecord, StoredComponent};
use crate::error::{StoreError, StoreResult};
use crate::traits::ComponentStore;

/// Directory name holding component objects under the backend root.
pub const COMPONENTS_DIR: &str = "components";

/// One JSON file per content hash, fanned out by the first hash byte.
///
/// Writes go to a temporary file in the target directory and are renamed
/// into place, so a reader never observes a partially written object.
#[derive(Debug, Clone)]
pub struct FileSystemComponentStore {
    dir: PathBuf,
}

impl FileSystemComponentStore {
    /// Open (or create) the store under `root`.
    pub fn open(root: &Path) -> StoreResult<Self> {
        let dir = root.join(COMPONENTS_DIR);
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "component store opened");
        Ok(Self { dir })
    }

    /// Directory holding the component objects.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the object file for `hash`.
    pub fn object_path(&self, hash: &ComponentHash) -> PathBuf {
        let (fanout, rest) = hash.fan_out();
        self.dir.join(fanout).join(format!("{rest}.json"))
    }
}

impl ComponentStore for FileSystemComponentStore {
    fn read(&self, hash: &ComponentHash) -> StoreResult<Option<StoredComponent>> {
        let bytes = match fs::read(self.object_path(hash)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: ComponentRecord = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::decode(format!("malformed object {}: {e}", hash.short_hex()))
        })?;
        StoredComponent::try_from(record).map(Some)
    }

    fn write(&self, hash: &ComponentHash, stored: &StoredComponent) -> StoreResult<bool> {
        let path = self.object_path(hash);
        if path.exists() {
            return Ok(false);
        }
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::Backend(format!("no parent for {}", path.display())))?;
        fs::create_dir_all(parent)?;

        let data = serde_json::to_vec(&ComponentRecord::from(stored))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(hash = %hash.short_hex(), bytes = data.len(), "component object written");
        Ok(true)
    }

    fn exists(&self, hash: &ComponentHash) -> StoreResult<bool> {
        Ok(self.object_path(hash).is_file())
    }

    fn delete(&self, hash: &ComponentHash) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(hash)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardbox_types::ContentHasher;
    use crate::canonical::ComponentKind;
    use crate::component::{Analytic, Block, Card, Cite, Component, Overlay, Slot, Span, Speech};

    fn smith(text: &str) -> Card {
        Card::new(Cite::new("Smith", "2010", "Renowned writer of cards"), text)
    }

    fn temp_store() -> (tempfile::TempDir, FileSystemComponentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemComponentStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn object_count(store: &FileSystemComponentStore) -> usize {
        fs::read_dir(store.dir())
            .unwrap()
            .map(|fanout| fs::read_dir(fanout.unwrap().path()).unwrap().count())
            .sum()
    }

    #[test]
    fn open_creates_components_dir() {
        let (dir, store) = temp_store();
        assert!(dir.path().join(COMPONENTS_DIR).is_dir());
        assert_eq!(store.dir(), dir.path().join(COMPONENTS_DIR));
    }

    #[test]
    fn block_write_read_roundtrip() {
        let (_dir, store) = temp_store();
        let card1 = smith("text");
        let card2 = smith("textAAA");
        store.store(&card1.clone().into()).unwrap();
        store.store(&card2.clone().into()).unwrap();

        let block: Component = Block::new("Test Block")
            .with(card1)
            .with(card2)
            .with(Analytic::new("This is an analytic"))
            .into();
        let hash = store.store(&block).unwrap();

        let recovered = store.retrieve_and_load(&hash).unwrap();
        assert_eq!(recovered, block);
        assert_eq!(recovered.label(), "Test Block");
    }

    #[test]
    fn pending_children_roundtrip_on_disk() {
        let (_dir, store) = temp_store();
        let inner = Block::new("inner").with(smith("nested"));
        let speech = Speech::new("1AR").with(smith("lead")).with(inner);
        let hash = store.store(&speech.clone().into()).unwrap();

        let Component::Speech(mut shallow) = store.retrieve(&hash).unwrap() else {
            panic!("expected a speech");
        };
        assert!(matches!(shallow.slot(0), Some(Slot::Pending(c)) if c.kind() == ComponentKind::Card));
        assert!(matches!(shallow.slot(1), Some(Slot::Pending(c)) if c.kind() == ComponentKind::Block));

        shallow.insert(0, Analytic::new("overview"));
        let edited = store.store(&shallow.into()).unwrap();
        let loaded = store.retrieve_and_load(&edited).unwrap();
        let expected = Speech::new("1AR")
            .with(Analytic::new("overview"))
            .with(smith("lead"))
            .with(Block::new("inner").with(smith("nested")));
        assert!(loaded.is_loaded());
        assert_eq!(loaded, Component::from(expected));
        assert_eq!(object_count(&store), 5);
    }

    #[test]
    fn object_layout_fans_out_by_first_byte() {
        let (_dir, store) = temp_store();
        let hash = store.store(&Analytic::new("laid out").into()).unwrap();
        let path = store.object_path(&hash);
        assert!(path.is_file());
        let (fanout, rest) = hash.fan_out();
        assert!(path.ends_with(format!("{fanout}/{rest}.json")));
    }

    #[test]
    fn dedup_writes_one_object() {
        let (_dir, store) = temp_store();
        let a = store.store(&smith("dup").into()).unwrap();
        let b = store.store(&smith("dup").into()).unwrap();
        assert_eq!(a, b);
        assert_eq!(object_count(&store), 1);
    }

    #[test]
    fn card_overlays_survive_disk() {
        let (_dir, store) = temp_store();
        let card: Component = smith("underline me")
            .with_tag("A tag")
            .with_overlay(Overlay::underline("u", vec![Span::new(0, 9)]))
            .into();
        let hash = store.store(&card).unwrap();
        assert_eq!(store.retrieve(&hash).unwrap(), card);
    }

    #[test]
    fn reopen_sees_existing_objects() {
        let dir = tempfile::tempdir().unwrap();
        let speech: Component = Speech::new("2AC").with(smith("persisted")).into();
        let hash = FileSystemComponentStore::open(dir.path())
            .unwrap()
            .store(&speech)
            .unwrap();

        let reopened = FileSystemComponentStore::open(dir.path()).unwrap();
        assert_eq!(reopened.retrieve_and_load(&hash).unwrap(), speech);
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_dir, store) = temp_store();
        let hash = ContentHasher::ANALYTIC.hash(b"absent");
        assert!(store.read(&hash).unwrap().is_none());
        assert!(store.retrieve(&hash).unwrap_err().is_not_found());
        assert!(!store.delete(&hash).unwrap());
    }

    #[test]
    fn corrupt_object_is_decode_error() {
        let (_dir, store) = temp_store();
        let hash = ContentHasher::ANALYTIC.hash(b"corrupt");
        let path = store.object_path(&hash);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{\"kind\":\"memo\",\"labels\":[],\"values\":[\"x\"]}").unwrap();
        assert!(matches!(store.retrieve(&hash), Err(StoreError::Decode(_))));

        fs::write(&path, b"not json").unwrap();
        assert!(matches!(store.read(&hash), Err(StoreError::Decode(_))));
    }

    #[test]
    fn delete_removes_object() {
        let (_dir, store) = temp_store();
        let hash = store.store(&Analytic::new("bye").into()).unwrap();
        assert!(store.delete(&hash).unwrap());
        assert!(!store.exists(&hash).unwrap());
    }
}
