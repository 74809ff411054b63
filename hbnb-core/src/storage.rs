//! File-backed object storage.
//!
//! [`FileStorage`] owns the table of live entities, keyed by `"<Kind>.<id>"`,
//! and mirrors it to a single JSON file. Nothing is written until [`save`]
//! is called, and every save rewrites the whole file. There is no journaling:
//! a crash mid-write can leave a truncated file behind.
//!
//! [`save`]: FileStorage::save

use crate::config::StorageConfig;
use crate::entity::{Entity, EntityKind, Projection};
use crate::error::{StorageError, StorageResult};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// The in-memory object table and its on-disk location.
#[derive(Debug, Clone)]
pub struct FileStorage {
    config: StorageConfig,
    objects: BTreeMap<String, Entity>,
}

impl FileStorage {
    /// Create an empty store backed by the configured file.
    ///
    /// The file is not read; call [`reload`](Self::reload) for that.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            objects: BTreeMap::new(),
        }
    }

    /// Create an empty store backed by `path`.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self::new(StorageConfig::new(path.as_ref()))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.config.path()
    }

    /// The live table.
    pub fn all(&self) -> &BTreeMap<String, Entity> {
        &self.objects
    }

    /// The live table, for direct mutation.
    pub fn all_mut(&mut self) -> &mut BTreeMap<String, Entity> {
        &mut self.objects
    }

    /// Register an entity under its composite key, replacing any previous
    /// entry. Returns the key.
    pub fn register(&mut self, entity: Entity) -> String {
        self.insert(entity).key()
    }

    /// Construct a fresh entity of `kind` and register it.
    pub fn create(&mut self, kind: EntityKind) -> &mut Entity {
        self.insert(Entity::new(kind))
    }

    fn insert(&mut self, entity: Entity) -> &mut Entity {
        let key = entity.key();
        debug!(key = %key, "registered entity");
        match self.objects.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(entity);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(entity),
        }
    }

    /// Get an entity by composite key.
    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.objects.get(key)
    }

    /// Get a mutable entity by composite key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.objects.get_mut(key)
    }

    /// Remove an entity from the table. The file is untouched until the next
    /// save.
    pub fn remove(&mut self, key: &str) -> Option<Entity> {
        let removed = self.objects.remove(key);
        if removed.is_some() {
            debug!(key = %key, "removed entity");
        }
        removed
    }

    /// Iterate over the entities of one kind.
    pub fn iter_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.objects.values().filter(move |e| e.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Write every entity's projection to the backing file, replacing it.
    pub fn save(&self) -> StorageResult<()> {
        let snapshot: BTreeMap<&str, Projection> = self
            .objects
            .iter()
            .map(|(key, entity)| (key.as_str(), entity.to_projection()))
            .collect();

        let content = serde_json::to_string(&snapshot)?;
        fs::write(self.path(), content)?;

        info!(path = %self.path().display(), entries = snapshot.len(), "saved object table");
        Ok(())
    }

    /// Touch the entity at `key` and save the whole table.
    ///
    /// Returns `false` without writing if the key is absent.
    pub fn save_entity(&mut self, key: &str) -> StorageResult<bool> {
        match self.objects.get_mut(key) {
            Some(entity) => entity.touch(),
            None => return Ok(false),
        }
        self.save()?;
        Ok(true)
    }

    /// Load the backing file into the table.
    ///
    /// A missing file means an empty store and loads nothing. Existing
    /// entries are kept; entries from the file overwrite them by key.
    /// Returns the number of entries read.
    pub fn reload(&mut self) -> StorageResult<usize> {
        let content = match fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path().display(), "no storage file, starting empty");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: BTreeMap<String, Projection> = serde_json::from_str(&content)?;
        let loaded = snapshot
            .into_iter()
            .map(|(key, projection)| match Entity::from_projection(projection) {
                Ok(entity) => Ok((key, entity)),
                Err(source) => Err(StorageError::InvalidEntry { key, source }),
            })
            .collect::<StorageResult<BTreeMap<_, _>>>()?;

        // Nothing is merged unless every entry rebuilt.
        let count = loaded.len();
        self.objects.extend(loaded);

        info!(path = %self.path().display(), entries = count, "reloaded object table");
        Ok(count)
    }
}
