use std::fs;

use cardbox_mongo::MongoBackend;
use cardbox_store::{
    CachedComponentStore, Component, ComponentStore, FileSystemComponentStore,
    InMemoryComponentStore, Speech,
};
use cardbox_structure::{
    FileSystemStructureIndex, InMemoryStructureIndex, StructureIndex, StructurePath,
};
use cardbox_types::ComponentHash;
use tracing::{info, warn};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};

/// The component store and structure index of one initialized backend.
struct Session {
    kind: &'static str,
    components: Box<dyn ComponentStore>,
    structure: Box<dyn StructureIndex>,
    database: Option<MongoBackend>,
}

impl Session {
    fn open(config: &BackendConfig) -> BackendResult<Self> {
        match config {
            BackendConfig::Memory => Ok(Self {
                kind: config.kind(),
                components: Box::new(InMemoryComponentStore::new()),
                structure: Box::new(InMemoryStructureIndex::new()),
                database: None,
            }),
            BackendConfig::Filesystem { root } => {
                fs::create_dir_all(root).map_err(|e| {
                    BackendError::Initialization(format!("cannot create {}: {e}", root.display()))
                })?;
                let components = FileSystemComponentStore::open(root)
                    .map_err(|e| BackendError::Initialization(e.to_string()))?;
                let structure = FileSystemStructureIndex::open(root)
                    .map_err(|e| BackendError::Initialization(e.to_string()))?;
                Ok(Self {
                    kind: config.kind(),
                    components: Box::new(CachedComponentStore::new(components)),
                    structure: Box::new(structure),
                    database: None,
                })
            }
            BackendConfig::Database(db) => {
                let backend = MongoBackend::connect(db)
                    .map_err(|e| BackendError::Initialization(e.to_string()))?;
                Ok(Self {
                    kind: config.kind(),
                    components: Box::new(CachedComponentStore::new(backend.component_store())),
                    structure: Box::new(backend.structure_index()),
                    database: Some(backend),
                })
            }
        }
    }

    fn close(self) {
        if let Some(database) = self.database {
            database.shutdown();
        }
    }
}

/// Handle to the active backend.
///
/// A handle is created empty with [`Backend::new`] and becomes usable after
/// [`Backend::initialize`]; [`Backend::open`] does both. Every store and
/// index operation on an uninitialized or closed handle fails with
/// [`BackendError::NotInitialized`]. Dropping the handle closes it.
///
/// Filesystem and database sessions put a read-through cache in front of the
/// component store, so a hash retrieved once is served from memory.
#[derive(Default)]
pub struct Backend {
    session: Option<Session>,
}

impl Backend {
    /// An uninitialized handle.
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Create and initialize a handle in one step.
    pub fn open(config: &BackendConfig) -> BackendResult<Self> {
        let mut backend = Self::new();
        backend.initialize(config)?;
        Ok(backend)
    }

    /// Open the backend described by `config`.
    ///
    /// Fails with [`BackendError::AlreadyInitialized`] if this handle is
    /// active, and with [`BackendError::Initialization`] if the directory
    /// cannot be created or the database is unreachable. A failed call
    /// leaves the handle uninitialized.
    pub fn initialize(&mut self, config: &BackendConfig) -> BackendResult<()> {
        if self.session.is_some() {
            return Err(BackendError::AlreadyInitialized);
        }
        let session = Session::open(config).inspect_err(|e| {
            warn!(kind = config.kind(), error = %e, "backend initialization failed");
        })?;
        info!(kind = session.kind, "backend initialized");
        self.session = Some(session);
        Ok(())
    }

    /// Release the backend. Safe to call at any time, any number of times.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            let kind = session.kind;
            session.close();
            info!(kind, "backend closed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Kind of the active backend, if any.
    pub fn kind(&self) -> Option<&'static str> {
        self.session.as_ref().map(|s| s.kind)
    }

    fn session(&self) -> BackendResult<&Session> {
        self.session.as_ref().ok_or(BackendError::NotInitialized)
    }

    /// The active component store.
    pub fn component_store(&self) -> BackendResult<&dyn ComponentStore> {
        Ok(self.session()?.components.as_ref())
    }

    /// The active structure index.
    pub fn structure_index(&self) -> BackendResult<&dyn StructureIndex> {
        Ok(self.session()?.structure.as_ref())
    }

    // ---- Component store ----

    /// Store `component` and its live children. See [`ComponentStore::store`].
    pub fn store(&self, component: &Component) -> BackendResult<ComponentHash> {
        Ok(self.component_store()?.store(component)?)
    }

    /// Shallow retrieve: composite children come back pending.
    pub fn retrieve(&self, hash: &ComponentHash) -> BackendResult<Component> {
        Ok(self.component_store()?.retrieve(hash)?)
    }

    pub fn retrieve_and_load(&self, hash: &ComponentHash) -> BackendResult<Component> {
        Ok(self.component_store()?.retrieve_and_load(hash)?)
    }

    /// Materialize every pending child of `component`.
    pub fn load(&self, component: &mut Component) -> BackendResult<()> {
        Ok(component.load(self.component_store()?)?)
    }

    /// Re-fetch every stored child of `speech`.
    pub fn reload(&self, speech: &mut Speech) -> BackendResult<()> {
        Ok(speech.reload(self.component_store()?)?)
    }

    // ---- Structure index ----

    pub fn add_child(&self, path: &StructurePath, name: &str) -> BackendResult<()> {
        Ok(self.structure_index()?.add_child(path, name)?)
    }

    /// Index `component` at `path`. The component is not stored.
    pub fn add_content(&self, path: &StructurePath, component: &Component) -> BackendResult<ComponentHash> {
        Ok(self.structure_index()?.add_content(path, component)?)
    }

    pub fn remove_content(&self, path: &StructurePath, hash: &ComponentHash) -> BackendResult<bool> {
        Ok(self.structure_index()?.remove_content(path, hash)?)
    }

    pub fn get_children(&self, path: &StructurePath) -> BackendResult<Vec<String>> {
        Ok(self.structure_index()?.children(path)?)
    }

    /// Shallow-retrieve every component indexed at `path`.
    pub fn get_content(&self, path: &StructurePath) -> BackendResult<Vec<Component>> {
        let session = self.session()?;
        Ok(session.structure.get_content(path, session.components.as_ref())?)
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind())
            .finish()
    }
}
