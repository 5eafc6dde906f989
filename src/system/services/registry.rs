//! Registry service owning the in-memory descriptor map.
//!
//! Provides [`SystemRegistry`] which coordinates registration, discovery,
//! refresh, and removal of managed systems. The in-memory map is the source
//! of truth for the process lifetime; every mutation writes a whole-set
//! snapshot to the injected [`DescriptorStore`], and a failed write is
//! logged rather than rolled back (at-least-once persistence).

use crate::system::domain::{
    AnalysisReport, SystemDescriptor, SystemDomainError, SystemId, SystemKind, SystemName,
    SystemStatus,
};
use crate::system::ports::{DescriptorStore, DescriptorStoreError, ProjectAnalyzer};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::warn;

/// Request payload for registering a new managed system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSystemRequest {
    id: String,
    name: String,
    path: Utf8PathBuf,
    kind: SystemKind,
}

impl RegisterSystemRequest {
    /// Creates a request with the required descriptor fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
        kind: SystemKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            kind,
        }
    }
}

/// Partial update applied to an existing descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSystemRequest {
    name: Option<String>,
    kind: Option<SystemKind>,
    status_override: Option<SystemStatus>,
    clear_status_override: bool,
}

impl UpdateSystemRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the system.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reclassifies the system.
    #[must_use]
    pub const fn with_kind(mut self, kind: SystemKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Manually overrides the lifecycle status.
    #[must_use]
    pub const fn with_status_override(mut self, status: SystemStatus) -> Self {
        self.status_override = Some(status);
        self
    }

    /// Clears any manual status override.
    #[must_use]
    pub const fn clearing_status_override(mut self) -> Self {
        self.clear_status_override = true;
        self
    }
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] SystemDomainError),

    /// A system with the same identifier is already registered.
    #[error("duplicate system identifier: {0}")]
    DuplicateSystem(SystemId),

    /// A system with the same path is already registered.
    #[error("path already registered to another system: {0}")]
    DuplicatePath(Utf8PathBuf),

    /// No system exists with the given identifier.
    #[error("system not found: {0}")]
    NotFound(SystemId),

    /// Descriptor store failure.
    #[error(transparent)]
    Store(#[from] DescriptorStoreError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry of managed systems.
///
/// Constructed once at process startup and shared by handle with the
/// runner, the watcher, and any external interface layer. Descriptor
/// mutation is funnelled through this service and applied atomically under
/// a single map lock; descriptors are independent, so no cross-descriptor
/// coordination exists.
pub struct SystemRegistry<S, A, C>
where
    S: DescriptorStore,
    A: ProjectAnalyzer,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    analyzer: Arc<A>,
    clock: Arc<C>,
    state: RwLock<HashMap<SystemId, SystemDescriptor>>,
}

impl<S, A, C> SystemRegistry<S, A, C>
where
    S: DescriptorStore,
    A: ProjectAnalyzer,
    C: Clock + Send + Sync,
{
    /// Opens the registry, loading the persisted descriptor set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the persisted set cannot be
    /// loaded.
    pub async fn open(store: Arc<S>, analyzer: Arc<A>, clock: Arc<C>) -> RegistryResult<Self> {
        let persisted = store.load_all().await?;
        let state = persisted
            .into_iter()
            .map(|descriptor| (descriptor.id().clone(), descriptor))
            .collect();

        Ok(Self {
            store,
            analyzer,
            clock,
            state: RwLock::new(state),
        })
    }

    /// Registers a new managed system.
    ///
    /// The project directory is analysed immediately and the report merged
    /// into the stored descriptor; a missing directory registers with
    /// `error` status rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Domain`] when a required field fails
    /// validation, [`RegistryError::DuplicateSystem`] when the identifier is
    /// taken, or [`RegistryError::DuplicatePath`] when another descriptor
    /// already claims the path.
    pub async fn register(
        &self,
        request: RegisterSystemRequest,
    ) -> RegistryResult<SystemDescriptor> {
        let id = SystemId::new(request.id)?;
        let name = SystemName::new(request.name)?;
        let mut descriptor =
            SystemDescriptor::new(id, name, request.path, request.kind, &*self.clock)?;

        let report = self.analyzer.analyze(descriptor.path()).await;
        descriptor.apply_analysis(&report, &*self.clock);

        {
            let mut state = self.write_state()?;
            if state.contains_key(descriptor.id()) {
                return Err(RegistryError::DuplicateSystem(descriptor.id().clone()));
            }
            if let Some(existing) = state.values().find(|d| d.path() == descriptor.path()) {
                return Err(RegistryError::DuplicatePath(existing.path().to_owned()));
            }
            state.insert(descriptor.id().clone(), descriptor.clone());
        }

        self.persist().await;
        Ok(descriptor)
    }

    /// Returns the descriptor for a system.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no system has the given
    /// identifier.
    pub fn get(&self, id: &SystemId) -> RegistryResult<SystemDescriptor> {
        let state = self.read_state()?;
        state
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Returns every registered descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the descriptor map lock is
    /// poisoned.
    pub fn list(&self) -> RegistryResult<Vec<SystemDescriptor>> {
        let state = self.read_state()?;
        Ok(state.values().cloned().collect())
    }

    /// Applies a partial update to a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the system is absent or
    /// [`RegistryError::Domain`] when an updated field fails validation.
    pub async fn update(
        &self,
        id: &SystemId,
        request: UpdateSystemRequest,
    ) -> RegistryResult<SystemDescriptor> {
        let name = request.name.map(SystemName::new).transpose()?;

        let updated = {
            let mut state = self.write_state()?;
            let descriptor = state
                .get_mut(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

            if let Some(new_name) = name {
                descriptor.rename(new_name);
            }
            if let Some(kind) = request.kind {
                descriptor.set_kind(kind);
            }
            if let Some(status) = request.status_override {
                descriptor.override_status(status);
            }
            if request.clear_status_override {
                descriptor.clear_status_override();
            }
            descriptor.clone()
        };

        self.persist().await;
        Ok(updated)
    }

    /// Removes a system from the registry, returning its descriptor.
    ///
    /// Any watcher attached to the system is stopped by the composition
    /// root alongside this call.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the system is absent.
    pub async fn remove(&self, id: &SystemId) -> RegistryResult<SystemDescriptor> {
        let removed = {
            let mut state = self.write_state()?;
            state
                .remove(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?
        };

        self.persist().await;
        Ok(removed)
    }

    /// Re-analyses a system's directory and merges the result.
    ///
    /// A directory deleted since registration yields `error` status, never
    /// an error return.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the system is absent.
    pub async fn refresh(&self, id: &SystemId) -> RegistryResult<SystemDescriptor> {
        let path = self.get(id)?.path().to_owned();
        let report = self.analyzer.analyze(&path).await;

        let refreshed = {
            let mut state = self.write_state()?;
            let descriptor = state
                .get_mut(id)
                .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
            descriptor.apply_analysis(&report, &*self.clock);
            descriptor.clone()
        };

        self.persist().await;
        Ok(refreshed)
    }

    /// Registers every analysable project under the given seed paths.
    ///
    /// Non-existent paths are skipped silently, as are paths or derived
    /// identifiers that are already registered. Returns the newly
    /// registered descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the descriptor map lock is
    /// poisoned.
    pub async fn discover(&self, seeds: &[Utf8PathBuf]) -> RegistryResult<Vec<SystemDescriptor>> {
        let mut registered = Vec::new();

        for seed in seeds {
            if !self.analyzer.probe(seed).await {
                continue;
            }
            let Some(directory_name) = seed.file_name() else {
                continue;
            };
            let Some(id) = SystemId::slug_from(directory_name) else {
                continue;
            };

            let report = self.analyzer.analyze(seed).await;
            let Some(descriptor) = self.admit_discovered(&id, directory_name, seed, &report)? else {
                continue;
            };
            registered.push(descriptor);
        }

        if !registered.is_empty() {
            self.persist().await;
        }
        Ok(registered)
    }

    /// Analyses a candidate path without registering it.
    ///
    /// Used to pre-fill suggested kind and technologies before an explicit
    /// `register` call.
    pub async fn inspect(&self, path: &Utf8Path) -> AnalysisReport {
        self.analyzer.analyze(path).await
    }

    fn admit_discovered(
        &self,
        id: &SystemId,
        directory_name: &str,
        seed: &Utf8Path,
        report: &AnalysisReport,
    ) -> RegistryResult<Option<SystemDescriptor>> {
        let Ok(name) = SystemName::new(directory_name) else {
            return Ok(None);
        };
        let Ok(mut descriptor) = SystemDescriptor::new(
            id.clone(),
            name,
            seed.to_owned(),
            report.suggested_kind(),
            &*self.clock,
        ) else {
            return Ok(None);
        };
        descriptor.apply_analysis(report, &*self.clock);

        let mut state = self.write_state()?;
        if state.contains_key(id) || state.values().any(|d| d.path() == seed) {
            return Ok(None);
        }
        state.insert(id.clone(), descriptor.clone());
        Ok(Some(descriptor))
    }

    async fn persist(&self) {
        let snapshot: Vec<SystemDescriptor> = match self.read_state() {
            Ok(state) => state.values().cloned().collect(),
            Err(err) => {
                warn!(error = %err, "skipping persistence: descriptor map unavailable");
                return;
            }
        };

        if let Err(err) = self.store.save_all(&snapshot).await {
            warn!(
                error = %err,
                descriptors = snapshot.len(),
                "descriptor persistence failed; in-memory state remains authoritative"
            );
        }
    }

    fn read_state(
        &self,
    ) -> RegistryResult<RwLockReadGuard<'_, HashMap<SystemId, SystemDescriptor>>> {
        self.state.read().map_err(|err| {
            RegistryError::Store(DescriptorStoreError::persistence(std::io::Error::other(
                err.to_string(),
            )))
        })
    }

    fn write_state(
        &self,
    ) -> RegistryResult<RwLockWriteGuard<'_, HashMap<SystemId, SystemDescriptor>>> {
        self.state.write().map_err(|err| {
            RegistryError::Store(DescriptorStoreError::persistence(std::io::Error::other(
                err.to_string(),
            )))
        })
    }
}
