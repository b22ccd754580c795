use std::sync::{Arc, PoisonError, RwLock};

use panicguard_core::Sentinel;

use crate::error::StorageError;
use crate::store::FileStorage;

/// Slot holding the backend the server's storage routes run against.
///
/// A backend is registered once at startup; routes are only built after
/// [`StorageRegistry::load`] succeeds.
#[derive(Default)]
pub struct StorageRegistry {
    backend: RwLock<Option<Arc<dyn FileStorage>>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `backend`, replacing any previous one.
    pub fn register(&self, backend: Arc<dyn FileStorage>) {
        *self.backend.write().unwrap_or_else(PoisonError::into_inner) = Some(backend);
    }

    /// The registered backend, or [`Sentinel::DriveNotExist`] if none.
    pub fn load(&self) -> Result<Arc<dyn FileStorage>, StorageError> {
        self.backend
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StorageError::Sentinel(Sentinel::DriveNotExist))
    }

    /// Remove the registered backend.
    pub fn unload(&self) {
        *self.backend.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
