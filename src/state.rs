use crate::store::{Store, StoreResult};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
}

impl AppState {
    pub fn new(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            store: Arc::new(Mutex::new(Store::open(data_dir)?)),
        })
    }

    /// Lock the store for the rest of the request. Holding the guard is the
    /// transaction.
    ///
    /// Every write commits as one batch, so a request that panicked while
    /// holding the guard left no partial write behind and the lock is
    /// recovered.
    pub fn store(&self) -> MutexGuard<'_, Store> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("recovering store lock released by a panicked request");
                self.store.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}
