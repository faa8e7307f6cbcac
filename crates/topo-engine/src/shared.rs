//! Cross-thread access to a single engine.
//!
//! The engine itself is single-threaded. `SharedTopology` serializes callers
//! behind one mutex held for the whole operation, so each call stays atomic.

use crate::api::MutationResult;
use crate::handle::TopologyHandle;
use crate::script::Operation;
use crate::types::{GraphSnapshot, TopologyState};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SharedTopology {
    inner: Arc<Mutex<TopologyHandle>>,
}

impl SharedTopology {
    pub fn new(handle: TopologyHandle) -> Self {
        Self {
            inner: Arc::new(Mutex::new(handle)),
        }
    }

    /// Lock the engine. Hold the guard only for the duration of one operation.
    pub fn lock(&self) -> MutexGuard<'_, TopologyHandle> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut TopologyHandle) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn apply(&self, op: Operation) -> MutationResult {
        self.inner.lock().apply(op)
    }

    pub fn graph(&self) -> GraphSnapshot {
        self.inner.lock().graph()
    }

    pub fn state(&self) -> TopologyState {
        self.inner.lock().state()
    }
}

impl From<TopologyHandle> for SharedTopology {
    fn from(handle: TopologyHandle) -> Self {
        Self::new(handle)
    }
}
