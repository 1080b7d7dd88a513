//! Process-wide state of the collision backend.
//!
//! The backend is initialized when the first environment is created and torn
//! down when the last one is dropped. Each thread issuing queries is
//! registered once, on its first query. Everything lives behind a single lock
//! reached through [`BackendRef`] and [`ensure_thread_ready`].

use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

struct BackendState {
    environments: usize,
    ready_threads: Vec<ThreadId>,
}

static BACKEND: Mutex<BackendState> = Mutex::new(BackendState {
    environments: 0,
    ready_threads: Vec::new(),
});

fn backend() -> MutexGuard<'static, BackendState> {
    // The state stays consistent even if a panic happened while it was locked.
    BACKEND.lock().unwrap_or_else(|e| e.into_inner())
}

fn acquire() {
    let mut state = backend();
    if state.environments == 0 {
        log::debug!("Initializing the collision backend.");
    }
    state.environments += 1;
}

fn release() {
    let mut state = backend();
    state.environments = state.environments.saturating_sub(1);
    if state.environments == 0 {
        log::debug!(
            "Tearing down the collision backend ({} registered threads).",
            state.ready_threads.len()
        );
        state.ready_threads.clear();
    }
}

/// A reference keeping the collision backend alive.
///
/// Every environment holds one: it is acquired on construction (and on
/// clone) and released on drop.
#[derive(Debug)]
pub struct BackendRef {
    _private: (),
}

impl BackendRef {
    /// Acquires a new reference to the backend, initializing it if needed.
    pub fn acquire() -> Self {
        acquire();
        BackendRef { _private: () }
    }
}

impl Clone for BackendRef {
    fn clone(&self) -> Self {
        Self::acquire()
    }
}

impl Drop for BackendRef {
    fn drop(&mut self) {
        release();
    }
}

/// Performs the per-thread backend setup of the calling thread if it was not
/// done yet.
///
/// Called at the start of every query.
pub fn ensure_thread_ready() {
    let id = thread::current().id();
    let mut state = backend();
    if !state.ready_threads.contains(&id) {
        log::debug!("Registering thread {:?} with the collision backend.", id);
        state.ready_threads.push(id);
    }
}

/// The number of live [`BackendRef`]s.
pub fn live_references() -> usize {
    backend().environments
}

/// Returns `true` if the calling thread completed its backend setup.
pub fn is_thread_ready() -> bool {
    let id = thread::current().id();
    backend().ready_threads.contains(&id)
}
