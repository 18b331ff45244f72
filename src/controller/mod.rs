//! Controllers: owned stores between the view and the REST client
//!
//! Each controller owns one cached collection and is the only thing that
//! mutates it. Operations follow the same path: acquire token, send,
//! parse, then apply to local state. Mutations never insert optimistically;
//! they refresh the whole collection from the server afterwards.
//!
//! Loads are tagged with a per-controller request id. A response is only
//! applied if no newer load was issued meanwhile and the controller has not
//! been closed, so a slow stale response can never overwrite fresher state.

mod data_item;
mod project;

pub use data_item::{DataItemController, DataItemState};
pub use project::{ProjectController, ProjectDraft, ProjectState};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Proof that the user explicitly agreed to a destructive action.
///
/// Controllers never ask; the caller does, then hands this over.
#[derive(Debug, Clone, Copy)]
pub struct Confirmation(());

impl Confirmation {
    pub fn confirmed() -> Self {
        Confirmation(())
    }
}

/// Request-id bookkeeping shared by both controllers
#[derive(Debug, Default)]
struct LoadTracker {
    latest: AtomicU64,
    closed: AtomicBool,
}

impl LoadTracker {
    /// Issue the id for a new load
    fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a response tagged `id` may still be applied
    fn is_current(&self, id: u64) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.latest.load(Ordering::SeqCst) == id
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// State guards are never held across an await, so poisoning only means a
/// panic elsewhere; the data itself is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
