//! Tracking of entered modes.
//!
//! Two views are kept: a per-thread stack answering "which mode is this
//! thread inside of", and a shared [`ModeTracker`] listing every entered mode
//! across threads.

use crate::error::{KeepAwakeError, KeepAwakeResult};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread::ThreadId;

static NEXT_MODE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique mode id.
pub(crate) fn next_mode_id() -> u64 {
    NEXT_MODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Snapshot of an entered mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeSnapshot {
    pub id: u64,
    pub name: String,
    /// Name of the active method, if activation succeeded.
    pub method: Option<String>,
    #[serde(skip)]
    pub thread: ThreadId,
}

/// Registry of entered modes, shared between threads.
#[derive(Debug, Clone, Default)]
pub struct ModeTracker {
    modes: Arc<Mutex<Vec<ModeSnapshot>>>,
}

impl ModeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide tracker, used by modes that are not given one.
    pub fn global() -> &'static ModeTracker {
        static GLOBAL: OnceLock<ModeTracker> = OnceLock::new();
        GLOBAL.get_or_init(ModeTracker::new)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ModeSnapshot>> {
        self.modes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn insert(&self, snapshot: ModeSnapshot) {
        tracing::debug!(mode = %snapshot.name, id = snapshot.id, "tracking mode");
        self.lock().push(snapshot);
    }

    pub(crate) fn remove(&self, id: u64) {
        self.lock().retain(|m| m.id != id);
    }

    /// All entered modes, in the order they were entered.
    pub fn modes(&self) -> Vec<ModeSnapshot> {
        self.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

thread_local! {
    static CURRENT: RefCell<Vec<ModeSnapshot>> = const { RefCell::new(Vec::new()) };
}

/// Ids of modes that are entered and not yet exited, on any thread.
fn live_ids() -> MutexGuard<'static, HashSet<u64>> {
    static LIVE: OnceLock<Mutex<HashSet<u64>>> = OnceLock::new();
    LIVE.get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn push_current(snapshot: ModeSnapshot) {
    live_ids().insert(snapshot.id);
    CURRENT.with(|stack| stack.borrow_mut().push(snapshot));
}

/// Forget mode `id`. A mode exited on another thread than it was entered on
/// stays on the entering thread's stack until [`current_mode`] prunes it.
pub(crate) fn pop_current(id: u64) {
    live_ids().remove(&id);
    CURRENT.with(|stack| {
        let mut stack = stack.borrow_mut();
        if let Some(pos) = stack.iter().rposition(|m| m.id == id) {
            stack.remove(pos);
        }
    });
}

/// The innermost mode entered on this thread and not exited yet.
pub fn current_mode() -> KeepAwakeResult<ModeSnapshot> {
    let live = live_ids();
    CURRENT
        .with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.retain(|m| live.contains(&m.id));
            stack.last().cloned()
        })
        .ok_or(KeepAwakeError::NoCurrentMode)
}

/// Every mode entered in the process, across threads.
pub fn global_modes() -> Vec<ModeSnapshot> {
    ModeTracker::global().modes()
}

/// Number of modes entered in the process.
pub fn modecount() -> usize {
    ModeTracker::global().count()
}
