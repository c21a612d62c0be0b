//! Progress reporting (§3 "Progress Report").
//!
//! The live [`ProgressReport`] is mutated only by the orchestrator, behind a
//! `parking_lot::Mutex` so callbacks triggered mid-run can safely read a
//! consistent snapshot (§5 "Shared resources"). Subscribers only ever see
//! [`ProgressSnapshot`], an immutable value type, replacing the
//! hand-copied-snapshot approach the spec's design notes call out (§9).

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCompletion {
    Ongoing,
    Completed,
    Cancelled,
    Failed,
}

/// An immutable point-in-time copy of the running counters, safe to hand to
/// `onProgress` subscribers.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    pub create_local: u64,
    pub update_local: u64,
    pub create_remote: u64,
    pub update_remote: u64,
    pub delete_local: u64,
    pub delete_remote: u64,
    pub note_conflict: u64,
    pub item_conflict: u64,
    pub resource_conflict: u64,
    pub fetching_total: u64,
    pub fetching_processed: u64,
    pub cancelling: bool,
    pub start_time: i64,
    pub completed_time: Option<i64>,
    pub state: RunCompletion,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
struct Counters {
    create_local: u64,
    update_local: u64,
    create_remote: u64,
    update_remote: u64,
    delete_local: u64,
    delete_remote: u64,
    note_conflict: u64,
    item_conflict: u64,
    resource_conflict: u64,
    fetching_total: u64,
    fetching_processed: u64,
    cancelling: bool,
    start_time: i64,
    completed_time: Option<i64>,
    state: RunCompletion,
    errors: Vec<String>,
}

/// Action counters keyed the way §3 names them, used by the orchestrator to
/// bump the right field without a giant match in every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCounter {
    CreateLocal,
    UpdateLocal,
    CreateRemote,
    UpdateRemote,
    DeleteLocal,
    DeleteRemote,
    NoteConflict,
    ItemConflict,
    ResourceConflict,
}

pub struct ProgressReport {
    counters: Mutex<Counters>,
}

impl ProgressReport {
    pub fn new(start_time: i64) -> Self {
        Self {
            counters: Mutex::new(Counters {
                start_time,
                ..Default::default()
            }),
        }
    }

    pub fn increment(&self, counter: ProgressCounter) {
        let mut c = self.counters.lock();
        match counter {
            ProgressCounter::CreateLocal => c.create_local += 1,
            ProgressCounter::UpdateLocal => c.update_local += 1,
            ProgressCounter::CreateRemote => c.create_remote += 1,
            ProgressCounter::UpdateRemote => c.update_remote += 1,
            ProgressCounter::DeleteLocal => c.delete_local += 1,
            ProgressCounter::DeleteRemote => c.delete_remote += 1,
            ProgressCounter::NoteConflict => c.note_conflict += 1,
            ProgressCounter::ItemConflict => c.item_conflict += 1,
            ProgressCounter::ResourceConflict => c.resource_conflict += 1,
        }
    }

    pub fn set_fetching_total(&self, total: u64) {
        self.counters.lock().fetching_total = total;
    }

    pub fn increment_fetching_processed(&self) {
        self.counters.lock().fetching_processed += 1;
    }

    pub fn set_cancelling(&self, cancelling: bool) {
        self.counters.lock().cancelling = cancelling;
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.counters.lock().errors.push(message.into());
    }

    pub fn finish(&self, completed_time: i64, state: RunCompletion) {
        let mut c = self.counters.lock();
        c.completed_time = Some(completed_time);
        c.state = state;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let c = self.counters.lock();
        ProgressSnapshot {
            create_local: c.create_local,
            update_local: c.update_local,
            create_remote: c.create_remote,
            update_remote: c.update_remote,
            delete_local: c.delete_local,
            delete_remote: c.delete_remote,
            note_conflict: c.note_conflict,
            item_conflict: c.item_conflict,
            resource_conflict: c.resource_conflict,
            fetching_total: c.fetching_total,
            fetching_processed: c.fetching_processed,
            cancelling: c.cancelling,
            start_time: c.start_time,
            completed_time: c.completed_time,
            state: c.state,
            errors: c.errors.clone(),
        }
    }
}

impl Default for RunCompletion {
    fn default() -> Self {
        RunCompletion::Ongoing
    }
}
