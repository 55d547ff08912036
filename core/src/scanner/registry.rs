//! Bookkeeping of in-flight lookups.
//!
//! A slot is reserved by [`TaskRegistry::try_admit`] before any work is done
//! for a request, filled by [`TaskRegistry::register`] once the task exists,
//! and freed by [`TaskRegistry::remove`] when its completion is handled.
//! Holding a slot per [`TaskKey`] is what keeps two processes from running
//! the same lookup against the same target.

use indexmap::IndexMap;
use smbrowse_common::lookup::{LookupKind, TaskKey};
use smbrowse_common::network::ItemKey;

use super::task::LookupTask;

#[derive(Debug)]
enum Slot {
    Reserved,
    Active(LookupTask),
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    slots: IndexMap<TaskKey, Slot>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the slot for `key`. Returns false if a lookup with the same
    /// key is already in flight.
    pub fn try_admit(&mut self, key: &TaskKey) -> bool {
        if self.slots.contains_key(key) {
            return false;
        }
        self.slots.insert(key.clone(), Slot::Reserved);
        true
    }

    /// Stores `task` in the slot reserved for its key.
    pub fn register(&mut self, task: LookupTask) {
        debug_assert!(
            matches!(self.slots.get(task.key()), Some(Slot::Reserved)),
            "task registered without admission"
        );
        self.slots.insert(task.key().clone(), Slot::Active(task));
    }

    /// Drops a reservation that never turned into a task.
    pub fn release(&mut self, key: &TaskKey) {
        if let Some(Slot::Reserved) = self.slots.get(key) {
            self.slots.shift_remove(key);
        }
    }

    pub fn find(&self, key: &TaskKey) -> Option<&LookupTask> {
        match self.slots.get(key)? {
            Slot::Active(task) => Some(task),
            Slot::Reserved => None,
        }
    }

    pub(crate) fn find_mut(&mut self, key: &TaskKey) -> Option<&mut LookupTask> {
        match self.slots.get_mut(key)? {
            Slot::Active(task) => Some(task),
            Slot::Reserved => None,
        }
    }

    /// All tasks working on `target`, whatever their operation.
    pub fn find_by_target(&self, target: &ItemKey) -> Vec<&LookupTask> {
        self.tasks()
            .filter(|task| task.key().target == *target)
            .collect()
    }

    /// Tasks matching an optional target and an optional operation kind.
    pub fn matching(
        &self,
        target: Option<&ItemKey>,
        kind: Option<LookupKind>,
    ) -> impl Iterator<Item = &LookupTask> {
        self.tasks().filter(move |task| {
            target.is_none_or(|target| task.key().target == *target)
                && kind.is_none_or(|kind| task.key().kind == kind)
        })
    }

    pub fn remove(&mut self, key: &TaskKey) -> Option<LookupTask> {
        match self.slots.shift_remove(key)? {
            Slot::Active(task) => Some(task),
            Slot::Reserved => None,
        }
    }

    /// Tasks in admission order.
    pub fn tasks(&self) -> impl Iterator<Item = &LookupTask> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Active(task) => Some(task),
            Slot::Reserved => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}
