//! In-memory task sink.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use super::{NewReminder, TaskSink};
use crate::error::SinkError;

/// A task list held in process memory.
///
/// Failures can be injected to exercise the gardener's degraded paths.
#[derive(Debug, Default)]
pub struct MemorySink {
    tasks: RefCell<BTreeMap<String, NewReminder>>,
    deleted: RefCell<Vec<String>>,
    next_id: Cell<u64>,
    fail_list: Cell<bool>,
    fail_creates: Cell<usize>,
    create_calls: Cell<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the operator ticking a task off (it vanishes from listings).
    pub fn complete(&self, task_id: &str) -> Option<NewReminder> {
        self.tasks.borrow_mut().remove(task_id)
    }

    /// Open task ids with their reminders.
    pub fn tasks(&self) -> BTreeMap<String, NewReminder> {
        self.tasks.borrow().clone()
    }

    /// Ids passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }

    /// Number of `create` calls, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.create_calls.get()
    }

    /// Make `list_active` fail until reset.
    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.set(fail);
    }

    /// Make the next `count` calls to `create` fail.
    pub fn fail_next_creates(&self, count: usize) {
        self.fail_creates.set(count);
    }

    fn unavailable(&self) -> SinkError {
        SinkError::Transport {
            service: self.name().to_string(),
            message: "injected failure".into(),
        }
    }
}

impl TaskSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn create(&self, reminder: &NewReminder) -> Result<String, SinkError> {
        self.create_calls.set(self.create_calls.get() + 1);

        let pending = self.fail_creates.get();
        if pending > 0 {
            self.fail_creates.set(pending - 1);
            return Err(self.unavailable());
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let id = format!("task-{id}");
        self.tasks.borrow_mut().insert(id.clone(), reminder.clone());
        Ok(id)
    }

    fn list_active(&self) -> Result<HashSet<String>, SinkError> {
        if self.fail_list.get() {
            return Err(self.unavailable());
        }
        Ok(self.tasks.borrow().keys().cloned().collect())
    }

    fn delete(&self, task_id: &str) -> Result<(), SinkError> {
        self.deleted.borrow_mut().push(task_id.to_string());
        self.tasks.borrow_mut().remove(task_id);
        Ok(())
    }
}
