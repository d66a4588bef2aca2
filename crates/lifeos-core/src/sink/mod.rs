//! External task sinks.
//!
//! The gardener pushes review reminders into a remote task list and later
//! lists what is still open there. Anything that can create, list and
//! delete tasks implements [`TaskSink`].

pub mod memory;
pub mod todoist;

pub use memory::MemorySink;
pub use todoist::TodoistSink;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// Reminder urgency, mapped onto the sink's own scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ReminderPriority {
    /// Todoist priority value (4 is the most urgent).
    pub fn todoist_value(self) -> u8 {
        match self {
            ReminderPriority::Low => 1,
            ReminderPriority::Medium => 2,
            ReminderPriority::High => 3,
            ReminderPriority::Urgent => 4,
        }
    }
}

/// A reminder to be created in the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub priority: ReminderPriority,
}

/// Create/list/delete operations against a remote task list.
///
/// Calls block until the remote answers; retry policy, if any, belongs to
/// the implementation.
pub trait TaskSink {
    /// Short service identifier used in logs (e.g. "todoist").
    fn name(&self) -> &str;

    /// Create a task and return its remote identifier.
    fn create(&self, reminder: &NewReminder) -> Result<String, SinkError>;

    /// Identifiers of every task that is currently open.
    fn list_active(&self) -> Result<HashSet<String>, SinkError>;

    /// Remove a task.
    fn delete(&self, task_id: &str) -> Result<(), SinkError>;
}

impl<S: TaskSink + ?Sized> TaskSink for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn create(&self, reminder: &NewReminder) -> Result<String, SinkError> {
        (**self).create(reminder)
    }

    fn list_active(&self) -> Result<HashSet<String>, SinkError> {
        (**self).list_active()
    }

    fn delete(&self, task_id: &str) -> Result<(), SinkError> {
        (**self).delete(task_id)
    }
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::SinkError;

    const SERVICE: &str = "lifeos";

    pub fn entry(key: &str) -> Result<keyring::Entry, SinkError> {
        Ok(keyring::Entry::new(SERVICE, key)?)
    }

    pub fn get(key: &str) -> Result<Option<String>, SinkError> {
        read(&entry(key)?)
    }

    /// Stored secret of `entry`; an absent entry is `None`, any other
    /// backend failure is an error.
    pub fn read(entry: &keyring::Entry) -> Result<Option<String>, SinkError> {
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), SinkError> {
        entry(key)?.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), SinkError> {
        match entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_maps_onto_todoist_scale() {
        assert_eq!(ReminderPriority::Low.todoist_value(), 1);
        assert_eq!(ReminderPriority::High.todoist_value(), 3);
        assert_eq!(ReminderPriority::Urgent.todoist_value(), 4);
    }

    #[test]
    fn priority_serializes_lowercase() {
        let json = serde_json::to_string(&ReminderPriority::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
