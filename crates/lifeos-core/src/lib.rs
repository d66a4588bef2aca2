//! # LifeOS Core Library
//!
//! This library provides the scheduling logic behind the LifeOS
//! knowledge-review tools. It follows a CLI-first philosophy: the `lifeos`
//! binary is a thin layer that wires configuration, storage and the task
//! sink into the engines defined here.
//!
//! ## Architecture
//!
//! - **Review**: SM-2 flashcards extracted from `Q:`/`A:` blocks, graded in
//!   an interactive session that persists after every grade
//! - **Garden**: Fibonacci-cadence resurfacing of whole documents through
//!   reminders in an external task list, with completion inferred from a
//!   reminder's disappearance
//! - **Storage**: JSON state files and TOML configuration
//! - **Sink**: Task-list seam with a Todoist implementation
//!
//! ## Key Components
//!
//! - [`ReviewSession`]: Interactive SM-2 grading loop
//! - [`Gardener`]: Four-phase gardener sync
//! - [`StateStore`]: Load/save seam for scheduler state
//! - [`TaskSink`]: Trait for external task lists

pub mod error;
pub mod garden;
pub mod review;
pub mod scanner;
pub mod sink;
pub mod storage;

pub use error::{ConfigError, CoreError, SinkError, ValidationError};
pub use garden::{GardenState, Gardener, GardenerOptions, IntervalTable, KnowledgeItem, SyncReport};
pub use review::{Card, CardState, Progress, Quality, Rating, ReviewSession, SessionSummary};
pub use scanner::{ContentScanner, Document};
pub use sink::{MemorySink, NewReminder, ReminderPriority, TaskSink, TodoistSink};
pub use storage::{Config, JsonFileStore, MemoryStore, StateStore};
