//! Knowledge gardener.
//!
//! Whole documents under the watched root are resurfaced on a Fibonacci
//! cadence by pushing review reminders into an external task list. A
//! reminder that later disappears from that list is taken as the review
//! having happened, and the document moves up one stage.

pub mod gardener;
pub mod intervals;
pub mod state;

pub use gardener::{preview, FailedReminder, Gardener, GardenerOptions, ScheduledReminder, SyncReport};
pub use intervals::IntervalTable;
pub use state::{Completion, GardenState, KnowledgeItem, Removal, RescanOutcome};
