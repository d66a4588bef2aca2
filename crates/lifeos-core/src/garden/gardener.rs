//! Sync orchestration: completion check, library rescan, scheduling, persist.

use chrono::NaiveDate;
use serde::Serialize;

use super::intervals::IntervalTable;
use super::state::{Completion, GardenState};
use crate::error::Result;
use crate::scanner::{title_from_stem, ContentScanner};
use crate::sink::{NewReminder, ReminderPriority, TaskSink};
use crate::storage::StateStore;

/// Lines inspected when building a reminder preview.
const PREVIEW_SCAN_LINES: usize = 10;
/// Lines kept in a reminder preview.
const PREVIEW_KEEP_LINES: usize = 3;

/// Tunables for one gardener.
#[derive(Debug, Clone)]
pub struct GardenerOptions {
    pub intervals: IntervalTable,
    /// Upper bound on reminders created per sync.
    pub daily_cap: usize,
    /// Best-effort delete of the remote reminder when a document vanishes.
    pub retract_deleted: bool,
    pub tags: Vec<String>,
    pub priority: ReminderPriority,
}

impl Default for GardenerOptions {
    fn default() -> Self {
        Self {
            intervals: IntervalTable::fibonacci(),
            daily_cap: 3,
            retract_deleted: false,
            tags: vec!["review".into()],
            priority: ReminderPriority::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledReminder {
    pub path: String,
    pub task_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedReminder {
    pub path: String,
    pub error: String,
}

/// What a sync did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub completed: Vec<Completion>,
    /// Set when the sink could not be listed and the completion check was
    /// skipped.
    pub completion_check_error: Option<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Remote reminders deleted because their document vanished.
    pub retracted: Vec<String>,
    pub scheduled: Vec<ScheduledReminder>,
    pub failed: Vec<FailedReminder>,
    /// Due items left for a later sync.
    pub still_due: usize,
}

/// Drives the four sync phases against a task sink.
pub struct Gardener<'a, S> {
    sink: S,
    scanner: &'a ContentScanner,
    options: GardenerOptions,
}

impl<'a, S: TaskSink> Gardener<'a, S> {
    pub fn new(sink: S, scanner: &'a ContentScanner, options: GardenerOptions) -> Self {
        Self {
            sink,
            scanner,
            options,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Load, run phases 1-3, and save once at the end.
    ///
    /// Any error before the final write leaves stored state untouched.
    pub fn run<St>(&self, store: &St, today: NaiveDate) -> Result<SyncReport>
    where
        St: StateStore<State = GardenState>,
    {
        let mut state = store.load()?;
        let report = self.sync(&mut state, today)?;
        store.save(&state)?;
        tracing::info!(
            completed = report.completed.len(),
            scheduled = report.scheduled.len(),
            still_due = report.still_due,
            "garden sync complete"
        );
        Ok(report)
    }

    /// Run phases 1-3 against in-memory state.
    pub fn sync(&self, state: &mut GardenState, today: NaiveDate) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        self.check_completions(state, today, &mut report);
        self.scan_library(state, today, &mut report)?;
        self.schedule_reviews(state, today, &mut report);

        report.still_due = state.due_count(today);
        Ok(report)
    }

    fn check_completions(&self, state: &mut GardenState, today: NaiveDate, report: &mut SyncReport) {
        if state.active_reminders.is_empty() {
            return;
        }

        let live = match self.sink.list_active() {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!(sink = self.sink.name(), error = %e, "cannot list tasks, skipping completion check");
                report.completion_check_error = Some(e.to_string());
                return;
            }
        };

        for completion in state.check_completions(&live, today, &self.options.intervals) {
            tracing::info!(
                path = %completion.path,
                stage = completion.stage,
                next_review = %completion.next_review,
                "review completed"
            );
            report.completed.push(completion);
        }
    }

    fn scan_library(&self, state: &mut GardenState, today: NaiveDate, report: &mut SyncReport) -> Result<()> {
        let present = self.scanner.relative_paths()?;
        let outcome = state.rescan(&present, today);

        for path in &outcome.added {
            tracing::info!(path = %path, "new knowledge document");
        }

        for removal in outcome.removed {
            tracing::info!(path = %removal.path, "document removed, state cleaned");
            if let Some(task_id) = removal.orphaned_reminder {
                if self.options.retract_deleted {
                    match self.sink.delete(&task_id) {
                        Ok(()) => report.retracted.push(task_id),
                        Err(e) => {
                            tracing::warn!(task_id = %task_id, error = %e, "failed to retract reminder")
                        }
                    }
                } else {
                    tracing::debug!(task_id = %task_id, "forgetting reminder of removed document");
                }
            }
            report.removed.push(removal.path);
        }

        report.added = outcome.added;
        Ok(())
    }

    fn schedule_reviews(&self, state: &mut GardenState, today: NaiveDate, report: &mut SyncReport) {
        let candidates = state.due_candidates(today, self.options.daily_cap);
        if candidates.is_empty() {
            tracing::debug!("no reviews due");
            return;
        }

        for path in candidates {
            let reminder = self.reminder_for(&path);
            match self.sink.create(&reminder) {
                Ok(task_id) => {
                    tracing::info!(path = %path, task_id = %task_id, "review reminder created");
                    state.active_reminders.insert(path.clone(), task_id.clone());
                    report.scheduled.push(ScheduledReminder {
                        path,
                        task_id,
                        title: reminder.title,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "failed to create review reminder");
                    report.failed.push(FailedReminder {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    fn reminder_for(&self, path: &str) -> NewReminder {
        let file = self.scanner.resolve(path);
        let preview = match std::fs::read_to_string(&file) {
            Ok(text) => preview(&text),
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "cannot read document for preview");
                "Unable to read file.".to_string()
            }
        };
        let file_name = path.rsplit('/').next().unwrap_or(path);

        NewReminder {
            title: format!("Review: {}", title_from_stem(path)),
            description: format!("{preview}\n\nPath: `{file_name}`"),
            tags: self.options.tags.clone(),
            priority: self.options.priority,
        }
    }
}

/// First few non-heading lines from the top of a document.
pub fn preview(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .take(PREVIEW_SCAN_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(PREVIEW_KEEP_LINES)
        .collect();

    if lines.is_empty() {
        "No content preview.".to_string()
    } else {
        format!("{}...", lines.join("\n"))
    }
}
