//! Gardener state and its phase transitions.
//!
//! Each phase is a plain function of the state plus the facts it needs
//! (live task ids, present documents, today's date); none of them talk to
//! the sink or the filesystem.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::intervals::IntervalTable;

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Review cadence of one watched document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub stage: u32,
    #[serde(default)]
    pub last_review: Option<NaiveDate>,
    /// Items recorded without a date are treated as long overdue.
    #[serde(default = "unix_epoch")]
    pub next_review: NaiveDate,
}

impl KnowledgeItem {
    /// A newly discovered document, due immediately.
    pub fn discovered(today: NaiveDate) -> Self {
        Self {
            stage: 0,
            last_review: None,
            next_review: today,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }
}

/// Everything the gardener persists, written as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenState {
    /// Document path -> cadence.
    #[serde(default)]
    pub items: BTreeMap<String, KnowledgeItem>,
    /// Document path -> remote task id of its open reminder.
    #[serde(default)]
    pub active_reminders: BTreeMap<String, String>,
}

/// A document promoted because its reminder disappeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub path: String,
    pub task_id: String,
    pub stage: u32,
    pub interval: u32,
    pub next_review: NaiveDate,
}

/// A document that vanished from the watched root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub path: String,
    /// The reminder that was open for it, now forgotten.
    pub orphaned_reminder: Option<String>,
}

/// Result of reconciling state against the watched root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RescanOutcome {
    pub added: Vec<String>,
    pub removed: Vec<Removal>,
}

impl GardenState {
    /// Advance `path` one stage and date its next review.
    ///
    /// A path with no record is created at stage 0 first.
    pub fn promote(&mut self, path: &str, today: NaiveDate, table: &IntervalTable) -> (u32, u32, NaiveDate) {
        let item = self
            .items
            .entry(path.to_string())
            .or_insert_with(|| KnowledgeItem::discovered(today));

        item.stage = item.stage.saturating_add(1);
        item.last_review = Some(today);
        let interval = table.interval_for(item.stage);
        item.next_review = today
            .checked_add_days(Days::new(u64::from(interval)))
            .unwrap_or(NaiveDate::MAX);

        (item.stage, interval, item.next_review)
    }

    /// Phase 1: every reminder whose task id is missing from `live` counts
    /// as reviewed. The sink gives no reason for a disappearance, so a
    /// deleted or purged task is indistinguishable from a completed one.
    pub fn check_completions(
        &mut self,
        live: &HashSet<String>,
        today: NaiveDate,
        table: &IntervalTable,
    ) -> Vec<Completion> {
        let finished: Vec<(String, String)> = self
            .active_reminders
            .iter()
            .filter(|(_, task_id)| !live.contains(task_id.as_str()))
            .map(|(path, task_id)| (path.clone(), task_id.clone()))
            .collect();

        finished
            .into_iter()
            .map(|(path, task_id)| {
                self.active_reminders.remove(&path);
                let (stage, interval, next_review) = self.promote(&path, today, table);
                Completion {
                    path,
                    task_id,
                    stage,
                    interval,
                    next_review,
                }
            })
            .collect()
    }

    /// Phase 2: register new documents (due today) and forget deleted ones
    /// along with any reminder they still had.
    pub fn rescan(&mut self, present: &BTreeSet<String>, today: NaiveDate) -> RescanOutcome {
        let mut outcome = RescanOutcome::default();

        for path in present {
            if !self.items.contains_key(path) {
                self.items
                    .insert(path.clone(), KnowledgeItem::discovered(today));
                outcome.added.push(path.clone());
            }
        }

        let gone: Vec<String> = self
            .items
            .keys()
            .filter(|path| !present.contains(*path))
            .cloned()
            .collect();

        for path in gone {
            self.items.remove(&path);
            let orphaned_reminder = self.active_reminders.remove(&path);
            outcome.removed.push(Removal {
                path,
                orphaned_reminder,
            });
        }

        // reminders whose item record is already gone
        let stray: Vec<String> = self
            .active_reminders
            .keys()
            .filter(|path| !self.items.contains_key(*path))
            .cloned()
            .collect();
        for path in stray {
            let orphaned_reminder = self.active_reminders.remove(&path);
            outcome.removed.push(Removal {
                path,
                orphaned_reminder,
            });
        }

        outcome
    }

    /// Phase 3 selection: due items without an open reminder, most overdue
    /// first, at most `cap`.
    pub fn due_candidates(&self, today: NaiveDate, cap: usize) -> Vec<String> {
        let mut due: Vec<(&String, &KnowledgeItem)> = self
            .items
            .iter()
            .filter(|(path, item)| item.is_due(today) && !self.active_reminders.contains_key(*path))
            .collect();

        due.sort_by(|(pa, a), (pb, b)| a.next_review.cmp(&b.next_review).then_with(|| pa.cmp(pb)));
        due.into_iter()
            .take(cap)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Number of due items without an open reminder.
    pub fn due_count(&self, today: NaiveDate) -> usize {
        self.items
            .iter()
            .filter(|(path, item)| item.is_due(today) && !self.active_reminders.contains_key(*path))
            .count()
    }
}
