use clap::Subcommand;
use lifeos_core::{Config, ContentScanner, GardenState, Gardener, JsonFileStore, StateStore, TodoistSink};
use serde::Serialize;

use super::today;

#[derive(Subcommand)]
pub enum GardenAction {
    /// Detect finished reviews, rescan the library and push due reminders
    Sync {
        /// Output the sync report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every tracked document with its stage and next review
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ItemStatus<'a> {
    path: &'a str,
    stage: u32,
    last_review: Option<chrono::NaiveDate>,
    next_review: chrono::NaiveDate,
    due: bool,
    reminder: Option<&'a str>,
}

pub fn run(action: GardenAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store: JsonFileStore<GardenState> = JsonFileStore::new(config.garden_state_path()?);

    match action {
        GardenAction::Sync { json } => {
            let scanner = ContentScanner::new(config.knowledge_dir()?, config.knowledge.extension.clone());
            let sink = TodoistSink::new(&config.todoist.base_url)?.with_project(config.garden.project_id.clone());
            if !sink.is_authenticated() {
                return Err("todoist token not set; run `lifeos auth todoist <token>`".into());
            }

            tracing::debug!(root = %scanner.root().display(), state = %store.path().display(), "starting garden sync");
            let gardener = Gardener::new(sink, &scanner, config.gardener_options()?);
            let report = gardener.run(&store, today())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if let Some(err) = &report.completion_check_error {
                println!("Completion check skipped: {err}");
            }
            for done in &report.completed {
                println!(
                    "Reviewed: {} -> stage {}, next in {} days",
                    done.path, done.stage, done.interval
                );
            }
            for path in &report.added {
                println!("New: {path}");
            }
            for path in &report.removed {
                println!("Removed: {path}");
            }
            for reminder in &report.scheduled {
                println!("Scheduled: {}", reminder.title);
            }
            for failed in &report.failed {
                println!("Failed: {} ({})", failed.path, failed.error);
            }
            if report.scheduled.is_empty() && report.failed.is_empty() {
                println!("No reviews due today.");
            }
            if report.still_due > 0 {
                println!("{} more due, left for the next sync.", report.still_due);
            }
        }
        GardenAction::Status { json } => {
            let state = store.load()?;
            let today = today();
            let rows: Vec<ItemStatus> = state
                .items
                .iter()
                .map(|(path, item)| ItemStatus {
                    path,
                    stage: item.stage,
                    last_review: item.last_review,
                    next_review: item.next_review,
                    due: item.is_due(today),
                    reminder: state.active_reminders.get(path).map(String::as_str),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No documents tracked yet. Run `lifeos garden sync`.");
            } else {
                for row in &rows {
                    let marker = match (row.reminder, row.due) {
                        (Some(_), _) => "reminder open",
                        (None, true) => "due",
                        (None, false) => "",
                    };
                    println!(
                        "{:<40} stage {:>2}  next {}  {marker}",
                        row.path, row.stage, row.next_review
                    );
                }
            }
        }
    }
    Ok(())
}
