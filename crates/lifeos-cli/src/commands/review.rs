use clap::Subcommand;
use lifeos_core::review::{due_cards, prune_progress, scan_cards};
use lifeos_core::{Config, ContentScanner, JsonFileStore, Progress, ReviewSession, StateStore};
use serde::Serialize;

use super::today;

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Run an interactive review session over today's due cards
    Run,
    /// List due cards without grading them
    Due {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop saved progress for cards that no longer exist
    Prune,
}

#[derive(Serialize)]
struct DueCard<'a> {
    id: &'a str,
    source: &'a str,
    context: &'a str,
    question: &'a str,
    /// `None` for a card that has never been graded.
    next_review: Option<chrono::NaiveDate>,
}

pub fn run(action: ReviewAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scanner = ContentScanner::new(config.knowledge_dir()?, config.knowledge.extension.clone());
    let store: JsonFileStore<Progress> = JsonFileStore::new(config.review_state_path()?);

    match action {
        ReviewAction::Run => {
            let cards = scan_cards(&scanner)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            ReviewSession::new(&store, stdin.lock(), stdout.lock()).run(
                &cards,
                today(),
                &mut rand::thread_rng(),
            )?;
        }
        ReviewAction::Due { json } => {
            let cards = scan_cards(&scanner)?;
            let progress = store.load()?;
            let mut due = due_cards(&cards, &progress, today(), &mut rand::thread_rng());
            due.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.question.cmp(&b.question)));

            let rows: Vec<DueCard> = due
                .iter()
                .map(|card| DueCard {
                    id: &card.id,
                    source: &card.source,
                    context: &card.context,
                    question: &card.question,
                    next_review: progress.get(&card.id).map(|s| s.next_review),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No cards due.");
            } else {
                println!("{} of {} cards due:", rows.len(), cards.len());
                for row in &rows {
                    let when = row
                        .next_review
                        .map_or_else(|| "new".to_string(), |d| d.to_string());
                    println!("  [{}] {} ({}, {when})", row.id, row.question, row.source);
                }
            }
        }
        ReviewAction::Prune => {
            let removed = prune_progress(&scanner, &store)?;
            println!("pruned {} orphaned card(s)", removed.len());
        }
    }
    Ok(())
}
