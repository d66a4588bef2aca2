//! SM-2 flashcard review.
//!
//! Cards are extracted from `Q:`/`A:` blocks in the knowledge base on every
//! run; only their scheduling state is persisted, keyed by a content hash.

pub mod card;
pub mod session;
pub mod sm2;

pub use card::{card_id, extract_cards, extract_from_text, Card};
pub use session::{due_cards, prune_orphans, Progress, ReviewSession, SessionSummary};
pub use sm2::{grade, sm2, CardState, Quality, Rating, Sm2Outcome, MIN_EASE_FACTOR};

use crate::error::Result;
use crate::scanner::ContentScanner;
use crate::storage::StateStore;

/// Scan the knowledge root and extract every card.
pub fn scan_cards(scanner: &ContentScanner) -> Result<Vec<Card>> {
    Ok(scanner
        .documents()?
        .flat_map(|doc| extract_cards(&doc))
        .collect())
}

/// Like [`scan_cards`], but any document that cannot be walked or read is
/// an error rather than a silent omission.
pub fn scan_all_cards(scanner: &ContentScanner) -> Result<Vec<Card>> {
    Ok(scanner
        .read_all()?
        .iter()
        .flat_map(extract_cards)
        .collect())
}

/// Drop stored progress for cards that no longer exist anywhere under the
/// root. Returns the removed ids.
///
/// Nothing is removed unless every document could be read, since an
/// unreadable file would otherwise look like one whose cards were deleted.
pub fn prune_progress<S>(scanner: &ContentScanner, store: &S) -> Result<Vec<String>>
where
    S: StateStore<State = Progress>,
{
    let cards = scan_all_cards(scanner)?;
    let mut progress = store.load()?;
    let removed = prune_orphans(&mut progress, &cards);
    for id in &removed {
        tracing::info!(card = %id, "dropping progress of vanished card");
    }
    if !removed.is_empty() {
        store.save(&progress)?;
    }
    Ok(removed)
}
