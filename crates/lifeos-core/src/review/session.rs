//! Due-card selection and the interactive grading loop.

use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, Write};

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use super::card::Card;
use super::sm2::{grade, CardState, Rating};
use crate::error::Result;
use crate::storage::StateStore;

/// Persisted SM-2 state keyed by card id.
pub type Progress = BTreeMap<String, CardState>;

/// Cards that are new or whose next review has arrived, shuffled so new
/// and returning cards are interleaved.
pub fn due_cards<'c, R: Rng + ?Sized>(
    cards: &'c [Card],
    progress: &Progress,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<&'c Card> {
    let mut due: Vec<&Card> = cards
        .iter()
        .filter(|card| {
            progress
                .get(&card.id)
                .map_or(true, |state| state.is_due(today))
        })
        .collect();
    due.shuffle(rng);
    due
}

/// Drop state for cards that no longer appear in `cards`.
///
/// Returns the removed ids. Nothing calls this implicitly; retention is
/// unbounded unless the operator asks for a prune.
pub fn prune_orphans(progress: &mut Progress, cards: &[Card]) -> Vec<String> {
    let live: HashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();
    let orphans: Vec<String> = progress
        .keys()
        .filter(|id| !live.contains(id.as_str()))
        .cloned()
        .collect();
    for id in &orphans {
        progress.remove(id);
    }
    orphans
}

/// Outcome of one review session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub due: usize,
    pub reviewed: usize,
    pub cancelled: bool,
}

impl SessionSummary {
    pub fn remaining(&self) -> usize {
        self.due - self.reviewed
    }
}

enum Prompt {
    Line(String),
    Quit,
}

/// Interactive review loop over arbitrary input and output streams.
///
/// Every grade is saved through the store before the next card is shown,
/// so quitting (or losing the process) keeps all earlier grades.
pub struct ReviewSession<'s, S, R, W> {
    store: &'s S,
    input: R,
    output: W,
}

impl<'s, S, R, W> ReviewSession<'s, S, R, W>
where
    S: StateStore<State = Progress>,
    R: BufRead,
    W: Write,
{
    pub fn new(store: &'s S, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Run a session over the due subset of `cards`.
    pub fn run<G: Rng + ?Sized>(
        &mut self,
        cards: &[Card],
        today: NaiveDate,
        rng: &mut G,
    ) -> Result<SessionSummary> {
        let mut progress = self.store.load()?;
        let due = due_cards(cards, &progress, today, rng);

        let mut summary = SessionSummary {
            due: due.len(),
            ..Default::default()
        };

        if due.is_empty() {
            writeln!(self.output, "All caught up! No cards due for review today.")?;
            return Ok(summary);
        }

        writeln!(self.output, "Session started: {} cards due.", due.len())?;
        tracing::info!(due = due.len(), "review session started");

        for (i, card) in due.iter().enumerate() {
            writeln!(self.output)?;
            writeln!(self.output, "--- Card {}/{} ---", i + 1, due.len())?;
            writeln!(self.output, "Context: {}", card.context)?;
            writeln!(self.output)?;
            writeln!(self.output, "Q: {}", card.question)?;
            writeln!(self.output)?;

            if let Prompt::Quit = self.prompt("Press [Enter] to show answer (q to quit)... ")? {
                summary.cancelled = true;
                break;
            }

            writeln!(self.output)?;
            writeln!(self.output, "A: {}", card.answer)?;
            writeln!(self.output)?;

            let Some(rating) = self.read_rating()? else {
                summary.cancelled = true;
                break;
            };

            let state = grade(progress.get(&card.id), rating.quality(), today);
            let interval = state.interval;
            progress.insert(card.id.clone(), state);
            self.store.save(&progress)?;
            summary.reviewed += 1;

            tracing::debug!(card = %card.id, ?rating, interval, "card graded");
            writeln!(self.output, "   [Next review in {interval} days]")?;
        }

        if summary.cancelled {
            writeln!(self.output)?;
            writeln!(
                self.output,
                "Session paused. {} reviewed, {} still due.",
                summary.reviewed,
                summary.remaining()
            )?;
        } else {
            writeln!(self.output)?;
            writeln!(self.output, "Session complete. {} cards reviewed.", summary.reviewed)?;
        }

        Ok(summary)
    }

    fn read_rating(&mut self) -> Result<Option<Rating>> {
        loop {
            let prompt = "Rating: [1] Again  [2] Hard  [3] Good  [4] Easy  (q to quit)\nSelect > ";
            match self.prompt(prompt)? {
                Prompt::Quit => return Ok(None),
                Prompt::Line(line) => match Rating::from_key(&line) {
                    Some(rating) => return Ok(Some(rating)),
                    None => writeln!(self.output, "Please enter 1, 2, 3 or 4.")?,
                },
            }
        }
    }

    /// Print `text` and block for one line. End of input counts as quitting.
    fn prompt(&mut self, text: &str) -> Result<Prompt> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Prompt::Quit);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(Prompt::Quit);
        }
        Ok(Prompt::Line(line.to_string()))
    }
}
