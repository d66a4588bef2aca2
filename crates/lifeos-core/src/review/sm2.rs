//! SM-2 spaced repetition algorithm.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! The operator only ever sees four ratings (see [`Rating`]), so qualities
//! 1 and 2 are reachable through the library API alone.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor of a card that has never been graded
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// A validated SM-2 quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const FAIL: Quality = Quality(0);
    pub const HARD: Quality = Quality(3);
    pub const GOOD: Quality = Quality(4);
    pub const EASY: Quality = Quality(5);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value <= 5 {
            Ok(Quality(value))
        } else {
            Err(ValidationError::QualityOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

/// The four coarse grades offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub fn quality(self) -> Quality {
        match self {
            Rating::Again => Quality::FAIL,
            Rating::Hard => Quality::HARD,
            Rating::Good => Quality::GOOD,
            Rating::Easy => Quality::EASY,
        }
    }

    /// Parse the session prompt's `1`-`4` keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "1" => Some(Rating::Again),
            "2" => Some(Rating::Hard),
            "3" => Some(Rating::Good),
            "4" => Some(Rating::Easy),
            _ => None,
        }
    }
}

/// Persisted scheduling state of one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub repetitions: u32,
    pub ease_factor: f64,
    pub interval: u32,
    pub next_review: NaiveDate,
    #[serde(default)]
    pub last_review: Option<NaiveDate>,
}

impl CardState {
    /// State assumed for a card with no history.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            repetitions: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            next_review: today,
            last_review: None,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }
}

/// Output of one SM-2 step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Outcome {
    pub repetitions: u32,
    pub ease_factor: f64,
    pub interval: u32,
}

/// One SM-2 transition.
///
/// On a pass the interval goes 1, 6, then `floor(interval * ease_factor)`
/// using the ease factor from before this grade. A fail resets repetitions
/// to 0 and the interval to 1. The ease factor is updated on every grade
/// and never drops below [`MIN_EASE_FACTOR`].
pub fn sm2(quality: Quality, repetitions: u32, ease_factor: f64, interval: u32) -> Sm2Outcome {
    let (repetitions, interval) = if quality.is_pass() {
        let interval = match repetitions {
            0 => 1,
            1 => 6,
            _ => (f64::from(interval) * ease_factor).floor() as u32,
        };
        (repetitions + 1, interval)
    } else {
        (0, 1)
    };

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = 5.0 - f64::from(quality.value());
    let ease_factor = (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

    Sm2Outcome {
        repetitions,
        ease_factor,
        interval,
    }
}

/// Grade a card and date the result.
///
/// `previous` is `None` for a card that has never been graded.
pub fn grade(previous: Option<&CardState>, quality: Quality, today: NaiveDate) -> CardState {
    let fresh;
    let state = match previous {
        Some(state) => state,
        None => {
            fresh = CardState::new(today);
            &fresh
        }
    };

    let outcome = sm2(quality, state.repetitions, state.ease_factor, state.interval);
    let next_review = today
        .checked_add_days(Days::new(u64::from(outcome.interval)))
        .unwrap_or(NaiveDate::MAX);

    CardState {
        repetitions: outcome.repetitions,
        ease_factor: outcome.ease_factor,
        interval: outcome.interval,
        next_review,
        last_review: Some(today),
    }
}
