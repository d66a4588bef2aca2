//! Property tests for the two schedulers.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use lifeos_core::garden::{GardenState, IntervalTable};
use lifeos_core::review::{grade, sm2, CardState, Quality, MIN_EASE_FACTOR};
use proptest::prelude::*;

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

proptest! {
    #[test]
    fn ease_factor_never_drops_below_floor(grades in prop::collection::vec(0u8..=5, 1..60)) {
        let mut state: Option<CardState> = None;
        let mut day = base_day();
        for q in grades {
            let next = grade(state.as_ref(), Quality::new(q).unwrap(), day);
            prop_assert!(next.ease_factor >= MIN_EASE_FACTOR);
            prop_assert!(next.interval >= 1);
            prop_assert_eq!(next.next_review, day + Days::new(u64::from(next.interval)));
            day = next.next_review;
            state = Some(next);
        }
    }

    #[test]
    fn fail_always_resets(reps in 0u32..50, ef in 1.3f64..3.5, interval in 1u32..400, q in 0u8..3) {
        let out = sm2(Quality::new(q).unwrap(), reps, ef, interval);
        prop_assert_eq!(out.repetitions, 0);
        prop_assert_eq!(out.interval, 1);
    }

    #[test]
    fn pass_interval_grows_after_bootstrap(reps in 2u32..50, ef in 1.3f64..3.5, interval in 1u32..400, q in 3u8..=5) {
        let out = sm2(Quality::new(q).unwrap(), reps, ef, interval);
        prop_assert_eq!(out.interval, (f64::from(interval) * ef).floor() as u32);
        prop_assert_eq!(out.repetitions, reps + 1);
    }

    #[test]
    fn garden_stage_interval_is_clamped(promotions in 1usize..40) {
        let table = IntervalTable::fibonacci();
        let mut state = GardenState::default();
        let mut last = None;
        for _ in 0..promotions {
            last = Some(state.promote("doc.md", base_day(), &table));
        }
        let (stage, interval, next) = last.unwrap();
        prop_assert_eq!(stage as usize, promotions);
        let expected = table.as_slice()[promotions.min(table.as_slice().len() - 1)];
        prop_assert_eq!(interval, expected);
        prop_assert_eq!(next, base_day() + Days::new(u64::from(expected)));
    }

    #[test]
    fn due_candidates_respect_cap(count in 0usize..30, cap in 0usize..10) {
        let mut state = GardenState::default();
        let present: BTreeSet<String> = (0..count).map(|i| format!("doc_{i:02}.md")).collect();
        state.rescan(&present, base_day());
        let picked = state.due_candidates(base_day(), cap);
        prop_assert_eq!(picked.len(), count.min(cap));
    }
}

#[test]
fn quality_above_five_is_rejected() {
    assert!(Quality::new(6).is_err());
}
