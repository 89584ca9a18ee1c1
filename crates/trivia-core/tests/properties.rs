//! Property tests for the engine's universal laws.

use std::sync::LazyLock;

use proptest::prelude::*;
use trivia_core::{
    Bounded, CalendarDay, DifficultyConfig, DifficultyState, DifficultyTier, LevelCurve, Outcome,
    StreakState, TierBounds, on_challenge_completed, record_outcome,
};

static CURVE: LazyLock<LevelCurve> = LazyLock::new(LevelCurve::default);

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    (any::<bool>(), 0u64..30_000, 1u8..=5).prop_map(|(correct, ms, tier)| Outcome {
        correct,
        response_time_ms: ms,
        tier: DifficultyTier::new(tier).unwrap(),
    })
}

proptest! {
    #[test]
    fn level_xp_roundtrip(level in 1u32..=1000) {
        let xp = CURVE.xp_for_level(level);
        prop_assert!(!xp.is_clamped());
        prop_assert_eq!(CURVE.level_for_xp(xp.value()), Bounded::Exact(level));
    }

    #[test]
    fn xp_for_level_strictly_increasing(level in 1u32..1000) {
        prop_assert!(CURVE.xp_for_level(level + 1).value() > CURVE.xp_for_level(level).value());
    }

    #[test]
    fn level_for_xp_non_decreasing(a in 0u64..20_000_000, b in 0u64..20_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(CURVE.level_for_xp(lo).value() <= CURVE.level_for_xp(hi).value());
    }

    #[test]
    fn milestone_law(level in 1u32..=1000) {
        let unlocks = CURVE.milestone_unlocks_for_level(level);
        prop_assert_eq!(!unlocks.is_empty(), level % 10 == 0);
        prop_assert_eq!(unlocks, CURVE.milestone_unlocks_for_level(level));
    }

    #[test]
    fn difficulty_moves_at_most_one_step(
        outcomes in prop::collection::vec(outcome_strategy(), 1..60),
        start in 1u8..=5,
        dwell in 1u32..5,
    ) {
        let config = DifficultyConfig { start_tier: start, dwell, ..DifficultyConfig::default() };
        let bounds = TierBounds::default();
        let mut state = DifficultyState::new(&config, bounds);
        for outcome in outcomes {
            let before = state.target();
            state = record_outcome(&state, outcome);
            let after = state.target();
            prop_assert!(before.distance(after) <= 1);
            prop_assert!(bounds.contains(after));
            prop_assert!(state.window().len() <= config.window_size);
        }
    }

    #[test]
    fn completion_idempotent_same_day(
        start in 18_000i64..21_000,
        gaps in prop::collection::vec(0i64..4, 1..20),
    ) {
        let mut state = StreakState::default();
        let mut d = start;
        for gap in gaps {
            d += gap;
            let date = CalendarDay::from_days(d);
            let once = on_challenge_completed(&state, date).unwrap();
            let twice = on_challenge_completed(&once, date).unwrap();
            prop_assert_eq!(once.current_streak, twice.current_streak);
            prop_assert!(once.longest_streak >= once.current_streak);
            state = once;
        }
    }

    #[test]
    fn gap_resets_but_keeps_longest(current in 1u32..50, extra in 0u32..50, gap in 2i64..30) {
        let last = CalendarDay::from_days(19_800);
        let state = StreakState {
            current_streak: current,
            longest_streak: current + extra,
            last_completion_date: Some(last),
        };
        let next = on_challenge_completed(&state, CalendarDay::from_days(19_800 + gap)).unwrap();
        prop_assert_eq!(next.current_streak, 1);
        prop_assert_eq!(next.longest_streak, current + extra);
    }
}
