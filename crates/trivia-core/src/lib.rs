//! Trivia game engine.
//!
//! Three cooperating pieces decide what the player sees next: a level curve
//! mapping XP to levels 1..=1000, an adaptive difficulty engine that keeps
//! questions in the flow zone, and a daily ritual that derives each day's
//! challenge from the date and tracks the completion streak.
//!
//! Zero I/O: every operation takes a snapshot and returns a value or a new
//! snapshot. Persistence and rendering belong to the caller.

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod curve;
pub mod difficulty;
pub mod error;
pub mod progress;
pub mod ritual;
pub mod scoring;
pub mod snapshot;

pub use calendar::{CalendarDay, today_utc};
pub use catalog::{
    Continent, DifficultyTier, DiscoveryFact, Question, QuestionCatalog, TierBounds, WeeklyTheme,
};
pub use config::EngineConfig;
pub use constants::{CHALLENGE_SIZE, MAX_LEVEL, MILESTONE_INTERVAL, MIN_LEVEL};
pub use curve::{CurveConfig, Increment, LevelCurve, Regime, Tier, Unlock};
pub use difficulty::{
    Adjustment, AnswerResult, DifficultyConfig, DifficultyState, Outcome, PerformanceWindow,
    Selection, SelectionConstraints, Session, next_difficulty_tier, record_outcome,
    select_question,
};
pub use error::{Bounded, CoreError, Result};
pub use progress::{LevelView, Milestone, ProgressUpdate, UserProgress};
pub use ritual::{
    DailyAssignment, DailyPhase, StreakStanding, StreakState, assignment_for_date, daily_phase,
    on_challenge_completed, streak_standing, theme_for_date, visible_streak,
};
pub use scoring::ScoringConfig;
pub use snapshot::{CURRENT_VERSION, PlayerSnapshot, export_json, import_json};
