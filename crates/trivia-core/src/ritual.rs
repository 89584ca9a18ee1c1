//! Daily ritual: the date-derived challenge bundle and the streak state machine.
//!
//! Nothing here is stored by the engine. A day's assignment is recomputed from
//! the date and catalog on demand, and streak updates take a snapshot and
//! return a new one.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;
use crate::catalog::{Continent, Question, QuestionCatalog, WeeklyTheme};
use crate::constants::{CHALLENGE_SIZE, DAILY_SEED_SALT, THEME_EPOCH_DAYS, THEME_PERIOD_DAYS};
use crate::error::{CoreError, Result};

/// Everything the player sees for one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAssignment {
    pub date: CalendarDay,
    /// One question per continent, five distinct continents.
    pub challenge_question_ids: Vec<String>,
    pub discovery_fact_id: String,
    pub weekly_theme_id: String,
}

/// Weeks elapsed since the theme epoch (negative before it).
pub fn week_index(date: CalendarDay) -> i64 {
    date.days_since(CalendarDay::from_days(THEME_EPOCH_DAYS))
        .div_euclid(THEME_PERIOD_DAYS)
}

/// Theme active on `date`; rotates every seven days from the epoch.
pub fn theme_for_date(catalog: &QuestionCatalog, date: CalendarDay) -> &WeeklyTheme {
    let themes = catalog.themes();
    let idx = week_index(date).rem_euclid(themes.len() as i64) as usize;
    &themes[idx]
}

/// Build the day's assignment. Same catalog and date always give the same
/// result, so nothing needs to be cached for a resumed session.
pub fn assignment_for_date(
    catalog: &QuestionCatalog,
    date: CalendarDay,
) -> Result<DailyAssignment> {
    let theme = theme_for_date(catalog, date);
    let mut rng = ChaCha8Rng::seed_from_u64(date.days() as u64 ^ DAILY_SEED_SALT);

    let mut by_continent: BTreeMap<Continent, Vec<&Question>> = BTreeMap::new();
    for q in catalog.questions() {
        by_continent.entry(q.continent).or_default().push(q);
    }
    if by_continent.len() < CHALLENGE_SIZE {
        return Err(CoreError::NoQuestionsAvailable(format!(
            "daily challenge for {date} needs {CHALLENGE_SIZE} continents, catalog covers {}",
            by_continent.len()
        )));
    }

    let mut continents: Vec<Continent> = by_continent.keys().copied().collect();
    continents.shuffle(&mut rng);
    continents.truncate(CHALLENGE_SIZE);

    let mut challenge_question_ids = Vec::with_capacity(CHALLENGE_SIZE);
    for continent in continents {
        let pool = &by_continent[&continent];
        // prefer the theme's category when the continent has any
        let themed: Vec<&Question> = match &theme.category {
            Some(category) => pool
                .iter()
                .filter(|q| q.category.eq_ignore_ascii_case(category))
                .copied()
                .collect(),
            None => Vec::new(),
        };
        let candidates = if themed.is_empty() { pool } else { &themed };
        let question = candidates.choose(&mut rng).ok_or_else(|| {
            CoreError::NoQuestionsAvailable(format!("no questions for {continent} on {date}"))
        })?;
        challenge_question_ids.push(question.id.clone());
    }

    let fact = catalog
        .facts()
        .choose(&mut rng)
        .ok_or_else(|| CoreError::InvalidCatalog("catalog has no discovery facts".to_string()))?;

    Ok(DailyAssignment {
        date,
        challenge_question_ids,
        discovery_fact_id: fact.id.clone(),
        weekly_theme_id: theme.id.clone(),
    })
}

/// Consecutive-day completion record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completion_date: Option<CalendarDay>,
}

/// Apply a daily-challenge completion.
///
/// The day after the last completion extends the streak; the same day is a
/// no-op; any later day (or the first completion ever) starts over at 1.
/// A date before the last completion is rejected and must not be applied.
pub fn on_challenge_completed(
    state: &StreakState,
    completion_date: CalendarDay,
) -> Result<StreakState> {
    let current_streak = match state.last_completion_date {
        Some(last) if completion_date < last => {
            tracing::warn!(%last, attempted = %completion_date, "rejected out-of-order completion");
            return Err(CoreError::InvalidChronology {
                last,
                attempted: completion_date,
            });
        }
        Some(last) if last == completion_date => state.current_streak,
        Some(last) if last.succ() == completion_date => state.current_streak.saturating_add(1),
        _ => 1,
    };

    Ok(StreakState {
        current_streak,
        longest_streak: state.longest_streak.max(current_streak),
        last_completion_date: Some(completion_date),
    })
}

/// Where the player is in today's ritual. Derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyPhase {
    NeedsStart,
    InProgress,
    Completed,
}

impl DailyPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NeedsStart => "needs_start",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

pub fn daily_phase(
    streak: &StreakState,
    opened_on: Option<CalendarDay>,
    today: CalendarDay,
) -> DailyPhase {
    if streak.last_completion_date == Some(today) {
        DailyPhase::Completed
    } else if opened_on == Some(today) {
        DailyPhase::InProgress
    } else {
        DailyPhase::NeedsStart
    }
}

/// Whether the stored streak is still alive as of `today`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStanding {
    /// Completed today.
    Active,
    /// Completed yesterday; today's challenge keeps it going.
    AtRisk,
    /// No completion yesterday or today.
    Broken,
}

impl StreakStanding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::AtRisk => "at_risk",
            Self::Broken => "broken",
        }
    }
}

pub fn streak_standing(state: &StreakState, today: CalendarDay) -> StreakStanding {
    match state.last_completion_date {
        Some(last) if today.days_since(last) <= 0 => StreakStanding::Active,
        Some(last) if today.days_since(last) == 1 => StreakStanding::AtRisk,
        _ => StreakStanding::Broken,
    }
}

/// Streak to display: zero once broken, even though the stored counter is
/// only reset by the next completion.
pub fn visible_streak(state: &StreakState, today: CalendarDay) -> u32 {
    match streak_standing(state, today) {
        StreakStanding::Broken => 0,
        _ => state.current_streak,
    }
}
