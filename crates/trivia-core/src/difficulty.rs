//! Adaptive difficulty: keep the player in the flow zone.
//!
//! Every answer lands in a bounded sliding window. Accuracy and speed are the
//! window means, so one lucky or unlucky answer cannot swing the target on its
//! own. The target tier moves at most one step per outcome, and only after
//! `dwell` outcomes have been seen since the previous move.

use std::collections::{HashSet, VecDeque};

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Continent, DifficultyTier, Question, QuestionCatalog, TierBounds};
use crate::constants::{MAX_TIER, MIN_TIER};
use crate::error::{CoreError, Result};
use crate::scoring::ScoringConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Outcomes kept in the sliding window.
    pub window_size: usize,
    /// Window accuracy above this (with fast answers) raises the tier.
    pub too_easy_accuracy: f64,
    /// Window accuracy below this lowers the tier.
    pub too_hard_accuracy: f64,
    /// Mean response time at or under this counts as fast.
    pub fast_response_ms: u64,
    /// Outcomes required since the last tier change before another.
    pub dwell: u32,
    pub start_tier: u8,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            too_easy_accuracy: 0.8,
            too_hard_accuracy: 0.4,
            fast_response_ms: 8_000,
            dwell: 4,
            start_tier: 2,
        }
    }
}

impl DifficultyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(CoreError::InvalidConfig("window_size must be at least 1".to_string()));
        }
        if self.dwell == 0 {
            return Err(CoreError::InvalidConfig("dwell must be at least 1".to_string()));
        }
        let thresholds_ok = (0.0..=1.0).contains(&self.too_hard_accuracy)
            && (0.0..=1.0).contains(&self.too_easy_accuracy)
            && self.too_hard_accuracy < self.too_easy_accuracy;
        if !thresholds_ok {
            return Err(CoreError::InvalidConfig(format!(
                "need 0 <= too_hard_accuracy ({}) < too_easy_accuracy ({}) <= 1",
                self.too_hard_accuracy, self.too_easy_accuracy
            )));
        }
        if DifficultyTier::new(self.start_tier).is_none() {
            return Err(CoreError::InvalidConfig(format!(
                "start_tier {} outside {MIN_TIER}..={MAX_TIER}",
                self.start_tier
            )));
        }
        Ok(())
    }
}

/// One answered question.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub correct: bool,
    pub response_time_ms: u64,
    pub tier: DifficultyTier,
}

/// Most recent outcomes, oldest first, never longer than its capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceWindow {
    capacity: usize,
    outcomes: VecDeque<Outcome>,
}

impl PerformanceWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity),
        }
    }

    /// Append, evicting the oldest outcome when full.
    pub fn push(&mut self, outcome: Outcome) {
        while self.outcomes.len() >= self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    /// Fraction correct, or `None` when empty.
    pub fn accuracy(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            return None;
        }
        let correct = self.outcomes.iter().filter(|o| o.correct).count();
        Some(correct as f64 / self.outcomes.len() as f64)
    }

    /// Mean response time, or `None` when empty.
    pub fn mean_response_ms(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            return None;
        }
        let total: u64 = self.outcomes.iter().map(|o| o.response_time_ms).sum();
        Some(total as f64 / self.outcomes.len() as f64)
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}

/// What a single `record` did to the target tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Raised,
    Lowered,
    Held,
}

/// Per-session difficulty state. Lives only in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyState {
    target: DifficultyTier,
    bounds: TierBounds,
    window: PerformanceWindow,
    smoothed_accuracy: f64,
    smoothed_speed_ms: f64,
    since_change: u32,
    config: DifficultyConfig,
}

impl DifficultyState {
    /// Start a session at the configured tier, clamped into `bounds`.
    pub fn new(config: &DifficultyConfig, bounds: TierBounds) -> Self {
        let start = DifficultyTier::new(config.start_tier).unwrap_or(DifficultyTier::EASIEST);
        Self {
            target: bounds.clamp(start),
            bounds,
            window: PerformanceWindow::new(config.window_size),
            // neutral priors until the first outcome arrives
            smoothed_accuracy: 0.5,
            smoothed_speed_ms: config.fast_response_ms as f64,
            since_change: 0,
            config: config.clone(),
        }
    }

    pub fn target(&self) -> DifficultyTier {
        self.target
    }

    pub fn bounds(&self) -> TierBounds {
        self.bounds
    }

    pub fn window(&self) -> &PerformanceWindow {
        &self.window
    }

    pub fn smoothed_accuracy(&self) -> f64 {
        self.smoothed_accuracy
    }

    pub fn smoothed_speed_ms(&self) -> f64 {
        self.smoothed_speed_ms
    }

    /// Record an outcome in place and step the target tier if warranted.
    pub fn record(&mut self, outcome: Outcome) -> Adjustment {
        self.window.push(outcome);
        self.smoothed_accuracy = self.window.accuracy().unwrap_or(self.smoothed_accuracy);
        self.smoothed_speed_ms = self.window.mean_response_ms().unwrap_or(self.smoothed_speed_ms);
        self.since_change = self.since_change.saturating_add(1);

        if self.since_change < self.config.dwell {
            return Adjustment::Held;
        }

        let fast = self.smoothed_speed_ms <= self.config.fast_response_ms as f64;
        let (next, adjustment) = if self.smoothed_accuracy > self.config.too_easy_accuracy && fast {
            (self.bounds.step_up(self.target), Adjustment::Raised)
        } else if self.smoothed_accuracy < self.config.too_hard_accuracy {
            (self.bounds.step_down(self.target), Adjustment::Lowered)
        } else {
            (None, Adjustment::Held)
        };

        // at the floor or ceiling a step is a no-op
        let Some(next) = next else {
            return Adjustment::Held;
        };

        tracing::debug!(
            from = self.target.get(),
            to = next.get(),
            accuracy = self.smoothed_accuracy,
            speed_ms = self.smoothed_speed_ms,
            "difficulty target changed"
        );
        self.target = next;
        self.since_change = 0;
        adjustment
    }

    /// Drop the window and priors, keeping the current target.
    pub fn reset_window(&mut self) {
        self.window.clear();
        self.smoothed_accuracy = 0.5;
        self.smoothed_speed_ms = self.config.fast_response_ms as f64;
        self.since_change = 0;
    }
}

/// Snapshot-in, snapshot-out form of [`DifficultyState::record`].
pub fn record_outcome(state: &DifficultyState, outcome: Outcome) -> DifficultyState {
    let mut next = state.clone();
    next.record(outcome);
    next
}

/// The tier the next question should be drawn from.
pub fn next_difficulty_tier(state: &DifficultyState) -> DifficultyTier {
    state.target
}

/// Filters applied when drawing a question.
#[derive(Clone, Copy, Debug)]
pub struct SelectionConstraints<'a> {
    pub continent: Option<Continent>,
    pub category: Option<&'a str>,
    pub seen: &'a HashSet<String>,
}

impl<'a> SelectionConstraints<'a> {
    pub fn new(seen: &'a HashSet<String>) -> Self {
        Self {
            continent: None,
            category: None,
            seen,
        }
    }

    pub fn continent(mut self, continent: Option<Continent>) -> Self {
        self.continent = continent;
        self
    }

    pub fn category(mut self, category: Option<&'a str>) -> Self {
        self.category = category;
        self
    }

    fn admits(&self, q: &Question) -> bool {
        self.continent.is_none_or(|c| q.continent == c)
            && self.category.is_none_or(|c| q.category.eq_ignore_ascii_case(c))
            && !self.seen.contains(&q.id)
    }

    fn describe(&self) -> String {
        format!(
            "continent={}, category={}, {} already seen",
            self.continent.map_or("any".to_string(), |c| c.to_string()),
            self.category.unwrap_or("any"),
            self.seen.len()
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Selection<'c> {
    pub question: &'c Question,
    /// True when the target tier had nothing left and a neighbour was used.
    pub fallback: bool,
}

/// Tiers ordered by distance from `target`; on a tie the easier one first.
fn tiers_by_distance(target: DifficultyTier) -> Vec<DifficultyTier> {
    let mut tiers: Vec<DifficultyTier> = (MIN_TIER..=MAX_TIER)
        .filter_map(DifficultyTier::new)
        .collect();
    tiers.sort_by_key(|t| (t.distance(target), t.get()));
    tiers
}

/// Draw one unseen question at the target tier, falling back to the nearest
/// tier that still has candidates. Deterministic for a given `seed` on every
/// platform.
pub fn select_question<'c>(
    state: &DifficultyState,
    catalog: &'c QuestionCatalog,
    constraints: &SelectionConstraints<'_>,
    seed: u64,
) -> Result<Selection<'c>> {
    let target = state.target;
    for tier in tiers_by_distance(target) {
        let pool: Vec<&Question> = catalog
            .questions()
            .iter()
            .filter(|q| q.difficulty == tier && constraints.admits(q))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        if let Some(&question) = pool.choose(&mut rng) {
            let fallback = tier != target;
            if fallback {
                tracing::debug!(wanted = target.get(), served = tier.get(), "tier fallback");
            }
            return Ok(Selection { question, fallback });
        }
    }
    Err(CoreError::NoQuestionsAvailable(constraints.describe()))
}

/// Result of grading one answer inside a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnswerResult {
    pub correct: bool,
    pub xp: u64,
    pub adjustment: Adjustment,
    pub next_tier: DifficultyTier,
}

/// One play session: difficulty state, questions already served and XP earned.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    pub state: DifficultyState,
    pub seen: HashSet<String>,
    pub answered: u32,
    pub correct: u32,
    pub xp_earned: u64,
    seed: u64,
    draws: u64,
}

impl Session {
    pub fn new(config: &DifficultyConfig, catalog: &QuestionCatalog, seed: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: DifficultyState::new(config, catalog.tier_bounds()),
            seen: HashSet::new(),
            answered: 0,
            correct: 0,
            xp_earned: 0,
            seed,
            draws: 0,
        }
    }

    /// Draw the next question and mark it seen.
    pub fn next_question<'c>(
        &mut self,
        catalog: &'c QuestionCatalog,
        continent: Option<Continent>,
        category: Option<&str>,
    ) -> Result<Selection<'c>> {
        let constraints = SelectionConstraints::new(&self.seen)
            .continent(continent)
            .category(category);
        let selection = select_question(
            &self.state,
            catalog,
            &constraints,
            self.seed.wrapping_add(self.draws),
        )?;
        self.draws += 1;
        self.seen.insert(selection.question.id.clone());
        Ok(selection)
    }

    /// Grade `choice`, feed the outcome to the engine and tally XP.
    pub fn answer(
        &mut self,
        question: &Question,
        choice: usize,
        response_time_ms: u64,
        scoring: &ScoringConfig,
    ) -> AnswerResult {
        let correct = question.is_correct(choice);
        let adjustment = self.state.record(Outcome {
            correct,
            response_time_ms,
            tier: question.difficulty,
        });
        let xp = scoring.xp_for_answer(
            question.difficulty,
            correct,
            response_time_ms,
            self.state.config.fast_response_ms,
        );

        self.answered += 1;
        if correct {
            self.correct += 1;
        }
        self.xp_earned = self.xp_earned.saturating_add(xp);

        AnswerResult {
            correct,
            xp,
            adjustment,
            next_tier: self.state.target,
        }
    }
}
