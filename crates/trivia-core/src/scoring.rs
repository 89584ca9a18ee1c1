use serde::{Deserialize, Serialize};

use crate::catalog::DifficultyTier;

/// XP rewards for answers and daily completions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Correct answer pays this times the question's tier.
    pub xp_per_tier: u64,
    /// Extra XP for a correct answer at or under the fast-response threshold.
    pub speed_bonus: u64,
    /// Consolation XP for a wrong answer.
    pub miss_xp: u64,
    pub daily_bonus: u64,
    pub streak_bonus_per_day: u64,
    /// Streak days beyond this stop adding bonus XP.
    pub streak_bonus_cap: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            xp_per_tier: 10,
            speed_bonus: 5,
            miss_xp: 1,
            daily_bonus: 50,
            streak_bonus_per_day: 10,
            streak_bonus_cap: 7,
        }
    }
}

impl ScoringConfig {
    pub fn xp_for_answer(
        &self,
        tier: DifficultyTier,
        correct: bool,
        response_time_ms: u64,
        fast_response_ms: u64,
    ) -> u64 {
        if !correct {
            return self.miss_xp;
        }
        let base = self.xp_per_tier.saturating_mul(tier.get() as u64);
        if response_time_ms <= fast_response_ms {
            base.saturating_add(self.speed_bonus)
        } else {
            base
        }
    }

    /// Bonus for finishing the daily challenge with `streak` consecutive days.
    pub fn daily_completion_xp(&self, streak: u32) -> u64 {
        let days = streak.min(self.streak_bonus_cap) as u64;
        self.daily_bonus
            .saturating_add(self.streak_bonus_per_day.saturating_mul(days))
    }
}
