use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::curve::{LevelCurve, Tier, Unlock};

/// Cumulative XP. Level, tier, title and badge are all derived from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub xp: u64,
}

/// Everything a profile or progress screen renders for a player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelView {
    pub level: u32,
    pub tier: Tier,
    pub title: &'static str,
    pub badge: &'static str,
    pub xp: u64,
    pub xp_into_level: u64,
    pub xp_to_next: u64,
    /// Fraction of the current level completed, 1.0 at the top level.
    pub progress: f64,
    /// XP is at or past the top of the curve.
    pub capped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub level: u32,
    pub unlocks: BTreeSet<Unlock>,
}

/// What an XP award changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub previous_level: u32,
    pub level: u32,
    pub xp_gained: u64,
    /// Milestones crossed by this award, lowest first.
    pub milestones: Vec<Milestone>,
}

impl ProgressUpdate {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

impl UserProgress {
    pub fn new(xp: u64) -> Self {
        Self { xp }
    }

    pub fn level(&self, curve: &LevelCurve) -> u32 {
        curve.level_for_xp(self.xp).value()
    }

    pub fn view(&self, curve: &LevelCurve) -> LevelView {
        let level = curve.level_for_xp(self.xp);
        let l = level.value();
        let tier = curve.tier_for_level(l).value();
        let floor = curve.xp_for_level(l).value();
        let span = curve.increment_for_level(l);
        let xp_into_level = self.xp.saturating_sub(floor);
        let (xp_to_next, progress) = if span == 0 {
            (0, 1.0)
        } else {
            (
                span.saturating_sub(xp_into_level),
                xp_into_level as f64 / span as f64,
            )
        };

        LevelView {
            level: l,
            tier,
            title: tier.title(),
            badge: tier.badge(),
            xp: self.xp,
            xp_into_level,
            xp_to_next,
            progress,
            capped: level.is_clamped() || l == curve.max_level(),
        }
    }

    /// Add XP (saturating, never decreasing) and report level changes.
    pub fn award(&self, curve: &LevelCurve, amount: u64) -> (UserProgress, ProgressUpdate) {
        let previous_level = self.level(curve);
        let next = UserProgress {
            xp: self.xp.saturating_add(amount),
        };
        let level = next.level(curve);
        let milestones = (previous_level + 1..=level)
            .filter_map(|l| {
                let unlocks = curve.milestone_unlocks_for_level(l);
                (!unlocks.is_empty()).then_some(Milestone { level: l, unlocks })
            })
            .collect();

        if level > previous_level {
            tracing::debug!(previous_level, level, xp = next.xp, "level up");
        }

        (
            next,
            ProgressUpdate {
                previous_level,
                level,
                xp_gained: next.xp - self.xp,
                milestones,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> LevelCurve {
        LevelCurve::default()
    }

    #[test]
    fn test_fresh_player_view() {
        let view = UserProgress::default().view(&curve());
        assert_eq!(view.level, 1);
        assert_eq!(view.tier, Tier::Novice);
        assert_eq!(view.xp_to_next, 100);
        assert_eq!(view.progress, 0.0);
        assert!(!view.capped);
    }

    #[test]
    fn test_mid_level_view() {
        let view = UserProgress::new(2_075).view(&curve());
        assert_eq!(view.level, 21);
        assert_eq!(view.tier, Tier::Explorer);
        assert_eq!(view.xp_into_level, 75);
        assert_eq!(view.xp_to_next, 75);
        assert!((view.progress - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_capped_view() {
        let c = curve();
        let view = UserProgress::new(c.max_xp() + 10).view(&c);
        assert_eq!(view.level, 1000);
        assert!(view.capped);
        assert_eq!(view.xp_to_next, 0);
        assert_eq!(view.title, "Living Legend");
    }

    #[test]
    fn test_award_crosses_milestone() {
        let c = curve();
        let start = UserProgress::new(c.xp_for_level(9).value());
        let (next, update) = start.award(&c, 250);
        assert_eq!(update.previous_level, 9);
        assert_eq!(update.level, 11);
        assert!(update.leveled_up());
        assert_eq!(update.milestones.len(), 1);
        assert_eq!(update.milestones[0].level, 10);
        assert_eq!(next.xp, start.xp + 250);
    }

    #[test]
    fn test_award_without_level_change() {
        let (_, update) = UserProgress::default().award(&curve(), 10);
        assert!(!update.leveled_up());
        assert!(update.milestones.is_empty());
    }

    #[test]
    fn test_award_saturates() {
        let (next, update) = UserProgress::new(u64::MAX - 1).award(&curve(), 10);
        assert_eq!(next.xp, u64::MAX);
        assert_eq!(update.xp_gained, 1);
    }
}
