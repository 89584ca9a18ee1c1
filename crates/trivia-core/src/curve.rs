//! Level curve: cumulative XP ↔ level across three progression regimes.
//!
//! Each regime prices the XP needed to advance *out of* every level in its
//! band. The default curve is a fast hook-in (flat cost), a steady climb
//! (linear cost) and a prestige band (geometric cost). The cumulative table is
//! built once, so both directions are exact and `level_for_xp` is a binary
//! search over the same numbers `xp_for_level` returns.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_LEVEL, MILESTONE_INTERVAL, MIN_LEVEL};
use crate::error::{Bounded, CoreError, Result};

/// Per-level XP cost formula. `offset` is the level's distance from the
/// start of its regime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Increment {
    Constant { xp: u64 },
    Linear { base: u64, step: u64 },
    Geometric { base: u64, ratio: f64 },
}

impl Increment {
    pub fn xp_at(&self, offset: u32) -> u64 {
        match *self {
            Self::Constant { xp } => xp,
            Self::Linear { base, step } => base.saturating_add(step.saturating_mul(offset as u64)),
            Self::Geometric { base, ratio } => {
                let xp = base as f64 * ratio.powi(offset as i32);
                if xp >= u64::MAX as f64 {
                    u64::MAX
                } else {
                    xp.round() as u64
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = match *self {
            Self::Constant { xp } => xp >= 1,
            Self::Linear { base, .. } => base >= 1,
            Self::Geometric { base, ratio } => base >= 1 && ratio.is_finite() && ratio >= 1.0,
        };
        if ok {
            Ok(())
        } else {
            Err(CoreError::InvalidConfig(format!(
                "increment {self:?} must cost at least 1 XP and never shrink"
            )))
        }
    }
}

/// A contiguous band of levels sharing one increment formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub start: u32,
    pub end: u32,
    pub increment: Increment,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub max_level: u32,
    pub regimes: Vec<Regime>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            regimes: vec![
                // hook-in: 100 XP per level
                Regime {
                    start: 1,
                    end: 20,
                    increment: Increment::Constant { xp: 100 },
                },
                // steady climb: 150, 160, 170, ...
                Regime {
                    start: 21,
                    end: 200,
                    increment: Increment::Linear { base: 150, step: 10 },
                },
                // prestige: 2000 XP growing 0.4% per level
                Regime {
                    start: 201,
                    end: MAX_LEVEL,
                    increment: Increment::Geometric {
                        base: 2000,
                        ratio: 1.004,
                    },
                },
            ],
        }
    }
}

impl CurveConfig {
    /// Regimes must tile `1..=max_level` in order with no gaps or overlaps.
    pub fn validate(&self) -> Result<()> {
        if self.max_level < 2 {
            return Err(CoreError::InvalidConfig(
                "max_level must be at least 2".to_string(),
            ));
        }
        let mut expected_start = MIN_LEVEL;
        for regime in &self.regimes {
            if regime.start != expected_start || regime.end < regime.start {
                return Err(CoreError::InvalidConfig(format!(
                    "regime {}..={} does not continue from level {expected_start}",
                    regime.start, regime.end
                )));
            }
            regime.increment.validate()?;
            expected_start = regime.end + 1;
        }
        if expected_start != self.max_level + 1 {
            return Err(CoreError::InvalidConfig(format!(
                "regimes end at level {} but max_level is {}",
                expected_start.saturating_sub(1),
                self.max_level
            )));
        }
        Ok(())
    }
}

/// Named progression tiers. Bands are contiguous and cover every level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Novice,
    Explorer,
    Scholar,
    Master,
    Legend,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Novice,
        Tier::Explorer,
        Tier::Scholar,
        Tier::Master,
        Tier::Legend,
    ];

    /// First level of this tier.
    pub fn first_level(self) -> u32 {
        match self {
            Self::Novice => 1,
            Self::Explorer => 10,
            Self::Scholar => 50,
            Self::Master => 200,
            Self::Legend => 500,
        }
    }

    pub fn for_level(level: u32) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|t| level >= t.first_level())
            .unwrap_or(Self::Novice)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Explorer => "explorer",
            Self::Scholar => "scholar",
            Self::Master => "master",
            Self::Legend => "legend",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Novice => "Curious Novice",
            Self::Explorer => "World Explorer",
            Self::Scholar => "Globe Scholar",
            Self::Master => "Trivia Master",
            Self::Legend => "Living Legend",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Self::Novice => "🌱",
            Self::Explorer => "🧭",
            Self::Scholar => "📚",
            Self::Master => "🏆",
            Self::Legend => "👑",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content unlocked on reaching a milestone level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "n", rename_all = "snake_case")]
pub enum Unlock {
    /// Extra question pack, every milestone.
    BonusPack(u32),
    /// Collectible artifact, numbered by milestone ordinal.
    Artifact(u32),
    /// Profile frame, every 50 levels.
    ProfileFrame(u32),
    /// Prestige title, every 100 levels.
    PrestigeTitle(u32),
}

impl fmt::Display for Unlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BonusPack(n) => write!(f, "bonus-pack-{n}"),
            Self::Artifact(n) => write!(f, "artifact-{n}"),
            Self::ProfileFrame(n) => write!(f, "profile-frame-{n}"),
            Self::PrestigeTitle(n) => write!(f, "prestige-title-{n}"),
        }
    }
}

/// Stateless XP ↔ level mapping with a precomputed cumulative table.
#[derive(Clone, Debug)]
pub struct LevelCurve {
    max_level: u32,
    regimes: Vec<Regime>,
    /// cumulative[i] = total XP required to reach level i + 1.
    cumulative: Vec<u64>,
}

impl LevelCurve {
    pub fn new(config: &CurveConfig) -> Result<Self> {
        config.validate()?;

        let mut cumulative = Vec::with_capacity(config.max_level as usize);
        cumulative.push(0u64);
        let mut total = 0u64;
        for level in MIN_LEVEL..config.max_level {
            let regime = regime_for(&config.regimes, level);
            let cost = regime.increment.xp_at(level - regime.start);
            total = total.checked_add(cost).ok_or_else(|| {
                CoreError::InvalidConfig(format!("cumulative XP overflows at level {level}"))
            })?;
            cumulative.push(total);
        }

        Ok(Self {
            max_level: config.max_level,
            regimes: config.regimes.clone(),
            cumulative,
        })
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Total XP needed to reach the top level.
    pub fn max_xp(&self) -> u64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Highest level whose cumulative requirement is ≤ `xp`.
    pub fn level_for_xp(&self, xp: u64) -> Bounded<u32> {
        if xp > self.max_xp() {
            return Bounded::RangeClamped(self.max_level);
        }
        let level = self.cumulative.partition_point(|&need| need <= xp) as u32;
        Bounded::Exact(level)
    }

    /// Cumulative XP required to reach `level` from level 1.
    pub fn xp_for_level(&self, level: u32) -> Bounded<u64> {
        match self.clamp_level(level) {
            Bounded::Exact(l) => Bounded::Exact(self.cumulative[(l - 1) as usize]),
            Bounded::RangeClamped(l) => Bounded::RangeClamped(self.cumulative[(l - 1) as usize]),
        }
    }

    /// XP needed to advance from `level` to `level + 1`; zero at the top level.
    pub fn increment_for_level(&self, level: u32) -> u64 {
        let level = self.clamp_level(level).value();
        if level >= self.max_level {
            return 0;
        }
        let regime = regime_for(&self.regimes, level);
        regime.increment.xp_at(level - regime.start)
    }

    pub fn tier_for_level(&self, level: u32) -> Bounded<Tier> {
        match self.clamp_level(level) {
            Bounded::Exact(l) => Bounded::Exact(Tier::for_level(l)),
            Bounded::RangeClamped(l) => Bounded::RangeClamped(Tier::for_level(l)),
        }
    }

    /// Unlocks granted on reaching `level`. Non-empty exactly on milestone
    /// levels inside the curve; empty for anything out of range.
    pub fn milestone_unlocks_for_level(&self, level: u32) -> BTreeSet<Unlock> {
        let mut unlocks = BTreeSet::new();
        if !(MIN_LEVEL..=self.max_level).contains(&level) || level % MILESTONE_INTERVAL != 0 {
            return unlocks;
        }
        unlocks.insert(Unlock::BonusPack(level));
        unlocks.insert(Unlock::Artifact(level / MILESTONE_INTERVAL));
        if level % 50 == 0 {
            unlocks.insert(Unlock::ProfileFrame(level));
        }
        if level % 100 == 0 {
            unlocks.insert(Unlock::PrestigeTitle(level));
        }
        unlocks
    }

    fn clamp_level(&self, level: u32) -> Bounded<u32> {
        if level < MIN_LEVEL {
            Bounded::RangeClamped(MIN_LEVEL)
        } else if level > self.max_level {
            Bounded::RangeClamped(self.max_level)
        } else {
            Bounded::Exact(level)
        }
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::new(&CurveConfig::default()).expect("default curve config is valid")
    }
}

fn regime_for(regimes: &[Regime], level: u32) -> &Regime {
    regimes
        .iter()
        .find(|r| (r.start..=r.end).contains(&level))
        .unwrap_or(&regimes[regimes.len() - 1])
}
