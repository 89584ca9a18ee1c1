//! Read-only question catalog: questions, discovery facts and weekly themes.
//!
//! The catalog is authored content handed to the engine by the caller. It is
//! validated once on construction and never mutated afterwards.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TIER, MIN_TIER};
use crate::error::{CoreError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    Africa,
    Antarctica,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Continent {
    pub const ALL: [Continent; 7] = [
        Continent::Africa,
        Continent::Antarctica,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Africa => "africa",
            Self::Antarctica => "antarctica",
            Self::Asia => "asia",
            Self::Europe => "europe",
            Self::NorthAmerica => "north_america",
            Self::Oceania => "oceania",
            Self::SouthAmerica => "south_america",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Continent {
    type Err = CoreError;

    /// Case-insensitive; accepts `-`, `_` or a space between words.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidCatalog(format!("unknown continent '{s}'")))
    }
}

/// Authored difficulty bucket, 1 (easiest) to 5 (hardest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DifficultyTier(u8);

impl DifficultyTier {
    pub const EASIEST: DifficultyTier = DifficultyTier(MIN_TIER);
    pub const HARDEST: DifficultyTier = DifficultyTier(MAX_TIER);

    pub fn new(tier: u8) -> Option<Self> {
        (MIN_TIER..=MAX_TIER).contains(&tier).then_some(Self(tier))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Absolute distance in tiers.
    pub fn distance(self, other: Self) -> u8 {
        self.0.abs_diff(other.0)
    }
}

impl TryFrom<u8> for DifficultyTier {
    type Error = CoreError;

    fn try_from(tier: u8) -> Result<Self> {
        Self::new(tier).ok_or_else(|| {
            CoreError::InvalidCatalog(format!("tier {tier} outside {MIN_TIER}..={MAX_TIER}"))
        })
    }
}

impl From<DifficultyTier> for u8 {
    fn from(tier: DifficultyTier) -> Self {
        tier.0
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of tiers a catalog actually contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBounds {
    pub min: DifficultyTier,
    pub max: DifficultyTier,
}

impl TierBounds {
    pub fn clamp(self, tier: DifficultyTier) -> DifficultyTier {
        tier.clamp(self.min, self.max)
    }

    pub fn contains(self, tier: DifficultyTier) -> bool {
        (self.min..=self.max).contains(&tier)
    }

    /// One step harder, or `None` at the ceiling.
    pub fn step_up(self, tier: DifficultyTier) -> Option<DifficultyTier> {
        (tier < self.max).then(|| DifficultyTier(tier.0 + 1))
    }

    /// One step easier, or `None` at the floor.
    pub fn step_down(self, tier: DifficultyTier) -> Option<DifficultyTier> {
        (tier > self.min).then(|| DifficultyTier(tier.0 - 1))
    }
}

impl Default for TierBounds {
    fn default() -> Self {
        Self {
            min: DifficultyTier::EASIEST,
            max: DifficultyTier::HARDEST,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub continent: Continent,
    pub category: String,
    pub difficulty: DifficultyTier,
    pub text: String,
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer.
    pub answer: usize,
}

impl Question {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }

    pub fn answer_text(&self) -> &str {
        &self.choices[self.answer]
    }
}

/// The "did you know" fact shown once per day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryFact {
    pub id: String,
    pub continent: Continent,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTheme {
    pub id: String,
    pub name: String,
    /// Category daily challenges favour while the theme is active.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize)]
struct RawCatalog {
    questions: Vec<Question>,
    #[serde(default)]
    facts: Vec<DiscoveryFact>,
    #[serde(default)]
    themes: Vec<WeeklyTheme>,
}

/// Validated, immutable content pool.
#[derive(Clone, Debug)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
    facts: Vec<DiscoveryFact>,
    themes: Vec<WeeklyTheme>,
    question_index: HashMap<String, usize>,
    bounds: TierBounds,
}

impl QuestionCatalog {
    pub fn new(
        questions: Vec<Question>,
        facts: Vec<DiscoveryFact>,
        themes: Vec<WeeklyTheme>,
    ) -> Result<Self> {
        if questions.is_empty() {
            return Err(CoreError::InvalidCatalog("catalog has no questions".to_string()));
        }
        if facts.is_empty() {
            return Err(CoreError::InvalidCatalog("catalog has no discovery facts".to_string()));
        }
        if themes.is_empty() {
            return Err(CoreError::InvalidCatalog("catalog has no weekly themes".to_string()));
        }

        let mut question_index = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            if q.choices.len() < 2 {
                return Err(CoreError::InvalidCatalog(format!(
                    "question '{}' needs at least 2 choices",
                    q.id
                )));
            }
            if q.answer >= q.choices.len() {
                return Err(CoreError::InvalidCatalog(format!(
                    "question '{}' answer index {} out of range",
                    q.id, q.answer
                )));
            }
            if question_index.insert(q.id.clone(), i).is_some() {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate question id '{}'",
                    q.id
                )));
            }
        }
        ensure_unique_ids("fact", facts.iter().map(|f| f.id.as_str()))?;
        ensure_unique_ids("theme", themes.iter().map(|t| t.id.as_str()))?;

        let min = questions.iter().map(|q| q.difficulty).min();
        let max = questions.iter().map(|q| q.difficulty).max();
        let bounds = match (min, max) {
            (Some(min), Some(max)) => TierBounds { min, max },
            _ => TierBounds::default(),
        };

        Ok(Self {
            questions,
            facts,
            themes,
            question_index,
            bounds,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::new(raw.questions, raw.facts, raw.themes)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn facts(&self) -> &[DiscoveryFact] {
        &self.facts
    }

    pub fn themes(&self) -> &[WeeklyTheme] {
        &self.themes
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.question_index.get(id).map(|&i| &self.questions[i])
    }

    pub fn fact(&self, id: &str) -> Option<&DiscoveryFact> {
        self.facts.iter().find(|f| f.id == id)
    }

    pub fn theme(&self, id: &str) -> Option<&WeeklyTheme> {
        self.themes.iter().find(|t| t.id == id)
    }

    /// Easiest and hardest tiers present in the catalog.
    pub fn tier_bounds(&self) -> TierBounds {
        self.bounds
    }

    /// Continents with at least one question.
    pub fn continents(&self) -> BTreeSet<Continent> {
        self.questions.iter().map(|q| q.continent).collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn ensure_unique_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::InvalidCatalog(format!("duplicate {kind} id '{id}'")));
        }
    }
    Ok(())
}
