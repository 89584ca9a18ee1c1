use thiserror::Error;

use crate::calendar::CalendarDay;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The catalog cannot satisfy a selection request even after fallback.
    #[error("no questions available: {0}")]
    NoQuestionsAvailable(String),

    /// A streak update would move backwards in time.
    #[error("completion on {attempted} precedes last completion on {last}")]
    InvalidChronology {
        last: CalendarDay,
        attempted: CalendarDay,
    },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// A value produced from an input that may have been outside its domain.
///
/// `RangeClamped` is informational, not a failure: the value is the nearest
/// boundary and the caller can render it as "capped".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bounded<T> {
    Exact(T),
    RangeClamped(T),
}

impl<T: Copy> Bounded<T> {
    pub fn value(self) -> T {
        match self {
            Self::Exact(v) | Self::RangeClamped(v) => v,
        }
    }

    pub fn is_clamped(self) -> bool {
        matches!(self, Self::RangeClamped(_))
    }
}
