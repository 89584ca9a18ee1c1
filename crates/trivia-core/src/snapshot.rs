//! JSON form of the long-lived player state the caller persists.

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;
use crate::error::{CoreError, Result};
use crate::progress::UserProgress;
use crate::ritual::StreakState;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub version: u32,
    #[serde(default)]
    pub progress: UserProgress,
    #[serde(default)]
    pub streak: StreakState,
    /// Day the daily assignment was last opened.
    #[serde(default)]
    pub opened_on: Option<CalendarDay>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            progress: UserProgress::default(),
            streak: StreakState::default(),
            opened_on: None,
        }
    }
}

pub fn export_json(snapshot: &PlayerSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse a snapshot, rejecting versions newer than this build understands.
pub fn import_json(json: &str) -> Result<PlayerSnapshot> {
    let snapshot: PlayerSnapshot = serde_json::from_str(json)
        .map_err(|e| CoreError::InvalidData(format!("malformed snapshot: {e}")))?;
    if snapshot.version > CURRENT_VERSION {
        return Err(CoreError::InvalidData(format!(
            "snapshot version {} is newer than supported {CURRENT_VERSION}",
            snapshot.version
        )));
    }
    if snapshot.streak.longest_streak < snapshot.streak.current_streak {
        return Err(CoreError::InvalidData(format!(
            "longest streak {} below current streak {}",
            snapshot.streak.longest_streak, snapshot.streak.current_streak
        )));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_import() {
        let snapshot = PlayerSnapshot {
            progress: UserProgress::new(1234),
            streak: StreakState {
                current_streak: 3,
                longest_streak: 5,
                last_completion_date: CalendarDay::from_ymd(2024, 4, 2),
            },
            opened_on: CalendarDay::from_ymd(2024, 4, 2),
            ..PlayerSnapshot::default()
        };
        let json = export_json(&snapshot).unwrap();
        assert!(json.contains("\"2024-04-02\""));
        assert_eq!(import_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_missing_sections_default() {
        let snapshot = import_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(snapshot, PlayerSnapshot::default());
    }

    #[test]
    fn test_rejects_future_version() {
        assert!(import_json(r#"{"version": 99}"#).is_err());
    }

    #[test]
    fn test_rejects_broken_streak_invariant() {
        let json = r#"{"version": 1, "streak": {"current_streak": 4, "longest_streak": 2,
            "last_completion_date": null}}"#;
        assert!(import_json(json).is_err());
    }

    #[test]
    fn test_out_of_range_date_is_invalid_data() {
        let json = r#"{"version": 1, "streak": {"current_streak": 1, "longest_streak": 1,
            "last_completion_date": "99999999999999999-01-01"}}"#;
        let err = import_json(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidData(_)), "got {err:?}");
    }
}
