//! Rating transition function
//!
//! The single authority for box, streak and next-review mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::interval_for;
use crate::model::{WordProgress, MAX_BOX};

/// User recall rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Forgot - back to box 0
    Again,
    /// Recalled - one box up
    Good,
    /// Recalled effortlessly - two boxes up
    Easy,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// Good and easy ratings are deferred into a practice batch
    pub fn is_positive(&self) -> bool {
        !matches!(self, Rating::Again)
    }

    /// How many boxes this rating promotes by (again handled separately)
    fn promotion(&self) -> u8 {
        match self {
            Rating::Again => 0,
            Rating::Good => 1,
            Rating::Easy => 2,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" | "a" | "1" => Ok(Rating::Again),
            "good" | "g" | "2" => Ok(Rating::Good),
            "easy" | "e" | "3" => Ok(Rating::Easy),
            _ => Err(format!("Unknown rating: {}", s)),
        }
    }
}

/// Apply a rating to a word's current state.
///
/// A word with no record starts from box 0, streak 0.
pub fn apply_rating(
    current: Option<&WordProgress>,
    rating: Rating,
    now: DateTime<Utc>,
) -> WordProgress {
    let (current_box, current_streak) = current.map_or((0, 0), |p| (p.box_level, p.streak));

    let (box_level, streak) = match rating {
        Rating::Again => (0, 0),
        Rating::Good | Rating::Easy => (
            current_box.saturating_add(rating.promotion()).min(MAX_BOX),
            current_streak.saturating_add(1),
        ),
    };

    WordProgress {
        box_level,
        next_review_at: now + interval_for(box_level),
        last_review_at: now,
        streak,
    }
}
