//! Scheduler configuration
//!
//! Defaults reproduce the reference timings. A JSON file may override any
//! subset of fields; missing fields keep their defaults.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Longest break a config may ask for (one day)
pub const MAX_BREAK_SECS: u64 = 86_400;

/// Longest feedback hold a config may ask for
pub const MAX_FEEDBACK_MILLIS: u64 = 60_000;

/// Configuration error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Session timing and batch parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Pending positive ratings that trigger a break + practice round
    pub batch_size: usize,
    /// Break after a full batch
    pub long_break_secs: u64,
    /// Break before the trailing, partial batch
    pub short_break_secs: u64,
    /// How long practice feedback stays on screen
    pub feedback_millis: u64,
    /// Wrong options offered in multiple choice
    pub distractor_count: usize,
    /// Language tag handed to the speech capability
    pub speech_lang: String,
    /// Study seconds accumulated before a time write is issued
    pub time_flush_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            long_break_secs: 300,
            short_break_secs: 10,
            feedback_millis: 1500,
            distractor_count: 3,
            speech_lang: "en-US".to_string(),
            time_flush_secs: 30,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<Self>(json)?.normalized())
    }

    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// A zero batch size would never trigger practice. Timings are capped
    /// so every deadline stays representable.
    pub fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self.time_flush_secs = self.time_flush_secs.max(1);
        self.long_break_secs = self.long_break_secs.min(MAX_BREAK_SECS);
        self.short_break_secs = self.short_break_secs.min(MAX_BREAK_SECS);
        self.feedback_millis = self.feedback_millis.min(MAX_FEEDBACK_MILLIS);
        self
    }

    // the caps apply here too, for configs built in code without normalized()
    pub fn long_break(&self) -> Duration {
        capped_seconds(self.long_break_secs)
    }

    pub fn short_break(&self) -> Duration {
        capped_seconds(self.short_break_secs)
    }

    pub fn feedback_hold(&self) -> Duration {
        let millis = self.feedback_millis.min(MAX_FEEDBACK_MILLIS);
        Duration::milliseconds(i64::try_from(millis).unwrap_or_default())
    }
}

fn capped_seconds(secs: u64) -> Duration {
    let secs = secs.min(MAX_BREAK_SECS);
    Duration::seconds(i64::try_from(secs).unwrap_or_default())
}
