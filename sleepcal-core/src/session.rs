//! Raw sleep session records as returned by the sleep tracker API.
//!
//! Every field is optional: the API omits fields it has no data for, and
//! sessions are validated one at a time by the event builder.

use serde::Deserialize;
use serde_json::Number;

/// One sleep session record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSession {
    pub id: Option<String>,
    pub bedtime_start: Option<String>,
    pub bedtime_end: Option<String>,

    // Durations in seconds (missing or null means 0)
    pub total_sleep_duration: Option<i64>,
    pub rem_sleep_duration: Option<i64>,
    pub light_sleep_duration: Option<i64>,
    pub deep_sleep_duration: Option<i64>,
    pub awake_time: Option<i64>,
    pub latency: Option<i64>,

    // Displayed as-is, so kept in their JSON number form
    pub efficiency: Option<Number>,
    pub lowest_heart_rate: Option<Number>,
    pub readiness: Option<Readiness>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Readiness {
    pub score: Option<Number>,
}

impl RawSession {
    /// Convert one JSON record into a session.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The session's own identifier, if it has a non-empty one
    pub fn stable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn readiness_score(&self) -> Option<&Number> {
        self.readiness.as_ref().and_then(|r| r.score.as_ref())
    }
}
