use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BatchStatus {
    Created,
    /// Open for players to join
    Running,
    Ended,
}

/// A cohort window players can be grouped into games during
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchModel {
    pub id: String,
    pub status: BatchStatus,
    /// Kept as the raw string it was created with; see [`parse_timestamp`]
    pub created_at: String,
    /// Games in the order they were attached
    pub game_ids: Vec<String>,
}

impl BatchModel {
    /// Creates a new batch stamped with the current time
    pub fn new() -> Self {
        Self::with_created_at(Utc::now().to_rfc3339())
    }

    pub fn with_created_at(created_at: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: BatchStatus::Created,
            created_at: created_at.into(),
            game_ids: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == BatchStatus::Running
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

impl Default for BatchModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the timestamp formats batches are created with
///
/// Accepts RFC 3339, RFC 2822, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC)
/// and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
