use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Time windows offered by the log viewer, in hours.
pub const LOG_WINDOWS: [u32; 5] = [1, 6, 24, 72, 168];

pub const DEFAULT_LOG_HOURS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

/// One entry of the backend's audit trail. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub action: String,
    #[serde(default)]
    pub instance_name: Option<String>,
    pub status: LogStatus,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActionLogEntry {
    pub fn is_success(&self) -> bool {
        self.status == LogStatus::Success
    }

    /// `create_instance` -> `create instance`.
    pub fn action_label(&self) -> String {
        self.action.replace('_', " ")
    }
}

/// The backend emits `isoformat()` without an offset; those are UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCount {
    pub action: String,
    pub count: u64,
}

/// Aggregate counts from `GET /api/logs/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogStats {
    pub total: u64,
    pub success: u64,
    pub errors: u64,
    #[serde(default)]
    pub by_type: Vec<ActionCount>,
}

impl LogStats {
    /// Share of successful actions as a rounded percentage; 0 with no actions.
    pub fn success_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.success as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Filters for `GET /api/logs`. Empty filters are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub instance: Option<String>,
    pub action: Option<String>,
    pub hours: u32,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            instance: None,
            action: None,
            hours: DEFAULT_LOG_HOURS,
        }
    }
}

impl LogQuery {
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = non_blank(instance.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = non_blank(action.into());
        self
    }

    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(instance) = &self.instance {
            params.push(("instance", instance.clone()));
        }
        if let Some(action) = &self.action {
            params.push(("action", action.clone()));
        }
        if self.hours > 0 {
            params.push(("hours", self.hours.to_string()));
        }
        params
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
