// Legacy tracking log record
// Flat row shape of the `track_trackinglog` table

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Event fields copied into a tracking log row, in column order
pub const LOG_FIELDS: [&str; 9] = [
    "username",
    "ip",
    "event_source",
    "event_type",
    "event",
    "agent",
    "page",
    "time",
    "host",
];

/// One row of the tracking log
///
/// Holds browsing-history style data (username, ip, page), so it should only
/// be enabled where that is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingLog {
    pub dtcreated: DateTime<Utc>,
    pub username: String,
    pub ip: String,
    pub event_source: String,
    pub event_type: String,
    pub event: String,
    pub agent: String,
    pub page: Option<String>,
    pub time: DateTime<Utc>,
    pub host: String,
}

impl TrackingLog {
    /// Builds a row from a tracking event
    ///
    /// Missing fields become empty strings, non-string values are stored as
    /// their JSON text, `page` stays `None` when absent or null and `time`
    /// falls back to the current instant when absent or not RFC 3339.
    ///
    /// # Example
    /// ```
    /// use course_teams::domain::tracking::TrackingLog;
    /// use serde_json::json;
    ///
    /// let log = TrackingLog::from_event(&json!({
    ///     "username": "alice",
    ///     "event_type": "edx.team.learner_added",
    ///     "event": {"team_id": "t1"},
    /// }));
    /// assert_eq!(log.username, "alice");
    /// assert_eq!(log.event, r#"{"team_id":"t1"}"#);
    /// assert!(log.page.is_none());
    /// ```
    pub fn from_event(event: &Value) -> Self {
        let mut fields: HashMap<&'static str, Option<String>> = LOG_FIELDS
            .iter()
            .map(|&name| (name, field(event, name)))
            .collect();
        let mut take = |name: &str| fields.get_mut(name).and_then(Option::take);

        let now = Utc::now();
        let time = take("time")
            .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(now);

        Self {
            dtcreated: now,
            username: take("username").unwrap_or_default(),
            ip: take("ip").unwrap_or_default(),
            event_source: take("event_source").unwrap_or_default(),
            event_type: take("event_type").unwrap_or_default(),
            event: take("event").unwrap_or_default(),
            agent: take("agent").unwrap_or_default(),
            page: take("page"),
            time,
            host: take("host").unwrap_or_default(),
        }
    }
}

/// Text of a field; `None` when absent or null, JSON text for non-strings.
fn field(event: &Value, name: &str) -> Option<String> {
    match event.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

impl fmt::Display for TrackingLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}@{}: {}| {} | {} | {}",
            self.time.to_rfc3339(),
            self.username,
            self.ip,
            self.event_source,
            self.event_type,
            self.page.as_deref().unwrap_or("None"),
            self.event
        )
    }
}
