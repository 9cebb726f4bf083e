//! Response envelopes shared by every endpoint.

use crate::cache::CacheInfo;
use crate::types::EventRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Successful query answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub events: Vec<EventRecord>,
    pub total: usize,
    pub source: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl ResponseEnvelope {
    pub fn new(events: Vec<EventRecord>, source: impl Into<String>) -> Self {
        Self {
            success: true,
            total: events.len(),
            events,
            source: source.into(),
            timestamp: timestamp_now(),
            warning: None,
            cached: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = Some(cached);
        self
    }
}

/// Failure answer, always paired with a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: timestamp_now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckEnvelope {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl AckEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            timestamp: timestamp_now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheInfoEnvelope {
    pub success: bool,
    pub cache_info: CacheInfo,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEnvelope {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub events_cached: usize,
    pub refresh_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_event_count() {
        let envelope = ResponseEnvelope::new(Vec::new(), "clubberia");
        assert!(envelope.success);
        assert_eq!(envelope.total, 0);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("warning").is_none());
        assert!(json.get("cached").is_none());
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let stamp = timestamp_now();
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn error_envelope_is_unsuccessful() {
        let json = serde_json::to_value(ErrorEnvelope::new("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }
}
