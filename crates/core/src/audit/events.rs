use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Conversion lifecycle
    ConversionRequested {
        request_id: String,
        original_filename: String,
        media_type: String,
        target_format: String,
    },
    ConversionCompleted {
        request_id: String,
        /// Strategy that produced the artifact
        strategy: String,
        output_filename: String,
        output_bytes: u64,
        duration_ms: u64,
    },
    ConversionFailed {
        request_id: String,
        /// Strategy that was executing, if selection had succeeded
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strategy: Option<String>,
        /// Internal error cause; never exposed to the caller
        error: String,
        duration_ms: u64,
    },

    // Input cleanup (confirmation log, distinct from the request path)
    InputCleanupCompleted {
        request_id: String,
        path: String,
    },
    InputCleanupFailed {
        request_id: String,
        path: String,
        error: String,
    },

    // Retention
    ArtifactExpired {
        filename: String,
        age_secs: u64,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::ConversionRequested { .. } => "conversion_requested",
            Self::ConversionCompleted { .. } => "conversion_completed",
            Self::ConversionFailed { .. } => "conversion_failed",
            Self::InputCleanupCompleted { .. } => "input_cleanup_completed",
            Self::InputCleanupFailed { .. } => "input_cleanup_failed",
            Self::ArtifactExpired { .. } => "artifact_expired",
        }
    }

    /// Extract request_id if this event is request-scoped
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ConversionRequested { request_id, .. }
            | Self::ConversionCompleted { request_id, .. }
            | Self::ConversionFailed { request_id, .. }
            | Self::InputCleanupCompleted { request_id, .. }
            | Self::InputCleanupFailed { request_id, .. } => Some(request_id),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub request_id: Option<String>,
    pub data: AuditEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_service_started() {
        let event = AuditEvent::ServiceStarted {
            version: "0.1.0".to_string(),
            config_hash: "abc123".to_string(),
        };
        assert_eq!(event.event_type(), "service_started");
        assert_eq!(event.request_id(), None);
    }

    #[test]
    fn test_event_type_conversion_requested() {
        let event = AuditEvent::ConversionRequested {
            request_id: "req-1".to_string(),
            original_filename: "photo.png".to_string(),
            media_type: "image/png".to_string(),
            target_format: "pdf".to_string(),
        };
        assert_eq!(event.event_type(), "conversion_requested");
        assert_eq!(event.request_id(), Some("req-1"));
    }

    #[test]
    fn test_event_type_conversion_completed() {
        let event = AuditEvent::ConversionCompleted {
            request_id: "req-1".to_string(),
            strategy: "image_to_image".to_string(),
            output_filename: "photo-req-1.jpeg".to_string(),
            output_bytes: 2048,
            duration_ms: 31,
        };
        assert_eq!(event.event_type(), "conversion_completed");
        assert_eq!(event.request_id(), Some("req-1"));
    }

    #[test]
    fn test_event_type_cleanup_events() {
        let completed = AuditEvent::InputCleanupCompleted {
            request_id: "req-1".to_string(),
            path: "/upload/upload-req-1.png".to_string(),
        };
        assert_eq!(completed.event_type(), "input_cleanup_completed");
        assert_eq!(completed.request_id(), Some("req-1"));

        let failed = AuditEvent::InputCleanupFailed {
            request_id: "req-1".to_string(),
            path: "/upload/upload-req-1.png".to_string(),
            error: "permission denied".to_string(),
        };
        assert_eq!(failed.event_type(), "input_cleanup_failed");
    }

    #[test]
    fn test_artifact_expired_has_no_request() {
        let event = AuditEvent::ArtifactExpired {
            filename: "old-output.pdf".to_string(),
            age_secs: 7200,
        };
        assert_eq!(event.event_type(), "artifact_expired");
        assert_eq!(event.request_id(), None);
    }

    #[test]
    fn test_serialize_deserialize_conversion_failed() {
        let event = AuditEvent::ConversionFailed {
            request_id: "req-9".to_string(),
            strategy: Some("office_process".to_string()),
            error: "soffice exited with status 1".to_string(),
            duration_ms: 1500,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"conversion_failed\""));
        assert!(json.contains("soffice"));

        let deserialized: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event_type(), "conversion_failed");
        assert_eq!(deserialized.request_id(), Some("req-9"));
    }

    #[test]
    fn test_conversion_failed_without_strategy_skips_field() {
        let event = AuditEvent::ConversionFailed {
            request_id: "req-9".to_string(),
            strategy: None,
            error: "no strategy for pair".to_string(),
            duration_ms: 0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("strategy"));
    }

    #[test]
    fn test_audit_record_serialize() {
        let record = AuditRecord {
            id: 1,
            timestamp: Utc::now(),
            event_type: "service_started".to_string(),
            request_id: None,
            data: AuditEvent::ServiceStarted {
                version: "0.1.0".to_string(),
                config_hash: "abc123".to_string(),
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"event_type\":\"service_started\""));
    }
}
