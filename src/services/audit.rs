// src/services/audit.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::{common::error::AppError, db::AuditRepository};

// Column limits of audit_logs
const ACTION_MAX: usize = 60;
const ENTITY_TYPE_MAX: usize = 60;
const DETAIL_MAX: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub actor_user_id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub detail: String,
}

impl AuditEvent {
    pub fn new(
        actor_user_id: i64,
        action: &str,
        entity_type: &str,
        entity_id: i64,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            actor_user_id,
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: Some(entity_id),
            detail: detail.into(),
        }
    }
}

/// Where audit events end up.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError>;
}

pub struct PgAuditSink {
    repo: AuditRepository,
}

impl PgAuditSink {
    pub fn new(repo: AuditRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError> {
        self.repo
            .insert(
                event.actor_user_id,
                &truncate(&event.action, ACTION_MAX),
                &truncate(&event.entity_type, ENTITY_TYPE_MAX),
                event.entity_id,
                &truncate(&event.detail, DETAIL_MAX),
            )
            .await
    }
}

// Character-based, the columns are VARCHAR(n)
fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Fire-and-forget front of the sink. Never fails the caller.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub fn emit(&self, event: AuditEvent) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let action = event.action.clone();
            if let Err(e) = sink.record(event).await {
                tracing::warn!("Audit event {} dropped: {}", action, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
        done: Notify,
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn record(&self, event: AuditEvent) -> Result<(), AppError> {
            self.events.lock().unwrap().push(event);
            self.done.notify_one();
            Ok(())
        }
    }

    struct FailingSink {
        done: Notify,
    }

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn record(&self, _event: AuditEvent) -> Result<(), AppError> {
            self.done.notify_one();
            Err(AppError::InvalidState("sink down".into()))
        }
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("şğüöç", 3), "şğü");
        assert_eq!(truncate("short", 60), "short");
    }

    #[tokio::test]
    async fn emit_hands_the_event_to_the_sink() {
        let sink = Arc::new(RecordingSink { events: Mutex::new(Vec::new()), done: Notify::new() });
        let log = AuditLog::new(sink.clone());

        log.emit(AuditEvent::new(7, "RESERVATION_CREATE", "Reservation", 42, "card"));
        sink.done.notified().await;

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_id, Some(42));
    }

    #[tokio::test]
    async fn sink_failure_does_not_reach_the_caller() {
        let sink = Arc::new(FailingSink { done: Notify::new() });
        let log = AuditLog::new(sink.clone());

        log.emit(AuditEvent::new(7, "SLOTS_REPLACE", "Facility", 1, ""));
        sink.done.notified().await;
    }
}
