//! Audit trail: fire-and-forget activity records
//!
//! Writes go through an unbounded channel consumed by a background task, so
//! the request that triggered the record never waits on (or fails with) the
//! audit insert. Failures surface only in the logs.

use tokio::sync::mpsc;

use crate::{
    error::AppResult,
    models::audit_log::{AuditLogDetails, AuditLogQuery},
    repository::Repository,
};

#[derive(Debug)]
struct AuditEvent {
    user_id: Option<i32>,
    entity: &'static str,
    action_type: &'static str,
    details: serde_json::Value,
}

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl AuditService {
    /// Spawns the background writer task; must be called inside the runtime
    pub fn new(repository: Repository) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditEvent>();

        let writer_repository = repository.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = writer_repository
                    .audit_logs
                    .insert(event.user_id, event.entity, event.action_type, &event.details)
                    .await
                {
                    tracing::warn!(
                        entity = event.entity,
                        action = event.action_type,
                        error = %e,
                        "failed to write audit log"
                    );
                }
            }
        });

        Self { repository, tx }
    }

    /// Queue an activity record. Never blocks, never fails the caller.
    pub fn record(
        &self,
        user_id: Option<i32>,
        entity: &'static str,
        action_type: &'static str,
        details: serde_json::Value,
    ) {
        let event = AuditEvent {
            user_id,
            entity,
            action_type,
            details,
        };
        if self.tx.send(event).is_err() {
            tracing::warn!(entity, action_type, "audit writer task is gone, record dropped");
        }
    }

    pub async fn list(&self, query: &AuditLogQuery) -> AppResult<(Vec<AuditLogDetails>, i64)> {
        self.repository.audit_logs.search(query).await
    }
}
