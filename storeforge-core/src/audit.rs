use tracing::info;

use crate::ports::AuditSink;
use crate::types::AuditEvent;

/// Audit sink that emits structured tracing events. Durable audit storage
/// is an external collaborator; this is the in-process default.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log(&self, event: AuditEvent) {
        info!(
            kind = event.kind,
            subdomain = %event.subdomain,
            tenant_id = ?event.tenant_id,
            detail = %event.detail,
            "audit event"
        );
    }
}
