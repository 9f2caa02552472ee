//! Request-scoped tenant context propagation.
//!
//! The context rides a tokio task-local: installation is scoped to one
//! logical operation's dynamic extent, nested installs shadow the outer
//! context and restore it on return, and two concurrently running
//! operations can never observe each other's context.
//!
//! Task-locals do not cross `tokio::spawn` on their own; use
//! [`spawn_with_current`] when a spawned task must keep the caller's
//! tenant identity.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use storeforge_model::TenantContext;

use crate::error::{ProvisionError, Result};

tokio::task_local! {
    static TENANT_CONTEXT: Arc<TenantContext>;
}

/// Runs `operation` with `context` installed for its entire dynamic extent.
pub async fn with_context<F>(context: TenantContext, operation: F) -> F::Output
where
    F: Future,
{
    TENANT_CONTEXT.scope(Arc::new(context), operation).await
}

/// Like [`with_context`] but reuses an already shared context.
pub async fn with_shared_context<F>(
    context: Arc<TenantContext>,
    operation: F,
) -> F::Output
where
    F: Future,
{
    TENANT_CONTEXT.scope(context, operation).await
}

/// The context installed for the current operation, if any.
pub fn current_context() -> Option<Arc<TenantContext>> {
    TENANT_CONTEXT.try_with(Arc::clone).ok()
}

/// The context installed for the current operation, or `ContextRequired`.
pub fn require_context() -> Result<Arc<TenantContext>> {
    current_context().ok_or(ProvisionError::ContextRequired)
}

pub fn has_context() -> bool {
    TENANT_CONTEXT.try_with(|_| ()).is_ok()
}

/// Spawns a task that inherits the caller's tenant context, when one is
/// installed.
pub fn spawn_with_current<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match current_context() {
        Some(context) => {
            tokio::spawn(TENANT_CONTEXT.scope(context, future))
        }
        None => tokio::spawn(future),
    }
}
