pub mod tenant;

pub use tenant::{
    AuthPrincipal, require_active_tenant, require_tenant_access, tenant_gate,
};
