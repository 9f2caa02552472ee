pub mod provision;
pub mod tenant_info;

pub use provision::handle_provision;
pub use tenant_info::handle_tenant_info;
