use std::fmt;
use std::sync::Arc;

use storeforge_core::{Provisioner, TenantRegistry};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<Provisioner>,
    pub registry: Arc<dyn TenantRegistry>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        provisioner: Arc<Provisioner>,
        registry: Arc<dyn TenantRegistry>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            provisioner,
            registry,
            config,
        }
    }
}
