//! Tenant (school) branding.
//!
//! One deployment serves several schools, each on its own domain. Mapping a
//! domain to its branding happens outside this workspace; the client only
//! needs the display name of whichever tenant it is running as.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Human-readable name shown in titles and headers.
    pub name: String,
}

impl Tenant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }
}

/// Resolves the tenant the client is currently acting for.
pub trait TenantProvider: Send + Sync {
    fn current(&self) -> Tenant;
}

/// A provider that always answers with the same tenant.
#[derive(Debug, Clone)]
pub struct StaticTenant(Tenant);

impl StaticTenant {
    pub fn new(tenant: Tenant) -> Self {
        Self(tenant)
    }
}

impl TenantProvider for StaticTenant {
    fn current(&self) -> Tenant {
        self.0.clone()
    }
}
