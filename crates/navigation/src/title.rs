//! Document titles.

use std::sync::Arc;

use appealwall_core::TenantProvider;

/// Placeholder replaced by the tenant's display name.
pub const TENANT_PLACEHOLDER: &str = "{tenant}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleResolution {
    pub text: String,
    pub substitutions: usize,
}

/// Substitute the tenant placeholder until none remains.
///
/// The number of substitutions is capped at the template length so a tenant
/// name that itself contains the placeholder cannot loop forever.
pub fn resolve_title(template: &str, tenant_name: &str) -> TitleResolution {
    let mut text = template.to_string();
    let mut substitutions = 0;

    while substitutions < template.len() && text.contains(TENANT_PLACEHOLDER) {
        text = text.replacen(TENANT_PLACEHOLDER, tenant_name, 1);
        substitutions += 1;
    }

    TitleResolution {
        text,
        substitutions,
    }
}

/// `"{title} - {tenant}"`, or just the tenant name when the route title is
/// missing or already equal to it.
pub fn effective_title(resolved: Option<&str>, tenant_name: &str) -> String {
    match resolved {
        Some(title) if title != tenant_name => format!("{title} - {tenant_name}"),
        _ => tenant_name.to_string(),
    }
}

/// Whether the client runs inside an embedding browser whose chrome shows the
/// document title as its header (the WeChat in-app browser).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct EmbeddedContext {
    embedded: bool,
}

impl EmbeddedContext {
    pub fn new(embedded: bool) -> Self {
        Self { embedded }
    }

    pub fn from_user_agent(user_agent: &str) -> Self {
        Self::new(user_agent.to_lowercase().contains("micromessenger"))
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }
}

/// Receives the document title.
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str);
}

/// Applies the title after a navigation commits.
pub struct TitleApplier {
    tenant: Arc<dyn TenantProvider>,
    context: EmbeddedContext,
    sink: Arc<dyn TitleSink>,
}

impl TitleApplier {
    pub fn new(
        tenant: Arc<dyn TenantProvider>,
        context: EmbeddedContext,
        sink: Arc<dyn TitleSink>,
    ) -> Self {
        Self {
            tenant,
            context,
            sink,
        }
    }

    /// Returns the title that was applied, if any. Outside an embedded
    /// browser nothing is applied.
    pub fn apply(&self, resolved: Option<&str>) -> Option<String> {
        if !self.context.is_embedded() {
            tracing::trace!("not embedded, skipping title update");
            return None;
        }

        let tenant = self.tenant.current();
        let title = effective_title(resolved, tenant.display_name());
        self.sink.set_title(&title);
        Some(title)
    }
}
