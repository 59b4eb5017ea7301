//! Guard chain evaluated on every route transition.
//!
//! Guards run strictly in order; the next one starts only after the previous
//! one's side effects are committed. A redirect abandons the remaining guards
//! and restarts the whole chain for the redirect target. Side effects already
//! committed (a principal fetch, the intended-URL marker) are kept.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use appealwall_auth::{AccessDecision, authorize};
use appealwall_core::TenantProvider;
use appealwall_session::SessionManager;

use crate::routes::{LOGIN_PATH, NOT_FOUND_PATH, RouteMatch, RouteTable};
use crate::title::{TitleApplier, resolve_title};

/// Redirects followed within one navigation; one more fails it.
pub const MAX_REDIRECTS: usize = 8;

/// Verdict of a single guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Proceed,
    Redirect(String),
    Abort(String),
}

/// State carried through the guards of one navigation attempt.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    pub target: RouteMatch,
    /// Route title with the tenant placeholder resolved.
    pub title: Option<String>,
}

impl NavigationContext {
    pub fn new(target: RouteMatch) -> Self {
        Self {
            target,
            title: None,
        }
    }
}

#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &mut NavigationContext) -> Outcome;
}

/// Stage 1: resolve the tenant placeholder in the route title.
pub struct TitleGuard {
    tenant: Arc<dyn TenantProvider>,
}

impl TitleGuard {
    pub fn new(tenant: Arc<dyn TenantProvider>) -> Self {
        Self { tenant }
    }
}

#[async_trait]
impl Guard for TitleGuard {
    fn name(&self) -> &'static str {
        "title"
    }

    async fn check(&self, ctx: &mut NavigationContext) -> Outcome {
        ctx.title = ctx.target.route.title.as_deref().map(|template| {
            let tenant = self.tenant.current();
            resolve_title(template, tenant.display_name()).text
        });
        Outcome::Proceed
    }
}

/// Stage 2: bring the session up to date. Never blocks navigation.
pub struct FreshnessGuard {
    sessions: Arc<SessionManager>,
}

impl FreshnessGuard {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Guard for FreshnessGuard {
    fn name(&self) -> &'static str {
        "freshness"
    }

    async fn check(&self, _ctx: &mut NavigationContext) -> Outcome {
        self.sessions.ensure_fresh().await;
        Outcome::Proceed
    }
}

/// Stage 3: enforce the route's auth requirement.
///
/// Anonymous visitors go to the login page with the attempted path
/// remembered. Logged-in users lacking the role get the not-found page, so
/// the route's existence is not revealed.
pub struct AuthorizationGuard {
    sessions: Arc<SessionManager>,
}

impl AuthorizationGuard {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Guard for AuthorizationGuard {
    fn name(&self) -> &'static str {
        "authorization"
    }

    async fn check(&self, ctx: &mut NavigationContext) -> Outcome {
        let principal = self.sessions.principal();
        match authorize(principal.as_ref(), &ctx.target.route.auth) {
            AccessDecision::Granted => Outcome::Proceed,
            AccessDecision::NeedsLogin => {
                let attempted = &ctx.target.full_path;
                if let Err(e) = self.sessions.session().set_intended_url(attempted) {
                    tracing::warn!(error = %e, "failed to remember intended url");
                }
                tracing::debug!(path = %attempted, "login required");
                Outcome::Redirect(LOGIN_PATH.to_string())
            }
            AccessDecision::Forbidden => {
                tracing::debug!(path = %ctx.target.full_path, "role missing");
                Outcome::Redirect(NOT_FOUND_PATH.to_string())
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NoRoute(String),

    #[error("too many redirects starting from '{from}' ({hops} hops)")]
    RedirectLoop { from: String, hops: usize },

    #[error("navigation aborted by guard '{guard}': {reason}")]
    Aborted { guard: &'static str, reason: String },
}

/// A committed navigation.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub target: RouteMatch,
    pub title: Option<String>,
    /// Title actually applied to the document, if any.
    pub applied_title: Option<String>,
    /// Paths passed through on the way, in order.
    pub redirected_from: Vec<String>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirected_from.is_empty()
    }
}

/// Interprets the guard list for each navigation request.
pub struct Navigator {
    routes: RouteTable,
    guards: Vec<Box<dyn Guard>>,
    titles: TitleApplier,
    max_redirects: usize,
}

impl Navigator {
    /// Navigator with the standard guard chain: title, freshness, authorization.
    pub fn new(
        routes: RouteTable,
        sessions: Arc<SessionManager>,
        tenant: Arc<dyn TenantProvider>,
        titles: TitleApplier,
    ) -> Self {
        let guards: Vec<Box<dyn Guard>> = vec![
            Box::new(TitleGuard::new(tenant)),
            Box::new(FreshnessGuard::new(sessions.clone())),
            Box::new(AuthorizationGuard::new(sessions)),
        ];
        Self::with_guards(routes, guards, titles)
    }

    pub fn with_guards(routes: RouteTable, guards: Vec<Box<dyn Guard>>, titles: TitleApplier) -> Self {
        Self {
            routes,
            guards,
            titles,
            max_redirects: MAX_REDIRECTS,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn navigate(&self, full_path: &str) -> Result<Navigation, NavigationError> {
        let mut current = full_path.to_string();
        let mut redirected_from = Vec::new();

        loop {
            if redirected_from.len() > self.max_redirects {
                return Err(NavigationError::RedirectLoop {
                    from: full_path.to_string(),
                    hops: redirected_from.len(),
                });
            }

            let target = self
                .routes
                .resolve(&current)
                .ok_or_else(|| NavigationError::NoRoute(current.clone()))?;

            if let Some(to) = target.route.redirect.clone() {
                tracing::debug!(from = %current, to = %to, "static redirect");
                redirected_from.push(std::mem::replace(&mut current, to));
                continue;
            }

            let mut ctx = NavigationContext::new(target);
            match self.run_guards(&mut ctx).await? {
                Some(to) => {
                    redirected_from.push(std::mem::replace(&mut current, to));
                }
                None => {
                    let applied_title = self.titles.apply(ctx.title.as_deref());
                    tracing::debug!(path = %ctx.target.full_path, "navigation committed");
                    return Ok(Navigation {
                        target: ctx.target,
                        title: ctx.title,
                        applied_title,
                        redirected_from,
                    });
                }
            }
        }
    }

    /// Continue after a successful login: the remembered path, or home.
    pub async fn resume(&self, intended: Option<String>) -> Result<Navigation, NavigationError> {
        let to = intended.unwrap_or_else(|| "/".to_string());
        self.navigate(&to).await
    }

    /// Returns the redirect target, or `None` when every guard proceeded.
    async fn run_guards(&self, ctx: &mut NavigationContext) -> Result<Option<String>, NavigationError> {
        for guard in &self.guards {
            match guard.check(ctx).await {
                Outcome::Proceed => {}
                Outcome::Redirect(to) => {
                    tracing::debug!(guard = guard.name(), to = %to, "guard redirected");
                    return Ok(Some(to));
                }
                Outcome::Abort(reason) => {
                    return Err(NavigationError::Aborted {
                        guard: guard.name(),
                        reason,
                    });
                }
            }
        }
        Ok(None)
    }
}
