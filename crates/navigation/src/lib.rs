//! `appealwall-navigation` — route table and the authorization pipeline run
//! on every route transition.
//!
//! A navigation is a small transaction: resolve the target route, run the
//! guards in order (title, freshness, authorization), and either commit or
//! restart at the redirect target. After commit the document title is applied.

pub mod pipeline;
pub mod routes;
pub mod title;

pub use pipeline::{
    AuthorizationGuard, FreshnessGuard, Guard, MAX_REDIRECTS, Navigation, NavigationContext,
    NavigationError, Navigator, Outcome, TitleGuard,
};
pub use routes::{LOGIN_PATH, NOT_FOUND_PATH, RouteDescriptor, RouteMatch, RouteTable, View};
pub use title::{
    EmbeddedContext, TENANT_PLACEHOLDER, TitleApplier, TitleResolution, TitleSink, effective_title,
    resolve_title,
};
