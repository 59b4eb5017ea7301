//! Assembles the client from its configuration.

use std::sync::Arc;

use thiserror::Error;

use appealwall_auth::ResourceTokenResponse;
use appealwall_core::{ApiError, Notice, Notifier, StaticTenant, SystemClock, Tenant, TenantProvider, TracingNotifier};
use appealwall_navigation::{EmbeddedContext, Navigation, NavigationError, Navigator, RouteTable, TitleApplier, TitleSink};
use appealwall_pagination::PaginatedList;
use appealwall_session::{FileStore, InMemoryStore, Session, SessionError, SessionManager, StoreError};

use crate::config::ClientConfig;
use crate::feeds::Feed;
use crate::health::HealthProbe;
use crate::transport::{Credentials, HttpTransport};
use crate::types::{Announcement, NewQuestion, Question};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Writes the document title to the log. Used when no view layer is attached.
#[derive(Debug, Default, Copy, Clone)]
pub struct TracingTitleSink;

impl TitleSink for TracingTitleSink {
    fn set_title(&self, title: &str) {
        tracing::info!(title, "document title");
    }
}

pub struct Client {
    config: ClientConfig,
    session: Arc<Session>,
    transport: Arc<HttpTransport>,
    sessions: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
    navigator: Navigator,
    health: HealthProbe,
}

impl Client {
    /// Client with a file-backed session, tracing notices and tracing titles.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let persisted = FileStore::open(&config.store_path)?;
        let session = Arc::new(Session::new(Arc::new(persisted), Arc::new(InMemoryStore::new())));
        Ok(Self::assemble(config, session, Arc::new(TracingNotifier), Arc::new(TracingTitleSink)))
    }

    pub fn assemble(
        config: ClientConfig,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
        titles: Arc<dyn TitleSink>,
    ) -> Self {
        let transport = Arc::new(HttpTransport::new(
            config.api_url.clone(),
            session.clone(),
            notifier.clone(),
        ));
        let sessions = Arc::new(SessionManager::new(
            session.clone(),
            transport.clone(),
            notifier.clone(),
            Arc::new(SystemClock),
        ));

        let tenant: Arc<dyn TenantProvider> = Arc::new(StaticTenant::new(Tenant::new(config.tenant_name.clone())));
        let context = EmbeddedContext::from_user_agent(&config.user_agent);
        tracing::debug!(embedded = context.is_embedded(), "client context");

        let navigator = Navigator::new(
            RouteTable::appeal_wall(),
            sessions.clone(),
            tenant.clone(),
            TitleApplier::new(tenant, context, titles),
        );

        Self {
            health: HealthProbe::new(transport.clone()),
            config,
            session,
            transport,
            sessions,
            notifier,
            navigator,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }

    pub fn health(&self) -> &HealthProbe {
        &self.health
    }

    pub async fn navigate(&self, full_path: &str) -> Result<Navigation, ClientError> {
        Ok(self.navigator.navigate(full_path).await?)
    }

    /// Log in with credentials and continue to wherever the user was headed.
    pub async fn login(&self, credentials: &Credentials) -> Result<Navigation, ClientError> {
        let token = self.transport.request_token(credentials).await?;
        let intended = self.sessions.login(&token).await?;
        tracing::info!(username = %credentials.username, "logged in");
        Ok(self.navigator.resume(intended).await?)
    }

    pub fn logout(&self) {
        self.sessions.logout();
    }

    /// Submit a question. The returned resource token is kept as the
    /// secondary token so an anonymous submitter can follow up on it.
    pub async fn submit_question(&self, question: &NewQuestion) -> Result<Option<Question>, ClientError> {
        let response: ResourceTokenResponse<Question> = self.transport.post("questions", question).await?;
        self.sessions.store_secondary(&response.resource_token)?;
        tracing::info!(campus = question.campus.code(), "question submitted");
        self.notifier.notify(Notice::info("Question submitted"));
        Ok(response.data)
    }

    pub fn announcements(&self) -> PaginatedList<Announcement, Feed<Announcement>> {
        PaginatedList::new(Feed::announcements(self.transport.clone()))
    }

    pub fn questions(&self) -> PaginatedList<Question, Feed<Question>> {
        PaginatedList::new(Feed::questions(self.transport.clone()))
    }
}
