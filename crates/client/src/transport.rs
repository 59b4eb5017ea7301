//! The single shared HTTP client.
//!
//! Every request carries `Authorization: Bearer <token>` (primary token,
//! falling back to the secondary one). Failures are classified once here:
//! connectivity problems raise a global notice, and a 401 from a regular
//! endpoint ends the session with a "session expired" notice.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use appealwall_auth::{TokenResponse, UserPrincipal};
use appealwall_core::{ApiError, ApiResult, Notice, Notifier};
use appealwall_session::{Bearer, PrincipalApi, Session};

/// Endpoints whose 401 means "bad credentials" or "anonymous access denied",
/// not "session expired".
const NO_LOGOUT_ON_401: [&str; 2] = ["token", "actuator/health"];

/// Login form submitted to the token endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            notifier,
        }
    }

    /// Use a custom HTTP client (timeouts, proxies, testing).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path` with the session's bearer token.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        let bearer = self.session.bearer();
        self.get_with_bearer(path, query, bearer).await
    }

    async fn get_with_bearer<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<Bearer>,
    ) -> ApiResult<T> {
        let mut req = self.http.get(self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        self.execute(path, req, bearer).await
    }

    /// `POST path` with a JSON body and the session's bearer token.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.http.post(self.url(path)).json(body);
        self.execute(path, req, self.session.bearer()).await
    }

    /// Exchange credentials for a primary token.
    pub async fn request_token(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.post("token", credentials).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        mut req: reqwest::RequestBuilder,
        bearer: Option<Bearer>,
    ) -> ApiResult<T> {
        if let Some(bearer) = &bearer {
            req = req.bearer_auth(bearer.token());
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(path, error = %e, "request failed");
                self.notifier.notify(Notice::connectivity());
                return Err(ApiError::connectivity(e.to_string()));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), body);
            self.report(path, &err, bearer.as_ref());
            return Err(err);
        }

        resp.json::<T>().await.map_err(|e| {
            tracing::warn!(path, error = %e, "unexpected response body");
            ApiError::decode(e.to_string())
        })
    }

    fn report(&self, path: &str, err: &ApiError, bearer: Option<&Bearer>) {
        match err {
            ApiError::Connectivity(_) => {
                tracing::warn!(path, error = %err, "server unavailable");
                self.notifier.notify(Notice::connectivity());
            }
            ApiError::Unauthorized if logs_out_on_401(path) => {
                let cleared = match bearer {
                    Some(bearer) => self.session.clear_if_bearer(bearer),
                    None => Ok(false),
                };
                match cleared {
                    Ok(true) => {
                        tracing::info!(path, "credentials rejected, session ended");
                        self.notifier.notify(Notice::session_expired());
                    }
                    Ok(false) => {}
                    Err(e) => tracing::warn!(error = %e, "failed to clear rejected session"),
                }
            }
            _ => tracing::debug!(path, error = %err, "request rejected"),
        }
    }
}

fn logs_out_on_401(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    !NO_LOGOUT_ON_401
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{p}/")))
}

#[async_trait]
impl PrincipalApi for HttpTransport {
    async fn fetch_principal(&self, token: &str) -> ApiResult<UserPrincipal> {
        self.get_with_bearer("user", &[], Some(Bearer::Primary(token.to_string())))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubServer;
    use appealwall_auth::{NO_EXPIRY, TokenGrant};
    use appealwall_core::RecordingNotifier;

    struct Fixture {
        transport: HttpTransport,
        session: Arc<Session>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(base: &str) -> Fixture {
        let session = Arc::new(Session::in_memory());
        let notifier = Arc::new(RecordingNotifier::new());
        Fixture {
            transport: HttpTransport::new(base, session.clone(), notifier.clone()),
            session,
            notifier,
        }
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let t = fixture("https://appeal.example.edu/api/").transport;
        assert_eq!(t.url("user"), "https://appeal.example.edu/api/user");
        assert_eq!(t.url("/announcements"), "https://appeal.example.edu/api/announcements");
    }

    #[test]
    fn token_and_health_endpoints_do_not_log_out() {
        assert!(!logs_out_on_401("token"));
        assert!(!logs_out_on_401("/token/refresh"));
        assert!(!logs_out_on_401("actuator/health"));
        assert!(logs_out_on_401("user"));
        assert!(logs_out_on_401("tokens-audit"));
        assert!(logs_out_on_401("announcements"));
    }

    #[tokio::test]
    async fn unreachable_server_is_reported_as_connectivity() {
        let f = fixture("http://127.0.0.1:9");

        let err = f.transport.get::<serde_json::Value>("announcements", &[]).await.unwrap_err();

        assert!(matches!(err, ApiError::Connectivity(_)));
        assert_eq!(f.notifier.notices(), vec![Notice::connectivity()]);
    }

    #[tokio::test]
    async fn primary_token_is_sent_as_bearer() {
        let server = StubServer::start(200, "[]").await;
        let f = fixture(&server.base_url());
        f.session.set_primary(&TokenGrant::new("tok-primary", NO_EXPIRY)).unwrap();
        f.session.set_secondary(&TokenGrant::new("tok-resource", NO_EXPIRY)).unwrap();

        let items: Vec<serde_json::Value> = f.transport.get("questions", &[("cursor", "c1")]).await.unwrap();

        assert!(items.is_empty());
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("get /api/questions?cursor=c1 "));
        assert!(requests[0].contains("authorization: bearer tok-primary"));
    }

    #[tokio::test]
    async fn secondary_token_is_sent_without_primary() {
        let server = StubServer::start(200, "[]").await;
        let f = fixture(&server.base_url());
        f.session.set_secondary(&TokenGrant::new("tok-resource", NO_EXPIRY)).unwrap();

        f.transport.get::<Vec<serde_json::Value>>("questions", &[]).await.unwrap();

        assert!(server.requests()[0].contains("authorization: bearer tok-resource"));
    }

    #[tokio::test]
    async fn anonymous_request_has_no_authorization_header() {
        let server = StubServer::start(200, "[]").await;
        let f = fixture(&server.base_url());

        f.transport.get::<Vec<serde_json::Value>>("announcements", &[]).await.unwrap();

        assert!(!server.requests()[0].contains("authorization:"));
    }

    #[tokio::test]
    async fn unauthorized_primary_ends_session_once() {
        let server = StubServer::start(401, "").await;
        let f = fixture(&server.base_url());
        f.session.set_primary(&TokenGrant::new("revoked", NO_EXPIRY)).unwrap();

        let first = f.transport.get::<serde_json::Value>("questions", &[]).await;
        let second = f.transport.get::<serde_json::Value>("questions", &[]).await;

        assert_eq!(first.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(second.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(f.session.token(), "");
        assert_eq!(f.notifier.notices(), vec![Notice::session_expired()]);
        assert!(!server.requests()[1].contains("authorization:"));
    }

    #[tokio::test]
    async fn unauthorized_secondary_ends_session() {
        let server = StubServer::start(401, "").await;
        let f = fixture(&server.base_url());
        f.session.set_secondary(&TokenGrant::new("tok-resource", NO_EXPIRY)).unwrap();

        let err = f.transport.get::<serde_json::Value>("questions", &[]).await.unwrap_err();

        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(f.session.secondary_token(), "");
        assert_eq!(f.session.bearer(), None);
        assert_eq!(f.notifier.notices(), vec![Notice::session_expired()]);
    }

    #[tokio::test]
    async fn unauthorized_token_and_health_keep_session() {
        let server = StubServer::start(401, "").await;
        let f = fixture(&server.base_url());
        f.session.set_primary(&TokenGrant::new("t1", NO_EXPIRY)).unwrap();

        let credentials = Credentials {
            username: "20240001".into(),
            password: "wrong".into(),
        };
        let login = f.transport.request_token(&credentials).await;
        let health = f.transport.get::<serde_json::Value>("actuator/health", &[]).await;

        assert_eq!(login.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(health.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(f.session.token(), "t1");
        assert!(f.notifier.is_empty());
    }

    #[tokio::test]
    async fn bad_gateway_is_one_connectivity_notice() {
        let server = StubServer::start(502, "").await;
        let f = fixture(&server.base_url());
        f.session.set_primary(&TokenGrant::new("t1", NO_EXPIRY)).unwrap();

        let err = f.transport.get::<serde_json::Value>("announcements", &[]).await.unwrap_err();

        assert!(matches!(err, ApiError::Connectivity(_)));
        assert_eq!(f.notifier.notices(), vec![Notice::connectivity()]);
        assert_eq!(f.session.token(), "t1");
    }

    #[tokio::test]
    async fn server_error_below_502_is_not_global() {
        let server = StubServer::start(500, "boom").await;
        let f = fixture(&server.base_url());

        let err = f.transport.get::<serde_json::Value>("announcements", &[]).await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                message: "boom".into()
            }
        );
        assert!(f.notifier.is_empty());
    }
}
