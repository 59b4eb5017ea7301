use async_trait::async_trait;

use appealwall_auth::UserPrincipal;
use appealwall_core::ApiResult;

/// The principal endpoint (`GET user`), as seen by the session layer.
#[async_trait]
pub trait PrincipalApi: Send + Sync {
    /// Fetch the principal the server associates with `token`.
    async fn fetch_principal(&self, token: &str) -> ApiResult<UserPrincipal>;
}
