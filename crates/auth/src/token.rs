use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted expiry value meaning "no known expiry".
///
/// Such a token is treated as valid until a 401 says otherwise.
pub const NO_EXPIRY: i64 = -1;

/// Whether a persisted expiry (epoch millis or [`NO_EXPIRY`]) has passed.
pub fn is_expired(expiry: i64, now_millis: i64) -> bool {
    expiry != NO_EXPIRY && expiry < now_millis
}

/// Token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds. Absent or zero means the server did not say.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Response of endpoints that hand out a scoped resource token alongside data
/// (e.g. anonymous question submission).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTokenResponse<T> {
    pub resource_token: TokenResponse,
    pub data: Option<T>,
}

/// A token paired with the expiry that gets persisted next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub expiry: i64,
}

impl TokenGrant {
    pub fn new(token: impl Into<String>, expiry: i64) -> Self {
        Self {
            token: token.into(),
            expiry,
        }
    }

    /// Turn a token response into a grant, anchoring `expires_in` at `now`.
    pub fn from_response(response: &TokenResponse, now: DateTime<Utc>) -> Self {
        let expiry = match response.expires_in {
            Some(secs) if secs > 0 => {
                let secs = i64::try_from(secs).unwrap_or(i64::MAX / 1000);
                now.timestamp_millis().saturating_add(secs.saturating_mul(1000))
            }
            _ => NO_EXPIRY,
        };
        Self::new(response.access_token.clone(), expiry)
    }
}
