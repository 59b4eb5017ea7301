//! API health detection.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use appealwall_core::ApiError;

use crate::transport::HttpTransport;

const HEALTH_PATH: &str = "actuator/health";

/// Last known health of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiHealth {
    /// Not probed yet.
    #[default]
    Unknown,
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

pub struct HealthProbe {
    transport: Arc<HttpTransport>,
    state: RwLock<ApiHealth>,
}

impl HealthProbe {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self {
            transport,
            state: RwLock::new(ApiHealth::Unknown),
        }
    }

    pub fn state(&self) -> ApiHealth {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_up(&self) -> bool {
        self.state() == ApiHealth::Up
    }

    /// Probe the health endpoint and remember the result.
    pub async fn check(&self) -> ApiHealth {
        let health = classify(self.transport.get::<HealthBody>(HEALTH_PATH, &[]).await);
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = health;
        health
    }
}

fn classify(result: Result<HealthBody, ApiError>) -> ApiHealth {
    match result {
        Ok(body) if body.status.eq_ignore_ascii_case("UP") => ApiHealth::Up,
        Ok(body) => {
            tracing::warn!(status = %body.status, "API reports unhealthy");
            ApiHealth::Down
        }
        // Deployments that protect the actuator answer 401 while serving normally.
        Err(ApiError::Unauthorized) => {
            tracing::warn!("health endpoint returned 401, treating API as up");
            ApiHealth::Up
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            ApiHealth::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(status: &str) -> Result<HealthBody, ApiError> {
        Ok(HealthBody {
            status: status.to_string(),
        })
    }

    #[test]
    fn status_up_is_healthy() {
        assert_eq!(classify(body("UP")), ApiHealth::Up);
        assert_eq!(classify(body("DOWN")), ApiHealth::Down);
        assert_eq!(classify(body("OUT_OF_SERVICE")), ApiHealth::Down);
    }

    #[test]
    fn unauthorized_counts_as_up() {
        assert_eq!(classify(Err(ApiError::Unauthorized)), ApiHealth::Up);
    }

    #[test]
    fn failures_count_as_down() {
        assert_eq!(classify(Err(ApiError::from_status(503, ""))), ApiHealth::Down);
        assert_eq!(classify(Err(ApiError::from_status(500, "boom"))), ApiHealth::Down);
        assert_eq!(classify(Err(ApiError::decode("not json"))), ApiHealth::Down);
    }
}
