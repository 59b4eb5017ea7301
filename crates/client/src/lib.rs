//! `appealwall-client`
//!
//! **Responsibility:** the HTTP side of the appeal-wall client.
//!
//! This crate provides:
//! - the shared transport (bearer injection, global connectivity and
//!   session-expiry handling)
//! - wire types for announcements, questions and their categories
//! - list feeds plugged into the pagination merger
//! - the API health probe
//! - environment configuration and wiring of the whole client

pub mod config;
pub mod feeds;
pub mod health;
pub mod transport;
pub mod types;
pub mod wiring;

#[cfg(test)]
mod stub;

pub use config::ClientConfig;
pub use feeds::Feed;
pub use health::{ApiHealth, HealthProbe};
pub use transport::{Credentials, HttpTransport};
pub use wiring::{Client, ClientError, TracingTitleSink};
