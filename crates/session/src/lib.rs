//! `appealwall-session` — token persistence and the session lifecycle.
//!
//! - [`store`]: durable key/value storage, no business logic
//! - [`state`]: the shared [`Session`] context (persisted tokens + cached principal)
//! - [`lifecycle`]: [`SessionManager`], which decides whether the session is usable

pub mod api;
pub mod lifecycle;
pub mod state;
pub mod store;

pub use api::PrincipalApi;
pub use lifecycle::{SessionError, SessionManager};
pub use state::{Bearer, Session};
pub use store::{FileStore, InMemoryStore, KeyValueStore, StoreError, keys};
