//! `appealwall-core` — shared building blocks for the appeal-wall client.
//!
//! This crate holds the pieces every other crate leans on: typed ids, the
//! transport error taxonomy, the clock and notifier seams, and tenant branding.
//! Nothing here performs IO.

pub mod clock;
pub mod error;
pub mod id;
pub mod notify;
pub mod tenant;
pub mod text;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use id::{AnnouncementId, AttachmentId, CarouselId, CategoryId, QuestionId, UserId};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use tenant::{StaticTenant, Tenant, TenantProvider};
pub use text::truncate;
