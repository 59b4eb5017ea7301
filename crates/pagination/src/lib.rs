//! `appealwall-pagination` — cursor-paginated lists with a pinned overlay.
//!
//! List views (announcements, questions) read a stream of cursor pages. The
//! first page may carry a `pinned` sequence shown ahead of everything else;
//! pinned items also occur in the regular ordering and are suppressed there,
//! on the first page and on every later one.

pub mod list;
pub mod page;

pub use list::{ListError, Loaded, PaginatedList};
pub use page::{CursorPage, Identified, PageSource, merge_first_page};
