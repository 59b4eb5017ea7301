//! List endpoints as page sources, plus the small lookups the list views need.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use appealwall_core::{AnnouncementId, ApiResult};
use appealwall_pagination::{CursorPage, PageSource};

use crate::transport::HttpTransport;
use crate::types::{Announcement, AnnouncementCarousel, AnnouncementCategory, Question, QuestionCategory};

/// A cursor-paginated collection endpoint.
pub struct Feed<T> {
    transport: Arc<HttpTransport>,
    path: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T> Feed<T> {
    pub fn new(transport: Arc<HttpTransport>, path: &'static str) -> Self {
        Self {
            transport,
            path,
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

impl Feed<Announcement> {
    pub fn announcements(transport: Arc<HttpTransport>) -> Self {
        Self::new(transport, "announcements")
    }
}

impl Feed<Question> {
    pub fn questions(transport: Arc<HttpTransport>) -> Self {
        Self::new(transport, "questions")
    }
}

#[async_trait]
impl<T> PageSource<T> for Feed<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, cursor: Option<&str>) -> ApiResult<CursorPage<T>> {
        let page: CursorPage<T> = match cursor {
            Some(cursor) => self.transport.get(self.path, &[("cursor", cursor)]).await?,
            None => self.transport.get(self.path, &[]).await?,
        };
        tracing::debug!(
            path = self.path,
            items = page.data.len(),
            pinned = page.pinned.as_ref().map_or(0, Vec::len),
            last = page.is_last(),
            "page fetched"
        );
        Ok(page)
    }
}

pub async fn announcement(transport: &HttpTransport, id: AnnouncementId) -> ApiResult<Announcement> {
    transport.get(&format!("announcements/{id}"), &[]).await
}

pub async fn announcement_categories(transport: &HttpTransport) -> ApiResult<Vec<AnnouncementCategory>> {
    transport.get("announcement-categories", &[]).await
}

pub async fn announcement_carousels(transport: &HttpTransport) -> ApiResult<Vec<AnnouncementCarousel>> {
    transport.get("announcement-carousels", &[]).await
}

pub async fn question_categories(transport: &HttpTransport) -> ApiResult<Vec<QuestionCategory>> {
    transport.get("question-categories", &[]).await
}
