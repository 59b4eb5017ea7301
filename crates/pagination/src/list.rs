//! The merged list behind one list view.

use std::collections::HashSet;

use thiserror::Error;

use appealwall_core::ApiError;

use crate::page::{CursorPage, Identified, PageSource, merge_first_page};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("page fetch failed: {0}")]
    Fetch(#[from] ApiError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Stream {
    /// No page loaded yet.
    Unstarted,
    /// More pages behind the stored cursor.
    Open,
    /// The last page had a null cursor.
    Ended,
}

/// Result of a load call: the items it appended to the list.
#[derive(Debug, PartialEq, Eq)]
pub struct Loaded<'a, T> {
    pub items: &'a [T],
    pub end_of_stream: bool,
}

/// A gap-free, duplicate-free list assembled from cursor pages.
///
/// Load calls take `&mut self`, so a list never has two fetches in flight and
/// pages are appended in request order. A failed fetch leaves the list as it
/// was; the view offers a manual retry.
pub struct PaginatedList<T: Identified, S> {
    source: S,
    items: Vec<T>,
    /// Identities already displayed, pinned ones included.
    shown: HashSet<T::Key>,
    cursor: Option<String>,
    stream: Stream,
}

impl<T, S> PaginatedList<T, S>
where
    T: Identified,
    S: PageSource<T>,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            items: Vec::new(),
            shown: HashSet::new(),
            cursor: None,
            stream: Stream::Unstarted,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.stream != Stream::Unstarted
    }

    /// False once a page with a null cursor has been received.
    pub fn has_more(&self) -> bool {
        self.stream != Stream::Ended
    }

    /// Fetch the first page and rebuild the list from it (also pull-to-refresh).
    ///
    /// Everything accumulated so far is discarded, but only once the new
    /// page has arrived.
    pub async fn load_first_page(&mut self) -> Result<Loaded<'_, T>, ListError> {
        let page = self.source.fetch_page(None).await?;
        let CursorPage {
            pinned,
            data,
            cursor,
        } = page;

        self.items.clear();
        self.shown.clear();

        let pinned = pinned.unwrap_or_default();
        let pinned_count = pinned.len();
        let shown = self.append(merge_first_page(pinned, data));

        tracing::debug!(
            pinned = pinned_count,
            regular = shown.saturating_sub(pinned_count),
            end = cursor.is_none(),
            "first page merged"
        );
        self.set_cursor(cursor);

        Ok(Loaded {
            items: &self.items,
            end_of_stream: self.stream == Stream::Ended,
        })
    }

    /// Fetch the page after the stored cursor and append its new items.
    ///
    /// Loads the first page if none has been loaded. After the end of the
    /// stream this returns nothing and fetches nothing.
    pub async fn load_next_page(&mut self) -> Result<Loaded<'_, T>, ListError> {
        match self.stream {
            Stream::Unstarted => return self.load_first_page().await,
            Stream::Ended => {
                return Ok(Loaded {
                    items: &[],
                    end_of_stream: true,
                });
            }
            Stream::Open => {}
        }

        let page = self.source.fetch_page(self.cursor.as_deref()).await?;
        if page.pinned.as_ref().is_some_and(|p| !p.is_empty()) {
            tracing::trace!("ignoring pinned items on a later page");
        }

        let start = self.items.len();
        let appended = self.append(page.data);
        tracing::debug!(appended, end = page.cursor.is_none(), "next page merged");
        self.set_cursor(page.cursor);

        Ok(Loaded {
            items: &self.items[start..],
            end_of_stream: self.stream == Stream::Ended,
        })
    }

    fn append(&mut self, data: Vec<T>) -> usize {
        let mut appended = 0;
        for item in data {
            if self.push_unique(item) {
                appended += 1;
            }
        }
        appended
    }

    fn push_unique(&mut self, item: T) -> bool {
        if self.shown.insert(item.identity()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    fn set_cursor(&mut self, cursor: Option<String>) {
        self.stream = if cursor.is_some() {
            Stream::Open
        } else {
            Stream::Ended
        };
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use proptest::prelude::*;

    use appealwall_core::ApiResult;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Post(&'static str);

    impl Identified for Post {
        type Key = &'static str;

        fn identity(&self) -> &'static str {
            self.0
        }
    }

    /// Serves scripted pages keyed by the cursor they answer.
    #[derive(Default)]
    struct Script {
        pages: Mutex<HashMap<Option<String>, VecDeque<ApiResult<CursorPage<Post>>>>>,
        requests: Mutex<Vec<Option<String>>>,
    }

    impl Script {
        fn on(self, cursor: Option<&str>, page: ApiResult<CursorPage<Post>>) -> Self {
            self.pages
                .lock()
                .unwrap()
                .entry(cursor.map(str::to_string))
                .or_default()
                .push_back(page);
            self
        }

        fn requests(&self) -> Vec<Option<String>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<'a> PageSource<Post> for &'a Script {
        async fn fetch_page(&self, cursor: Option<&str>) -> ApiResult<CursorPage<Post>> {
            let key = cursor.map(str::to_string);
            self.requests.lock().unwrap().push(key.clone());
            self.pages
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(VecDeque::pop_front)
                .unwrap_or(Err(ApiError::from_status(404, "no such page")))
        }
    }

    fn posts(ids: &[&'static str]) -> Vec<Post> {
        ids.iter().map(|id| Post(*id)).collect()
    }

    fn page(ids: &[&'static str], cursor: Option<&str>) -> CursorPage<Post> {
        CursorPage::new(posts(ids), cursor.map(str::to_string))
    }

    #[tokio::test]
    async fn first_page_puts_pinned_first_without_duplicates() {
        let script = Script::default().on(
            None,
            Ok(page(&["B", "C", "D"], None).with_pinned(posts(&["A", "B"]))),
        );
        let mut list = PaginatedList::new(&script);

        let loaded = list.load_first_page().await.unwrap();
        assert_eq!(loaded.items, posts(&["A", "B", "C", "D"]).as_slice());
        assert!(loaded.end_of_stream);
    }

    #[tokio::test]
    async fn pinned_items_stay_suppressed_on_later_pages() {
        let script = Script::default()
            .on(None, Ok(page(&["C", "D"], Some("p2")).with_pinned(posts(&["A"]))))
            .on(Some("p2"), Ok(page(&["A", "E"], None).with_pinned(posts(&["Z"]))));
        let mut list = PaginatedList::new(&script);

        list.load_first_page().await.unwrap();
        let loaded = list.load_next_page().await.unwrap();

        assert_eq!(loaded.items, posts(&["E"]).as_slice());
        assert_eq!(list.items(), posts(&["A", "C", "D", "E"]).as_slice());
        assert!(!list.has_more());
    }

    #[tokio::test]
    async fn empty_page_with_cursor_does_not_end_stream() {
        let script = Script::default()
            .on(None, Ok(page(&["A"], Some("x")).with_pinned(posts(&["A"]))))
            .on(Some("x"), Ok(page(&[], Some("y"))))
            .on(Some("y"), Ok(page(&[], None)));
        let mut list = PaginatedList::new(&script);

        list.load_first_page().await.unwrap();

        let loaded = list.load_next_page().await.unwrap();
        assert!(loaded.items.is_empty());
        assert!(!loaded.end_of_stream);
        assert!(list.has_more());

        let loaded = list.load_next_page().await.unwrap();
        assert!(loaded.end_of_stream);
        assert!(!list.has_more());
    }

    #[tokio::test]
    async fn nothing_is_fetched_after_end_of_stream() {
        let script = Script::default().on(None, Ok(page(&["A"], None)));
        let mut list = PaginatedList::new(&script);

        list.load_first_page().await.unwrap();
        let loaded = list.load_next_page().await.unwrap();

        assert!(loaded.items.is_empty());
        assert!(loaded.end_of_stream);
        assert_eq!(script.requests(), vec![None]);
    }

    #[tokio::test]
    async fn next_before_first_loads_first() {
        let script = Script::default().on(None, Ok(page(&["A"], Some("n"))));
        let mut list = PaginatedList::new(&script);
        assert!(!list.is_loaded());

        let loaded = list.load_next_page().await.unwrap();
        assert_eq!(loaded.items, posts(&["A"]).as_slice());
        assert_eq!(list.cursor(), Some("n"));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_list_untouched() {
        let script = Script::default()
            .on(None, Ok(page(&["A", "B"], Some("p2"))))
            .on(Some("p2"), Err(ApiError::connectivity("offline")))
            .on(Some("p2"), Ok(page(&["C"], None)));
        let mut list = PaginatedList::new(&script);

        list.load_first_page().await.unwrap();
        let err = list.load_next_page().await.unwrap_err();
        assert_eq!(err, ListError::Fetch(ApiError::connectivity("offline")));
        assert_eq!(list.items(), posts(&["A", "B"]).as_slice());
        assert_eq!(list.cursor(), Some("p2"));

        let loaded = list.load_next_page().await.unwrap();
        assert_eq!(loaded.items, posts(&["C"]).as_slice());
    }

    #[tokio::test]
    async fn refresh_discards_previous_suppression() {
        let script = Script::default()
            .on(None, Ok(page(&["B"], Some("p2")).with_pinned(posts(&["A"]))))
            .on(Some("p2"), Ok(page(&["C"], None)))
            .on(None, Ok(page(&["A", "C"], None).with_pinned(posts(&["B"]))));
        let mut list = PaginatedList::new(&script);

        list.load_first_page().await.unwrap();
        list.load_next_page().await.unwrap();
        assert_eq!(list.items(), posts(&["A", "B", "C"]).as_slice());

        let loaded = list.load_first_page().await.unwrap();
        assert_eq!(loaded.items, posts(&["B", "A", "C"]).as_slice());
        assert!(!list.has_more());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_old_pages() {
        let script = Script::default()
            .on(None, Ok(page(&["A"], Some("p2"))))
            .on(None, Err(ApiError::from_status(500, "boom")));
        let mut list = PaginatedList::new(&script);

        list.load_first_page().await.unwrap();
        assert!(list.load_first_page().await.is_err());

        assert_eq!(list.items(), posts(&["A"]).as_slice());
        assert_eq!(list.cursor(), Some("p2"));
    }

    const POOL: [&str; 12] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];

    fn pick(indices: Vec<usize>) -> Vec<&'static str> {
        indices.into_iter().map(|i| POOL[i]).collect()
    }

    proptest! {
        #[test]
        fn loaded_pages_show_pinned_first_and_never_repeat(
            pinned in proptest::collection::hash_set(0usize..12, 0..4),
            first in proptest::collection::hash_set(0usize..12, 0..8),
            second in proptest::collection::hash_set(0usize..12, 0..8),
        ) {
            let pinned = pick(pinned.into_iter().collect());
            let first = pick(first.into_iter().collect());
            let second = pick(second.into_iter().collect());

            let script = Script::default()
                .on(None, Ok(page(&first, Some("p2")).with_pinned(posts(&pinned))))
                .on(Some("p2"), Ok(page(&second, None)));
            let mut list = PaginatedList::new(&script);

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                list.load_first_page().await.unwrap();
                list.load_next_page().await.unwrap();
            });

            let mut expected = pinned.clone();
            for id in first.iter().chain(second.iter()) {
                if !expected.contains(id) {
                    expected.push(*id);
                }
            }
            let expected_posts = posts(&expected);
            prop_assert_eq!(list.items(), expected_posts.as_slice());
            prop_assert!(!list.has_more());
        }
    }
}
