use std::collections::HashSet;
use std::hash::Hash;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use appealwall_core::ApiResult;

/// Items with a stable identity, used for de-duplication.
pub trait Identified {
    type Key: Eq + Hash + Clone + core::fmt::Debug + Send + Sync;

    fn identity(&self) -> Self::Key;
}

/// One page of a cursor-paginated response.
///
/// `cursor == None` marks the end of the stream. `pinned` is only meaningful
/// on the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub pinned: Option<Vec<T>>,
    pub data: Vec<T>,
    pub cursor: Option<String>,
}

impl<T> CursorPage<T> {
    pub fn new(data: Vec<T>, cursor: Option<String>) -> Self {
        Self {
            pinned: None,
            data,
            cursor,
        }
    }

    pub fn with_pinned(mut self, pinned: Vec<T>) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Where list pages come from.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the page after `cursor`, or the first page when `cursor` is None.
    async fn fetch_page(&self, cursor: Option<&str>) -> ApiResult<CursorPage<T>>;
}

/// `pinned ++ data`, with pinned identities removed from `data`.
///
/// The relative order of the remaining `data` items is preserved.
pub fn merge_first_page<T: Identified>(pinned: Vec<T>, data: Vec<T>) -> Vec<T> {
    let pinned_keys: HashSet<T::Key> = pinned.iter().map(|p| p.identity()).collect();
    let mut merged = pinned;
    merged.extend(data.into_iter().filter(|item| !pinned_keys.contains(&item.identity())));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Item(u32);

    impl Identified for Item {
        type Key = u32;

        fn identity(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn pinned_items_are_suppressed_from_data() {
        let merged = merge_first_page(vec![Item(1), Item(2)], vec![Item(2), Item(3), Item(4)]);
        assert_eq!(merged, vec![Item(1), Item(2), Item(3), Item(4)]);
    }

    #[test]
    fn page_without_pinned_field_deserializes() {
        let page: CursorPage<Item> = serde_json::from_str(r#"{"data":[1,2],"cursor":null}"#).unwrap();
        assert_eq!(page.pinned, None);
        assert!(page.is_last());

        let page: CursorPage<Item> =
            serde_json::from_str(r#"{"pinned":[9],"data":[],"cursor":"abc"}"#).unwrap();
        assert_eq!(page.pinned, Some(vec![Item(9)]));
        assert!(!page.is_last());
    }

    proptest! {
        #[test]
        fn merged_page_is_pinned_then_remaining_data_in_order(
            pinned in proptest::collection::hash_set(0u32..50, 0..6),
            data in proptest::collection::hash_set(0u32..50, 0..20),
        ) {
            let pinned: Vec<Item> = pinned.into_iter().map(Item).collect();
            let data: Vec<Item> = data.into_iter().map(Item).collect();

            let merged = merge_first_page(pinned.clone(), data.clone());

            prop_assert_eq!(&merged[..pinned.len()], &pinned[..]);
            let expected_rest: Vec<Item> = data
                .iter()
                .filter(|d| !pinned.contains(d))
                .cloned()
                .collect();
            prop_assert_eq!(&merged[pinned.len()..], &expected_rest[..]);

            let unique: HashSet<u32> = merged.iter().map(|i| i.0).collect();
            prop_assert_eq!(unique.len(), merged.len());
        }
    }
}
