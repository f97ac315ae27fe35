//! List queries, list results and the pagination reconciler.
//!
//! Backends report paging in several shapes, or not at all. Whatever arrives is
//! reduced to a [`PageHint`] by the envelope adapter and then reconciled here
//! into one canonical [`PaginationMeta`] the list screens can trust.

use serde::{Deserialize, Serialize};

use crate::types::PageSize;
use crate::utils::contains_ignore_case;

/// Search term, 1-based page and page size for one list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: String,
    pub page: u32,
    pub limit: PageSize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            limit: PageSize::default(),
        }
    }
}

impl ListQuery {
    /// Build a query, lifting page 0 to page 1.
    pub fn new(search: impl Into<String>, page: u32, limit: PageSize) -> Self {
        Self {
            search: search.into(),
            page: page.max(1),
            limit,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: PageSize) -> Self {
        self.limit = limit;
        self.page = 1;
        self
    }
}

/// Paging numbers as reported by a backend, before reconciliation.
///
/// A zero is treated the same as a missing value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageHint {
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub total_items: Option<u64>,
    pub items_per_page: Option<u32>,
}

impl From<PaginationMeta> for PageHint {
    fn from(meta: PaginationMeta) -> Self {
        Self {
            current_page: Some(meta.current_page),
            total_pages: Some(meta.total_pages),
            total_items: Some(meta.total_items),
            items_per_page: Some(meta.items_per_page),
        }
    }
}

/// One page of records plus whatever paging metadata came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub pagination: Option<PageHint>,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, pagination: Option<PageHint>) -> Self {
        Self { items, pagination }
    }

    /// Reconciled metadata for this page under `query`.
    pub fn meta(&self, query: &ListQuery) -> PaginationMeta {
        reconcile(self.pagination, query, self.items.len())
    }
}

/// Canonical paging record shown by list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
}

impl PaginationMeta {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Page buttons to show around the current page.
    pub fn window(&self) -> Vec<u32> {
        page_window(self.current_page, self.total_pages)
    }
}

fn non_zero<N: PartialEq + Default + Copy>(value: Option<N>) -> Option<N> {
    value.filter(|v| *v != N::default())
}

/// Derive canonical metadata for a page of `item_count` records.
///
/// With a hint, the reported numbers are adopted and made consistent:
/// `total_pages` is never below `ceil(total_items / items_per_page)` or 1, and
/// `current_page` is clamped into range. Without one, the page is assumed to
/// have a successor exactly when it came back full.
///
/// Reconciling an already reconciled record returns it unchanged.
pub fn reconcile(hint: Option<PageHint>, query: &ListQuery, item_count: usize) -> PaginationMeta {
    let requested_page = query.page.max(1);
    let limit = query.limit.as_u32();

    let Some(hint) = hint else {
        let total_pages = if item_count >= limit as usize {
            (requested_page + 1).max(2)
        } else {
            requested_page
        };
        return PaginationMeta {
            current_page: requested_page,
            total_pages,
            total_items: item_count as u64,
            items_per_page: limit,
        };
    };

    let current_page = non_zero(hint.current_page).unwrap_or(requested_page);
    let items_per_page = non_zero(hint.items_per_page).unwrap_or(limit).max(1);
    let total_items = hint.total_items.unwrap_or_else(|| {
        // Lower bound: everything before this page plus this page.
        u64::from(current_page.saturating_sub(1)) * u64::from(items_per_page) + item_count as u64
    });
    let derived_pages = total_items.div_ceil(u64::from(items_per_page));
    let derived_pages = u32::try_from(derived_pages).unwrap_or(u32::MAX);
    let total_pages = non_zero(hint.total_pages)
        .unwrap_or(0)
        .max(derived_pages)
        .max(1);

    PaginationMeta {
        current_page: current_page.clamp(1, total_pages),
        total_pages,
        total_items,
        items_per_page,
    }
}

/// Three-button pager window centred on `current`, shifted at the edges.
///
/// Empty when there are no pages.
pub fn page_window(current: u32, total: u32) -> Vec<u32> {
    let mut start = current.saturating_sub(1).max(1);
    let mut end = start + 2;
    if end > total {
        end = total;
        start = total.saturating_sub(2).max(1);
    }
    (start..=end).collect()
}

/// Filter by `label` and slice one page out of a fully loaded collection.
///
/// Used by stores that hold every record locally and so know exact totals.
pub fn paginate_in_memory<T>(
    items: Vec<T>,
    query: &ListQuery,
    label: impl Fn(&T) -> &str,
) -> ListResult<T> {
    let matching: Vec<T> = items
        .into_iter()
        .filter(|item| contains_ignore_case(label(item), &query.search))
        .collect();

    let limit = query.limit.as_usize();
    let total_items = matching.len() as u64;
    let total_pages = (matching.len().div_ceil(limit)).max(1) as u32;
    let current_page = query.page.clamp(1, total_pages);
    let skip = (current_page as usize - 1) * limit;

    let page: Vec<T> = matching.into_iter().skip(skip).take(limit).collect();

    ListResult::new(
        page,
        Some(PageHint {
            current_page: Some(current_page),
            total_pages: Some(total_pages),
            total_items: Some(total_items),
            items_per_page: Some(limit as u32),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: u32) -> ListQuery {
        ListQuery::new("", page, PageSize::Ten)
    }

    #[test]
    fn test_full_first_page_without_metadata() {
        let meta = reconcile(None, &query(1), 10);
        assert_eq!(
            meta,
            PaginationMeta {
                current_page: 1,
                total_pages: 2,
                total_items: 10,
                items_per_page: 10
            }
        );
    }

    #[test]
    fn test_short_page_without_metadata_is_last() {
        let meta = reconcile(None, &query(3), 4);
        assert_eq!(
            meta,
            PaginationMeta {
                current_page: 3,
                total_pages: 3,
                total_items: 4,
                items_per_page: 10
            }
        );
    }

    #[test]
    fn test_empty_first_page_without_metadata() {
        let meta = reconcile(None, &query(1), 0);
        assert_eq!(meta.total_pages, 1);
        assert_eq!(meta.total_items, 0);
        assert!(!meta.has_next());
    }

    #[test]
    fn test_full_later_page_without_metadata_has_successor() {
        let meta = reconcile(None, &query(4), 10);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_next());
    }

    #[test]
    fn test_metadata_total_pages_raised_to_item_count() {
        let hint = PageHint {
            current_page: Some(1),
            total_pages: Some(1),
            total_items: Some(45),
            items_per_page: Some(10),
        };
        let meta = reconcile(Some(hint), &query(1), 10);
        assert_eq!(meta.total_pages, 5);
        assert_eq!(meta.total_items, 45);
    }

    #[test]
    fn test_metadata_zero_values_fall_back_to_query() {
        let hint = PageHint {
            current_page: Some(0),
            total_pages: Some(0),
            total_items: Some(25),
            items_per_page: Some(0),
        };
        let meta = reconcile(Some(hint), &ListQuery::new("", 2, PageSize::Twenty), 5);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.items_per_page, 20);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_metadata_current_page_clamped() {
        let hint = PageHint {
            current_page: Some(9),
            total_pages: Some(3),
            total_items: Some(30),
            items_per_page: Some(10),
        };
        let meta = reconcile(Some(hint), &query(9), 0);
        assert_eq!(meta.current_page, 3);
    }

    #[test]
    fn test_metadata_without_total_items_uses_lower_bound() {
        let hint = PageHint {
            current_page: Some(2),
            total_pages: Some(4),
            ..PageHint::default()
        };
        let meta = reconcile(Some(hint), &query(2), 10);
        assert_eq!(meta.total_items, 20);
        assert_eq!(meta.total_pages, 4);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let cases = [
            (None, query(1), 10),
            (None, query(3), 4),
            (
                Some(PageHint {
                    current_page: Some(7),
                    total_pages: Some(2),
                    total_items: Some(33),
                    items_per_page: Some(10),
                }),
                query(7),
                3,
            ),
        ];
        for (hint, q, count) in cases {
            let once = reconcile(hint, &q, count);
            let twice = reconcile(Some(once.into()), &q, count);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3]);
        assert_eq!(page_window(5, 10), vec![4, 5, 6]);
        assert_eq!(page_window(10, 10), vec![8, 9, 10]);
        assert_eq!(page_window(1, 2), vec![1, 2]);
        assert_eq!(page_window(1, 1), vec![1]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_query_setters_normalize_page() {
        let q = ListQuery::new("x", 0, PageSize::Ten);
        assert_eq!(q.page, 1);
        let q = q.with_page(4).with_search("admin");
        assert_eq!(q.page, 1);
        let q = q.with_page(3).with_limit(PageSize::Fifty);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, PageSize::Fifty);
    }

    #[test]
    fn test_query_serializes_as_request_body() {
        let body = serde_json::to_value(ListQuery::new("ad", 2, PageSize::Twenty)).unwrap();
        assert_eq!(body, serde_json::json!({"search": "ad", "page": 2, "limit": 20}));
    }

    #[test]
    fn test_paginate_in_memory() {
        let names: Vec<String> = (1..=23).map(|i| format!("Item {i}")).collect();

        let result = paginate_in_memory(names.clone(), &query(3), |s| s.as_str());
        assert_eq!(result.items.len(), 3);
        let meta = result.meta(&query(3));
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total_items, 23);

        let q = ListQuery::new("item 2", 1, PageSize::Ten);
        let result = paginate_in_memory(names, &q, |s| s.as_str());
        // "Item 2" and "Item 20".."Item 23"
        assert_eq!(result.items.len(), 5);
    }
}
