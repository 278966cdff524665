use serde::{Deserialize, Serialize};

use crate::config;

/// Manual pagination computed from `page_size`/`page_number` query params.
/// Offset-based; no cursor stability guarantee across concurrent writes.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

impl Page {
    pub fn limit(&self) -> i64 {
        let api = &config::config().api;
        self.page_size
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size)
    }

    pub fn offset(&self) -> i64 {
        let page_number = self.page_number.unwrap_or(1).max(1);
        // page_number is client-supplied; saturate rather than overflow
        (page_number - 1).saturating_mul(self.limit())
    }

    pub fn page_number(&self) -> i64 {
        self.page_number.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page_number: i64,
    pub page_size: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: &Page) -> Self {
        Self {
            items,
            total,
            page_number: page.page_number(),
            page_size: page.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let page = Page::default();
        assert_eq!(page.limit(), 20);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.page_number(), 1);
    }

    #[test]
    fn successive_pages_are_disjoint() {
        let p1 = Page { page_size: Some(10), page_number: Some(1) };
        let p2 = Page { page_size: Some(10), page_number: Some(2) };
        assert_eq!(p1.offset() + p1.limit(), p2.offset());
    }

    #[test]
    fn page_size_is_clamped_to_max() {
        let page = Page { page_size: Some(10_000), page_number: Some(1) };
        assert!(page.limit() <= crate::config::config().api.max_page_size);
    }

    #[test]
    fn nonpositive_inputs_are_sanitized() {
        let page = Page { page_size: Some(0), page_number: Some(-3) };
        assert_eq!(page.limit(), 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn huge_page_number_saturates_instead_of_overflowing() {
        let page = Page { page_size: Some(100), page_number: Some(i64::MAX) };
        assert_eq!(page.offset(), i64::MAX);

        let page = Page { page_size: Some(1), page_number: Some(i64::MAX) };
        assert!(page.offset() >= 0);
    }
}
