//! Pagination types for list endpoints.

use serde::Serialize;

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            0
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1 && total_pages > 0,
        }
    }
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(page, per_page, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_records_at_page_size_three() {
        // page 1: three most recent
        let meta = PaginationMeta::new(1, 3, 7);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_previous);

        // page 3: the single remaining record
        let meta = PaginationMeta::new(3, 3, 7);
        assert!(!meta.has_next);
        assert!(meta.has_previous);

        // page 4: past the end
        let meta = PaginationMeta::new(4, 3, 7);
        assert!(!meta.has_next);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let meta = PaginationMeta::new(1, 3, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_previous);
    }

    #[test]
    fn exact_multiple_has_no_extra_page() {
        let meta = PaginationMeta::new(2, 3, 6);
        assert_eq!(meta.total_pages, 2);
        assert!(!meta.has_next);
    }
}
