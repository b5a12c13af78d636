use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A validated page of a listing; both values start at one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows to skip, or `None` when it is negative or does not fit in an `i64`
    #[must_use]
    pub fn checked_offset(&self) -> Option<i64> {
        self.page
            .checked_sub(1)?
            .checked_mul(self.limit)
            .filter(|offset| *offset >= 0)
    }

    /// Number of rows to skip; saturates instead of overflowing
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }
}

/// Pagination details returned alongside a listing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    #[must_use]
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let limit = request.limit.max(1);
        let total_pages = (total_items + limit - 1) / limit;
        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.limit,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn test_offset_overflow() {
        let request = PageRequest::new(i64::MAX, 10);
        assert_eq!(request.checked_offset(), None);
        assert_eq!(request.offset(), i64::MAX);
        assert_eq!(PageRequest::new(i64::MIN, 10).checked_offset(), None);
        assert_eq!(
            PageRequest::new(i64::MAX / 10 + 1, 10).checked_offset(),
            Some(i64::MAX / 10 * 10)
        );
    }

    #[test]
    fn test_first_of_many_pages() {
        let pagination = Pagination::new(PageRequest::new(1, 10), 25);

        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn test_last_page() {
        let pagination = Pagination::new(PageRequest::new(3, 10), 30);

        assert_eq!(pagination.total_pages, 3);
        assert!(!pagination.has_next);
        assert!(pagination.has_prev);
    }

    #[test]
    fn test_empty_listing() {
        let pagination = Pagination::new(PageRequest::new(1, 10), 0);

        assert_eq!(pagination.total_pages, 0);
        assert_eq!(pagination.total_items, 0);
        assert!(!pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn test_serialize() -> anyhow::Result<()> {
        let pagination = Pagination::new(PageRequest::new(2, 5), 11);
        let value = serde_json::to_value(pagination)?;

        assert_eq!(
            value,
            serde_json::json!({
                "current_page": 2,
                "total_pages": 3,
                "total_items": 11,
                "items_per_page": 5,
                "has_next": true,
                "has_prev": true,
            })
        );
        Ok(())
    }
}
