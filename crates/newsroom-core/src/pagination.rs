//! Page arithmetic for the listing workflow.

use serde::Serialize;

use crate::error::DomainError;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: u64, size: u64) -> Self {
        Self { number, size }
    }

    pub fn offset(&self) -> u64 {
        self.number.saturating_sub(1) * self.size
    }

    /// Number of pages for `total` items. An empty collection still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        if self.size == 0 {
            return 1;
        }
        total.div_ceil(self.size).max(1)
    }

    /// Reject page numbers outside `1..=num_pages`.
    pub fn validate(&self, total: u64) -> Result<(), DomainError> {
        if self.number == 0 || self.number > self.num_pages(total) {
            return Err(DomainError::InvalidPage(self.number));
        }
        Ok(())
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            number: request.number,
            num_pages: request.num_pages(total),
            total,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages_rounds_up() {
        let req = PageRequest::new(1, 3);
        assert_eq!(req.num_pages(7), 3);
        assert_eq!(req.num_pages(6), 2);
        assert_eq!(req.num_pages(0), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 3).offset(), 0);
        assert_eq!(PageRequest::new(3, 3).offset(), 6);
    }

    #[test]
    fn test_validate_rejects_out_of_range_pages() {
        assert!(PageRequest::new(1, 3).validate(0).is_ok());
        assert!(PageRequest::new(3, 3).validate(7).is_ok());
        assert!(matches!(
            PageRequest::new(4, 3).validate(7),
            Err(DomainError::InvalidPage(4))
        ));
        assert!(PageRequest::new(0, 3).validate(7).is_err());
    }

    #[test]
    fn test_page_navigation_flags() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(2, 3), 7);
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
