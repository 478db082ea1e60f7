use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// Pagination parameters. `page` is 1-based.
#[derive(Debug, Clone, Deserialize)]
pub struct Pageable {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

impl Default for Pageable {
    fn default() -> Self {
        Self { page: 1, size: 20 }
    }
}

impl Pageable {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Reject `page < 1` and `size < 1` before any query is built.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.page < 1 {
            return Err(DataError::InvalidArgument(
                "page index is 1-based and must be >= 1".into(),
            ));
        }
        if self.size < 1 {
            return Err(DataError::InvalidArgument(
                "page size must be >= 1".into(),
            ));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.size
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let total_pages = if pageable.size == 0 {
            0
        } else {
            total_elements.div_ceil(pageable.size)
        };
        Self {
            content,
            page: pageable.page,
            size: pageable.size,
            total_elements,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_based() {
        assert_eq!(Pageable::new(1, 10).offset(), 0);
        assert_eq!(Pageable::new(2, 10).offset(), 10);
        assert_eq!(Pageable::new(3, 7).offset(), 14);
    }

    #[test]
    fn zero_page_rejected() {
        assert!(Pageable::new(0, 10).validate().is_err());
        assert!(Pageable::new(1, 0).validate().is_err());
        assert!(Pageable::new(1, 1).validate().is_ok());
    }

    #[test]
    fn total_pages_round_up() {
        let page = Page::new(vec![1, 2, 3], &Pageable::new(1, 10), 25);
        assert_eq!(page.total_pages, 3);
    }
}
