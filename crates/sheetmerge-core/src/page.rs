//! Pagination.

use crate::error::{Error, Result};

/// One page of a sequence plus paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Slices `items` to page `page_number` (1-based) of `page_size` items.
///
/// Pages past the end are empty. Page 0 and a zero page size are rejected.
pub fn paginate<T: Clone>(items: &[T], page_number: usize, page_size: usize) -> Result<Page<T>> {
    if page_number == 0 {
        return Err(Error::validation("page", "page numbers start at 1"));
    }
    if page_size == 0 {
        return Err(Error::validation("pageSize", "page size must be at least 1"));
    }

    let total_items = items.len();
    let start = (page_number - 1).saturating_mul(page_size).min(total_items);
    let end = page_number.saturating_mul(page_size).min(total_items);

    Ok(Page {
        items: items[start..end].to_vec(),
        current_page: page_number,
        page_size,
        total_items,
        total_pages: total_pages(total_items, page_size),
        has_more: end < total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_page() {
        let items: Vec<u32> = (0..205).collect();
        let page = paginate(&items, 5, 50).unwrap();
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.items, (200..205).collect::<Vec<_>>());
        assert!(!page.has_more);

        let page = paginate(&items, 4, 50).unwrap();
        assert_eq!(page.items.len(), 50);
        assert!(page.has_more);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items = [1, 2, 3];
        let page = paginate(&items, 9, 2).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_more);
    }

    #[test]
    fn test_empty_sequence() {
        let page = paginate::<u8>(&[], 1, 10).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_more);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(paginate(&[1], 0, 10).unwrap_err().is_validation());
        assert!(paginate(&[1], 1, 0).unwrap_err().is_validation());
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let page = paginate(&[1, 2], usize::MAX, usize::MAX).unwrap();
        assert!(page.items.is_empty());
    }
}
