//! # Pagination
//!
//! One-based paging over an ordered listing.
//!
//! Requests are clamped, never rejected: size into
//! `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`, page to at least 1. A page past the
//! end is empty.

use crate::primitives::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// One page of a listing plus the size of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Effective (clamped) page number.
    pub page: i64,
    /// Effective (clamped) page size.
    pub size: i64,
    /// Number of items across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Convert every item, keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

/// Cut page `page` of size `size` out of `all`.
#[must_use]
pub fn paginate<T>(all: Vec<T>, page: i64, size: i64) -> Page<T> {
    let size = size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let page = page.max(1);
    let total = all.len();

    let offset = (page - 1).saturating_mul(size);
    let from = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(size).unwrap_or(0);

    let items = if from >= total {
        Vec::new()
    } else {
        all.into_iter().skip(from).take(take).collect()
    };

    Page {
        items,
        page,
        size,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn first_page() {
        let page = paginate(numbers(20), 1, 8);
        assert_eq!(page.items, (0..8).collect::<Vec<_>>());
        assert_eq!(page.total, 20);
    }

    #[test]
    fn last_partial_page() {
        let page = paginate(numbers(20), 3, 8);
        assert_eq!(page.items, vec![16, 17, 18, 19]);
    }

    #[test]
    fn size_is_clamped_to_bounds() {
        assert_eq!(paginate(numbers(300), 1, 200).size, 100);
        assert_eq!(paginate(numbers(300), 1, 200).items.len(), 100);
        assert_eq!(paginate(numbers(3), 1, 0).size, 1);
        assert_eq!(paginate(numbers(3), 1, -5).size, 1);
    }

    #[test]
    fn page_is_clamped_to_one() {
        let page = paginate(numbers(20), -1, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = paginate(numbers(5), 4, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let page = paginate(numbers(5), i64::MAX, 100);
        assert!(page.items.is_empty());
    }

    #[test]
    fn map_keeps_metadata() {
        let page = paginate(numbers(5), 1, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![0, 10]);
        assert_eq!(page.total, 5);
        assert_eq!(page.size, 2);
    }
}
