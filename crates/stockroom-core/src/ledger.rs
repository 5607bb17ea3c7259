//! # Ledger Pagination
//!
//! The ledger itself lives in the store; this module holds the paging
//! rules shared by every list operation (articles, products, transactions).

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// A limit/offset window over an id-ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Builds a page, falling back to defaults for out-of-range input.
    ///
    /// A limit below 1 becomes [`DEFAULT_PAGE_LIMIT`], a limit above
    /// [`MAX_PAGE_LIMIT`] is capped, and a negative offset becomes 0.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit < 1 {
            DEFAULT_PAGE_LIMIT
        } else {
            limit.min(MAX_PAGE_LIMIT)
        };

        Page {
            limit,
            offset: offset.max(0),
        }
    }

    /// The first page with the default limit.
    pub fn first() -> Self {
        Page::new(DEFAULT_PAGE_LIMIT, 0)
    }

    /// The page right after this one.
    pub fn next(&self) -> Self {
        Page {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        assert_eq!(Page::new(0, -5), Page { limit: DEFAULT_PAGE_LIMIT, offset: 0 });
        assert_eq!(Page::new(10_000, 3), Page { limit: MAX_PAGE_LIMIT, offset: 3 });
        assert_eq!(Page::default(), Page::first());
    }

    #[test]
    fn test_next_page() {
        let page = Page::new(20, 0).next();
        assert_eq!(page, Page { limit: 20, offset: 20 });
    }
}
