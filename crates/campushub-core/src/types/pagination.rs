//! Pagination cursor for paged API responses.

use serde::{Deserialize, Serialize};

/// Cursor state of a paginated listing, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number (1-based).
    pub current_page: u64,
    /// Last available page number.
    pub last_page: u64,
}

impl PageMeta {
    /// Create a cursor from server-reported page numbers.
    pub fn new(current_page: u64, last_page: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            last_page: last_page.max(1),
        }
    }

    /// Cursor before anything has been fetched.
    pub fn first() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
        }
    }

    /// Whether a further page is available.
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    /// The next page number, when one is available.
    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then_some(self.current_page + 1)
    }
}

impl Default for PageMeta {
    fn default() -> Self {
        Self::first()
    }
}
