//! Page arithmetic shared by every listing extractor.
//!
//! Extractors parse the total item count from the page and hand it here
//! together with the requested page number and the listing's page size.

use crate::{Page, Result, XiamiError};

/// Position of a page within a listing, before its rows are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub total: u32,
    pub last_page: u32,
    pub page: u32,
}

impl PageInfo {
    /// Attach the page's rows, producing the listing envelope.
    pub fn with_data<T>(self, data: Vec<T>) -> Page<T> {
        Page {
            total: self.total,
            last_page: self.last_page,
            page: self.page,
            data,
        }
    }
}

/// Reject page numbers below 1. Called before any request is made.
pub fn ensure_valid_page(page: u32) -> Result<()> {
    if page < 1 {
        return Err(XiamiError::InvalidPage(page));
    }
    Ok(())
}

/// Number of the last page holding `total` items at `page_size` per page.
///
/// A zero page size is treated as one item per page.
pub fn last_page(total: u32, page_size: u32) -> u32 {
    total.div_ceil(page_size.max(1))
}

/// Locate `page` within a listing of `total` items.
///
/// Returns `None` when the listing is empty or `page` lies past the last page.
pub fn paginate(total: u32, page: u32, page_size: u32) -> Option<PageInfo> {
    if total == 0 {
        return None;
    }

    let last_page = last_page(total, page_size);
    if page < 1 || page > last_page {
        log::debug!("Page {page} is outside 1..={last_page} ({total} items)");
        return None;
    }

    Some(PageInfo {
        total,
        last_page,
        page,
    })
}
