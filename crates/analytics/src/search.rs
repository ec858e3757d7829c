//! Client list search and pagination.

use serde::{Deserialize, Serialize};
use trustlens_core::{ClientField, ClientRecord};

/// Page numbers shown around the current page.
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Records with any cell containing `query`, case-insensitively.
/// An empty query matches everything.
pub fn filter_clients<'a>(roster: &'a [ClientRecord], query: &str) -> Vec<&'a ClientRecord> {
    let needle = query.to_lowercase();
    roster
        .iter()
        .filter(|record| {
            needle.is_empty()
                || record
                    .cell_texts()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Look up a record by certificate number, compared as text.
pub fn find_by_cert<'a>(roster: &'a [ClientRecord], cert: &str) -> Option<&'a ClientRecord> {
    let cert = cert.trim();
    roster
        .iter()
        .find(|r| r.text(ClientField::CertNumber).as_deref() == Some(cert))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based, clamped to `[1, total_pages]` (or 1 when there are no pages).
    pub current_page: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    /// Slice bounds into the filtered list.
    pub start: usize,
    pub end: usize,
    /// At most [`MAX_VISIBLE_PAGES`] page numbers around the current page.
    pub window: Vec<usize>,
}

/// Paginate `len` items.
pub fn paginate(len: usize, page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = len.div_ceil(page_size);
    let current_page = page.clamp(1, total_pages.max(1));

    let start = ((current_page - 1) * page_size).min(len);
    let end = (start + page_size).min(len);

    let half = MAX_VISIBLE_PAGES / 2;
    let mut first = current_page.saturating_sub(half).max(1);
    let last = (first + MAX_VISIBLE_PAGES - 1).min(total_pages);
    if last + 1 < first + MAX_VISIBLE_PAGES {
        first = (last + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }
    let window = if total_pages == 0 {
        Vec::new()
    } else {
        (first..=last).collect()
    };

    Pagination {
        current_page,
        total_pages,
        items_per_page: page_size,
        start,
        end,
        window,
    }
}
