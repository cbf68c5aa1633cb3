//! Overflow detection and fallback pagination arithmetic.

use crate::{PageNumber, PageSize, WindowSize};

/// Entries of a collection not covered by the bulk window.
///
/// A non-zero surplus means the bulk edges are incomplete.
pub fn surplus(total_count: u64, window: WindowSize) -> u64 {
    total_count.saturating_sub(window.as_u64())
}

/// Number of fallback pages needed to cover `surplus` entries.
pub fn page_count(surplus: u64, page_size: PageSize) -> u64 {
    surplus.div_ceil(page_size.as_u64())
}

/// Iterates page numbers `1..=page_count(surplus, page_size)`.
pub fn fallback_pages(surplus: u64, page_size: PageSize) -> impl Iterator<Item = PageNumber> {
    (1..=page_count(surplus, page_size)).filter_map(PageNumber::new)
}
