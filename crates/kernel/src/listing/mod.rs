//! Listing query engine.
//!
//! Every paginated view in the portal (forum posts, merch catalog, news feed)
//! goes through this module: request parameters are normalized by [`params`],
//! the filtered/sorted/paged SQL is produced by [`query::ListingQuery`], and
//! the page window math lives in [`Pager`]. The engine is a pure read-side
//! projection — it never mutates state.

pub mod params;
pub mod query;

pub use params::{month_from, page_from, page_size_from, parse_i64_or, parse_nonneg_or};
pub use query::ListingQuery;

use serde::Serialize;

/// Sort direction for a listing rank column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (oldest first).
    Asc,
    /// Descending order (newest first). The default for every listing.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a `sort` request parameter. Anything other than `asc` is
    /// descending — malformed input falls back, it never errors.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    /// Whether this is the ascending direction.
    pub fn is_asc(self) -> bool {
        self == SortDirection::Asc
    }
}

/// Page window over a filtered, sorted item set.
///
/// `total` is the count of items matching the filters *before* pagination.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Pager {
    /// Effective 1-based page number.
    pub page: i64,
    /// Effective page size.
    pub page_size: i64,
    /// Count of items matching the filters, pre-pagination.
    pub total: i64,
}

impl Pager {
    /// Create a pager, clamping the page to at least 1.
    pub fn new(page: i64, page_size: i64, total: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            total: total.max(0),
        }
    }

    /// Start offset of this page's window.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// True iff a further page exists past this window.
    pub fn has_next(&self) -> bool {
        self.page * self.page_size < self.total
    }
}

/// A page of items plus its pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pager: Pager,
}

impl<T> Listing<T> {
    /// Build a listing from an already filtered and sorted in-memory set.
    ///
    /// Used by feed-style listings whose sort rank is computed in the
    /// application (e.g. parsed publish dates). A window past the end of
    /// the set yields an empty page, not an error.
    pub fn from_sorted(mut items: Vec<T>, page: i64, page_size: i64) -> Self {
        let pager = Pager::new(page, page_size, items.len() as i64);
        let start = pager.offset().min(items.len() as i64) as usize;
        let end = (pager.offset() + pager.page_size).min(items.len() as i64) as usize;
        let window: Vec<T> = items.drain(..).skip(start).take(end - start).collect();
        Self {
            items: window,
            pager,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn pager_window_math() {
        let p = Pager::new(1, 6, 11);
        assert_eq!(p.offset(), 0);
        assert!(p.has_next());

        let p2 = Pager::new(2, 6, 11);
        assert_eq!(p2.offset(), 6);
        assert!(!p2.has_next());
    }

    #[test]
    fn pager_exact_boundary_has_no_next() {
        // 12 items at size 6: page 2 is the last page.
        let p = Pager::new(2, 6, 12);
        assert!(!p.has_next());
        assert!(Pager::new(1, 6, 12).has_next());
    }

    #[test]
    fn pager_clamps_nonsense_input() {
        let p = Pager::new(0, 0, -5);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 1);
        assert_eq!(p.total, 0);
        assert!(!p.has_next());
    }

    #[test]
    fn from_sorted_slices_the_requested_window() {
        let items: Vec<i32> = (0..11).collect();
        let first = Listing::from_sorted(items.clone(), 1, 6);
        assert_eq!(first.items, vec![0, 1, 2, 3, 4, 5]);
        assert!(first.pager.has_next());

        let second = Listing::from_sorted(items, 2, 6);
        assert_eq!(second.items, vec![6, 7, 8, 9, 10]);
        assert!(!second.pager.has_next());
        assert_eq!(second.pager.total, 11);
    }

    #[test]
    fn from_sorted_out_of_range_is_empty_not_an_error() {
        let listing = Listing::from_sorted(vec![1, 2, 3], 999, 6);
        assert!(listing.items.is_empty());
        assert!(!listing.pager.has_next());
        assert_eq!(listing.pager.page, 999);
    }

    #[test]
    fn pages_partition_the_set_without_gaps_or_overlap() {
        let items: Vec<i32> = (0..23).collect();
        let mut seen = Vec::new();
        let mut page = 1;
        loop {
            let listing = Listing::from_sorted(items.clone(), page, 6);
            seen.extend(listing.items.iter().copied());
            if !listing.pager.has_next() {
                break;
            }
            page += 1;
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn sort_direction_parsing() {
        assert_eq!(SortDirection::from_param(None), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("sideways")), SortDirection::Desc);
    }
}
