//! Pagination utilities for service layer
//!
//! Provides a simple `PageRequest` struct, input normalisation and the
//! rating-filtered slicing used by every aggregate response.

use models::{AnnotatedReview, FilterState, Pagination};

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Clamp to sane values: page 0 becomes 1, per_page lands in `1..=max_per_page`.
    pub fn normalize(self, max_per_page: u32) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, max_per_page.max(1));
        Self { page, per_page }
    }

    fn offset(self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.per_page as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

/// Slice one page out of the merged stream after applying the rating filter.
///
/// A page past the end yields an empty slice, never an error.
pub fn paginate(
    full: &[AnnotatedReview],
    filter: FilterState,
    request: PageRequest,
) -> (Vec<AnnotatedReview>, Pagination) {
    let total = full.iter().filter(|r| filter.matches(r.rating())).count();
    let page: Vec<AnnotatedReview> = full
        .iter()
        .filter(|r| filter.matches(r.rating()))
        .skip(request.offset())
        .take(request.per_page as usize)
        .cloned()
        .collect();
    (page, Pagination::new(request.page, request.per_page, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::test_fixtures::annotated;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let req = PageRequest { page: 0, per_page: 0 }.normalize(100);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let req = PageRequest { page: 5, per_page: 1000 }.normalize(100);
        assert_eq!(req.page, 5);
        assert_eq!(req.per_page, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = PageRequest::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
    }

    #[test]
    fn filter_narrows_page_and_total() {
        let full: Vec<_> = [5, 3, 5, 1, 5].iter().enumerate().map(|(i, r)| annotated(&format!("r{i}"), "A", "u", *r, i as i64)).collect();
        let (page, meta) = paginate(&full, FilterState::Five, PageRequest::new(1, 2));
        assert_eq!(page.iter().map(|r| r.id()).collect::<Vec<_>>(), vec!["r0", "r2"]);
        assert_eq!(meta.total, 3);
        assert_eq!(meta.pages, 2);
        assert!(meta.has_next);

        let (second, meta) = paginate(&full, FilterState::Five, PageRequest::new(2, 2));
        assert_eq!(second.iter().map(|r| r.id()).collect::<Vec<_>>(), vec!["r4"]);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn page_past_end_is_empty_not_error() {
        let full: Vec<_> = (0..3).map(|i| annotated(&format!("r{i}"), "A", "u", 4, i)).collect();
        let (page, meta) = paginate(&full, FilterState::All, PageRequest::new(9, 10));
        assert!(page.is_empty());
        assert_eq!(meta.total, 3);
        assert_eq!(meta.pages, 1);
        assert!(!meta.has_next);
    }

    #[test]
    fn filter_without_matches_yields_zero_pages() {
        let full: Vec<_> = (0..3).map(|i| annotated(&format!("r{i}"), "A", "u", 4, i)).collect();
        let (page, meta) = paginate(&full, FilterState::Two, PageRequest::new(1, 10));
        assert!(page.is_empty());
        assert_eq!((meta.total, meta.pages), (0, 0));
    }
}
