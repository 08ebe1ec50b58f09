//! Merge & sort of per-listing review batches.
//!
//! Sorting is stable in both directions: reviews with equal keys keep their
//! fetch order (listing order first, then each listing's own order).

use models::{AnnotatedReview, Review, SortOrder, SortSpec};

/// Stable in-place sort by the numeric projection of `sort.sort_by`.
pub fn sort_reviews<T: AsRef<Review>>(items: &mut [T], sort: SortSpec) {
    let key = |item: &T| sort.sort_by.key(item.as_ref());
    match sort.sort_order {
        SortOrder::Asc => items.sort_by_key(key),
        SortOrder::Desc => items.sort_by(|a, b| key(b).cmp(&key(a))),
    }
}

/// Flatten batches in the order given and sort the result.
pub fn merge_batches(batches: Vec<Vec<AnnotatedReview>>, sort: SortSpec) -> Vec<AnnotatedReview> {
    let mut merged: Vec<AnnotatedReview> = batches.into_iter().flatten().collect();
    sort_reviews(&mut merged, sort);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::test_fixtures::annotated;
    use models::SortBy;

    fn ids(reviews: &[AnnotatedReview]) -> Vec<&str> { reviews.iter().map(|r| r.id()).collect() }

    #[test]
    fn created_at_desc_interleaves_listings() {
        let a = vec![annotated("a1", "A", "u1", 5, 30), annotated("a2", "A", "u2", 4, 10)];
        let b = vec![annotated("b1", "B", "u3", 3, 20)];
        let merged = merge_batches(vec![a, b], SortSpec::default());
        assert_eq!(ids(&merged), vec!["a1", "b1", "a2"]);
    }

    #[test]
    fn rating_asc_and_desc_are_stable_reverses() {
        let batch = vec![
            annotated("x", "A", "u", 4, 0),
            annotated("y", "A", "u", 2, 1),
            annotated("z", "A", "u", 4, 2),
            annotated("w", "B", "u", 5, 3),
            annotated("v", "B", "u", 2, 4),
        ];
        let asc = merge_batches(vec![batch.clone()], SortSpec::new(SortBy::Rating, SortOrder::Asc));
        let desc = merge_batches(vec![batch], SortSpec::new(SortBy::Rating, SortOrder::Desc));
        // ties keep input order in both directions
        assert_eq!(ids(&asc), vec!["y", "v", "x", "z", "w"]);
        assert_eq!(ids(&desc), vec!["w", "x", "z", "y", "v"]);
    }

    #[test]
    fn helpful_sort_uses_helpful_count() {
        let mut batch = vec![annotated("a", "A", "u", 3, 0), annotated("b", "A", "u", 3, 1), annotated("c", "A", "u", 3, 2)];
        batch[0].review.helpful_count = 2;
        batch[1].review.helpful_count = 9;
        batch[2].review.helpful_count = 2;
        let merged = merge_batches(vec![batch], SortSpec::new(SortBy::Helpful, SortOrder::Desc));
        assert_eq!(ids(&merged), vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_input_merges_to_empty() {
        assert!(merge_batches(vec![Vec::new(), Vec::new()], SortSpec::default()).is_empty());
    }
}
