//! Aggregate statistics over the full, unfiltered review set.

use std::collections::{BTreeMap, HashSet};

use models::review::{MAX_RATING, MIN_RATING};
use models::{AggregateStatistics, AnnotatedReview, FilterState, PerformanceTier};

/// Average rating in tenths, rounded half away from zero; 0 for no reviews.
///
/// Integer arithmetic so that e.g. 17/4 always lands on 43.
pub fn average_tenths(rating_sum: u64, count: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    ((rating_sum * 20 + count) / (count * 2)) as u32
}

pub fn compute(reviews: &[AnnotatedReview]) -> AggregateStatistics {
    let total_reviews = reviews.len();
    if total_reviews == 0 {
        return AggregateStatistics::empty();
    }

    let rating_sum: u64 = reviews.iter().map(|r| u64::from(r.rating())).sum();
    let tenths = average_tenths(rating_sum, total_reviews as u64);
    let total_customers = reviews.iter().map(|r| r.user_id()).collect::<HashSet<_>>().len();
    let performance_tier = PerformanceTier::from_average_tenths(total_reviews, tenths);

    let mut rating_distribution: BTreeMap<u8, usize> = (MIN_RATING..=MAX_RATING).map(|k| (k, 0)).collect();
    for review in reviews {
        if let Some(slot) = rating_distribution.get_mut(&review.rating()) {
            *slot += 1;
        }
    }

    let filter_counts = FilterState::MENU
        .iter()
        .map(|filter| {
            let count = match filter.rating() {
                None => total_reviews,
                Some(k) => rating_distribution.get(&k).copied().unwrap_or(0),
            };
            (*filter, count)
        })
        .collect();

    AggregateStatistics {
        average_rating: f64::from(tenths) / 10.0,
        total_reviews,
        total_customers,
        performance_tier,
        rating_distribution,
        filter_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::test_fixtures::annotated;

    fn with_ratings(ratings: &[u8]) -> Vec<AnnotatedReview> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, r)| annotated(&format!("r{i}"), "A", &format!("u{i}"), *r, i as i64))
            .collect()
    }

    #[test]
    fn two_listing_scenario() {
        let mut reviews = with_ratings(&[5, 4, 5]);
        reviews.push(annotated("b0", "B", "ub", 3, 9));
        let stats = compute(&reviews);

        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.average_rating, 4.3);
        assert_eq!(stats.performance_tier, PerformanceTier::VeryGood);
        assert_eq!(stats.rating_distribution, BTreeMap::from([(1, 0), (2, 0), (3, 1), (4, 1), (5, 2)]));
        assert_eq!(
            stats.filter_menu(),
            vec![(FilterState::All, 4), (FilterState::Five, 2), (FilterState::Four, 1), (FilterState::Three, 1)]
        );
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(average_tenths(17, 4), 43);
        assert_eq!(average_tenths(9, 4), 23);
        // 4.45 -> 4.5
        assert_eq!(average_tenths(89, 20), 45);
        assert_eq!(average_tenths(0, 0), 0);
    }

    #[test]
    fn average_stays_within_bounds_and_one_decimal() {
        let cases: [&[u8]; 5] = [&[1], &[5, 5, 5], &[1, 2], &[2, 3, 3], &[1, 5, 5, 5, 4, 2, 3]];
        for ratings in cases {
            let stats = compute(&with_ratings(ratings));
            assert!((0.0..=5.0).contains(&stats.average_rating));
            let scaled = stats.average_rating * 10.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn distribution_sums_to_total() {
        let stats = compute(&with_ratings(&[1, 1, 2, 5, 5, 5, 3, 4]));
        assert_eq!(stats.rating_distribution.values().sum::<usize>(), stats.total_reviews);
        assert_eq!(stats.filter_count(FilterState::All), stats.total_reviews);
        for k in 1..=5u8 {
            let filter = FilterState::from_rating(k).unwrap();
            assert_eq!(stats.filter_count(filter), stats.rating_distribution[&k]);
        }
    }

    #[test]
    fn customers_are_distinct_users() {
        let reviews = vec![
            annotated("a", "A", "alice", 5, 0),
            annotated("b", "B", "alice", 4, 1),
            annotated("c", "B", "bob", 2, 2),
        ];
        let stats = compute(&reviews);
        assert_eq!(stats.total_customers, 2);
        assert!(stats.total_customers <= stats.total_reviews);
    }

    #[test]
    fn no_reviews_is_sentinel_tier() {
        let stats = compute(&[]);
        assert_eq!(stats.performance_tier, PerformanceTier::NoReviews);
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn low_average_needs_improvement() {
        let stats = compute(&with_ratings(&[1, 2, 3, 2]));
        assert_eq!(stats.average_rating, 2.0);
        assert_eq!(stats.performance_tier, PerformanceTier::NeedsImprovement);
    }
}
