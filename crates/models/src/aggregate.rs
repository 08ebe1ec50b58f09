use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::FilterState;
use crate::review::{AnnotatedReview, MAX_RATING, MIN_RATING};

/// Page metadata for one slice of the (possibly filtered) review stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: usize) -> Self {
        let pages = total.div_ceil(limit.max(1) as usize);
        Self {
            page,
            limit,
            total,
            pages,
            has_next: (page as usize) < pages,
            has_prev: page > 1,
        }
    }
}

/// Label derived from the rounded average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    #[serde(rename = "Excellent")]
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Average")]
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    #[serde(rename = "No Reviews")]
    NoReviews,
}

impl PerformanceTier {
    /// Tier for an average expressed in tenths (43 == 4.3).
    pub fn from_average_tenths(total_reviews: usize, average_tenths: u32) -> Self {
        if total_reviews == 0 {
            return PerformanceTier::NoReviews;
        }
        match average_tenths {
            45..=u32::MAX => PerformanceTier::Excellent,
            40..=44 => PerformanceTier::VeryGood,
            35..=39 => PerformanceTier::Good,
            30..=34 => PerformanceTier::Average,
            _ => PerformanceTier::NeedsImprovement,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::VeryGood => "Very Good",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
            PerformanceTier::NoReviews => "No Reviews",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Statistics over the full, unfiltered review set.
///
/// `rating_distribution` always carries keys 1..=5 and `filter_counts` always
/// carries every menu key; use [`AggregateStatistics::filter_menu`] for the
/// display variant without zero entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub average_rating: f64,
    pub total_reviews: usize,
    pub total_customers: usize,
    pub performance_tier: PerformanceTier,
    pub rating_distribution: BTreeMap<u8, usize>,
    pub filter_counts: BTreeMap<FilterState, usize>,
}

impl AggregateStatistics {
    pub fn empty() -> Self {
        Self {
            average_rating: 0.0,
            total_reviews: 0,
            total_customers: 0,
            performance_tier: PerformanceTier::NoReviews,
            rating_distribution: (MIN_RATING..=MAX_RATING).map(|k| (k, 0)).collect(),
            filter_counts: FilterState::MENU.iter().map(|f| (*f, 0)).collect(),
        }
    }

    pub fn filter_count(&self, filter: FilterState) -> usize {
        self.filter_counts.get(&filter).copied().unwrap_or(0)
    }

    /// Filter menu entries in display order, zero counts dropped.
    pub fn filter_menu(&self) -> Vec<(FilterState, usize)> {
        FilterState::MENU
            .iter()
            .map(|f| (*f, self.filter_count(*f)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Default for AggregateStatistics {
    fn default() -> Self { Self::empty() }
}

/// One aggregate response: a page of reviews plus statistics over everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub reviews: Vec<AnnotatedReview>,
    pub pagination: Pagination,
    pub statistics: AggregateStatistics,
}
