use std::sync::Arc;

use async_trait::async_trait;
use configs::AggregationConfig;
use models::{AggregateQuery, AggregateResult, AnnotatedReview, FilterState, SortSpec};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::observability::{AGGREGATIONS_TOTAL, AGGREGATION_DURATION};
use crate::pagination::{paginate, PageRequest};
use crate::reviews::directory::ListingDirectory;
use crate::reviews::fetcher::{FanOutFetcher, FetchPolicy};
use crate::reviews::merge::merge_batches;
use crate::reviews::source::ReviewSource;
use crate::reviews::statistics;

/// Source of aggregate pages for a reviews feed.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load_page(&self, vendor_id: &str, filter: FilterState, page: u32, limit: u32) -> Result<AggregateResult, ServiceError>;
}

/// Client-side review aggregation over a vendor's listings.
///
/// Every call recomputes from the sources; nothing is cached between calls.
pub struct ReviewAggregationService<D: ListingDirectory, S: ReviewSource> {
    fetcher: FanOutFetcher<D, S>,
    max_page_limit: u32,
}

impl<D: ListingDirectory, S: ReviewSource + 'static> ReviewAggregationService<D, S> {
    pub fn new(directory: Arc<D>, source: Arc<S>, cfg: &AggregationConfig) -> Self {
        Self {
            fetcher: FanOutFetcher::new(directory, source, FetchPolicy::from(cfg)),
            max_page_limit: cfg.max_page_limit.max(1),
        }
    }

    /// Unfiltered aggregate page.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use configs::AggregationConfig;
    /// use models::{AggregateQuery, Listing, PerformanceTier};
    /// use service::reviews::ReviewAggregationService;
    /// use service::reviews::directory::mock::MockListingDirectory;
    /// use service::reviews::source::mock::MockReviewSource;
    ///
    /// let directory = Arc::new(MockListingDirectory::default());
    /// directory.insert("vendor-1", vec![Listing::new("l1", "Window Cleaning", "Cleaning")]);
    /// let svc = ReviewAggregationService::new(directory, Arc::new(MockReviewSource::default()), &AggregationConfig::default());
    /// let result = tokio_test::block_on(svc.get_aggregate("vendor-1", AggregateQuery::default()));
    /// assert!(result.reviews.is_empty());
    /// assert_eq!(result.statistics.performance_tier, PerformanceTier::NoReviews);
    /// ```
    pub async fn get_aggregate(&self, vendor_id: &str, query: AggregateQuery) -> AggregateResult {
        self.aggregate(vendor_id, query, FilterState::All).await
    }

    /// Dashboard variant: the three newest reviews plus full statistics.
    pub async fn get_latest(&self, vendor_id: &str) -> AggregateResult {
        self.get_aggregate(vendor_id, AggregateQuery::latest()).await
    }

    /// Newest-first page restricted to one rating; statistics stay unfiltered.
    pub async fn get_filtered_aggregate(&self, vendor_id: &str, filter: FilterState, page: u32, limit: u32) -> AggregateResult {
        self.aggregate(vendor_id, AggregateQuery::new(page, limit, SortSpec::default()), filter).await
    }

    /// Fetch, merge and sort every review the vendor has.
    pub async fn merged_reviews(&self, vendor_id: &str, sort: SortSpec) -> Vec<AnnotatedReview> {
        let outcome = self.fetcher.fetch(vendor_id, sort).await;
        merge_batches(outcome.batches, sort)
    }

    #[instrument(skip_all, fields(vendor_id = %vendor_id, page = query.page, limit = query.limit, filter = %filter))]
    async fn aggregate(&self, vendor_id: &str, query: AggregateQuery, filter: FilterState) -> AggregateResult {
        AGGREGATIONS_TOTAL.inc();
        let _timer = AGGREGATION_DURATION.start_timer();
        let request = PageRequest::new(query.page, query.limit).normalize(self.max_page_limit);

        let full = self.merged_reviews(vendor_id, query.sort).await;
        let statistics = statistics::compute(&full);
        let (reviews, pagination) = paginate(&full, filter, request);

        info!(
            event = "aggregate_served",
            total_reviews = statistics.total_reviews,
            matched = pagination.total,
            returned = reviews.len(),
            "aggregate computed"
        );
        AggregateResult { reviews, pagination, statistics }
    }
}

#[async_trait]
impl<D: ListingDirectory, S: ReviewSource + 'static> PageLoader for ReviewAggregationService<D, S> {
    async fn load_page(&self, vendor_id: &str, filter: FilterState, page: u32, limit: u32) -> Result<AggregateResult, ServiceError> {
        Ok(self.get_filtered_aggregate(vendor_id, filter, page, limit).await)
    }
}
