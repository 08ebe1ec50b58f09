//! Fan-out fetcher: one task per listing, bounded concurrency, join barrier.
//!
//! Failures never escape this module. A failing directory yields an empty
//! outcome and a listing whose first page fails contributes nothing; both are
//! logged and counted. A failure on a later page keeps the earlier pages.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use configs::AggregationConfig;
use models::{AnnotatedReview, Listing, ReviewPageQuery, SortSpec};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::errors::SourceError;
use crate::observability::{DIRECTORY_FAILURES_TOTAL, LISTING_FAILURES_TOTAL};
use crate::reviews::directory::ListingDirectory;
use crate::reviews::source::{ReviewPage, ReviewSource};

#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Review source calls allowed in flight at once
    pub max_concurrency: usize,
    /// Deadline for each directory or review source call
    pub source_timeout: Duration,
    pub per_listing_limit: u32,
    /// Keep paging a listing until a short page instead of stopping after page 1
    pub exhaust_listings: bool,
    pub max_pages_per_listing: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self { Self::from(&AggregationConfig::default()) }
}

impl From<&AggregationConfig> for FetchPolicy {
    fn from(cfg: &AggregationConfig) -> Self {
        Self {
            max_concurrency: cfg.max_concurrency.max(1),
            source_timeout: cfg.source_timeout(),
            per_listing_limit: cfg.per_listing_limit.max(1),
            exhaust_listings: cfg.exhaust_listings,
            max_pages_per_listing: cfg.max_pages_per_listing.max(1),
        }
    }
}

/// Per-listing batches in directory order; failed listings leave an empty batch.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub batches: Vec<Vec<AnnotatedReview>>,
    pub failed_listings: Vec<String>,
    pub directory_failed: bool,
}

impl FetchOutcome {
    fn directory_failure() -> Self { Self { directory_failed: true, ..Self::default() } }

    /// Reviews in fetch order (listing order, then each listing's own order).
    pub fn reviews(&self) -> impl Iterator<Item = &AnnotatedReview> + '_ { self.batches.iter().flatten() }

    pub fn len(&self) -> usize { self.batches.iter().map(Vec::len).sum() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

pub struct FanOutFetcher<D: ListingDirectory, S: ReviewSource> {
    directory: Arc<D>,
    source: Arc<S>,
    policy: FetchPolicy,
}

impl<D: ListingDirectory, S: ReviewSource + 'static> FanOutFetcher<D, S> {
    pub fn new(directory: Arc<D>, source: Arc<S>, policy: FetchPolicy) -> Self { Self { directory, source, policy } }

    #[instrument(skip_all, fields(vendor_id = %vendor_id))]
    pub async fn fetch(&self, vendor_id: &str, sort: SortSpec) -> FetchOutcome {
        let listings = match timeout(self.policy.source_timeout, self.directory.owned_listings(vendor_id)).await {
            Ok(Ok(listings)) => listings,
            Ok(Err(e)) => {
                DIRECTORY_FAILURES_TOTAL.inc();
                warn!(event = "directory_failed", error = %e, code = e.code(), "listing directory failed; serving empty aggregate");
                return FetchOutcome::directory_failure();
            }
            Err(_) => {
                DIRECTORY_FAILURES_TOTAL.inc();
                warn!(event = "directory_timeout", timeout_ms = self.policy.source_timeout.as_millis() as u64, "listing directory timed out; serving empty aggregate");
                return FetchOutcome::directory_failure();
            }
        };
        if listings.is_empty() {
            debug!("vendor owns no listings");
            return FetchOutcome::default();
        }

        let count = listings.len();
        let semaphore = Arc::new(Semaphore::new(self.policy.max_concurrency));
        let mut tasks = JoinSet::new();
        // task id -> listing id, so a panicked task is still attributed
        let mut task_listings: HashMap<task::Id, String> = HashMap::with_capacity(count);
        for (index, listing) in listings.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let policy = self.policy.clone();
            let listing_id = listing.id.clone();
            let handle = tasks.spawn(async move {
                let result = fetch_listing(source.as_ref(), &listing, sort, &policy, &semaphore).await;
                (index, listing.id, result)
            });
            task_listings.insert(handle.id(), listing_id);
        }

        // join barrier: every listing settles before anything is merged
        let mut slots: Vec<Vec<AnnotatedReview>> = vec![Vec::new(); count];
        let mut failed_listings = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(reviews))) => slots[index] = reviews,
                Ok((_, listing_id, Err(e))) => {
                    LISTING_FAILURES_TOTAL.inc();
                    warn!(event = "listing_failed", %listing_id, error = %e, code = e.code(), "excluding listing from aggregate");
                    failed_listings.push(listing_id);
                }
                Err(e) => {
                    LISTING_FAILURES_TOTAL.inc();
                    let listing_id = task_listings.remove(&e.id()).unwrap_or_default();
                    warn!(event = "listing_task_failed", %listing_id, error = %e, "listing fetch task did not complete");
                    failed_listings.push(listing_id);
                }
            }
        }

        let outcome = FetchOutcome { batches: slots, failed_listings, directory_failed: false };
        debug!(listings = count, failed = outcome.failed_listings.len(), reviews = outcome.len(), "fan-out joined");
        outcome
    }
}

async fn fetch_page<S: ReviewSource + ?Sized>(
    source: &S,
    listing_id: &str,
    query: ReviewPageQuery,
    policy: &FetchPolicy,
    semaphore: &Semaphore,
) -> Result<ReviewPage, SourceError> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| SourceError::Unavailable("fetch pool closed".into()))?;
    timeout(policy.source_timeout, source.reviews(listing_id, query))
        .await
        .map_err(|_| SourceError::Timeout(policy.source_timeout))?
}

async fn fetch_listing<S: ReviewSource + ?Sized>(
    source: &S,
    listing: &Listing,
    sort: SortSpec,
    policy: &FetchPolicy,
    semaphore: &Semaphore,
) -> Result<Vec<AnnotatedReview>, SourceError> {
    let max_pages = if policy.exhaust_listings { policy.max_pages_per_listing } else { 1 };
    let mut annotation = listing.clone();
    let mut collected = Vec::new();
    // pages can shift between requests; a review seen on page k may reappear on k+1
    let mut seen: HashSet<String> = HashSet::new();

    for page in 1..=max_pages {
        let query = ReviewPageQuery { page, limit: policy.per_listing_limit, sort };
        let batch = match fetch_page(source, &listing.id, query, policy, semaphore).await {
            Ok(batch) => batch,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                warn!(
                    event = "listing_partial",
                    listing_id = %listing.id,
                    page,
                    kept = collected.len(),
                    error = %e,
                    code = e.code(),
                    "later page failed; keeping reviews from earlier pages"
                );
                return Ok(collected);
            }
        };

        if page == 1 {
            if let Some(name) = batch.listing_name {
                annotation.display_name = name;
            }
            if let Some(category) = batch.category_name {
                annotation.category_name = category;
            }
        }

        let received = batch.reviews.len();
        for review in batch.reviews {
            if let Err(e) = review.validate() {
                warn!(listing_id = %listing.id, review_id = %review.id, error = %e, "dropping malformed review");
                continue;
            }
            if !seen.insert(review.id.clone()) {
                debug!(listing_id = %listing.id, review_id = %review.id, page, "skipping review already collected");
                continue;
            }
            collected.push(AnnotatedReview::new(review, annotation.clone()));
        }
        if received < policy.per_listing_limit as usize {
            return Ok(collected);
        }
    }

    warn!(
        event = "listing_truncated",
        listing_id = %listing.id,
        pages = max_pages,
        per_page = policy.per_listing_limit,
        "listing has more reviews than the fetch bound; aggregate is truncated"
    );
    Ok(collected)
}
