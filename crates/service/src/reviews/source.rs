use async_trait::async_trait;
use models::{Review, ReviewPageQuery};

use crate::errors::SourceError;

/// One page of reviews for a single listing.
///
/// The source may echo listing metadata; when present it takes precedence
/// over the directory's copy when annotating reviews.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub listing_name: Option<String>,
    pub category_name: Option<String>,
}

impl ReviewPage {
    pub fn new(reviews: Vec<Review>) -> Self { Self { reviews, ..Self::default() } }
}

/// Per-listing paginated review API.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn reviews(&self, listing_id: &str, query: ReviewPageQuery) -> Result<ReviewPage, SourceError>;
}

/// In-memory review source with failure and latency injection.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::reviews::merge::sort_reviews;

    #[derive(Default)]
    pub struct MockReviewSource {
        reviews: Mutex<HashMap<String, Vec<Review>>>,
        metadata: Mutex<HashMap<String, (String, String)>>,
        failures: Mutex<HashMap<String, SourceError>>,
        delays: Mutex<HashMap<String, Duration>>,
        requests: Mutex<Vec<(String, ReviewPageQuery)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl MockReviewSource {
        pub fn insert(&self, listing_id: &str, reviews: Vec<Review>) {
            self.reviews.lock().unwrap().insert(listing_id.to_string(), reviews);
        }

        pub fn set_metadata(&self, listing_id: &str, name: &str, category: &str) {
            self.metadata.lock().unwrap().insert(listing_id.to_string(), (name.to_string(), category.to_string()));
        }

        pub fn fail_listing(&self, listing_id: &str, err: SourceError) {
            self.failures.lock().unwrap().insert(listing_id.to_string(), err);
        }

        pub fn delay_listing(&self, listing_id: &str, delay: Duration) {
            self.delays.lock().unwrap().insert(listing_id.to_string(), delay);
        }

        /// Every request seen so far, in arrival order.
        pub fn requests(&self) -> Vec<(String, ReviewPageQuery)> { self.requests.lock().unwrap().clone() }

        pub fn max_in_flight(&self) -> usize { self.max_in_flight.load(Ordering::SeqCst) }
    }

    #[async_trait]
    impl ReviewSource for MockReviewSource {
        async fn reviews(&self, listing_id: &str, query: ReviewPageQuery) -> Result<ReviewPage, SourceError> {
            self.requests.lock().unwrap().push((listing_id.to_string(), query));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlight(&self.in_flight);

            let delay = self.delays.lock().unwrap().get(listing_id).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = self.failures.lock().unwrap().get(listing_id).cloned() {
                return Err(err);
            }

            let mut all = self.reviews.lock().unwrap().get(listing_id).cloned().unwrap_or_default();
            sort_reviews(&mut all, query.sort);
            let start = (query.page.saturating_sub(1) as usize).saturating_mul(query.limit as usize);
            let reviews = all.into_iter().skip(start).take(query.limit as usize).collect();

            let (listing_name, category_name) = match self.metadata.lock().unwrap().get(listing_id).cloned() {
                Some((name, category)) => (Some(name), Some(category)),
                None => (None, None),
            };
            Ok(ReviewPage { reviews, listing_name, category_name })
        }
    }
}
