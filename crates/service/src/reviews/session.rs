use std::sync::Arc;

use models::FilterState;
use tracing::{info, warn};

use crate::reviews::feed::{ApplyOutcome, FeedTicket, FeedView, ReviewFeed};
use crate::reviews::service::PageLoader;

/// One reviews-screen session: a feed plus the loader that fills it.
///
/// Opened when the screen appears and dropped when it closes.
pub struct FeedSession<L: PageLoader> {
    loader: Arc<L>,
    vendor_id: String,
    feed: ReviewFeed,
}

impl<L: PageLoader> FeedSession<L> {
    pub fn new(loader: Arc<L>, vendor_id: impl Into<String>, limit: u32) -> Self {
        Self { loader, vendor_id: vendor_id.into(), feed: ReviewFeed::new(limit) }
    }

    pub fn feed(&self) -> &ReviewFeed { &self.feed }

    /// Initial load with the current filter.
    pub async fn open(&mut self) -> FeedView {
        let ticket = self.feed.set_filter(self.feed.filter());
        self.run(ticket).await
    }

    pub async fn change_filter(&mut self, filter: FilterState) -> FeedView {
        let ticket = self.feed.set_filter(filter);
        self.run(ticket).await
    }

    /// No-op when a fetch is in flight or nothing is left to load.
    pub async fn load_more(&mut self) -> FeedView {
        match self.feed.load_more() {
            Some(ticket) => self.run(ticket).await,
            None => self.feed.view(),
        }
    }

    pub async fn refresh(&mut self) -> FeedView {
        let ticket = self.feed.refresh();
        self.run(ticket).await
    }

    pub async fn retry(&mut self) -> FeedView {
        match self.feed.retry() {
            Some(ticket) => self.run(ticket).await,
            None => self.feed.view(),
        }
    }

    async fn run(&mut self, ticket: FeedTicket) -> FeedView {
        let result = self.loader.load_page(&self.vendor_id, ticket.filter, ticket.page, ticket.limit).await;
        if let Err(e) = &result {
            warn!(vendor_id = %self.vendor_id, page = ticket.page, filter = %ticket.filter, error = %e, "loading more failed");
        }
        if let ApplyOutcome::Applied { appended } = self.feed.apply(ticket, result) {
            info!(vendor_id = %self.vendor_id, page = ticket.page, appended, total = self.feed.items().len(), "feed page applied");
        }
        self.feed.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ServiceError, SourceError};
    use crate::pagination::{paginate, PageRequest};
    use crate::reviews::statistics;
    use crate::reviews::test_fixtures::annotated;
    use async_trait::async_trait;
    use models::{AggregateResult, AnnotatedReview};
    use std::sync::Mutex;

    /// Serves a fixed stream; fails the next `failures` calls.
    struct FlakyLoader {
        full: Vec<AnnotatedReview>,
        failures: Mutex<u32>,
        calls: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PageLoader for FlakyLoader {
        async fn load_page(&self, _vendor_id: &str, filter: FilterState, page: u32, limit: u32) -> Result<AggregateResult, ServiceError> {
            self.calls.lock().unwrap().push(page);
            {
                let mut failures = self.failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(SourceError::Unavailable("connection reset".into()).into());
                }
            }
            let (reviews, pagination) = paginate(&self.full, filter, PageRequest::new(page, limit));
            Ok(AggregateResult { reviews, pagination, statistics: statistics::compute(&self.full) })
        }
    }

    fn loader(len: usize, failures: u32) -> Arc<FlakyLoader> {
        let full = (0..len).map(|i| annotated(&format!("r{i}"), "A", "u", (i % 5) as u8 + 1, -(i as i64))).collect();
        Arc::new(FlakyLoader { full, failures: Mutex::new(failures), calls: Mutex::new(Vec::new()) })
    }

    #[tokio::test]
    async fn pages_through_to_the_end() {
        let mut session = FeedSession::new(loader(12, 0), "v1", 5);
        assert_eq!(session.open().await, FeedView::Ready);
        assert_eq!(session.load_more().await, FeedView::Ready);
        assert_eq!(session.load_more().await, FeedView::ReachedEnd);
        assert_eq!(session.load_more().await, FeedView::ReachedEnd);
        assert_eq!(session.feed().items().len(), 12);
    }

    #[tokio::test]
    async fn failure_then_retry_requests_same_page() {
        let loader = loader(12, 0);
        let mut session = FeedSession::new(Arc::clone(&loader), "v1", 5);
        session.open().await;

        *loader.failures.lock().unwrap() = 1;
        assert_eq!(session.load_more().await, FeedView::Failed { page: 2 });
        assert_eq!(session.retry().await, FeedView::Ready);
        assert_eq!(*loader.calls.lock().unwrap(), vec![1, 2, 2]);
        assert_eq!(session.feed().items().len(), 10);
    }

    #[tokio::test]
    async fn load_more_after_failure_requests_failed_page() {
        let loader = loader(12, 0);
        let mut session = FeedSession::new(Arc::clone(&loader), "v1", 5);
        session.open().await;

        *loader.failures.lock().unwrap() = 1;
        assert_eq!(session.load_more().await, FeedView::Failed { page: 2 });
        assert_eq!(session.load_more().await, FeedView::Ready);
        assert_eq!(*loader.calls.lock().unwrap(), vec![1, 2, 2]);
        assert_eq!(session.feed().current_page(), 2);
    }

    #[tokio::test]
    async fn filter_change_starts_over() {
        let mut session = FeedSession::new(loader(12, 0), "v1", 5);
        session.open().await;
        session.load_more().await;
        assert_eq!(session.change_filter(FilterState::Five).await, FeedView::ReachedEnd);
        assert_eq!(session.feed().items().len(), 2);
        assert_eq!(session.change_filter(FilterState::All).await, FeedView::Ready);
        assert_eq!(session.feed().items().len(), 5);
    }

    #[tokio::test]
    async fn initial_failure_is_retryable() {
        let mut session = FeedSession::new(loader(3, 1), "v1", 5);
        assert_eq!(session.open().await, FeedView::Failed { page: 1 });
        assert_eq!(session.retry().await, FeedView::ReachedEnd);
        assert_eq!(session.feed().items().len(), 3);
    }
}
