//! Vendor review aggregation: collaborators, fan-out, merge, statistics and the feed.
//!
//! Data flows `ListingDirectory -> FanOutFetcher -> merge -> {statistics, paginate} -> ReviewFeed`.

pub mod directory;
pub mod source;
pub mod http;
pub mod fetcher;
pub mod merge;
pub mod statistics;
pub mod service;
pub mod feed;
pub mod session;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use directory::ListingDirectory;
pub use feed::{ApplyOutcome, FeedPhase, FeedTicket, FeedView, ReviewFeed};
pub use fetcher::{FanOutFetcher, FetchOutcome, FetchPolicy};
pub use service::{PageLoader, ReviewAggregationService};
pub use session::FeedSession;
pub use source::{ReviewPage, ReviewSource};
