//! Domain model for vendor review aggregation.
//! - Plain data types shared by the fetcher, the aggregation service and the feed.
//! - Serialises in camelCase so dashboards consume the same JSON shape.
//! - No I/O: collaborators and algorithms live in the `service` crate.

pub mod errors;
pub mod listing;
pub mod review;
pub mod query;
pub mod aggregate;

pub use aggregate::{AggregateResult, AggregateStatistics, Pagination, PerformanceTier};
pub use listing::Listing;
pub use query::{AggregateQuery, FilterState, ReviewPageQuery, SortBy, SortOrder, SortSpec};
pub use review::{AnnotatedReview, Review};
