#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use configs::AggregationConfig;
use models::{Listing, Review};
use service::reviews::directory::mock::MockListingDirectory;
use service::reviews::source::mock::MockReviewSource;
use service::reviews::ReviewAggregationService;

pub type MockService = ReviewAggregationService<MockListingDirectory, MockReviewSource>;

pub struct Fixture {
    pub directory: Arc<MockListingDirectory>,
    pub source: Arc<MockReviewSource>,
    pub service: Arc<MockService>,
}

pub const VENDOR: &str = "vendor-42";

pub fn review(id: &str, listing_id: &str, user_id: &str, rating: u8, minute: i64) -> Review {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    Review {
        id: id.to_string(),
        listing_id: listing_id.to_string(),
        user_id: user_id.to_string(),
        rating,
        comment: None,
        created_at: base + Duration::minutes(minute),
        helpful_count: 0,
    }
}

/// One listing per entry; review timestamps increase in insertion order.
pub fn vendor_with(listings: &[(&str, &[u8])]) -> Fixture {
    let directory = Arc::new(MockListingDirectory::default());
    let source = Arc::new(MockReviewSource::default());
    directory.insert(VENDOR, listings.iter().map(|(id, _)| Listing::new(*id, format!("Listing {id}"), "Home Services")).collect());

    let mut minute = 0;
    for (listing_id, ratings) in listings {
        let reviews = ratings
            .iter()
            .map(|rating| {
                minute += 1;
                review(&format!("{listing_id}-{minute}"), listing_id, &format!("user-{minute}"), *rating, minute)
            })
            .collect();
        source.insert(listing_id, reviews);
    }

    let service = Arc::new(ReviewAggregationService::new(
        Arc::clone(&directory),
        Arc::clone(&source),
        &AggregationConfig::default(),
    ));
    Fixture { directory, source, service }
}
