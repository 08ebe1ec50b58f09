use chrono::{Duration, TimeZone, Utc};
use models::{AnnotatedReview, Listing, Review};

pub fn review(id: &str, listing_id: &str, user_id: &str, rating: u8, minute: i64) -> Review {
    Review {
        id: id.to_string(),
        listing_id: listing_id.to_string(),
        user_id: user_id.to_string(),
        rating,
        comment: None,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minute),
        helpful_count: 0,
    }
}

pub fn annotated(id: &str, listing_id: &str, user_id: &str, rating: u8, minute: i64) -> AnnotatedReview {
    AnnotatedReview::new(
        review(id, listing_id, user_id, rating, minute),
        Listing::new(listing_id, format!("Listing {listing_id}"), "Home Services"),
    )
}
