use async_trait::async_trait;
use models::Listing;

use crate::errors::SourceError;

/// Resolves the listings a vendor owns.
#[async_trait]
pub trait ListingDirectory: Send + Sync {
    async fn owned_listings(&self, vendor_id: &str) -> Result<Vec<Listing>, SourceError>;
}

/// Simple in-memory mock directory for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockListingDirectory {
        vendors: Mutex<HashMap<String, Vec<Listing>>>,
        failure: Mutex<Option<SourceError>>,
        calls: AtomicUsize,
    }

    impl MockListingDirectory {
        pub fn insert(&self, vendor_id: &str, listings: Vec<Listing>) {
            self.vendors.lock().unwrap().insert(vendor_id.to_string(), listings);
        }

        /// Every subsequent lookup fails with `err`.
        pub fn fail_with(&self, err: SourceError) {
            *self.failure.lock().unwrap() = Some(err);
        }

        pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
    }

    #[async_trait]
    impl ListingDirectory for MockListingDirectory {
        async fn owned_listings(&self, vendor_id: &str) -> Result<Vec<Listing>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.failure.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(self.vendors.lock().unwrap().get(vendor_id).cloned().unwrap_or_default())
        }
    }
}
