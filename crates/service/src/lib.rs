//! Service layer for vendor review aggregation.
//! - Fans out to per-listing review sources behind async collaborator traits.
//! - Merges, scores and paginates on the client side; nothing is cached between calls.
//! - Drives the incremental reviews feed used by the reviews screen.

pub mod errors;
pub mod pagination;
pub mod observability;
pub mod reviews;
