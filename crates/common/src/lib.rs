//! Ambient helpers shared by the library crates and the `reviews` binary.

pub mod utils;
