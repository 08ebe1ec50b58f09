//! Query parameters: sort spec, rating filter and page requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::review::Review;

/// Field the merged review stream is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "helpful")]
    Helpful,
}

impl SortBy {
    /// Numeric projection used for ordering.
    pub fn key(self, review: &Review) -> i64 {
        match self {
            SortBy::CreatedAt => review.created_at.timestamp_millis(),
            SortBy::Rating => i64::from(review.rating),
            SortBy::Helpful => i64::from(review.helpful_count),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::Rating => "rating",
            SortBy::Helpful => "helpful",
        }
    }
}

impl FromStr for SortBy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortBy::CreatedAt),
            "rating" => Ok(SortBy::Rating),
            "helpful" => Ok(SortBy::Helpful),
            other => Err(ModelError::invalid("sortBy", other)),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ModelError::invalid("sortOrder", s)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Sort spec; defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl SortSpec {
    pub fn new(sort_by: SortBy, sort_order: SortOrder) -> Self { Self { sort_by, sort_order } }
}

/// Rating filter applied to the paginated slice only.
///
/// Variant order is the display order of the filter menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum FilterState {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "1")]
    One,
}

impl FilterState {
    pub const MENU: [FilterState; 6] = [
        FilterState::All,
        FilterState::Five,
        FilterState::Four,
        FilterState::Three,
        FilterState::Two,
        FilterState::One,
    ];

    pub fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            5 => Some(FilterState::Five),
            4 => Some(FilterState::Four),
            3 => Some(FilterState::Three),
            2 => Some(FilterState::Two),
            1 => Some(FilterState::One),
            _ => None,
        }
    }

    /// `None` for `All`.
    pub fn rating(self) -> Option<u8> {
        match self {
            FilterState::All => None,
            FilterState::Five => Some(5),
            FilterState::Four => Some(4),
            FilterState::Three => Some(3),
            FilterState::Two => Some(2),
            FilterState::One => Some(1),
        }
    }

    pub fn matches(self, rating: u8) -> bool {
        self.rating().map_or(true, |wanted| wanted == rating)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterState::All => "all",
            FilterState::Five => "5",
            FilterState::Four => "4",
            FilterState::Three => "3",
            FilterState::Two => "2",
            FilterState::One => "1",
        }
    }
}

impl FromStr for FilterState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(FilterState::All);
        }
        s.parse::<u8>()
            .ok()
            .and_then(FilterState::from_rating)
            .ok_or_else(|| ModelError::invalid("filter", s))
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Page request issued to a single review source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPageQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(flatten)]
    pub sort: SortSpec,
}

/// Aggregate page request from the dashboard or reviews screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQuery {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub limit: u32,
    #[serde(flatten)]
    pub sort: SortSpec,
}

impl AggregateQuery {
    pub const LATEST_LIMIT: u32 = 3;

    pub fn new(page: u32, limit: u32, sort: SortSpec) -> Self { Self { page, limit, sort } }

    /// Dashboard "latest reviews" variant: page 1, three newest.
    pub fn latest() -> Self { Self { page: 1, limit: Self::LATEST_LIMIT, sort: SortSpec::default() } }
}

impl Default for AggregateQuery {
    fn default() -> Self { Self { page: 1, limit: 10, sort: SortSpec::default() } }
}
