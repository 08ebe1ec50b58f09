//! reqwest-backed listing directory and review source.

use std::time::Duration;

use async_trait::async_trait;
use configs::UpstreamConfig;
use models::{Listing, Review, ReviewPageQuery};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::errors::SourceError;
use crate::reviews::directory::ListingDirectory;
use crate::reviews::source::{ReviewPage, ReviewSource};

/// Shared HTTP plumbing: base URL, optional bearer token and request timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, SourceError> {
        let base_url = Url::parse(&cfg.base_url).map_err(|e| SourceError::Unavailable(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::Unavailable(format!("invalid base url: {}", cfg.base_url)));
        }
        let timeout = cfg.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url, api_token: cfg.api_token.clone(), timeout })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Unavailable(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T, SourceError> {
        debug!(url = %url, "upstream request");
        let mut req = self.client.get(url).query(query);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            SourceError::Unavailable(e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListingsEnvelope {
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct ListingMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewsEnvelope {
    #[serde(default)]
    reviews: Vec<Review>,
    #[serde(default)]
    listing: Option<ListingMeta>,
}

impl From<ReviewsEnvelope> for ReviewPage {
    fn from(env: ReviewsEnvelope) -> Self {
        let (listing_name, category_name) = match env.listing {
            Some(meta) => (meta.name, meta.category),
            None => (None, None),
        };
        ReviewPage { reviews: env.reviews, listing_name, category_name }
    }
}

pub struct HttpListingDirectory {
    http: HttpClient,
}

impl HttpListingDirectory {
    pub fn new(http: HttpClient) -> Self { Self { http } }
}

#[async_trait]
impl ListingDirectory for HttpListingDirectory {
    async fn owned_listings(&self, vendor_id: &str) -> Result<Vec<Listing>, SourceError> {
        let url = self.http.endpoint(&["vendors", vendor_id, "listings"])?;
        let env: ListingsEnvelope = self.http.get_json(url, &[]).await?;
        Ok(env.listings)
    }
}

pub struct HttpReviewSource {
    http: HttpClient,
}

impl HttpReviewSource {
    pub fn new(http: HttpClient) -> Self { Self { http } }
}

fn review_query(query: &ReviewPageQuery) -> Vec<(&'static str, String)> {
    vec![
        ("page", query.page.to_string()),
        ("limit", query.limit.to_string()),
        ("sortBy", query.sort.sort_by.to_string()),
        ("sortOrder", query.sort.sort_order.to_string()),
    ]
}

#[async_trait]
impl ReviewSource for HttpReviewSource {
    async fn reviews(&self, listing_id: &str, query: ReviewPageQuery) -> Result<ReviewPage, SourceError> {
        let url = self.http.endpoint(&["listings", listing_id, "reviews"])?;
        let env: ReviewsEnvelope = self.http.get_json(url, &review_query(&query)).await?;
        Ok(env.into())
    }
}
