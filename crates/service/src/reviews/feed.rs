//! Incremental accumulation of aggregate pages for the reviews screen.
//!
//! `ReviewFeed` is a pure state machine: it issues [`FeedTicket`]s and is fed
//! results through [`ReviewFeed::apply`]. No I/O happens here, which keeps the
//! dedup and retry rules testable without a loader.
//!
//! Every issued ticket carries a sequence number; only a response to the most
//! recently issued ticket is applied, so a slow response for an old filter or
//! page can never overwrite fresher state.

use std::collections::HashSet;
use std::fmt::Display;

use models::{AggregateResult, AggregateStatistics, AnnotatedReview, FilterState};
use tracing::debug;

use crate::observability::STALE_RESPONSES_TOTAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    /// page 1 in flight (initial load, filter change or refresh)
    Loading,
    Accumulating,
    Exhausted,
    /// last fetch failed; `retry` re-requests the same page
    Error,
}

/// One outstanding page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTicket {
    pub sequence: u64,
    pub filter: FilterState,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { appended: usize },
    Failed,
    Stale,
}

/// Mutually exclusive display states derived from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedView {
    Idle,
    InitialLoading,
    Refreshing,
    LoadingMore,
    Ready,
    ReachedEnd,
    NoMatches,
    Failed { page: u32 },
}

#[derive(Debug, Clone)]
pub struct ReviewFeed {
    filter: FilterState,
    limit: u32,
    items: Vec<AnnotatedReview>,
    seen_ids: HashSet<String>,
    current_page: u32,
    has_more: bool,
    is_loading_more: bool,
    phase: FeedPhase,
    latest_sequence: u64,
    in_flight: Option<FeedTicket>,
    failed_page: Option<u32>,
    last_error: Option<String>,
    statistics: Option<AggregateStatistics>,
}

impl ReviewFeed {
    pub fn new(limit: u32) -> Self {
        Self {
            filter: FilterState::All,
            limit: limit.max(1),
            items: Vec::new(),
            seen_ids: HashSet::new(),
            current_page: 1,
            has_more: true,
            is_loading_more: false,
            phase: FeedPhase::Idle,
            latest_sequence: 0,
            in_flight: None,
            failed_page: None,
            last_error: None,
            statistics: None,
        }
    }

    pub fn filter(&self) -> FilterState { self.filter }
    pub fn limit(&self) -> u32 { self.limit }
    pub fn items(&self) -> &[AnnotatedReview] { &self.items }
    pub fn current_page(&self) -> u32 { self.current_page }
    pub fn has_more(&self) -> bool { self.has_more }
    pub fn is_loading_more(&self) -> bool { self.is_loading_more }
    pub fn phase(&self) -> FeedPhase { self.phase }
    pub fn in_flight(&self) -> Option<FeedTicket> { self.in_flight }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

    /// Statistics from the latest applied page (always unfiltered).
    pub fn statistics(&self) -> Option<&AggregateStatistics> { self.statistics.as_ref() }

    /// Reset for `filter` and issue page 1.
    pub fn set_filter(&mut self, filter: FilterState) -> FeedTicket {
        self.filter = filter;
        self.items.clear();
        self.seen_ids.clear();
        self.current_page = 1;
        self.has_more = true;
        self.is_loading_more = false;
        self.failed_page = None;
        self.last_error = None;
        self.phase = FeedPhase::Loading;
        self.issue(1)
    }

    /// Re-issue page 1 for the current filter; items are replaced when it lands.
    pub fn refresh(&mut self) -> FeedTicket {
        self.is_loading_more = false;
        self.phase = FeedPhase::Loading;
        self.issue(1)
    }

    /// Issue the next page, unless a fetch is in flight or the feed is exhausted.
    ///
    /// After a failed later page this re-requests that same page, since
    /// `current_page` only advances on success.
    pub fn load_more(&mut self) -> Option<FeedTicket> {
        if self.in_flight.is_some() || self.is_loading_more || !self.has_more {
            return None;
        }
        match self.phase {
            FeedPhase::Accumulating => {}
            FeedPhase::Error if self.failed_page.is_some_and(|page| page > 1) => self.phase = FeedPhase::Accumulating,
            _ => return None,
        }
        self.is_loading_more = true;
        Some(self.issue(self.current_page + 1))
    }

    /// Re-request the page whose fetch failed.
    pub fn retry(&mut self) -> Option<FeedTicket> {
        if self.phase != FeedPhase::Error {
            return None;
        }
        let page = self.failed_page.unwrap_or(1);
        if page <= 1 {
            self.phase = FeedPhase::Loading;
        } else {
            self.phase = FeedPhase::Accumulating;
            self.is_loading_more = true;
        }
        Some(self.issue(page))
    }

    pub fn apply<E: Display>(&mut self, ticket: FeedTicket, result: Result<AggregateResult, E>) -> ApplyOutcome {
        if ticket.sequence != self.latest_sequence {
            STALE_RESPONSES_TOTAL.inc();
            debug!(sequence = ticket.sequence, latest = self.latest_sequence, page = ticket.page, "dropping stale feed response");
            return ApplyOutcome::Stale;
        }
        self.in_flight = None;
        self.is_loading_more = false;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                // current_page stays put so the same page is requested again
                self.phase = FeedPhase::Error;
                self.failed_page = Some(ticket.page);
                self.last_error = Some(e.to_string());
                return ApplyOutcome::Failed;
            }
        };

        if ticket.page <= 1 {
            self.items.clear();
            self.seen_ids.clear();
        }
        let mut appended = 0;
        for review in result.reviews {
            if self.seen_ids.insert(review.id().to_string()) {
                self.items.push(review);
                appended += 1;
            }
        }

        self.current_page = ticket.page.max(1);
        self.has_more = result.pagination.has_next;
        self.statistics = Some(result.statistics);
        self.failed_page = None;
        self.last_error = None;
        self.phase = if self.has_more { FeedPhase::Accumulating } else { FeedPhase::Exhausted };
        ApplyOutcome::Applied { appended }
    }

    pub fn view(&self) -> FeedView {
        match self.phase {
            FeedPhase::Idle => FeedView::Idle,
            FeedPhase::Loading if self.items.is_empty() => FeedView::InitialLoading,
            FeedPhase::Loading => FeedView::Refreshing,
            FeedPhase::Error => FeedView::Failed { page: self.failed_page.unwrap_or(1) },
            _ if self.is_loading_more => FeedView::LoadingMore,
            _ if self.items.is_empty() => FeedView::NoMatches,
            FeedPhase::Exhausted => FeedView::ReachedEnd,
            FeedPhase::Accumulating => FeedView::Ready,
        }
    }

    fn issue(&mut self, page: u32) -> FeedTicket {
        self.latest_sequence += 1;
        let ticket = FeedTicket { sequence: self.latest_sequence, filter: self.filter, page, limit: self.limit };
        self.in_flight = Some(ticket);
        ticket
    }
}
