//! The state machine behind a document list view.
//!
//! ```text
//!   Idle ──begin──▶ Loading ──complete(ok)──▶ Success
//!                      ▲     └─complete(err)─▶ Failure
//!                      └────────begin─────────────┘  (from any state)
//! ```
//!
//! Every [`ListView::begin`] hands out a [`RequestTicket`] carrying the
//! request identity (the [`FilterState`]) and a monotonically increasing
//! sequence number. [`ListView::complete`] applies a result only if its
//! filter is the one most recently issued; results for superseded filters
//! are discarded. A late response can therefore never overwrite the answer
//! to a newer request, no matter which one the network delivers first.
//! Tickets for the same filter are interchangeable, which lets callers share
//! one read between identical concurrent requests.
//!
//! The last successful page stays available through every later state so a
//! view can keep showing it while loading or after a failure.

use crate::error::FetchError;
use crate::filter::FilterState;
use crate::models::DocumentPage;

/// What the view should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight; `previous` is the last successful page.
    Loading { previous: Option<DocumentPage> },
    /// The latest request succeeded. An empty page means "no results".
    Success(DocumentPage),
    /// The latest request failed; `previous` is still shown under the error.
    Failure {
        error: FetchError,
        previous: Option<DocumentPage>,
    },
}

impl FetchState {
    /// The page to render, if any.
    pub fn displayed(&self) -> Option<&DocumentPage> {
        match self {
            Self::Idle => None,
            Self::Loading { previous } | Self::Failure { previous, .. } => previous.as_ref(),
            Self::Success(page) => Some(page),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failure { error, .. } => Some(error),
            _ => None,
        }
    }

    /// `true` only for a successful, empty page.
    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::Success(page) if page.is_empty())
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    filter: FilterState,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }
}

/// Outcome of handing a result to [`ListView::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result belonged to the latest request and is now displayed.
    Applied,
    /// A newer request was issued meanwhile; the result was dropped.
    Stale,
}

/// Per-view request bookkeeping.
#[derive(Debug, Default)]
pub struct ListView {
    state: FetchState,
    latest: Option<RequestTicket>,
    last_success: Option<DocumentPage>,
    issued: u64,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Filter of the most recently issued request.
    pub fn latest_filter(&self) -> Option<&FilterState> {
        self.latest.as_ref().map(|t| &t.filter)
    }

    /// Last page that was successfully applied, whatever the current state.
    pub fn last_success(&self) -> Option<&DocumentPage> {
        self.last_success.as_ref()
    }

    /// Records a new request for `filter` and moves to `Loading`.
    pub fn begin(&mut self, filter: FilterState) -> RequestTicket {
        self.issued += 1;
        let ticket = RequestTicket {
            seq: self.issued,
            filter,
        };
        self.latest = Some(ticket.clone());
        self.state = FetchState::Loading {
            previous: self.last_success.clone(),
        };
        ticket
    }

    /// `true` if `ticket` asks for the most recently issued filter.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| latest.filter == ticket.filter)
    }

    /// Applies `result` if `ticket` is still current.
    pub fn complete(
        &mut self,
        ticket: &RequestTicket,
        result: Result<DocumentPage, FetchError>,
    ) -> Completion {
        if !self.is_current(ticket) {
            return Completion::Stale;
        }
        self.state = match result {
            Ok(page) => {
                self.last_success = Some(page.clone());
                FetchState::Success(page)
            }
            Err(error) => FetchState::Failure {
                error,
                previous: self.last_success.clone(),
            },
        };
        Completion::Applied
    }
}
