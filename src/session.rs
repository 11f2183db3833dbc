//! The quoting session state machine.
//!
//! `Idle -> AwaitingMatch -> AwaitingDerivation -> Complete | NoMatchFound |
//! DerivationFailed`. `NoMatchFound` is a valid terminal outcome (the index
//! had nothing to offer), not an error. A transient provider failure leaves
//! the session in `AwaitingDerivation` so the caller can retry with backoff;
//! parse and validation failures are terminal.

use crate::error::QuotingError;
use crate::retrieval::{PartMatch, RetrievalService};
use quotx_features::QueryPart;
use quotx_quote::{QuoteBreakdown, QuoteEngine, QuoteError};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingMatch,
    AwaitingDerivation,
    Complete,
    NoMatchFound,
    DerivationFailed,
}

/// Terminal result of one quoting run.
#[derive(Debug)]
pub enum QuoteOutcome {
    Complete {
        matched: PartMatch,
        breakdown: QuoteBreakdown,
    },
    /// Zero neighbors came back; the user needs to ingest historical parts.
    NoMatchFound,
    /// Derivation failed for good. The error carries the raw provider
    /// payload where one exists, so a human can complete the quote manually.
    DerivationFailed {
        matched: PartMatch,
        error: QuoteError,
    },
}

pub struct QuoteSession {
    retrieval: RetrievalService,
    engine: QuoteEngine,
    state: SessionState,
}

impl QuoteSession {
    pub fn new(retrieval: RetrievalService, engine: QuoteEngine) -> Self {
        Self {
            retrieval,
            engine,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// Run the full pipeline for one query part.
    pub fn quote(&mut self, query: &QueryPart) -> Result<QuoteOutcome, QuotingError> {
        self.state = SessionState::AwaitingMatch;

        let mut matches = self.retrieval.find_nearest(query, 1)?;
        let Some(matched) = matches.pop() else {
            self.state = SessionState::NoMatchFound;
            info!("no neighbors in the index");
            return Ok(QuoteOutcome::NoMatchFound);
        };

        self.state = SessionState::AwaitingDerivation;
        info!(matched = %matched.id, score = matched.score, "nearest match found");

        let query_text = if query.description.trim().is_empty() {
            query.embedding_text()
        } else {
            query.description.clone()
        };

        match self
            .engine
            .derive(&query_text, &query.features(), &matched.as_reference())
        {
            Ok(breakdown) => {
                self.state = SessionState::Complete;
                Ok(QuoteOutcome::Complete { matched, breakdown })
            }
            // Transient provider failure: stay in AwaitingDerivation and
            // hand the retry decision to the caller.
            Err(QuoteError::Provider(e)) => Err(QuotingError::Quote(QuoteError::Provider(e))),
            Err(error) => {
                self.state = SessionState::DerivationFailed;
                warn!(%error, "quote derivation failed");
                Ok(QuoteOutcome::DerivationFailed { matched, error })
            }
        }
    }
}
