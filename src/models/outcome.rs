//! Per-row outcomes and batch reports.
//!
//! Every input line ends in exactly one [`RowOutcome`]. Rejections are normal
//! filter results; malformed rows carry the parse error that stopped them.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, RowParseError};
use crate::models::NotificationPayload;

/// Where a duplicate apply link was already recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuplicateOrigin {
    /// Seen earlier in the same batch
    Batch,
    /// Found in the durable seen store
    Store,
}

/// A filter decided the row is not worth notifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Status cell carries the lock marker
    Closed,
    /// No location survived the exclusion list
    NoDomesticLocation,
    /// Posted longer ago than the recency window
    Stale { posted: NaiveDate, age_days: i64 },
    /// Posted after the reference date
    Future { posted: NaiveDate },
    /// Apply link already notified
    Duplicate {
        apply_link: String,
        origin: DuplicateOrigin,
    },
}

impl Rejection {
    /// Short stable name, used in logs and stats.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::Closed => "closed",
            Rejection::NoDomesticLocation => "no_domestic_location",
            Rejection::Stale { .. } => "stale",
            Rejection::Future { .. } => "future",
            Rejection::Duplicate { .. } => "duplicate",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Closed => write!(f, "listing is closed"),
            Rejection::NoDomesticLocation => write!(f, "no domestic location"),
            Rejection::Stale { posted, age_days } => {
                write!(f, "posted {posted} ({age_days} days ago)")
            }
            Rejection::Future { posted } => write!(f, "posted in the future ({posted})"),
            Rejection::Duplicate { apply_link, origin } => {
                write!(f, "already notified ({origin:?}): {apply_link}")
            }
        }
    }
}

/// Final state of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted { apply_link: String },
    Rejected(Rejection),
    Malformed(RowParseError),
}

impl RowOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RowOutcome::Accepted { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            RowOutcome::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    pub fn parse_error(&self) -> Option<&RowParseError> {
        match self {
            RowOutcome::Malformed(error) => Some(error),
            _ => None,
        }
    }
}

/// Counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub rows: usize,
    pub accepted: usize,
    pub malformed: usize,
    pub closed: usize,
    pub no_domestic_location: usize,
    pub stale: usize,
    pub future: usize,
    pub duplicate: usize,
}

impl BatchStats {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Accepted { .. } => self.accepted += 1,
            RowOutcome::Malformed(_) => self.malformed += 1,
            RowOutcome::Rejected(rejection) => match rejection {
                Rejection::Closed => self.closed += 1,
                Rejection::NoDomesticLocation => self.no_domestic_location += 1,
                Rejection::Stale { .. } => self.stale += 1,
                Rejection::Future { .. } => self.future += 1,
                Rejection::Duplicate { .. } => self.duplicate += 1,
            },
        }
    }

    pub fn rejected(&self) -> usize {
        self.closed + self.no_domestic_location + self.stale + self.future + self.duplicate
    }
}

/// Result of processing one batch of added lines.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Accepted payloads in input order
    pub payloads: Vec<NotificationPayload>,
    /// One outcome per input line, in input order
    pub outcomes: Vec<RowOutcome>,
    pub stats: BatchStats,
}

impl BatchReport {
    pub fn push(&mut self, outcome: RowOutcome) {
        self.stats.record(&outcome);
        self.outcomes.push(outcome);
    }

    /// Fail on the first malformed row, for callers that reject bad input.
    pub fn ensure_well_formed(&self) -> Result<()> {
        match self.outcomes.iter().find_map(RowOutcome::parse_error) {
            Some(error) => Err(error.clone().into()),
            None => Ok(()),
        }
    }
}
