// src/services/recency.rs

//! Posted-date parsing and the recency window.

use chrono::{Datelike, NaiveDate};

use crate::error::RowParseError;
use crate::models::FilterConfig;

/// Where a posted date falls relative to the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    Fresh(NaiveDate),
    Stale { posted: NaiveDate, age_days: i64 },
    Future(NaiveDate),
}

/// Accepts postings made within `max_age_days` before the reference date.
#[derive(Debug, Clone)]
pub struct RecencyFilter {
    max_age_days: i64,
    infer_year_rollover: bool,
}

impl RecencyFilter {
    pub fn new(max_age_days: i64, infer_year_rollover: bool) -> Self {
        Self {
            max_age_days,
            infer_year_rollover,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.max_age_days, config.infer_year_rollover)
    }

    /// Parse a "Feb 05" style cell in the given year.
    pub fn parse_posted(cell: &str, year: i32) -> Result<NaiveDate, RowParseError> {
        let normalized = cell.split_whitespace().collect::<Vec<_>>().join(" ");
        NaiveDate::parse_from_str(&format!("{normalized} {year}"), "%b %d %Y").map_err(|_| {
            RowParseError::InvalidDate {
                cell: cell.to_string(),
            }
        })
    }

    /// Classify a posted-date cell against `reference`.
    ///
    /// The cell carries no year, so the reference year is assumed. With year
    /// rollover enabled, a date that lands in the future is retried in the
    /// previous year and kept if that puts it inside the window (a late
    /// December posting seen in early January).
    pub fn check(&self, cell: &str, reference: NaiveDate) -> Result<Recency, RowParseError> {
        let posted = Self::parse_posted(cell, reference.year())?;

        if posted > reference && self.infer_year_rollover {
            if let Ok(previous) = Self::parse_posted(cell, reference.year() - 1) {
                if let Recency::Fresh(date) = self.classify(previous, reference) {
                    return Ok(Recency::Fresh(date));
                }
            }
        }

        Ok(self.classify(posted, reference))
    }

    fn classify(&self, posted: NaiveDate, reference: NaiveDate) -> Recency {
        let age_days = (reference - posted).num_days();
        if age_days < 0 {
            Recency::Future(posted)
        } else if age_days > self.max_age_days {
            Recency::Stale { posted, age_days }
        } else {
            Recency::Fresh(posted)
        }
    }
}

impl Default for RecencyFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
