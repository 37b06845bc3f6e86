//! Posting data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::services::LocationResolver;

/// A fully validated listing, ready to be rendered.
///
/// Candidates only exist once every filter has passed; a row that fails any
/// check never becomes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCandidate {
    /// Company name, explicit or inherited from the previous row
    pub company: String,

    /// Job title cell
    pub title: String,

    /// Location cell as written in the table
    pub raw_location: String,

    /// Domestic locations in table order
    pub locations: Vec<String>,

    /// Terms/schedule cell, only for variants that have one
    pub terms: Option<String>,

    /// Apply link taken from the status cell
    pub apply_link: String,

    /// Posted date with its year resolved
    pub posted_date: NaiveDate,

    /// Posted-date cell as written (e.g., "Feb 05")
    pub posted_cell: String,
}

impl JobCandidate {
    /// Locations joined for display.
    pub fn location_display(&self) -> String {
        LocationResolver::display(&self.locations)
    }
}

/// Rendered notification for one accepted posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub date_posted: String,
    pub company: String,
    pub title: String,
    pub location: String,
    pub terms: Option<String>,
    pub apply_link: String,

    /// Message body sent to delivery sinks
    pub text: String,
}
