// src/services/fields.rs

//! Maps tokenized cells onto named listing fields.
//!
//! Layouts differ between documents: Summer and New-Grad tables have no
//! terms column, Co-Op tables do. A [`RowSchema`] names where each field sits,
//! counted from the front for leading columns and from the end for trailing
//! ones, so blank cells in the middle of a row cannot shift the anchors.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, RowParseError};
use crate::services::tokenizer::{MIN_ROW_CELLS, TokenizedRow};

/// Glyph marking a listing that no longer accepts applications.
pub const CLOSED_MARKER: &str = "🔒";

const ANCHOR_SELECTOR: &str = "a[href]";

/// Cell positions of one row layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchema {
    /// Company cell, from the front
    #[serde(default)]
    pub company: usize,

    /// Title cell, from the front
    #[serde(default = "defaults::title")]
    pub title: usize,

    /// Location cell, from the front
    #[serde(default = "defaults::location")]
    pub location: usize,

    /// Status/apply cell, from the end (1 = last)
    #[serde(default = "defaults::status_from_end")]
    pub status_from_end: usize,

    /// Terms cell, from the end, when the layout has one
    #[serde(default)]
    pub terms_from_end: Option<usize>,

    /// Posted-date cell, from the end
    #[serde(default = "defaults::date_from_end")]
    pub date_from_end: usize,
}

impl RowSchema {
    /// Standard layout, with or without a terms column before the status cell.
    pub fn for_layout(has_terms_column: bool) -> Self {
        let status_from_end = defaults::status_from_end();
        Self {
            company: 0,
            title: defaults::title(),
            location: defaults::location(),
            status_from_end,
            terms_from_end: has_terms_column.then_some(status_from_end + 1),
            date_from_end: defaults::date_from_end(),
        }
    }

    /// Fewest cells a row needs so front and end anchors do not overlap.
    pub fn min_cells(&self) -> usize {
        let front = self.company.max(self.title).max(self.location) + 1;
        let end = self
            .status_from_end
            .max(self.date_from_end)
            .max(self.terms_from_end.unwrap_or(0));
        (front + end).max(MIN_ROW_CELLS)
    }
}

mod defaults {
    pub fn title() -> usize {
        1
    }
    pub fn location() -> usize {
        2
    }
    pub fn status_from_end() -> usize {
        2
    }
    pub fn date_from_end() -> usize {
        1
    }
}

/// Raw cells of one row, located by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields<'a> {
    pub company: &'a str,
    pub title: &'a str,
    pub location: &'a str,
    pub status: &'a str,
    pub terms: Option<&'a str>,
    pub date: &'a str,
}

impl RowFields<'_> {
    /// Whether the status cell carries the closed marker.
    pub fn is_closed(&self) -> bool {
        self.status.contains(CLOSED_MARKER)
    }
}

/// Locates fields and pulls the apply link out of the status cell.
pub struct FieldExtractor {
    anchor: Selector,
    markdown_link: Regex,
}

impl FieldExtractor {
    pub fn new() -> Result<Self> {
        let anchor = Selector::parse(ANCHOR_SELECTOR)
            .map_err(|e| AppError::selector(ANCHOR_SELECTOR, format!("{e:?}")))?;
        let markdown_link = Regex::new(r"\[[^\]]*\]\(\s*(https?://[^)\s]+)\s*\)")?;
        Ok(Self {
            anchor,
            markdown_link,
        })
    }

    /// Locate every field of `row` according to `schema`.
    pub fn extract<'a>(
        &self,
        row: &TokenizedRow<'a>,
        schema: &RowSchema,
    ) -> std::result::Result<RowFields<'a>, RowParseError> {
        let required = schema.min_cells();
        let too_few = || RowParseError::TooFewCells {
            found: row.len(),
            required,
        };
        if row.len() < required {
            return Err(too_few());
        }

        let terms = match schema.terms_from_end {
            Some(offset) => Some(row.from_end(offset).ok_or_else(too_few)?),
            None => None,
        };

        Ok(RowFields {
            company: row.get(schema.company).ok_or_else(too_few)?,
            title: row.get(schema.title).ok_or_else(too_few)?,
            location: row.get(schema.location).ok_or_else(too_few)?,
            status: row.from_end(schema.status_from_end).ok_or_else(too_few)?,
            terms,
            date: row.from_end(schema.date_from_end).ok_or_else(too_few)?,
        })
    }

    /// Apply link of a status cell: the first anchor's `href`, else a
    /// markdown link target.
    pub fn apply_link(&self, status: &str) -> Option<String> {
        let fragment = Html::parse_fragment(status);
        let from_anchor = fragment
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string);

        from_anchor.or_else(|| {
            self.markdown_link
                .captures(status)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}
