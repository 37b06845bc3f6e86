//! Row parsing services.
//!
//! Each stage of turning one added table line into a notification:
//! - Tokenizing (`TokenizedRow`)
//! - Field location and link extraction (`FieldExtractor`, `RowSchema`)
//! - Location expansion and filtering (`LocationResolver`)
//! - Recency window (`RecencyFilter`)
//! - Company carry-over (`CompanyCarry`)
//! - Rendering (`formatter::render`)

mod company;
mod fields;
pub mod formatter;
mod locations;
mod recency;
mod tokenizer;

pub use company::{CONTINUATION_MARKER, CompanyCarry, UNKNOWN_COMPANY};
pub use fields::{CLOSED_MARKER, FieldExtractor, RowFields, RowSchema};
pub use locations::{
    LOCATION_SEPARATOR, LocationMatcher, LocationResolver, SubstringMatcher, WordMatcher,
    matcher_for,
};
pub use recency::{Recency, RecencyFilter};
pub use tokenizer::{COLUMN_SEPARATOR, MIN_ROW_CELLS, TokenizedRow};
