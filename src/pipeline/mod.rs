//! Pipeline entry points.
//!
//! - `Pipeline`: turns one batch of added rows into notification payloads
//! - `Poller`: drives the pipeline over watched documents and delivers results

pub mod batch;
pub mod dedup;
pub mod poll;

pub use batch::{BatchState, Pipeline};
pub use dedup::{Admission, DeduplicationGate};
pub use poll::{DocumentOutcome, DocumentReport, PollSummary, Poller};
