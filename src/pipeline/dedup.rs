//! Apply-link deduplication.
//!
//! A link is admitted at most once per seen set. The gate checks the in-batch
//! set first, then the durable store if one is wired in. An admitted link is
//! recorded in both before the posting is rendered or delivered: a crash
//! after recording drops that posting instead of sending it twice.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::DuplicateOrigin;
use crate::storage::SeenStore;

/// Gate decision for one apply link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Duplicate(DuplicateOrigin),
}

pub struct DeduplicationGate<'s> {
    seen: HashSet<String>,
    store: Option<&'s dyn SeenStore>,
}

impl<'s> DeduplicationGate<'s> {
    /// Gate backed by the in-batch set only.
    pub fn in_batch() -> Self {
        Self {
            seen: HashSet::new(),
            store: None,
        }
    }

    /// Gate that also consults and records into a durable store.
    pub fn with_store(store: Option<&'s dyn SeenStore>) -> Self {
        Self {
            seen: HashSet::new(),
            store,
        }
    }

    /// Check and record `link`, consulting the durable store.
    ///
    /// Store failures propagate; the caller decides whether to abort.
    pub async fn admit(&mut self, link: &str, at: DateTime<Utc>) -> Result<Admission> {
        if self.seen.contains(link) {
            return Ok(Admission::Duplicate(DuplicateOrigin::Batch));
        }

        if let Some(store) = self.store {
            if store.exists(link).await? {
                self.seen.insert(link.to_string());
                return Ok(Admission::Duplicate(DuplicateOrigin::Store));
            }
            store.record(link, at).await?;
        }

        self.seen.insert(link.to_string());
        Ok(Admission::Admitted)
    }

    /// Check and record `link` against the in-batch set only.
    pub fn admit_in_batch(&mut self, link: &str) -> Admission {
        if self.seen.insert(link.to_string()) {
            Admission::Admitted
        } else {
            Admission::Duplicate(DuplicateOrigin::Batch)
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
