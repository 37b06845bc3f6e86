//! Diff sources.
//!
//! A source answers three questions about a watched document: what the head
//! revision is, which revision to diff from on a first run, and which lines a
//! range of revisions added to the document.

pub mod github;
pub mod patch;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::DocumentConfig;

pub use github::GitHubDiffSource;

#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Current revision of the document's branch.
    async fn head_revision(&self, document: &DocumentConfig) -> Result<String>;

    /// Revision to diff from when no checkpoint exists: the parent of `head`.
    ///
    /// `None` when `head` has no parent.
    async fn base_revision(&self, document: &DocumentConfig, head: &str)
    -> Result<Option<String>>;

    /// Lines added to the document between `base` and `head`, in diff order,
    /// without the leading `+`.
    async fn added_lines(
        &self,
        document: &DocumentConfig,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>>;
}
