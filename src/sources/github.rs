// src/sources/github.rs

//! GitHub REST API diff source.
//!
//! Uses three unauthenticated endpoints:
//!
//! ```text
//! GET /repos/{owner}/{repo}/branches/{branch}        → head commit sha
//! GET /repos/{owner}/{repo}/commits/{sha}            → parent sha
//! GET /repos/{owner}/{repo}/compare/{base}...{head}  → per-file patches
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::DocumentConfig;
use crate::sources::{DiffSource, patch};

const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    parents: Vec<CommitRef>,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Debug, Deserialize)]
struct ChangedFile {
    filename: String,
    /// Absent for binary files and very large diffs
    patch: Option<String>,
}

/// Diff source backed by the GitHub REST API.
pub struct GitHubDiffSource {
    client: Client,
    api_base: Url,
}

impl GitHubDiffSource {
    pub fn new(client: Client, api_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "watcher.api_base '{api_base}' cannot be used as a base URL"
            )));
        }
        Ok(Self { client, api_base })
    }

    /// `{api_base}/repos/{owner}/{repo}/{tail...}`, each segment percent-encoded.
    fn endpoint(&self, document: &DocumentConfig, tail: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::config("watcher.api_base cannot be a base URL"))?;
            segments
                .pop_if_empty()
                .extend(["repos", document.owner.as_str(), document.repo.as_str()])
                .extend(tail);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, document: &DocumentConfig, url: Url) -> Result<T> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::source(
                &document.name,
                format!("{} returned {}", response.url(), status),
            ));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DiffSource for GitHubDiffSource {
    async fn head_revision(&self, document: &DocumentConfig) -> Result<String> {
        let url = self.endpoint(document, &["branches", document.branch.as_str()])?;
        let branch: BranchResponse = self.get_json(document, url).await?;
        Ok(branch.commit.sha)
    }

    async fn base_revision(
        &self,
        document: &DocumentConfig,
        head: &str,
    ) -> Result<Option<String>> {
        let url = self.endpoint(document, &["commits", head])?;
        let commit: CommitResponse = self.get_json(document, url).await?;
        Ok(commit.parents.into_iter().next().map(|parent| parent.sha))
    }

    async fn added_lines(
        &self,
        document: &DocumentConfig,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>> {
        let range = format!("{base}...{head}");
        let url = self.endpoint(document, &["compare", range.as_str()])?;
        let compare: CompareResponse = self.get_json(document, url).await?;

        let mut lines = Vec::new();
        for file in compare.files.into_iter().filter(|f| f.filename == document.path) {
            match file.patch {
                Some(text) => lines.extend(patch::added_lines(&text)),
                None => log::warn!(
                    "{}: no patch for {} in {}, diff too large?",
                    document.name,
                    file.filename,
                    range
                ),
            }
        }
        Ok(lines)
    }
}
