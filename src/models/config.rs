//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Variant;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and polling behavior settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Row filter rules
    #[serde(default)]
    pub filters: FilterConfig,

    /// Deduplication behavior
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Where notifications go
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Watched listing documents
    #[serde(default = "defaults::documents")]
    pub documents: Vec<DocumentConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.watcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("watcher.user_agent is empty"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::validation("watcher.timeout_secs must be > 0"));
        }
        if self.watcher.poll_interval_secs == 0 {
            return Err(AppError::validation(
                "watcher.poll_interval_secs must be > 0",
            ));
        }
        if self.filters.max_age_days < 0 {
            return Err(AppError::validation("filters.max_age_days must be >= 0"));
        }
        if self
            .filters
            .excluded_regions
            .iter()
            .any(|r| r.trim().is_empty())
        {
            return Err(AppError::validation(
                "filters.excluded_regions contains an empty entry",
            ));
        }
        if self.delivery.max_destinations == 0 {
            return Err(AppError::validation(
                "delivery.max_destinations must be > 0",
            ));
        }
        if self.documents.is_empty() {
            return Err(AppError::validation("No documents defined"));
        }
        for doc in &self.documents {
            if doc.name.trim().is_empty() || doc.path.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "document '{}' needs a name and a path",
                    doc.name
                )));
            }
        }
        let mut names: Vec<&str> = self.documents.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(AppError::validation("document names must be unique"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watcher: WatcherConfig::default(),
            filters: FilterConfig::default(),
            dedup: DedupConfig::default(),
            delivery: DeliveryConfig::default(),
            storage: StorageConfig::default(),
            documents: defaults::documents(),
        }
    }
}

/// HTTP client and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Base URL of the repository API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between polling passes in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            poll_interval_secs: defaults::poll_interval(),
        }
    }
}

/// How location entries are compared against the exclusion list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMatch {
    /// Case-insensitive substring
    #[default]
    Substring,
    /// Case-insensitive whole word
    Word,
}

/// Row filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Region names that mark a location as non-domestic
    #[serde(default = "defaults::excluded_regions")]
    pub excluded_regions: Vec<String>,

    #[serde(default)]
    pub location_match: LocationMatch,

    /// Recency window in days, inclusive
    #[serde(default = "defaults::max_age_days")]
    pub max_age_days: i64,

    /// Move future-looking December dates into the previous year
    #[serde(default = "defaults::infer_year_rollover")]
    pub infer_year_rollover: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_regions: defaults::excluded_regions(),
            location_match: LocationMatch::default(),
            max_age_days: defaults::max_age_days(),
            infer_year_rollover: defaults::infer_year_rollover(),
        }
    }
}

/// Durable seen-set keying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupScope {
    /// One seen set per variant label
    #[default]
    Variant,
    /// One seen set shared by every document
    Global,
}

/// What the polling driver does when the durable store fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFailurePolicy {
    /// Fail the document and keep its checkpoint
    #[default]
    Abort,
    /// Re-run the batch with in-batch dedup only
    Degrade,
}

/// Deduplication settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default)]
    pub scope: DedupScope,

    #[serde(default)]
    pub on_store_failure: StoreFailurePolicy,
}

/// Delivery sink kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Webhook,
    #[default]
    Console,
}

/// Delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub sink: SinkKind,

    /// Destination identifiers (webhook URLs for the webhook sink)
    #[serde(default)]
    pub destinations: Vec<String>,

    /// Upper bound on destinations per payload
    #[serde(default = "defaults::max_destinations")]
    pub max_destinations: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            destinations: Vec::new(),
            max_destinations: defaults::max_destinations(),
        }
    }
}

impl DeliveryConfig {
    /// Destinations after applying the cap.
    pub fn active_destinations(&self) -> &[String] {
        let end = self.destinations.len().min(self.max_destinations);
        &self.destinations[..end]
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `seen.json` and `checkpoints.json`
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
        }
    }
}

/// One watched listing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Unique name, also the checkpoint key
    pub name: String,

    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch to follow
    #[serde(default = "defaults::branch")]
    pub branch: String,

    /// File path of the table inside the repository
    pub path: String,

    pub variant: Variant,
}

mod defaults {
    use super::{DocumentConfig, Variant};

    // Watcher defaults
    pub fn api_base() -> String {
        "https://api.github.com".into()
    }
    pub fn user_agent() -> String {
        "postwatch/0.1 (+https://github.com)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn poll_interval() -> u64 {
        60
    }

    // Filter defaults
    pub fn excluded_regions() -> Vec<String> {
        vec![
            "canada".into(),
            "uk".into(),
            "united kingdom".into(),
            "eu".into(),
        ]
    }
    pub fn max_age_days() -> i64 {
        7
    }
    pub fn infer_year_rollover() -> bool {
        true
    }

    // Delivery defaults
    pub fn max_destinations() -> usize {
        20
    }

    // Storage defaults
    pub fn storage_dir() -> String {
        "storage".into()
    }

    // Document defaults
    pub fn branch() -> String {
        "dev".into()
    }

    pub fn documents() -> Vec<DocumentConfig> {
        vec![
            DocumentConfig {
                name: "summer".to_string(),
                owner: "SimplifyJobs".to_string(),
                repo: "Summer2025-Internships".to_string(),
                branch: branch(),
                path: "README.md".to_string(),
                variant: Variant::summer(),
            },
            DocumentConfig {
                name: "co-op".to_string(),
                owner: "SimplifyJobs".to_string(),
                repo: "Summer2025-Internships".to_string(),
                branch: branch(),
                path: "README-Off-Season.md".to_string(),
                variant: Variant::co_op(),
            },
            DocumentConfig {
                name: "new-grad".to_string(),
                owner: "SimplifyJobs".to_string(),
                repo: "New-Grad-Positions".to_string(),
                branch: branch(),
                path: "README.md".to_string(),
                variant: Variant::new_grad(),
            },
        ]
    }
}
