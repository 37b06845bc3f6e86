// src/pipeline/poll.rs

//! Polling driver.
//!
//! One pass over every watched document:
//!
//! ```text
//! head revision → checkpoint (or parent of head) → skip if unchanged
//!     → added lines → Pipeline::run → deliver payloads → save checkpoint
//! ```
//!
//! The checkpoint only advances once the batch went through the pipeline, so
//! a failed pass is retried on the next tick over the same revision range.

use std::time::Duration;

use chrono::{NaiveDate, Utc};

use crate::delivery::DeliverySink;
use crate::error::Result;
use crate::models::{
    BatchReport, BatchStats, Config, DedupScope, DocumentConfig, StoreFailurePolicy,
};
use crate::pipeline::Pipeline;
use crate::sources::DiffSource;
use crate::storage::{CheckpointStore, ScopedStore, SeenStore};

/// What happened to one document in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Head equals the checkpoint, or head has no parent on a first run
    Unchanged { head: String },
    Processed(DocumentReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub base: String,
    pub head: String,
    pub stats: BatchStats,
    pub delivered: usize,
    pub delivery_failures: usize,
    /// The durable store failed and the batch fell back to in-batch dedup
    pub degraded: bool,
}

/// Totals of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub documents: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub rows: usize,
    pub accepted: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
}

impl PollSummary {
    fn record(&mut self, outcome: &DocumentOutcome) {
        self.documents += 1;
        match outcome {
            DocumentOutcome::Unchanged { .. } => self.unchanged += 1,
            DocumentOutcome::Processed(report) => {
                self.rows += report.stats.rows;
                self.accepted += report.stats.accepted;
                self.delivered += report.delivered;
                self.delivery_failures += report.delivery_failures;
            }
        }
    }

    fn log(&self) {
        crate::utils::log::summary(
            "Poll",
            &[
                ("Documents", self.documents.to_string()),
                ("Unchanged", self.unchanged.to_string()),
                ("Failed", self.failed.to_string()),
                ("Rows", self.rows.to_string()),
                ("Accepted", self.accepted.to_string()),
                ("Delivered", self.delivered.to_string()),
                ("Delivery failures", self.delivery_failures.to_string()),
            ],
        );
    }
}

/// Drives the pipeline over every configured document.
pub struct Poller<'a> {
    config: &'a Config,
    pipeline: Pipeline,
    source: &'a dyn DiffSource,
    seen: &'a dyn SeenStore,
    checkpoints: &'a dyn CheckpointStore,
    sink: &'a dyn DeliverySink,
}

impl<'a> Poller<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn DiffSource,
        seen: &'a dyn SeenStore,
        checkpoints: &'a dyn CheckpointStore,
        sink: &'a dyn DeliverySink,
    ) -> Result<Self> {
        Ok(Self {
            config,
            pipeline: Pipeline::new(&config.filters)?,
            source,
            seen,
            checkpoints,
            sink,
        })
    }

    /// Poll every document once. Per-document errors are logged and counted.
    pub async fn poll_once(&self, reference: NaiveDate) -> PollSummary {
        let mut summary = PollSummary::default();

        for document in &self.config.documents {
            match self.poll_document(document, reference).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    log::error!("{}: poll failed: {}", document.name, e);
                    summary.documents += 1;
                    summary.failed += 1;
                }
            }
        }

        summary.log();
        summary
    }

    /// Poll forever, one pass per `watcher.poll_interval_secs`.
    pub async fn watch(&self) -> Result<()> {
        let period = Duration::from_secs(self.config.watcher.poll_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        log::info!(
            "Watching {} documents every {}s",
            self.config.documents.len(),
            period.as_secs()
        );

        loop {
            interval.tick().await;
            self.poll_once(Utc::now().date_naive()).await;
        }
    }

    /// Poll a single document.
    pub async fn poll_document(
        &self,
        document: &DocumentConfig,
        reference: NaiveDate,
    ) -> Result<DocumentOutcome> {
        let head = self.source.head_revision(document).await?;

        let base = match self.checkpoints.load_checkpoint(&document.name).await? {
            Some(revision) => revision,
            None => match self.source.base_revision(document, &head).await? {
                Some(parent) => parent,
                None => {
                    log::info!("{}: {} has no parent, starting from it", document.name, head);
                    self.checkpoints
                        .save_checkpoint(&document.name, &head)
                        .await?;
                    return Ok(DocumentOutcome::Unchanged { head });
                }
            },
        };

        if base == head {
            log::debug!("{}: unchanged at {}", document.name, head);
            return Ok(DocumentOutcome::Unchanged { head });
        }

        let lines = self.source.added_lines(document, &base, &head).await?;
        log::info!(
            "{}: {} added lines in {}...{}",
            document.name,
            lines.len(),
            short(&base),
            short(&head)
        );

        let (batch, degraded) = self.run_batch(document, &lines, reference).await?;

        let destinations = self.config.delivery.active_destinations();
        let mut delivered = 0;
        let mut delivery_failures = 0;
        for payload in &batch.payloads {
            match self.sink.deliver(payload, destinations).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::error!("{}: delivery failed: {}", document.name, e);
                    delivery_failures += 1;
                }
            }
        }

        self.checkpoints
            .save_checkpoint(&document.name, &head)
            .await?;

        let stats = batch.stats;
        log::info!(
            "{}: {} rows, {} accepted, {} rejected, {} malformed",
            document.name,
            stats.rows,
            stats.accepted,
            stats.rejected(),
            stats.malformed
        );

        Ok(DocumentOutcome::Processed(DocumentReport {
            base,
            head,
            stats,
            delivered,
            delivery_failures,
            degraded,
        }))
    }

    async fn run_batch(
        &self,
        document: &DocumentConfig,
        lines: &[String],
        reference: NaiveDate,
    ) -> Result<(BatchReport, bool)> {
        let scoped = match self.config.dedup.scope {
            DedupScope::Variant => ScopedStore::new(self.seen, &document.variant.label),
            DedupScope::Global => ScopedStore::global(self.seen),
        };

        match self
            .pipeline
            .run(lines, &document.variant, reference, Some(&scoped))
            .await
        {
            Ok(report) => Ok((report, false)),
            Err(e)
                if e.is_store()
                    && self.config.dedup.on_store_failure == StoreFailurePolicy::Degrade =>
            {
                log::warn!(
                    "{}: {}; continuing with in-batch deduplication only",
                    document.name,
                    e
                );
                let report = self
                    .pipeline
                    .process_batch_report(lines, &document.variant, reference);
                Ok((report, true))
            }
            Err(e) => Err(e),
        }
    }
}

fn short(revision: &str) -> &str {
    revision.get(..7).unwrap_or(revision)
}
