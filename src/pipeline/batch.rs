//! Batch orchestration.
//!
//! A batch is every added line of one diff of one document. Rows are folded in
//! order through a [`BatchState`] holding the carried company name and the
//! seen links; later rows depend on what earlier rows left there, so rows are
//! never processed out of order.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::{Result, RowParseError};
use crate::models::{
    BatchReport, FilterConfig, JobCandidate, NotificationPayload, Rejection, RowOutcome, Variant,
};
use crate::pipeline::dedup::{Admission, DeduplicationGate};
use crate::services::{
    CompanyCarry, FieldExtractor, LocationResolver, Recency, RecencyFilter, RowSchema,
    TokenizedRow, formatter, matcher_for,
};
use crate::storage::SeenStore;

/// Accumulator threaded through one batch.
pub struct BatchState<'s> {
    pub carry: CompanyCarry,
    pub dedup: DeduplicationGate<'s>,
}

impl<'s> BatchState<'s> {
    pub fn new(store: Option<&'s dyn SeenStore>) -> Self {
        Self {
            carry: CompanyCarry::new(),
            dedup: DeduplicationGate::with_store(store),
        }
    }
}

/// Turns added table lines into notification payloads.
pub struct Pipeline {
    extractor: FieldExtractor,
    locations: LocationResolver,
    recency: RecencyFilter,
}

impl Pipeline {
    pub fn new(filters: &FilterConfig) -> Result<Self> {
        Ok(Self {
            extractor: FieldExtractor::new()?,
            locations: LocationResolver::new(matcher_for(filters)?)?,
            recency: RecencyFilter::from_config(filters),
        })
    }

    /// Process a batch with in-batch deduplication only.
    pub fn process_batch<I>(
        &self,
        lines: I,
        variant: &Variant,
        reference: NaiveDate,
    ) -> Vec<NotificationPayload>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.process_batch_report(lines, variant, reference).payloads
    }

    /// Same as [`Pipeline::process_batch`], keeping every row outcome.
    pub fn process_batch_report<I>(
        &self,
        lines: I,
        variant: &Variant,
        reference: NaiveDate,
    ) -> BatchReport
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let schema = variant.row_schema();
        let mut state = BatchState::new(None);
        let mut report = BatchReport::default();

        for (index, line) in lines.into_iter().enumerate() {
            let outcome = match self.evaluate(&mut state.carry, line.as_ref(), &schema, reference)
            {
                Ok(candidate) => {
                    let admission = state.dedup.admit_in_batch(&candidate.apply_link);
                    self.settle(&mut report, candidate, admission, variant, reference)
                }
                Err(outcome) => outcome,
            };
            log_outcome(index, &outcome);
            report.push(outcome);
        }

        report
    }

    /// Process a batch, deduplicating against `store` as well.
    ///
    /// A store failure stops the batch and is returned to the caller.
    pub async fn run<I>(
        &self,
        lines: I,
        variant: &Variant,
        reference: NaiveDate,
        store: Option<&dyn SeenStore>,
    ) -> Result<BatchReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let schema = variant.row_schema();
        let mut state = BatchState::new(store);
        let mut report = BatchReport::default();

        for (index, line) in lines.into_iter().enumerate() {
            let evaluated = self.evaluate(&mut state.carry, line.as_ref(), &schema, reference);
            let outcome = match evaluated {
                Ok(candidate) => {
                    let admission = state.dedup.admit(&candidate.apply_link, Utc::now()).await?;
                    self.settle(&mut report, candidate, admission, variant, reference)
                }
                Err(outcome) => outcome,
            };
            log_outcome(index, &outcome);
            report.push(outcome);
        }

        Ok(report)
    }

    /// Run every filter on one line.
    ///
    /// `Err` carries the outcome of a row that stops here.
    fn evaluate(
        &self,
        carry: &mut CompanyCarry,
        line: &str,
        schema: &RowSchema,
        reference: NaiveDate,
    ) -> std::result::Result<JobCandidate, RowOutcome> {
        let row = TokenizedRow::parse(line);
        let fields = self
            .extractor
            .extract(&row, schema)
            .map_err(RowOutcome::Malformed)?;

        // Carried even if a later check drops this row.
        let company = carry.resolve(fields.company);

        if fields.is_closed() {
            return Err(RowOutcome::Rejected(Rejection::Closed));
        }

        let apply_link = self
            .extractor
            .apply_link(fields.status)
            .ok_or(RowOutcome::Malformed(RowParseError::MissingLink))?;

        let posted_date = match self
            .recency
            .check(fields.date, reference)
            .map_err(RowOutcome::Malformed)?
        {
            Recency::Fresh(date) => date,
            Recency::Stale { posted, age_days } => {
                return Err(RowOutcome::Rejected(Rejection::Stale { posted, age_days }));
            }
            Recency::Future(posted) => {
                return Err(RowOutcome::Rejected(Rejection::Future { posted }));
            }
        };

        let locations = self.locations.resolve(fields.location);
        if locations.is_empty() {
            return Err(RowOutcome::Rejected(Rejection::NoDomesticLocation));
        }

        Ok(JobCandidate {
            company,
            title: fields.title.to_string(),
            raw_location: fields.location.to_string(),
            locations,
            terms: fields.terms.map(str::to_string),
            apply_link,
            posted_date,
            posted_cell: fields.date.to_string(),
        })
    }

    /// Render an admitted candidate, or turn a duplicate into a rejection.
    fn settle(
        &self,
        report: &mut BatchReport,
        candidate: JobCandidate,
        admission: Admission,
        variant: &Variant,
        reference: NaiveDate,
    ) -> RowOutcome {
        match admission {
            Admission::Admitted => {
                report
                    .payloads
                    .push(formatter::render(&candidate, variant, reference.year()));
                RowOutcome::Accepted {
                    apply_link: candidate.apply_link,
                }
            }
            Admission::Duplicate(origin) => RowOutcome::Rejected(Rejection::Duplicate {
                apply_link: candidate.apply_link,
                origin,
            }),
        }
    }
}

fn log_outcome(index: usize, outcome: &RowOutcome) {
    match outcome {
        RowOutcome::Accepted { apply_link } => log::debug!("row {index}: accepted {apply_link}"),
        RowOutcome::Rejected(rejection) => {
            log::debug!("row {index}: skipped ({}): {rejection}", rejection.kind())
        }
        RowOutcome::Malformed(error) => log::debug!("row {index}: malformed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::DuplicateOrigin;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 3).unwrap()
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(&FilterConfig::default()).unwrap()
    }

    fn row(company: &str, location: &str, link: &str, date: &str) -> String {
        format!("| {company} | SWE Intern | {location} | <a href=\"{link}\">Apply</a> | {date} |")
    }

    #[test]
    fn test_single_row_accepted() {
        let line = row("**[Acme](https://acme.test)**", "Austin, TX", "https://x.test/job1", "Feb 01");
        let payloads = pipeline().process_batch([line], &Variant::summer(), reference());

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].company, "Acme");
        assert_eq!(payloads[0].location, "Austin, TX");
        assert_eq!(payloads[0].apply_link, "https://x.test/job1");
    }

    #[test]
    fn test_outcome_per_line() {
        let lines = vec![
            row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 01"),
            "| Acme | SWE | Feb 01 |".to_string(),
            row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 01"),
            row("[Acme](a)", "Toronto, Canada", "https://x.test/2", "Feb 01"),
            "| [Acme](a) | SWE | NYC | 🔒 | Feb 01 |".to_string(),
            "| [Acme](a) | SWE | NYC | no link | Feb 01 |".to_string(),
            row("[Acme](a)", "NYC", "https://x.test/3", "Jan 20"),
            row("[Acme](a)", "NYC", "https://x.test/4", "Feb 09"),
            row("[Acme](a)", "NYC", "https://x.test/5", "Febr 1st"),
        ];
        let report = pipeline().process_batch_report(&lines, &Variant::summer(), reference());

        assert_eq!(report.outcomes.len(), lines.len());
        assert!(report.outcomes[0].is_accepted());
        assert!(matches!(
            report.outcomes[1],
            RowOutcome::Malformed(RowParseError::TooFewCells { .. })
        ));
        assert!(matches!(
            report.outcomes[2],
            RowOutcome::Rejected(Rejection::Duplicate {
                origin: DuplicateOrigin::Batch,
                ..
            })
        ));
        assert_eq!(
            report.outcomes[3],
            RowOutcome::Rejected(Rejection::NoDomesticLocation)
        );
        assert_eq!(report.outcomes[4], RowOutcome::Rejected(Rejection::Closed));
        assert_eq!(
            report.outcomes[5],
            RowOutcome::Malformed(RowParseError::MissingLink)
        );
        assert!(matches!(
            report.outcomes[6],
            RowOutcome::Rejected(Rejection::Stale { age_days: 14, .. })
        ));
        assert!(matches!(
            report.outcomes[7],
            RowOutcome::Rejected(Rejection::Future { .. })
        ));
        assert!(matches!(
            report.outcomes[8],
            RowOutcome::Malformed(RowParseError::InvalidDate { .. })
        ));
        assert_eq!(report.stats.accepted, 1);
        assert_eq!(report.stats.malformed, 3);
        assert_eq!(report.stats.rejected(), 5);
    }

    #[test]
    fn test_continuation_inherits_from_filtered_row() {
        let lines = [
            row("**[Acme](https://acme.test)**", "Toronto, Canada", "https://x.test/1", "Feb 01"),
            row("↳", "Austin, TX", "https://x.test/2", "Feb 01"),
        ];
        let payloads = pipeline().process_batch(lines, &Variant::summer(), reference());

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].company, "Acme");
        assert_eq!(payloads[0].apply_link, "https://x.test/2");
    }

    #[test]
    fn test_closed_row_still_sets_company() {
        let lines = [
            "| [Globex](g) | SWE | NYC | 🔒 | Feb 01 |".to_string(),
            row("↳", "Austin, TX", "https://x.test/2", "Feb 01"),
        ];
        let payloads = pipeline().process_batch(lines, &Variant::summer(), reference());
        assert_eq!(payloads[0].company, "Globex");
    }

    #[test]
    fn test_table_separator_does_not_break_inheritance() {
        let lines = [
            row("[Acme](a)", "Toronto, Canada", "https://x.test/1", "Feb 01"),
            "|---|---|---|---|---|".to_string(),
            row("↳", "Austin, TX", "https://x.test/2", "Feb 01"),
        ];
        let report = pipeline().process_batch_report(&lines, &Variant::summer(), reference());

        assert_eq!(
            report.outcomes[1],
            RowOutcome::Malformed(RowParseError::MissingLink)
        );
        assert_eq!(report.payloads.len(), 1);
        assert_eq!(report.payloads[0].company, "Acme");
    }

    #[test]
    fn test_coop_variant() {
        let line = "+| **[Acme](a)** | Firmware Co-op | Boston, MA | Fall 2026, Spring 2027 | <a href=\"https://x.test/coop\">Apply</a> | Feb 02 |";
        let payloads = pipeline().process_batch([line], &Variant::co_op(), reference());

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].title, "Firmware Co-op");
        assert_eq!(payloads[0].terms.as_deref(), Some("Fall 2026 | Spring 2027"));
    }

    #[tokio::test]
    async fn test_run_with_store_is_idempotent() {
        let store = MemoryStore::new();
        let lines = [row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 01")];
        let pipeline = pipeline();

        let first = pipeline
            .run(&lines, &Variant::summer(), reference(), Some(&store))
            .await
            .unwrap();
        let second = pipeline
            .run(&lines, &Variant::summer(), reference(), Some(&store))
            .await
            .unwrap();

        assert_eq!(first.payloads.len(), 1);
        assert!(second.payloads.is_empty());
        assert_eq!(
            second.outcomes[0],
            RowOutcome::Rejected(Rejection::Duplicate {
                apply_link: "https://x.test/1".into(),
                origin: DuplicateOrigin::Store,
            })
        );
    }

    struct BrokenStore;

    #[async_trait]
    impl SeenStore for BrokenStore {
        async fn exists(&self, _key: &str) -> Result<bool> {
            Err(AppError::store("unreachable"))
        }

        async fn record(&self, _key: &str, _at: DateTime<Utc>) -> Result<()> {
            Err(AppError::store("unreachable"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let lines = [
            "| too | short |".to_string(),
            row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 01"),
        ];
        let err = pipeline()
            .run(&lines, &Variant::summer(), reference(), Some(&BrokenStore))
            .await
            .unwrap_err();
        assert!(err.is_store());
    }
}
