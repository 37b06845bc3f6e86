//! End-to-end behaviour of the row pipeline.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use postwatch::error::RowParseError;
use postwatch::models::{FilterConfig, LocationMatch, Rejection, RowOutcome, Variant};
use postwatch::pipeline::Pipeline;
use postwatch::storage::{LocalStorage, MemoryStore, ScopedStore};

fn pipeline() -> Pipeline {
    Pipeline::new(&FilterConfig::default()).unwrap()
}

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
}

fn row(company: &str, location: &str, link: &str, date: &str) -> String {
    format!("| {company} | SWE Intern | {location} | <a href=\"{link}\">Apply</a> | {date} |")
}

fn day(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

#[test]
fn test_concrete_scenario() {
    let today = Utc::now().date_naive();
    let reference = NaiveDate::from_ymd_opt(today.year(), 2, 3).unwrap();
    let line = "| **[Acme](link)** | SWE Intern | Austin, TX | <a href=\"https://x.test/job1\">Apply</a> | Feb 01 |";

    let payloads = pipeline().process_batch([line], &Variant::summer(), reference);

    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].apply_link, "https://x.test/job1");
    assert_eq!(payloads[0].location, "Austin, TX");
    assert_eq!(payloads[0].company, "Acme");
}

#[test]
fn test_same_line_twice_in_one_batch() {
    let line = row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 09");
    let payloads = pipeline().process_batch([&line, &line], &Variant::summer(), reference());
    assert_eq!(payloads.len(), 1);
}

#[tokio::test]
async fn test_same_line_across_batches_with_shared_store() {
    let store = MemoryStore::new();
    let line = row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 09");
    let pipeline = pipeline();

    let mut total = 0;
    for _ in 0..3 {
        let report = pipeline
            .run([&line], &Variant::summer(), reference(), Some(&store))
            .await
            .unwrap();
        total += report.payloads.len();
    }
    assert_eq!(total, 1);
    assert_eq!(store.seen_count(), 1);
}

#[tokio::test]
async fn test_seen_links_survive_restart() {
    let tmp = tempfile::TempDir::new().unwrap();
    let line = row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 09");
    let pipeline = pipeline();

    {
        let storage = LocalStorage::new(tmp.path());
        let report = pipeline
            .run([&line], &Variant::summer(), reference(), Some(&storage))
            .await
            .unwrap();
        assert_eq!(report.payloads.len(), 1);
    }

    let storage = LocalStorage::new(tmp.path());
    let report = pipeline
        .run([&line], &Variant::summer(), reference(), Some(&storage))
        .await
        .unwrap();
    assert!(report.payloads.is_empty());
}

#[tokio::test]
async fn test_variant_scopes_do_not_share_links() {
    let store = MemoryStore::new();
    let pipeline = pipeline();
    let summer_line = row("[Acme](a)", "Austin, TX", "https://x.test/1", "Feb 09");
    let coop_line = "| [Acme](a) | SWE Co-op | Austin, TX | Fall 2026 | <a href=\"https://x.test/1\">Apply</a> | Feb 09 |";

    let summer_scope = ScopedStore::new(&store, "Summer");
    let coop_scope = ScopedStore::new(&store, "Co-Op");

    let summer = pipeline
        .run([&summer_line], &Variant::summer(), reference(), Some(&summer_scope))
        .await
        .unwrap();
    let coop = pipeline
        .run([coop_line], &Variant::co_op(), reference(), Some(&coop_scope))
        .await
        .unwrap();

    assert_eq!(summer.payloads.len(), 1);
    assert_eq!(coop.payloads.len(), 1);
}

#[test]
fn test_output_order_matches_input_order() {
    let lines: Vec<String> = (1..=6)
        .map(|i| {
            let location = if i % 3 == 0 { "London, UK" } else { "Austin, TX" };
            row("[Acme](a)", location, &format!("https://x.test/{i}"), "Feb 08")
        })
        .collect();

    let payloads = pipeline().process_batch(&lines, &Variant::summer(), reference());
    let links: Vec<&str> = payloads.iter().map(|p| p.apply_link.as_str()).collect();

    assert_eq!(
        links,
        vec![
            "https://x.test/1",
            "https://x.test/2",
            "https://x.test/4",
            "https://x.test/5"
        ]
    );
}

#[test]
fn test_closed_rows_never_emit() {
    let lines = [
        "| [Acme](a) | SWE | Austin, TX | 🔒 | Feb 09 |",
        "| [Acme](a) | SWE | Austin, TX | <a href=\"https://x.test/1\">🔒</a> | Feb 09 |",
        "| [Acme](a) | SWE | Toronto, Canada | 🔒 | long ago |",
    ];
    let report = pipeline().process_batch_report(lines, &Variant::summer(), reference());

    assert!(report.payloads.is_empty());
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.rejection() == Some(&Rejection::Closed))
    );
}

#[test]
fn test_recency_boundaries() {
    let reference = reference();
    let seven = reference - Duration::days(7);
    let eight = reference - Duration::days(8);
    let tomorrow = reference + Duration::days(1);

    let lines = [
        row("[A](a)", "NYC", "https://x.test/7", &day(seven)),
        row("[B](b)", "NYC", "https://x.test/8", &day(eight)),
        row("[C](c)", "NYC", "https://x.test/future", &day(tomorrow)),
        row("[D](d)", "NYC", "https://x.test/today", &day(reference)),
    ];
    let report = pipeline().process_batch_report(&lines, &Variant::summer(), reference);

    assert!(report.outcomes[0].is_accepted());
    assert!(matches!(
        report.outcomes[1],
        RowOutcome::Rejected(Rejection::Stale { age_days: 8, .. })
    ));
    assert!(matches!(
        report.outcomes[2],
        RowOutcome::Rejected(Rejection::Future { .. })
    ));
    assert!(report.outcomes[3].is_accepted());
}

#[test]
fn test_december_posting_seen_in_january() {
    let reference = NaiveDate::from_ymd_opt(2027, 1, 2).unwrap();
    let line = row("[Acme](a)", "NYC", "https://x.test/dec", "Dec 30");

    let inferred = pipeline().process_batch([&line], &Variant::summer(), reference);
    assert_eq!(inferred.len(), 1);

    let strict = Pipeline::new(&FilterConfig {
        infer_year_rollover: false,
        ..FilterConfig::default()
    })
    .unwrap();
    assert!(
        strict
            .process_batch([&line], &Variant::summer(), reference)
            .is_empty()
    );
}

#[test]
fn test_continuation_inherits_from_rejected_row() {
    let lines = [
        row("**[Acme](https://acme.test)**", "NYC", "https://x.test/old", "Jan 01"),
        row("↳", "Austin, TX", "https://x.test/new", "Feb 09"),
        row("**[Globex](https://globex.test)**", "Toronto, Canada", "https://x.test/g1", "Feb 09"),
        row("↳", "Boston, MA", "https://x.test/g2", "Feb 09"),
    ];
    let payloads = pipeline().process_batch(lines, &Variant::summer(), reference());

    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].company, "Acme");
    assert_eq!(payloads[1].company, "Globex");
}

#[test]
fn test_continuation_without_prior_company() {
    let line = row("↳", "Austin, TX", "https://x.test/1", "Feb 09");
    let payloads = pipeline().process_batch([line], &Variant::summer(), reference());
    assert_eq!(payloads[0].company, "Unknown Company");
}

#[test]
fn test_location_examples() {
    let lines = [
        row("[A](a)", "Toronto, Canada", "https://x.test/1", "Feb 09"),
        row("[A](a)", "Austin, TX", "https://x.test/2", "Feb 09"),
        row("[A](a)", "Remote</br>Austin, TX", "https://x.test/3", "Feb 09"),
        row(
            "[A](a)",
            "<details><summary>3 locations</summary>NYC</br>London, UK</br>remote</details>",
            "https://x.test/4",
            "Feb 09",
        ),
        row("[A](a)", "Remote in Canada", "https://x.test/5", "Feb 09"),
    ];
    let report = pipeline().process_batch_report(&lines, &Variant::summer(), reference());

    assert_eq!(
        report.outcomes[0],
        RowOutcome::Rejected(Rejection::NoDomesticLocation)
    );
    let locations: Vec<&str> = report.payloads.iter().map(|p| p.location.as_str()).collect();
    assert_eq!(
        locations,
        vec!["Austin, TX", "Remote | Austin, TX", "NYC | remote", "Remote"]
    );
}

#[test]
fn test_word_matching_keeps_milwaukee() {
    let line = row("[A](a)", "Milwaukee, WI", "https://x.test/1", "Feb 09");

    let substring = pipeline().process_batch([&line], &Variant::summer(), reference());
    assert!(substring.is_empty());

    let word = Pipeline::new(&FilterConfig {
        location_match: LocationMatch::Word,
        ..FilterConfig::default()
    })
    .unwrap();
    assert_eq!(
        word.process_batch([&line], &Variant::summer(), reference()).len(),
        1
    );
}

#[test]
fn test_malformed_rows_are_distinct_from_rejections() {
    let lines = [
        "| [A](a) | SWE | Feb 09 |".to_string(),
        "| [A](a) | SWE | NYC | Apply soon | Feb 09 |".to_string(),
        row("[A](a)", "NYC", "https://x.test/1", "someday"),
    ];
    let report = pipeline().process_batch_report(&lines, &Variant::summer(), reference());

    assert_eq!(report.stats.malformed, 3);
    assert_eq!(report.stats.rejected(), 0);
    assert_eq!(
        report.outcomes[1].parse_error(),
        Some(&RowParseError::MissingLink)
    );
}

#[test]
fn test_coop_terms_and_markdown_link() {
    let line = "+| **[Acme](a)** | Hardware Co-op | Boston, MA | Fall 2026, Spring 2027 | [Apply](https://x.test/coop) | Feb 09 |";
    let payloads = pipeline().process_batch([line], &Variant::co_op(), reference());

    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].apply_link, "https://x.test/coop");
    assert!(
        payloads[0]
            .text
            .contains("**➡️ When?:** Fall 2026 | Spring 2027\n")
    );
}

#[test]
fn test_new_grad_has_no_terms_line() {
    let line = row("[Acme](a)", "NYC", "https://x.test/ng", "Feb 09");
    let payloads = pipeline().process_batch([line], &Variant::new_grad(), reference());

    assert_eq!(payloads[0].terms, None);
    assert!(!payloads[0].text.contains("When?"));
}
