mod common;

use match_stats::{
    aggregate::{grouped_sum, top_n},
    coerce::coerce_numeric,
    config::Profile,
    data::Value,
    error::QueryError,
    queries::Session,
    report::{self, ReportParams},
    schema::QueryKind,
};

use common::{ingest, ingest_fixtures};

fn names(values: &[Value]) -> Vec<String> {
    values.iter().map(Value::as_display).collect()
}

#[test]
fn card_example_coerces_groups_and_ranks() {
    let dataset = ingest(&[("cards.csv", "player,card\nA,1\nB,2\nA,x\n")]);
    let coerced = coerce_numeric(&dataset, &["card"]);
    let cards = coerced
        .view()
        .column_values("card")
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(cards[2], Value::Missing);

    let sums = grouped_sum(&coerced.view(), "player", &["card"]);
    assert_eq!(sums.total(&Value::from("A"), "card"), Some(1.0));
    assert_eq!(sums.total(&Value::from("B"), "card"), Some(2.0));

    let ranking = top_n(&coerced.view(), "player", 10);
    let flat = ranking
        .iter()
        .map(|entry| (entry.key.as_display(), entry.count))
        .collect::<Vec<_>>();
    assert_eq!(flat, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
}

#[test]
fn fixtures_unify_into_schema_union() {
    let dataset = ingest_fixtures();
    assert_eq!(dataset.len(), 11);
    assert_eq!(dataset.sources().len(), 2);
    assert_eq!(dataset.columns().len(), 17);

    let last = dataset.records().last().expect("records");
    assert_eq!(dataset.source_of(last).name, common::STATS_FILE);
    assert_eq!(dataset.value(last, "num_camisa"), &Value::Missing);
    assert_eq!(dataset.value(last, "chutes"), &Value::Number(5.0));
}

#[test]
fn unparsable_card_is_missing_not_dropped() {
    let dataset = ingest_fixtures();
    let veiga = dataset
        .records()
        .iter()
        .find(|record| dataset.value(record, "atleta") == &Value::from("Raphael Veiga"))
        .expect("Raphael Veiga row");
    assert_eq!(dataset.value(veiga, "cartao_amarelo"), &Value::Missing);
}

#[test]
fn session_answers_the_dashboard_queries() {
    let dataset = ingest_fixtures();
    let profile = Profile::default();
    let session = Session::new(&dataset, &profile);

    let top = session.top_players().expect("top players");
    let ranked = top
        .iter()
        .map(|entry| (entry.key.as_display(), entry.count))
        .collect::<Vec<_>>();
    assert_eq!(
        ranked,
        vec![
            ("Gerson".to_string(), 4),
            ("Dudu".to_string(), 4),
            ("Pedro".to_string(), 2),
            ("Raphael Veiga".to_string(), 1),
        ]
    );

    let players = vec!["Dudu".to_string(), "Gerson".to_string()];
    let cards = session.card_comparison(&players).expect("card comparison");
    assert_eq!(cards.table.total(&Value::from("Gerson"), "cartao_amarelo"), Some(2.0));
    assert_eq!(cards.table.total(&Value::from("Gerson"), "cartao_vermelho"), Some(1.0));
    assert_eq!(cards.table.total(&Value::from("Dudu"), "cartao_vermelho"), Some(0.0));

    let performance = session
        .performance_comparison(&players)
        .expect("performance comparison");
    assert_eq!(performance.table.total(&Value::from("Dudu"), "chutes"), Some(8.0));
    assert_eq!(performance.table.total(&Value::from("Gerson"), "passes"), Some(130.0));

    let filtered = session
        .team_date_filter(Some("Palmeiras"), Some("2"))
        .expect("filter");
    let athletes = filtered
        .view
        .column_values("atleta")
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(names(&athletes), vec!["Raphael Veiga", "Dudu", "Dudu"]);

    let distribution = session.card_distribution().expect("distribution");
    assert_eq!(distribution.len(), 1);
    assert_eq!(distribution[0].key, Value::Number(1.0));
    assert_eq!(distribution[0].count, 5);

    let results = session.results_table().expect("results");
    assert_eq!(results.headers, profile.results_columns);
    assert_eq!(results.len(), 11);
}

#[test]
fn comparison_reports_absent_players() {
    let dataset = ingest_fixtures();
    let profile = Profile::default();
    let session = Session::new(&dataset, &profile);
    let comparison = session
        .card_comparison(&["Gerson".to_string(), "Zico".to_string()])
        .expect("comparison");
    assert_eq!(comparison.table.rows.len(), 1);
    assert_eq!(names(&comparison.absent), vec!["Zico"]);
}

#[test]
fn comparison_needs_two_players() {
    let dataset = ingest_fixtures();
    let profile = Profile::default();
    let session = Session::new(&dataset, &profile);
    assert_eq!(
        session.card_comparison(&["Gerson".to_string()]).unwrap_err(),
        QueryError::InsufficientSelection {
            query: QueryKind::CardComparison,
            selected: 1,
        }
    );
}

#[test]
fn stats_only_source_degrades_per_query() {
    let stats = std::fs::read_to_string(common::fixture_path(common::STATS_FILE)).unwrap();
    let dataset = ingest(&[(common::STATS_FILE, stats.as_str())]);
    let profile = Profile::default();
    let session = Session::new(&dataset, &profile);

    let capabilities = session.capabilities();
    let runnable = |query: QueryKind| {
        capabilities
            .iter()
            .find(|capability| capability.query == query)
            .map(|capability| capability.runnable)
            .unwrap()
    };
    assert!(runnable(QueryKind::TeamDateFilter));
    assert!(runnable(QueryKind::TopPlayers));
    assert!(!runnable(QueryKind::CardDistribution));
    assert!(!runnable(QueryKind::CardComparison));
    assert!(!runnable(QueryKind::ResultsTable));

    let report = report::build(&session, &ReportParams::default());
    assert!(report.section(report::RESULTS).unwrap().is_warning());
    assert!(!report.section(report::TEAM_PERFORMANCE).unwrap().is_warning());
    assert!(!report.section(report::SUMMARY).unwrap().is_warning());
}

#[test]
fn report_without_selection_warns_about_comparisons() {
    let dataset = ingest_fixtures();
    let profile = Profile::default();
    let session = Session::new(&dataset, &profile);
    let report = report::build(&session, &ReportParams::default());
    assert_eq!(report.sections.len(), 7);
    let comparison = report.section(report::CARD_COMPARISON).unwrap();
    assert!(comparison.is_warning());
}
