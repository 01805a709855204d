use std::io::Write;
use std::path::PathBuf;

use strideboard::data::ActivityLoader;
use strideboard::stats::{AggregateView, Aggregator, FilterSelection};

const FIXTURE: &str = include_str!("fixtures/activities.csv");

fn fixture_path(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("activities.csv");
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(FIXTURE.as_bytes()).expect("write fixture");
    path
}

#[test]
fn full_pipeline_over_the_fixture_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = fixture_path(&dir);

    let mut loader = ActivityLoader::new();
    let table = loader.load(&path).expect("load fixture");

    // the broken-date row is dropped, everything else survives
    assert_eq!(table.raw_rows, 5);
    assert_eq!(table.dropped_rows, 1);
    assert_eq!(table.df.height(), 4);
    assert!(table.warnings.is_empty());

    let kpis = Aggregator::kpis(&table.df);
    assert_eq!(kpis.activity_count, 4);
    assert!((kpis.total_distance_km - 26.0).abs() < 1e-9);
    assert!((kpis.longest_km - 10.0).abs() < 1e-9);

    // the monthly pivot redistributes the same total
    let monthly = Aggregator::monthly_distance(&table.df);
    assert!((monthly.total() - kpis.total_distance_km).abs() < 1e-9);
    assert_eq!(monthly.months, vec![(2022, 3), (2023, 1), (2023, 2)]);

    // cumulative prefix sum ends at the total
    let cumulative = Aggregator::cumulative_distance(&table.df);
    let last = cumulative.last().expect("nonempty series");
    assert!((last.total_km - kpis.total_distance_km).abs() < 1e-9);
}

#[test]
fn ride_filter_reproduces_the_documented_example() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = fixture_path(&dir);

    let mut loader = ActivityLoader::new();
    let table = loader.load(&path).expect("load fixture");

    let selection = FilterSelection {
        year: None,
        activity_type: Some("Ride".to_string()),
    };
    let view = AggregateView::compute(&table.df, &selection);

    assert_eq!(view.kpis.activity_count, 2);
    assert!((view.kpis.total_distance_km - 13.0).abs() < 1e-9);
    assert_eq!(view.monthly.months, vec![(2023, 1)]);
    assert!((view.monthly.by_type["Ride"][0] - 13.0).abs() < 1e-9);

    // average speed column is m/s in the export, km/h in the table
    assert!(view.kpis.avg_speed_kmh > 10.0);
}

#[test]
fn year_filter_scopes_the_type_options() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = fixture_path(&dir);

    let mut loader = ActivityLoader::new();
    let table = loader.load(&path).expect("load fixture");

    assert_eq!(Aggregator::observed_years(&table.df), vec![2023, 2022]);

    let year_only = FilterSelection {
        year: Some(2022),
        activity_type: None,
    };
    let scoped = Aggregator::apply_filter(&table.df, &year_only);
    assert_eq!(Aggregator::observed_types(&scoped), vec!["Hike".to_string()]);
}

#[test]
fn unmatched_filter_is_empty_but_never_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = fixture_path(&dir);

    let mut loader = ActivityLoader::new();
    let table = loader.load(&path).expect("load fixture");

    let selection = FilterSelection {
        year: Some(2022),
        activity_type: Some("Ride".to_string()),
    };
    let view = AggregateView::compute(&table.df, &selection);

    assert_eq!(view.kpis.activity_count, 0);
    assert_eq!(view.kpis.total_distance_km, 0.0);
    assert!(view.monthly.months.is_empty());
    assert!(view.cumulative.is_empty());
    assert!(view.breakdown.is_empty());
    assert!(view.recent.is_empty());
}

#[test]
fn recent_listing_is_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = fixture_path(&dir);

    let mut loader = ActivityLoader::new();
    let table = loader.load(&path).expect("load fixture");

    let recent = Aggregator::recent(&table.df, 20);
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0].name.as_deref(), Some("Park Run"));
    for pair in recent.windows(2) {
        assert!(pair[0].start_ts_ms >= pair[1].start_ts_ms);
    }
}
