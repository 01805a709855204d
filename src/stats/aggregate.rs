//! Activity Aggregation Module
//! Pure summaries computed from the normalized activity table.

use crate::data::schema::{
    COL_CALORIES, COL_DISTANCE, COL_ELEVATION, COL_HOUR, COL_MONTH, COL_NAME, COL_SPEED,
    COL_START_MS, COL_TIME, COL_TYPE, COL_WEEKDAY, COL_YEAR,
};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

pub const DAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// How many rows the recent-activities table shows.
pub const RECENT_LIMIT: usize = 20;

/// User-chosen subset of the table; `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub activity_type: Option<String>,
}

impl FilterSelection {
    pub fn describe(&self) -> String {
        let year = match self.year {
            Some(y) => y.to_string(),
            None => "All Years".to_string(),
        };
        let kind = self
            .activity_type
            .clone()
            .unwrap_or_else(|| "All Activities".to_string());
        format!("{year} | {kind}")
    }
}

/// Top-level summary statistics for one filtered view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Kpis {
    pub activity_count: usize,
    pub total_distance_km: f64,
    pub total_time_hr: f64,
    pub total_elevation_m: f64,
    pub total_calories: f64,
    pub longest_km: f64,
    pub avg_distance_km: f64,
    pub avg_time_hr: f64,
    pub avg_speed_kmh: f64,
}

/// Distance per observed year-month, split by activity type.
#[derive(Debug, Clone, Default)]
pub struct MonthlySeries {
    /// Observed (year, month) pairs in calendar order.
    pub months: Vec<(i32, u32)>,
    /// Per activity type, one value per entry of `months`. Missing cells are 0.
    pub by_type: BTreeMap<String, Vec<f64>>,
}

impl MonthlySeries {
    pub fn label(year: i32, month: u32) -> String {
        format!("{year}-{month:02}")
    }

    pub fn total(&self) -> f64 {
        self.by_type.values().flatten().sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CumulativePoint {
    pub ts_ms: i64,
    pub total_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatmapMetric {
    Count,
    TotalDistance,
    MeanSpeed,
}

impl HeatmapMetric {
    pub fn label(&self) -> &'static str {
        match self {
            HeatmapMetric::Count => "Count",
            HeatmapMetric::TotalDistance => "Distance (km)",
            HeatmapMetric::MeanSpeed => "Avg. Speed (km/h)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatmapColumns {
    Hour,
    Month,
}

/// Day-of-week by hour/month aggregate matrix.
///
/// A `None` cell means no activity was observed there, which the UI renders
/// differently from an actual zero.
#[derive(Debug, Clone)]
pub struct HeatmapGrid {
    pub metric: HeatmapMetric,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    cells: Vec<Option<f64>>,
}

impl HeatmapGrid {
    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row * self.cols() + col).copied().flatten()
    }

    /// Largest observed cell value, 0 when every cell is empty.
    pub fn max_value(&self) -> f64 {
        self.cells
            .iter()
            .flatten()
            .fold(0.0f64, |acc, v| acc.max(*v))
    }
}

/// Per-type KPI row of the breakdown table.
#[derive(Debug, Clone, Serialize)]
pub struct TypeBreakdown {
    pub activity_type: String,
    pub kpis: Kpis,
}

/// One row of the recent-activities table.
#[derive(Debug, Clone)]
pub struct RecentActivity {
    pub name: Option<String>,
    pub activity_type: String,
    pub start_ts_ms: i64,
    pub distance_km: f64,
    pub moving_time_hr: f64,
    pub speed_kmh: f64,
    pub elevation_m: f64,
    pub calories: Option<f64>,
}

/// Pure aggregation functions over the normalized table. Every function
/// yields zero/empty outputs on an empty table, never an error.
pub struct Aggregator;

impl Aggregator {
    /// Row predicate: (year matches or All) AND (type matches or All).
    /// Order-preserving.
    pub fn apply_filter(df: &DataFrame, selection: &FilterSelection) -> DataFrame {
        let mut lf = df.clone().lazy();
        if let Some(year) = selection.year {
            lf = lf.filter(col(COL_YEAR).eq(lit(year)));
        }
        if let Some(kind) = &selection.activity_type {
            lf = lf.filter(col(COL_TYPE).eq(lit(kind.as_str())));
        }
        lf.collect().unwrap_or_default()
    }

    /// Distinct years, newest first.
    pub fn observed_years(df: &DataFrame) -> Vec<i32> {
        let years: BTreeSet<i32> = Self::i32_values(df, COL_YEAR).into_iter().collect();
        years.into_iter().rev().collect()
    }

    /// Distinct activity types, sorted.
    pub fn observed_types(df: &DataFrame) -> Vec<String> {
        let types: BTreeSet<String> = Self::str_values(df, COL_TYPE).into_iter().collect();
        types.into_iter().collect()
    }

    pub fn kpis(df: &DataFrame) -> Kpis {
        Self::kpis_from_parts(
            &Self::f64_values(df, COL_DISTANCE),
            &Self::f64_values(df, COL_TIME),
            &Self::f64_values(df, COL_ELEVATION),
            &Self::f64_values(df, COL_CALORIES),
            &Self::f64_values(df, COL_SPEED),
        )
    }

    /// Pivot: observed year-months (calendar order) x activity type ->
    /// sum of distance. Missing cells are 0.
    pub fn monthly_distance(df: &DataFrame) -> MonthlySeries {
        let years = Self::i32_values(df, COL_YEAR);
        let months = Self::i32_values(df, COL_MONTH);
        let types = Self::str_values(df, COL_TYPE);
        let distance = Self::f64_values(df, COL_DISTANCE);

        let keys: BTreeSet<(i32, u32)> = years
            .iter()
            .zip(&months)
            .map(|(&y, &m)| (y, m as u32))
            .collect();
        let axis: Vec<(i32, u32)> = keys.into_iter().collect();
        let index: BTreeMap<(i32, u32), usize> = axis
            .iter()
            .enumerate()
            .map(|(i, &key)| (key, i))
            .collect();

        let mut by_type: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for i in 0..distance.len() {
            let key = (years[i], months[i] as u32);
            let Some(&slot) = index.get(&key) else {
                continue;
            };
            let row = by_type
                .entry(types[i].clone())
                .or_insert_with(|| vec![0.0; axis.len()]);
            row[slot] += distance[i];
        }

        MonthlySeries {
            months: axis,
            by_type,
        }
    }

    /// Running total of distance in ascending timestamp order. Recomputed
    /// fresh on every call.
    pub fn cumulative_distance(df: &DataFrame) -> Vec<CumulativePoint> {
        let ts = Self::i64_values(df, COL_START_MS);
        let distance = Self::f64_values(df, COL_DISTANCE);

        let mut order: Vec<usize> = (0..ts.len()).collect();
        order.sort_by_key(|&i| ts[i]);

        let mut total = 0.0;
        order
            .into_iter()
            .map(|i| {
                total += distance[i];
                CumulativePoint {
                    ts_ms: ts[i],
                    total_km: total,
                }
            })
            .collect()
    }

    /// Day-of-week rows against the full hour or month domain.
    pub fn heatmap(df: &DataFrame, metric: HeatmapMetric, columns: HeatmapColumns) -> HeatmapGrid {
        let weekdays = Self::i32_values(df, COL_WEEKDAY);
        let (col_vals, ncols, offset) = match columns {
            HeatmapColumns::Hour => (Self::i32_values(df, COL_HOUR), 24usize, 0i32),
            HeatmapColumns::Month => (Self::i32_values(df, COL_MONTH), 12usize, 1i32),
        };
        let values = match metric {
            HeatmapMetric::Count => vec![1.0; weekdays.len()],
            HeatmapMetric::TotalDistance => Self::f64_values(df, COL_DISTANCE),
            HeatmapMetric::MeanSpeed => Self::f64_values(df, COL_SPEED),
        };

        let mut sums = vec![0.0f64; 7 * ncols];
        let mut counts = vec![0usize; 7 * ncols];
        for i in 0..weekdays.len() {
            let row = weekdays[i] - 1;
            let col = col_vals[i] - offset;
            if !(0..7).contains(&row) || !(0..ncols as i32).contains(&col) {
                continue;
            }
            let slot = row as usize * ncols + col as usize;
            sums[slot] += values[i];
            counts[slot] += 1;
        }

        let cells = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &count)| {
                if count == 0 {
                    None
                } else {
                    Some(match metric {
                        HeatmapMetric::Count => count as f64,
                        HeatmapMetric::TotalDistance => sum,
                        HeatmapMetric::MeanSpeed => sum / count as f64,
                    })
                }
            })
            .collect();

        let col_labels = match columns {
            HeatmapColumns::Hour => (0..24).map(|h| format!("{h:02}")).collect(),
            HeatmapColumns::Month => MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        };

        HeatmapGrid {
            metric,
            row_labels: DAY_LABELS.iter().map(|d| d.to_string()).collect(),
            col_labels,
            cells,
        }
    }

    /// One KPI row per observed activity type, largest total distance first.
    pub fn breakdown_by_type(df: &DataFrame) -> Vec<TypeBreakdown> {
        let types = Self::str_values(df, COL_TYPE);
        let distance = Self::f64_values(df, COL_DISTANCE);
        let time = Self::f64_values(df, COL_TIME);
        let elevation = Self::f64_values(df, COL_ELEVATION);
        let calories = Self::f64_values(df, COL_CALORIES);
        let speed = Self::f64_values(df, COL_SPEED);

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, kind) in types.iter().enumerate() {
            groups.entry(kind.clone()).or_default().push(i);
        }

        let gather = |slice: &[f64], indices: &[usize]| -> Vec<f64> {
            indices.iter().map(|&i| slice[i]).collect()
        };

        let mut rows: Vec<TypeBreakdown> = groups
            .into_iter()
            .map(|(kind, indices)| TypeBreakdown {
                activity_type: kind,
                kpis: Self::kpis_from_parts(
                    &gather(&distance, &indices),
                    &gather(&time, &indices),
                    &gather(&elevation, &indices),
                    &gather(&calories, &indices),
                    &gather(&speed, &indices),
                ),
            })
            .collect();

        // Stable sort keeps the alphabetical order for equal totals.
        rows.sort_by(|a, b| {
            b.kpis
                .total_distance_km
                .partial_cmp(&a.kpis.total_distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }

    /// Most recent activities, newest first; ties keep table order.
    pub fn recent(df: &DataFrame, limit: usize) -> Vec<RecentActivity> {
        let ts = Self::i64_values(df, COL_START_MS);
        let names = Self::opt_str_values(df, COL_NAME);
        let types = Self::str_values(df, COL_TYPE);
        let distance = Self::f64_values(df, COL_DISTANCE);
        let time = Self::f64_values(df, COL_TIME);
        let speed = Self::f64_values(df, COL_SPEED);
        let elevation = Self::f64_values(df, COL_ELEVATION);
        let calories = Self::opt_f64_values(df, COL_CALORIES);

        let mut order: Vec<usize> = (0..ts.len()).collect();
        order.sort_by_key(|&i| Reverse(ts[i]));

        order
            .into_iter()
            .take(limit)
            .map(|i| RecentActivity {
                name: names[i].clone(),
                activity_type: types[i].clone(),
                start_ts_ms: ts[i],
                distance_km: distance[i],
                moving_time_hr: time[i],
                speed_kmh: speed[i],
                elevation_m: elevation[i],
                calories: calories[i],
            })
            .collect()
    }

    fn kpis_from_parts(
        distance: &[f64],
        time: &[f64],
        elevation: &[f64],
        calories: &[f64],
        speed: &[f64],
    ) -> Kpis {
        let n = distance.len();
        let total_distance_km: f64 = distance.iter().sum();
        let total_time_hr: f64 = time.iter().sum();
        let total_elevation_m: f64 = elevation.iter().sum();
        let total_calories: f64 = calories.iter().sum();
        let longest_km = distance.iter().copied().fold(0.0f64, f64::max);

        let (avg_distance_km, avg_time_hr) = if n > 0 {
            (total_distance_km / n as f64, total_time_hr / n as f64)
        } else {
            (0.0, 0.0)
        };

        // Mean of per-activity speeds, ignoring stationary rows.
        let moving: Vec<f64> = speed.iter().copied().filter(|s| *s > 0.0).collect();
        let avg_speed_kmh = if moving.is_empty() {
            0.0
        } else {
            moving.iter().sum::<f64>() / moving.len() as f64
        };

        Kpis {
            activity_count: n,
            total_distance_km,
            total_time_hr,
            total_elevation_m,
            total_calories,
            longest_km,
            avg_distance_km,
            avg_time_hr,
            avg_speed_kmh,
        }
    }

    /// Numeric column as a dense vector; nulls and a missing column become 0.
    fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
        Self::opt_f64_values(df, name)
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect()
    }

    fn opt_f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        let Ok(column) = df.column(name) else {
            return vec![None; df.height()];
        };
        let Ok(cast) = column.cast(&DataType::Float64) else {
            return vec![None; df.height()];
        };
        match cast.f64() {
            Ok(ca) => ca.into_iter().collect(),
            Err(_) => vec![None; df.height()],
        }
    }

    fn i32_values(df: &DataFrame, name: &str) -> Vec<i32> {
        let Ok(column) = df.column(name) else {
            return vec![0; df.height()];
        };
        let Ok(cast) = column.cast(&DataType::Int32) else {
            return vec![0; df.height()];
        };
        match cast.i32() {
            Ok(ca) => ca.into_iter().map(|v| v.unwrap_or(0)).collect(),
            Err(_) => vec![0; df.height()],
        }
    }

    fn i64_values(df: &DataFrame, name: &str) -> Vec<i64> {
        let Ok(column) = df.column(name) else {
            return vec![0; df.height()];
        };
        let Ok(cast) = column.cast(&DataType::Int64) else {
            return vec![0; df.height()];
        };
        match cast.i64() {
            Ok(ca) => ca.into_iter().map(|v| v.unwrap_or(0)).collect(),
            Err(_) => vec![0; df.height()],
        }
    }

    fn str_values(df: &DataFrame, name: &str) -> Vec<String> {
        Self::opt_str_values(df, name)
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect()
    }

    fn opt_str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        let Ok(column) = df.column(name) else {
            return vec![None; df.height()];
        };
        (0..column.len())
            .map(|i| match column.get(i) {
                Ok(value) if !value.is_null() => {
                    Some(value.to_string().trim_matches('"').to_string())
                }
                _ => None,
            })
            .collect()
    }
}

/// Everything one render needs for the current filter selection.
#[derive(Debug, Clone)]
pub struct AggregateView {
    pub filtered: DataFrame,
    pub kpis: Kpis,
    pub monthly: MonthlySeries,
    pub cumulative: Vec<CumulativePoint>,
    pub by_hour_distance: HeatmapGrid,
    pub by_month_distance: HeatmapGrid,
    pub by_month_speed: HeatmapGrid,
    pub by_month_count: HeatmapGrid,
    pub breakdown: Vec<TypeBreakdown>,
    pub recent: Vec<RecentActivity>,
}

impl AggregateView {
    pub fn compute(df: &DataFrame, selection: &FilterSelection) -> Self {
        let filtered = Aggregator::apply_filter(df, selection);
        Self {
            kpis: Aggregator::kpis(&filtered),
            monthly: Aggregator::monthly_distance(&filtered),
            cumulative: Aggregator::cumulative_distance(&filtered),
            by_hour_distance: Aggregator::heatmap(
                &filtered,
                HeatmapMetric::TotalDistance,
                HeatmapColumns::Hour,
            ),
            by_month_distance: Aggregator::heatmap(
                &filtered,
                HeatmapMetric::TotalDistance,
                HeatmapColumns::Month,
            ),
            by_month_speed: Aggregator::heatmap(
                &filtered,
                HeatmapMetric::MeanSpeed,
                HeatmapColumns::Month,
            ),
            by_month_count: Aggregator::heatmap(
                &filtered,
                HeatmapMetric::Count,
                HeatmapColumns::Month,
            ),
            breakdown: Aggregator::breakdown_by_type(&filtered),
            recent: Aggregator::recent(&filtered, RECENT_LIMIT),
            filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        kind: &'static str,
        ts_ms: i64,
        distance: f64,
        time: f64,
        elevation: f64,
        speed: f64,
        year: i32,
        month: i32,
        weekday: i32,
        hour: i32,
    }

    fn row(kind: &'static str, ts_ms: i64, distance: f64, year: i32, month: i32) -> Row {
        Row {
            kind,
            ts_ms,
            distance,
            time: 1.0,
            elevation: 100.0,
            speed: 20.0,
            year,
            month,
            weekday: 1,
            hour: 8,
        }
    }

    fn table(rows: &[Row]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                COL_NAME.into(),
                rows.iter()
                    .map(|r| Some(format!("{} outing", r.kind)))
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                COL_TYPE.into(),
                rows.iter().map(|r| r.kind.to_string()).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_START_MS.into(),
                rows.iter().map(|r| r.ts_ms).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_DISTANCE.into(),
                rows.iter().map(|r| r.distance).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_TIME.into(),
                rows.iter().map(|r| r.time).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_ELEVATION.into(),
                rows.iter().map(|r| r.elevation).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_SPEED.into(),
                rows.iter().map(|r| r.speed).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_CALORIES.into(),
                rows.iter().map(|_| Some(500.0f64)).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_YEAR.into(),
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_MONTH.into(),
                rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_HOUR.into(),
                rows.iter().map(|r| r.hour).collect::<Vec<_>>(),
            ),
            Column::new(
                COL_WEEKDAY.into(),
                rows.iter().map(|r| r.weekday).collect::<Vec<_>>(),
            ),
        ])
        .expect("test table")
    }

    fn sample() -> DataFrame {
        // Ride 10 km in January, Run 5 km in February, Ride 3 km in January
        table(&[
            row("Ride", 1_000, 10.0, 2023, 1),
            row("Run", 2_000, 5.0, 2023, 2),
            row("Ride", 3_000, 3.0, 2023, 1),
        ])
    }

    #[test]
    fn activity_count_matches_row_count() {
        let df = sample();
        assert_eq!(Aggregator::kpis(&df).activity_count, df.height());
    }

    #[test]
    fn type_filter_reproduces_the_ride_totals() {
        let df = sample();
        let selection = FilterSelection {
            year: None,
            activity_type: Some("Ride".to_string()),
        };
        let filtered = Aggregator::apply_filter(&df, &selection);
        let kpis = Aggregator::kpis(&filtered);
        assert_eq!(kpis.activity_count, 2);
        assert!((kpis.total_distance_km - 13.0).abs() < 1e-9);

        let monthly = Aggregator::monthly_distance(&filtered);
        assert_eq!(monthly.months, vec![(2023, 1)]);
        assert!((monthly.by_type["Ride"][0] - 13.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_cells_sum_to_total_distance() {
        let df = sample();
        let kpis = Aggregator::kpis(&df);
        let monthly = Aggregator::monthly_distance(&df);
        assert!((monthly.total() - kpis.total_distance_km).abs() < 1e-9);
        // calendar order
        assert_eq!(monthly.months, vec![(2023, 1), (2023, 2)]);
    }

    #[test]
    fn cumulative_is_nondecreasing_and_ends_at_total() {
        let df = sample();
        let series = Aggregator::cumulative_distance(&df);
        assert_eq!(series.len(), 3);
        for pair in series.windows(2) {
            assert!(pair[1].total_km >= pair[0].total_km);
            assert!(pair[1].ts_ms >= pair[0].ts_ms);
        }
        let total = Aggregator::kpis(&df).total_distance_km;
        let last = series.last().expect("nonempty");
        assert!((last.total_km - total).abs() < 1e-9);
    }

    #[test]
    fn empty_filter_yields_zeroed_outputs() {
        let df = sample();
        let selection = FilterSelection {
            year: Some(1999),
            activity_type: None,
        };
        let view = AggregateView::compute(&df, &selection);
        assert_eq!(view.kpis.activity_count, 0);
        assert_eq!(view.kpis.total_distance_km, 0.0);
        assert_eq!(view.kpis.avg_speed_kmh, 0.0);
        assert!(view.monthly.months.is_empty());
        assert!(view.cumulative.is_empty());
        assert!(view.breakdown.is_empty());
        assert!(view.recent.is_empty());
        assert_eq!(view.by_month_distance.max_value(), 0.0);
    }

    #[test]
    fn recent_is_truncated_and_newest_first() {
        let rows: Vec<Row> = (0..30)
            .map(|i| row("Ride", i as i64 * 1_000, 1.0, 2023, 1))
            .collect();
        let df = table(&rows);
        let recent = Aggregator::recent(&df, RECENT_LIMIT);
        assert_eq!(recent.len(), RECENT_LIMIT);
        for pair in recent.windows(2) {
            assert!(pair[0].start_ts_ms >= pair[1].start_ts_ms);
        }
        assert_eq!(recent[0].start_ts_ms, 29_000);
    }

    #[test]
    fn recent_ties_keep_table_order() {
        let df = table(&[
            row("Ride", 1_000, 1.0, 2023, 1),
            row("Run", 1_000, 2.0, 2023, 1),
            row("Hike", 1_000, 3.0, 2023, 1),
        ]);
        let recent = Aggregator::recent(&df, RECENT_LIMIT);
        let kinds: Vec<&str> = recent.iter().map(|r| r.activity_type.as_str()).collect();
        assert_eq!(kinds, vec!["Ride", "Run", "Hike"]);
    }

    #[test]
    fn heatmap_distinguishes_no_data_from_zero() {
        let mut zero_ride = row("Ride", 1_000, 0.0, 2023, 1);
        zero_ride.weekday = 3;
        zero_ride.hour = 6;
        let df = table(&[zero_ride]);
        let grid = Aggregator::heatmap(&df, HeatmapMetric::TotalDistance, HeatmapColumns::Hour);
        // Wednesday 06:00 observed with zero distance
        assert_eq!(grid.cell(2, 6), Some(0.0));
        // never observed
        assert_eq!(grid.cell(0, 0), None);
        assert_eq!(grid.rows(), 7);
        assert_eq!(grid.cols(), 24);
    }

    #[test]
    fn month_heatmap_counts_observations() {
        let df = sample();
        let grid = Aggregator::heatmap(&df, HeatmapMetric::Count, HeatmapColumns::Month);
        assert_eq!(grid.cols(), 12);
        // all sample rows land on Monday
        assert_eq!(grid.cell(0, 0), Some(2.0));
        assert_eq!(grid.cell(0, 1), Some(1.0));
        assert_eq!(grid.cell(0, 2), None);
    }

    #[test]
    fn breakdown_orders_by_total_distance() {
        let df = sample();
        let rows = Aggregator::breakdown_by_type(&df);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].activity_type, "Ride");
        assert!((rows[0].kpis.total_distance_km - 13.0).abs() < 1e-9);
        assert_eq!(rows[1].activity_type, "Run");
        assert_eq!(rows[1].kpis.activity_count, 1);
    }

    #[test]
    fn breakdown_counts_sum_to_table_rows() {
        let df = sample();
        let total: usize = Aggregator::breakdown_by_type(&df)
            .iter()
            .map(|r| r.kpis.activity_count)
            .sum();
        assert_eq!(total, df.height());
    }

    #[test]
    fn average_speed_ignores_stationary_rows() {
        let mut stationary = row("Ride", 1_000, 0.0, 2023, 1);
        stationary.speed = 0.0;
        let mut moving = row("Ride", 2_000, 30.0, 2023, 1);
        moving.speed = 30.0;
        let df = table(&[stationary, moving]);
        let kpis = Aggregator::kpis(&df);
        assert!((kpis.avg_speed_kmh - 30.0).abs() < 1e-9);
    }

    #[test]
    fn observed_years_newest_first_and_types_sorted() {
        let df = table(&[
            row("Run", 1_000, 1.0, 2021, 3),
            row("Hike", 2_000, 2.0, 2023, 4),
            row("Ride", 3_000, 3.0, 2022, 5),
        ]);
        assert_eq!(Aggregator::observed_years(&df), vec![2023, 2022, 2021]);
        assert_eq!(
            Aggregator::observed_types(&df),
            vec!["Hike".to_string(), "Ride".to_string(), "Run".to_string()]
        );
    }
}
