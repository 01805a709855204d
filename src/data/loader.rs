//! Activity CSV Loader
//! Handles export-file loading and normalization using Polars.

use crate::data::schema::{
    self, candidate_list, resolve, NumericSource, CALORIE_SOURCES, DATE_COLUMN, DISTANCE_SOURCES,
    ELEVATION_SOURCES, NAME_COLUMN, SPEED_SOURCES, TIME_SOURCES, TYPE_COLUMN, UNKNOWN_TYPE,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("activity file not found: {0}")]
    FileMissing(PathBuf),
    #[error("failed to read activity file: {0}")]
    Csv(#[from] PolarsError),
}

/// Timestamp formats accepted for the activity-start field, tried in order.
/// The comma-separated 12-hour form is what the vendor export ships.
const DATE_FORMATS: &[&str] = &[
    "%b %d, %Y, %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Normalized activity table plus load diagnostics.
#[derive(Debug, Clone)]
pub struct ActivityTable {
    pub df: DataFrame,
    /// Schema mismatches: non-fatal, surfaced to the user.
    pub warnings: Vec<String>,
    pub raw_rows: usize,
    /// Rows dropped because the start timestamp failed to parse.
    pub dropped_rows: usize,
}

struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    table: ActivityTable,
}

/// Loads and normalizes the export file, memoized by (path, mtime).
///
/// The cached table is immutable once produced; a changed file timestamp or
/// an explicit `invalidate` triggers a fresh load on the next access.
pub struct ActivityLoader {
    cache: Option<CacheEntry>,
    generation: u64,
}

impl Default for ActivityLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLoader {
    pub fn new() -> Self {
        Self {
            cache: None,
            generation: 0,
        }
    }

    /// Load the file at `path`, reusing the cached table when the path and
    /// modification time match the previous load.
    pub fn load(&mut self, path: &Path) -> Result<&ActivityTable, LoadError> {
        let modified = std::fs::metadata(path)
            .map_err(|_| LoadError::FileMissing(path.to_path_buf()))?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|c| c.path == path && c.modified == modified);

        if !fresh {
            let table = Self::read_and_normalize(path)?;
            log::info!(
                "loaded {} activities from {} ({} raw rows, {} dropped, {} schema warnings)",
                table.df.height(),
                path.display(),
                table.raw_rows,
                table.dropped_rows,
                table.warnings.len()
            );
            for warning in &table.warnings {
                log::warn!("schema: {warning}");
            }
            self.cache = Some(CacheEntry {
                path: path.to_path_buf(),
                modified,
                table,
            });
            self.generation += 1;
        }

        match self.cache.as_ref() {
            Some(entry) => Ok(&entry.table),
            None => Err(LoadError::FileMissing(path.to_path_buf())),
        }
    }

    /// The currently cached table, if any.
    pub fn cached(&self) -> Option<&ActivityTable> {
        self.cache.as_ref().map(|c| &c.table)
    }

    /// Bumped on every fresh load; lets callers key derived caches.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the cached table; the next `load` rereads the file.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn read_and_normalize(path: &Path) -> Result<ActivityTable, LoadError> {
        let path_str = path.to_string_lossy().to_string();
        let raw = LazyCsvReader::new(&path_str)
            .with_infer_schema_length(Some(10_000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Self::normalize(&raw)
    }

    /// Build the canonical table from the raw frame: resolve the schema
    /// mapping, parse timestamps, derive computed columns, drop bad rows.
    fn normalize(raw: &DataFrame) -> Result<ActivityTable, LoadError> {
        let raw_rows = raw.height();
        let mut warnings = Vec::new();

        let date_strs = Self::str_column(raw, DATE_COLUMN);
        if date_strs.is_none() {
            warnings.push(format!("no '{DATE_COLUMN}' column; every row is dropped"));
        }
        let name_strs = Self::str_column(raw, NAME_COLUMN);
        let type_strs = Self::str_column(raw, TYPE_COLUMN);
        if type_strs.is_none() {
            warnings.push(format!(
                "no '{TYPE_COLUMN}' column; activities grouped as '{UNKNOWN_TYPE}'"
            ));
        }

        let distance_vals = Self::numeric_field(raw, DISTANCE_SOURCES, "distance", &mut warnings);
        let time_vals = Self::numeric_field(raw, TIME_SOURCES, "moving time", &mut warnings);
        let elevation_vals =
            Self::numeric_field(raw, ELEVATION_SOURCES, "elevation gain", &mut warnings);
        let calorie_vals = Self::numeric_field(raw, CALORIE_SOURCES, "calories", &mut warnings);
        // Speed has a derived fallback, so its absence is not a mismatch.
        let speed_vals = resolve(raw, SPEED_SOURCES).and_then(|s| Self::numeric_column(raw, s));

        let mut names: Vec<Option<String>> = Vec::with_capacity(raw_rows);
        let mut types: Vec<String> = Vec::with_capacity(raw_rows);
        let mut start_ms: Vec<i64> = Vec::with_capacity(raw_rows);
        let mut distance: Vec<f64> = Vec::with_capacity(raw_rows);
        let mut time: Vec<f64> = Vec::with_capacity(raw_rows);
        let mut elevation: Vec<f64> = Vec::with_capacity(raw_rows);
        let mut speed: Vec<f64> = Vec::with_capacity(raw_rows);
        let mut calories: Vec<Option<f64>> = Vec::with_capacity(raw_rows);
        let mut years: Vec<i32> = Vec::with_capacity(raw_rows);
        let mut months: Vec<i32> = Vec::with_capacity(raw_rows);
        let mut hours: Vec<i32> = Vec::with_capacity(raw_rows);
        let mut weekdays: Vec<i32> = Vec::with_capacity(raw_rows);
        let mut dropped = 0usize;

        for i in 0..raw_rows {
            let stamp = date_strs
                .as_ref()
                .and_then(|v| v[i].as_deref())
                .and_then(Self::parse_start);
            let Some(stamp) = stamp else {
                dropped += 1;
                continue;
            };

            let d = Self::value_at(&distance_vals, i).max(0.0);
            let t = Self::value_at(&time_vals, i).max(0.0);
            let e = Self::value_at(&elevation_vals, i).max(0.0);
            // Zero-time rows get zero speed rather than a division blowup.
            let s = match &speed_vals {
                Some(vals) => vals[i].unwrap_or(0.0).max(0.0),
                None if t > 0.0 => d / t,
                None => 0.0,
            };

            names.push(name_strs.as_ref().and_then(|v| v[i].clone()));
            types.push(
                type_strs
                    .as_ref()
                    .and_then(|v| v[i].clone())
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            );
            start_ms.push(stamp.and_utc().timestamp_millis());
            distance.push(d);
            time.push(t);
            elevation.push(e);
            speed.push(s);
            calories.push(calorie_vals.as_ref().and_then(|v| v[i]));
            years.push(stamp.year());
            months.push(stamp.month() as i32);
            hours.push(stamp.hour() as i32);
            weekdays.push(stamp.weekday().number_from_monday() as i32);
        }

        // Chronological order; a stable sort keeps file order for ties.
        let mut order: Vec<usize> = (0..start_ms.len()).collect();
        order.sort_by_key(|&i| start_ms[i]);

        let df = DataFrame::new(vec![
            Column::new(schema::COL_NAME.into(), Self::permute(&names, &order)),
            Column::new(schema::COL_TYPE.into(), Self::permute(&types, &order)),
            Column::new(schema::COL_START_MS.into(), Self::permute(&start_ms, &order)),
            Column::new(
                schema::COL_DISTANCE.into(),
                Self::permute(&distance, &order),
            ),
            Column::new(schema::COL_TIME.into(), Self::permute(&time, &order)),
            Column::new(
                schema::COL_ELEVATION.into(),
                Self::permute(&elevation, &order),
            ),
            Column::new(schema::COL_SPEED.into(), Self::permute(&speed, &order)),
            Column::new(
                schema::COL_CALORIES.into(),
                Self::permute(&calories, &order),
            ),
            Column::new(schema::COL_YEAR.into(), Self::permute(&years, &order)),
            Column::new(schema::COL_MONTH.into(), Self::permute(&months, &order)),
            Column::new(schema::COL_HOUR.into(), Self::permute(&hours, &order)),
            Column::new(schema::COL_WEEKDAY.into(), Self::permute(&weekdays, &order)),
        ])?;

        Ok(ActivityTable {
            df,
            warnings,
            raw_rows,
            dropped_rows: dropped,
        })
    }

    fn parse_start(raw: &str) -> Option<NaiveDateTime> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        for format in DATE_FORMATS {
            if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Some(stamp);
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Resolve a numeric field; a missing field records a warning and yields
    /// `None`, which downstream treats as an all-zero column.
    fn numeric_field(
        raw: &DataFrame,
        sources: &[NumericSource],
        label: &str,
        warnings: &mut Vec<String>,
    ) -> Option<Vec<Option<f64>>> {
        match resolve(raw, sources) {
            Some(source) => Self::numeric_column(raw, source),
            None => {
                warnings.push(format!(
                    "no {label} column (looked for: {}); values default to 0",
                    candidate_list(sources)
                ));
                None
            }
        }
    }

    fn numeric_column(raw: &DataFrame, source: &NumericSource) -> Option<Vec<Option<f64>>> {
        let column = raw.column(source.column).ok()?;
        let cast = column.cast(&DataType::Float64).ok()?;
        let ca = cast.f64().ok()?;
        Some(
            ca.into_iter()
                .map(|v| v.filter(|x| x.is_finite()).map(|x| x * source.scale))
                .collect(),
        )
    }

    fn str_column(raw: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
        let column = raw.column(name).ok()?;
        Some(
            (0..column.len())
                .map(|i| match column.get(i) {
                    Ok(value) if !value.is_null() => {
                        let text = value.to_string().trim_matches('"').to_string();
                        (!text.is_empty()).then_some(text)
                    }
                    _ => None,
                })
                .collect(),
        )
    }

    fn value_at(values: &Option<Vec<Option<f64>>>, i: usize) -> f64 {
        values.as_ref().and_then(|v| v[i]).unwrap_or(0.0)
    }

    fn permute<T: Clone>(values: &[T], order: &[usize]) -> Vec<T> {
        order.iter().map(|&i| values[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{COL_DISTANCE, COL_HOUR, COL_MONTH, COL_TYPE, COL_WEEKDAY, COL_YEAR};
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create csv");
        file.write_all(contents.as_bytes()).expect("write csv");
        path
    }

    fn distances(table: &ActivityTable) -> Vec<f64> {
        table
            .df
            .column(COL_DISTANCE)
            .expect("distance column")
            .f64()
            .expect("f64")
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let mut loader = ActivityLoader::new();
        let err = loader.load(Path::new("/nonexistent/activities.csv"));
        assert!(matches!(err, Err(LoadError::FileMissing(_))));
    }

    #[test]
    fn meter_and_km_distance_columns_agree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let meters = write_csv(
            &dir,
            "meters.csv",
            "Activity Date,Activity Type,Distance.1\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10000\n\
             \"Jul 5, 2021, 8:00:00 AM\",Run,5000\n",
        );
        let km = write_csv(
            &dir,
            "km.csv",
            "Activity Date,Activity Type,Distance\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10.0\n\
             \"Jul 5, 2021, 8:00:00 AM\",Run,5.0\n",
        );

        let mut loader = ActivityLoader::new();
        let from_meters: f64 = distances(loader.load(&meters).expect("load meters"))
            .iter()
            .sum();
        let mut loader = ActivityLoader::new();
        let from_km: f64 = distances(loader.load(&km).expect("load km")).iter().sum();

        assert!((from_meters - from_km).abs() < 1e-9);
        assert!((from_meters - 15.0).abs() < 1e-9);
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "bad_dates.csv",
            "Activity Date,Activity Type,Distance\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10.0\n\
             not-a-date,Ride,4.0\n\
             ,Run,2.0\n",
        );

        let mut loader = ActivityLoader::new();
        let table = loader.load(&path).expect("load");
        assert_eq!(table.df.height(), 1);
        assert_eq!(table.raw_rows, 3);
        assert_eq!(table.dropped_rows, 2);
    }

    #[test]
    fn missing_columns_warn_and_zero_fill() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "sparse.csv",
            "Activity Date\n\"Jul 4, 2021, 7:12:33 AM\"\n",
        );

        let mut loader = ActivityLoader::new();
        let table = loader.load(&path).expect("load");
        assert_eq!(table.df.height(), 1);
        // type, distance, moving time, elevation, calories
        assert_eq!(table.warnings.len(), 5);
        assert_eq!(distances(table), vec![0.0]);

        let kind = table
            .df
            .column(COL_TYPE)
            .expect("type column")
            .get(0)
            .expect("value")
            .to_string();
        assert_eq!(kind.trim_matches('"'), UNKNOWN_TYPE);
    }

    #[test]
    fn derived_calendar_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        // 2021-07-04 fell on a Sunday
        let path = write_csv(
            &dir,
            "calendar.csv",
            "Activity Date,Activity Type,Distance\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10.0\n",
        );

        let mut loader = ActivityLoader::new();
        let table = loader.load(&path).expect("load");
        let cell = |name: &str| -> i64 {
            table
                .df
                .column(name)
                .expect("column")
                .cast(&DataType::Int64)
                .expect("cast")
                .i64()
                .expect("i64")
                .get(0)
                .expect("value")
        };
        assert_eq!(cell(COL_YEAR), 2021);
        assert_eq!(cell(COL_MONTH), 7);
        assert_eq!(cell(COL_HOUR), 7);
        assert_eq!(cell(COL_WEEKDAY), 7);
    }

    #[test]
    fn negative_distance_is_clamped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "negative.csv",
            "Activity Date,Activity Type,Distance\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,-3.5\n",
        );

        let mut loader = ActivityLoader::new();
        let table = loader.load(&path).expect("load");
        assert_eq!(distances(table), vec![0.0]);
    }

    #[test]
    fn zero_time_yields_zero_speed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "zero_time.csv",
            "Activity Date,Activity Type,Distance,Moving Time\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10.0,0\n",
        );

        let mut loader = ActivityLoader::new();
        let table = loader.load(&path).expect("load");
        let speed = table
            .df
            .column(schema::COL_SPEED)
            .expect("speed column")
            .f64()
            .expect("f64")
            .get(0)
            .expect("value");
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn cache_hits_until_invalidated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "cache.csv",
            "Activity Date,Activity Type,Distance\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10.0\n",
        );

        let mut loader = ActivityLoader::new();
        loader.load(&path).expect("first load");
        let generation = loader.generation();
        loader.load(&path).expect("cached load");
        assert_eq!(loader.generation(), generation);

        loader.invalidate();
        assert!(loader.cached().is_none());
        loader.load(&path).expect("reload");
        assert_eq!(loader.generation(), generation + 1);
    }

    #[test]
    fn rows_sorted_ascending_by_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "unsorted.csv",
            "Activity Date,Activity Type,Distance\n\
             \"Jul 5, 2021, 8:00:00 AM\",Run,5.0\n\
             \"Jul 4, 2021, 7:12:33 AM\",Ride,10.0\n",
        );

        let mut loader = ActivityLoader::new();
        let table = loader.load(&path).expect("load");
        assert_eq!(distances(table), vec![10.0, 5.0]);
    }
}
