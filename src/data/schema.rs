//! Export Schema Mapping
//! Maps vendor CSV headers onto canonical fields with a fixed fallback order.

use polars::prelude::DataFrame;

// Canonical column names of the normalized table.
pub const COL_NAME: &str = "activity_name";
pub const COL_TYPE: &str = "activity_type";
pub const COL_START_MS: &str = "start_ts_ms";
pub const COL_DISTANCE: &str = "distance_km";
pub const COL_TIME: &str = "moving_time_hr";
pub const COL_ELEVATION: &str = "elevation_m";
pub const COL_SPEED: &str = "speed_kmh";
pub const COL_CALORIES: &str = "calories";
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_HOUR: &str = "hour";
pub const COL_WEEKDAY: &str = "weekday";

/// Label used when the export has no activity-type column or a blank cell.
pub const UNKNOWN_TYPE: &str = "Unknown";

// Vendor columns that map 1:1 onto canonical string fields.
pub const DATE_COLUMN: &str = "Activity Date";
pub const NAME_COLUMN: &str = "Activity Name";
pub const TYPE_COLUMN: &str = "Activity Type";

/// One acceptable source column for a canonical numeric field.
///
/// `scale` converts the vendor unit into the canonical unit, e.g. the
/// meter-denominated distance column carries `1.0 / 1000.0`.
#[derive(Debug, Clone, Copy)]
pub struct NumericSource {
    pub column: &'static str,
    pub scale: f64,
}

/// Distance in km. The export carries the distance twice: a km column named
/// `Distance` and a more reliable meter column under a duplicated header,
/// surfaced as `Distance.1` by some tooling and mangled to
/// `Distance_duplicated_0` by polars. The meter column wins when present.
pub const DISTANCE_SOURCES: &[NumericSource] = &[
    NumericSource {
        column: "Distance.1",
        scale: 1.0 / 1000.0,
    },
    NumericSource {
        column: "Distance_duplicated_0",
        scale: 1.0 / 1000.0,
    },
    NumericSource {
        column: "Distance",
        scale: 1.0,
    },
];

/// Moving time in hours, from a seconds-denominated column.
pub const TIME_SOURCES: &[NumericSource] = &[
    NumericSource {
        column: "Moving Time",
        scale: 1.0 / 3600.0,
    },
    NumericSource {
        column: "Elapsed Time",
        scale: 1.0 / 3600.0,
    },
];

/// Elevation gain in meters. Vendors have shipped both header spellings.
pub const ELEVATION_SOURCES: &[NumericSource] = &[
    NumericSource {
        column: "Total Elevation Gain",
        scale: 1.0,
    },
    NumericSource {
        column: "Elevation Gain",
        scale: 1.0,
    },
];

/// Average speed in km/h, from the m/s column. When absent the loader
/// derives speed from distance and moving time instead.
pub const SPEED_SOURCES: &[NumericSource] = &[NumericSource {
    column: "Average Speed",
    scale: 3.6,
}];

pub const CALORIE_SOURCES: &[NumericSource] = &[NumericSource {
    column: "Calories",
    scale: 1.0,
}];

/// Pick the first candidate present in the raw frame. Resolution happens
/// once per load; a `None` means the canonical field gets a zeroed column.
pub fn resolve<'a>(df: &DataFrame, sources: &'a [NumericSource]) -> Option<&'a NumericSource> {
    sources.iter().find(|s| df.column(s.column).is_ok())
}

/// Human-readable candidate list for schema warnings.
pub fn candidate_list(sources: &[NumericSource]) -> String {
    sources
        .iter()
        .map(|s| s.column)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn frame_with(columns: &[&str]) -> DataFrame {
        let cols: Vec<Column> = columns
            .iter()
            .map(|name| Column::new((*name).into(), vec![1.0f64]))
            .collect();
        DataFrame::new(cols).expect("test frame")
    }

    #[test]
    fn meter_column_wins_over_km_column() {
        let df = frame_with(&["Distance", "Distance.1"]);
        let source = resolve(&df, DISTANCE_SOURCES).expect("resolved");
        assert_eq!(source.column, "Distance.1");
        assert!((source.scale - 0.001).abs() < 1e-12);
    }

    #[test]
    fn km_column_is_the_fallback() {
        let df = frame_with(&["Distance", "Moving Time"]);
        let source = resolve(&df, DISTANCE_SOURCES).expect("resolved");
        assert_eq!(source.column, "Distance");
        assert_eq!(source.scale, 1.0);
    }

    #[test]
    fn missing_field_resolves_to_none() {
        let df = frame_with(&["Activity Type"]);
        assert!(resolve(&df, ELEVATION_SOURCES).is_none());
        assert!(resolve(&df, SPEED_SOURCES).is_none());
    }
}
