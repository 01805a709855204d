//! Stats module - aggregation over the activity table

mod aggregate;

pub use aggregate::{
    AggregateView, Aggregator, CumulativePoint, FilterSelection, HeatmapColumns, HeatmapGrid,
    HeatmapMetric, Kpis, MonthlySeries, RecentActivity, TypeBreakdown, DAY_LABELS, MONTH_LABELS,
    RECENT_LIMIT,
};
