//! Report Bundle Generator
//! Packages rendered charts and summary tables into a single zip archive.

use crate::charts::{ChartRenderer, SCALE_BLUES, SCALE_GREENS, SCALE_HEAT};
use crate::stats::{AggregateView, FilterSelection, Kpis, TypeBreakdown};
use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 700;

#[derive(serde::Serialize)]
struct ReportSummary<'a> {
    generated_at: String,
    filter: &'a FilterSelection,
    kpis: &'a Kpis,
}

/// Writes the export bundle: chart PNGs, the per-type breakdown as CSV, and
/// a KPI summary as JSON.
pub struct ReportWriter;

impl ReportWriter {
    pub fn write_bundle(
        view: &AggregateView,
        selection: &FilterSelection,
        output: &Path,
    ) -> Result<()> {
        let charts: [(&str, Vec<u8>); 6] = [
            (
                "monthly_distance.png",
                ChartRenderer::monthly_png(&view.monthly, CHART_WIDTH, CHART_HEIGHT)?,
            ),
            (
                "cumulative_distance.png",
                ChartRenderer::cumulative_png(&view.cumulative, CHART_WIDTH, CHART_HEIGHT)?,
            ),
            (
                "heatmap_day_hour_distance.png",
                ChartRenderer::heatmap_png(
                    &view.by_hour_distance,
                    &SCALE_BLUES,
                    "Distance by Day and Hour",
                    CHART_WIDTH,
                    CHART_HEIGHT,
                )?,
            ),
            (
                "heatmap_day_month_distance.png",
                ChartRenderer::heatmap_png(
                    &view.by_month_distance,
                    &SCALE_BLUES,
                    "Total Distance by Day and Month",
                    CHART_WIDTH,
                    CHART_HEIGHT,
                )?,
            ),
            (
                "heatmap_day_month_speed.png",
                ChartRenderer::heatmap_png(
                    &view.by_month_speed,
                    &SCALE_HEAT,
                    "Average Speed by Day and Month",
                    CHART_WIDTH,
                    CHART_HEIGHT,
                )?,
            ),
            (
                "heatmap_day_month_count.png",
                ChartRenderer::heatmap_png(
                    &view.by_month_count,
                    &SCALE_GREENS,
                    "Activity Count by Day and Month",
                    CHART_WIDTH,
                    CHART_HEIGHT,
                )?,
            ),
        ];

        let file = File::create(output)
            .with_context(|| format!("could not create {}", output.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default();

        for (name, bytes) in &charts {
            zip.start_file(format!("charts/{name}"), options)?;
            zip.write_all(bytes)?;
        }

        zip.start_file("breakdown.csv", options)?;
        zip.write_all(&Self::breakdown_csv(&view.breakdown)?)?;

        let summary = ReportSummary {
            generated_at: chrono::Local::now().to_rfc3339(),
            filter: selection,
            kpis: &view.kpis,
        };
        zip.start_file("summary.json", options)?;
        zip.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;

        zip.finish()?;
        log::info!(
            "report bundle written to {} ({} charts)",
            output.display(),
            charts.len()
        );
        Ok(())
    }

    /// The breakdown table as CSV bytes, written with polars.
    fn breakdown_csv(rows: &[TypeBreakdown]) -> Result<Vec<u8>> {
        let mut df = DataFrame::new(vec![
            Column::new(
                "activity_type".into(),
                rows.iter()
                    .map(|r| r.activity_type.clone())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "activities".into(),
                rows.iter()
                    .map(|r| r.kpis.activity_count as u32)
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "total_distance_km".into(),
                rows.iter()
                    .map(|r| r.kpis.total_distance_km)
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "total_time_hr".into(),
                rows.iter().map(|r| r.kpis.total_time_hr).collect::<Vec<_>>(),
            ),
            Column::new(
                "total_elevation_m".into(),
                rows.iter()
                    .map(|r| r.kpis.total_elevation_m)
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "total_calories".into(),
                rows.iter()
                    .map(|r| r.kpis.total_calories)
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "avg_speed_kmh".into(),
                rows.iter().map(|r| r.kpis.avg_speed_kmh).collect::<Vec<_>>(),
            ),
        ])?;

        let mut out = Vec::new();
        CsvWriter::new(&mut out)
            .include_header(true)
            .finish(&mut df)?;
        Ok(out)
    }

    /// Best effort: reveal the bundle with the system opener.
    pub fn reveal(path: &Path) {
        if let Err(e) = open::that(path) {
            log::warn!("could not open {}: {e}", path.display());
        }
    }
}
