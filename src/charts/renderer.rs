//! Static Chart Renderer
//! Renders the dashboard charts to PNG images for the report bundle.

use crate::charts::plotter::{ColorScale, PALETTE};
use crate::stats::{CumulativePoint, HeatmapGrid, MonthlySeries};
use chrono::{DateTime, Utc};
use plotters::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("chart drawing failed: {0}")]
    Draw(String),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("invalid image buffer")]
    Buffer,
}

const MS_PER_DAY: f64 = 86_400_000.0;
const NO_DATA: RGBColor = RGBColor(235, 235, 235);

/// Renders charts into in-memory PNG bytes, no temp files involved.
pub struct ChartRenderer;

impl ChartRenderer {
    pub fn monthly_png(
        monthly: &MonthlySeries,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw_monthly(&mut buffer, monthly, width, height)
            .map_err(|e| RenderError::Draw(e.to_string()))?;
        Self::encode(buffer, width, height)
    }

    pub fn cumulative_png(
        points: &[CumulativePoint],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw_cumulative(&mut buffer, points, width, height)
            .map_err(|e| RenderError::Draw(e.to_string()))?;
        Self::encode(buffer, width, height)
    }

    pub fn heatmap_png(
        grid: &HeatmapGrid,
        scale: &ColorScale,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw_heatmap(&mut buffer, grid, scale, title, width, height)
            .map_err(|e| RenderError::Draw(e.to_string()))?;
        Self::encode(buffer, width, height)
    }

    fn draw_monthly(
        buffer: &mut [u8],
        monthly: &MonthlySeries,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n = monthly.months.len();
        let mut totals = vec![0.0f64; n];
        for values in monthly.by_type.values() {
            for (slot, v) in values.iter().enumerate() {
                totals[slot] += v;
            }
        }
        let y_max = totals.iter().copied().fold(1.0f64, f64::max) * 1.1;
        let x_max = (n as f64 - 0.5).max(0.5);
        let labels: Vec<String> = monthly
            .months
            .iter()
            .map(|&(y, m)| MonthlySeries::label(y, m))
            .collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Distance per Month by Activity Type", ("sans-serif", 22))
            .margin(14)
            .x_label_area_size(42)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.5f64..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n.clamp(1, 18))
            .x_label_formatter(&|x| {
                let idx = x.round();
                if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .y_desc("Distance (km)")
            .draw()?;

        let mut base = vec![0.0f64; n];
        for (i, (kind, values)) in monthly.by_type.iter().enumerate() {
            let color = Self::series_color(i);
            let floors = base.clone();
            chart
                .draw_series((0..n).map(|slot| {
                    let y0 = floors[slot];
                    let y1 = y0 + values[slot];
                    Rectangle::new(
                        [(slot as f64 - 0.3, y0), (slot as f64 + 0.3, y1)],
                        color.filled(),
                    )
                }))?
                .label(kind.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
            for slot in 0..n {
                base[slot] += values[slot];
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }

    fn draw_cumulative(
        buffer: &mut [u8],
        points: &[CumulativePoint],
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = match (points.first(), points.last()) {
            (Some(first), Some(last)) if last.ts_ms > first.ts_ms => (
                first.ts_ms as f64 / MS_PER_DAY,
                last.ts_ms as f64 / MS_PER_DAY,
            ),
            (Some(first), Some(_)) => {
                let day = first.ts_ms as f64 / MS_PER_DAY;
                (day - 0.5, day + 0.5)
            }
            _ => (0.0, 1.0),
        };
        let y_max = points
            .last()
            .map(|p| p.total_km)
            .unwrap_or(0.0)
            .max(1.0)
            * 1.05;

        let mut chart = ChartBuilder::on(&root)
            .caption("Cumulative Distance Over Time", ("sans-serif", 22))
            .margin(14)
            .x_label_area_size(42)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|days| {
                DateTime::<Utc>::from_timestamp_millis((days * MS_PER_DAY) as i64)
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_default()
            })
            .y_desc("Total Distance (km)")
            .draw()?;

        let color = Self::series_color(0);
        chart.draw_series(LineSeries::new(
            points
                .iter()
                .map(|p| (p.ts_ms as f64 / MS_PER_DAY, p.total_km)),
            color.stroke_width(2),
        ))?;
        root.present()?;
        Ok(())
    }

    fn draw_heatmap(
        buffer: &mut [u8],
        grid: &HeatmapGrid,
        scale: &ColorScale,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let rows = grid.rows() as i32;
        let cols = grid.cols() as i32;
        if rows == 0 || cols == 0 {
            root.present()?;
            return Ok(());
        }

        const LEFT: i32 = 96;
        const TOP: i32 = 48;
        const RIGHT: i32 = 16;
        const BOTTOM: i32 = 30;
        const GAP: i32 = 2;

        let cell_w = ((width as i32 - LEFT - RIGHT) / cols - GAP).max(2);
        let cell_h = ((height as i32 - TOP - BOTTOM) / rows - GAP).max(2);
        let max = grid.max_value();

        root.draw(&Text::new(
            title.to_string(),
            (LEFT, 14),
            ("sans-serif", 20).into_font(),
        ))?;

        for r in 0..rows {
            let y = TOP + r * (cell_h + GAP);
            root.draw(&Text::new(
                grid.row_labels[r as usize].clone(),
                (8, y + cell_h / 2 - 6),
                ("sans-serif", 13).into_font(),
            ))?;
            for c in 0..cols {
                let x = LEFT + c * (cell_w + GAP);
                let color = match grid.cell(r as usize, c as usize) {
                    Some(v) if max > 0.0 => {
                        let (red, green, blue) = scale.sample_rgb(v / max);
                        RGBColor(red, green, blue)
                    }
                    Some(_) => {
                        let (red, green, blue) = scale.sample_rgb(0.0);
                        RGBColor(red, green, blue)
                    }
                    None => NO_DATA,
                };
                root.draw(&Rectangle::new(
                    [(x, y), (x + cell_w, y + cell_h)],
                    color.filled(),
                ))?;
            }
        }

        let stride = if cols > 12 { 3 } else { 1 };
        let label_y = TOP + rows * (cell_h + GAP) + 6;
        for c in (0..cols).step_by(stride as usize) {
            let x = LEFT + c * (cell_w + GAP);
            root.draw(&Text::new(
                grid.col_labels[c as usize].clone(),
                (x, label_y),
                ("sans-serif", 12).into_font(),
            ))?;
        }

        root.present()?;
        Ok(())
    }

    fn series_color(index: usize) -> RGBColor {
        let c = PALETTE[index % PALETTE.len()];
        RGBColor(c.r(), c.g(), c.b())
    }

    fn encode(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let img = image::RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(png)
    }
}
