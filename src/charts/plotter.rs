//! Chart Plotter Module
//! Interactive dashboard visuals built on egui_plot and the egui painter.

use crate::stats::{
    CumulativePoint, HeatmapGrid, MonthlySeries, RecentActivity, TypeBreakdown,
};
use chrono::{DateTime, Utc};
use egui::{Align2, Color32, FontId, RichText, Sense};
use egui_plot::{Bar, BarChart, Legend, Line, Plot};
use polars::prelude::DataFrame;

/// Color palette for activity types, assigned by sorted-type index.
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const MS_PER_DAY: f64 = 86_400_000.0;

/// Continuous color scale defined by evenly spaced gradient stops.
pub struct ColorScale {
    stops: &'static [(u8, u8, u8)],
}

/// Blues, for distance grids.
pub const SCALE_BLUES: ColorScale = ColorScale {
    stops: &[(222, 235, 247), (158, 202, 225), (49, 130, 189)],
};

/// Yellow-orange-red, for the speed grid.
pub const SCALE_HEAT: ColorScale = ColorScale {
    stops: &[(255, 237, 160), (254, 178, 76), (240, 59, 32)],
};

/// Greens, for the count grid.
pub const SCALE_GREENS: ColorScale = ColorScale {
    stops: &[(229, 245, 224), (161, 217, 155), (49, 163, 84)],
};

impl ColorScale {
    /// Interpolate at `t` in [0, 1].
    pub fn sample_rgb(&self, t: f64) -> (u8, u8, u8) {
        let t = t.clamp(0.0, 1.0);
        let segments = (self.stops.len() - 1) as f64;
        let scaled = t * segments;
        let idx = (scaled.floor() as usize).min(self.stops.len() - 2);
        let frac = scaled - idx as f64;
        let (r0, g0, b0) = self.stops[idx];
        let (r1, g1, b1) = self.stops[idx + 1];
        let lerp = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * frac).round() as u8
        };
        (lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    pub fn sample(&self, t: f64) -> Color32 {
        let (r, g, b) = self.sample_rgb(t);
        Color32::from_rgb(r, g, b)
    }
}

/// Creates the dashboard charts and tables.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the activity type at `index` in the sorted type list.
    pub fn type_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Stacked bars: one bar per observed year-month, one segment per type.
    pub fn draw_monthly_chart(ui: &mut egui::Ui, monthly: &MonthlySeries) {
        let axis_labels: Vec<String> = monthly
            .months
            .iter()
            .map(|&(y, m)| MonthlySeries::label(y, m))
            .collect();

        Plot::new("monthly_distance")
            .height(300.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label("Distance (km)")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    axis_labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let mut charts: Vec<BarChart> = Vec::new();
                for (i, (kind, values)) in monthly.by_type.iter().enumerate() {
                    let bars: Vec<Bar> = values
                        .iter()
                        .enumerate()
                        .map(|(slot, &v)| Bar::new(slot as f64, v).width(0.6))
                        .collect();
                    let mut chart = BarChart::new(bars)
                        .name(kind)
                        .color(Self::type_color(i));
                    {
                        let prior: Vec<&BarChart> = charts.iter().collect();
                        chart = chart.stack_on(&prior);
                    }
                    charts.push(chart);
                }
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Running-total line over the filtered table.
    pub fn draw_cumulative_chart(ui: &mut egui::Ui, points: &[CumulativePoint]) {
        let series: Vec<[f64; 2]> = points
            .iter()
            .map(|p| [p.ts_ms as f64 / MS_PER_DAY, p.total_km])
            .collect();

        Plot::new("cumulative_distance")
            .height(300.0)
            .allow_scroll(false)
            .y_axis_label("Total Distance (km)")
            .x_axis_formatter(|mark, _range| Self::format_day(mark.value))
            .label_formatter(|_name, value| {
                format!("{}\n{:.1} km", Self::format_day(value.x), value.y)
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(series)
                        .color(PALETTE[0])
                        .width(2.0)
                        .name("Cumulative"),
                );
            });
    }

    /// Color-scaled cell grid with day rows. Unobserved cells stay unfilled
    /// so "no activity" reads differently from "zero".
    pub fn draw_heatmap(ui: &mut egui::Ui, grid: &HeatmapGrid, scale: &ColorScale) {
        const ROW_GUTTER: f32 = 78.0;
        const COL_HEADER: f32 = 16.0;
        const CELL_H: f32 = 18.0;
        const GAP: f32 = 1.0;

        let rows = grid.rows();
        let cols = grid.cols();
        if rows == 0 || cols == 0 {
            return;
        }

        let avail = ui.available_width();
        let cell_w = ((avail - ROW_GUTTER) / cols as f32 - GAP).clamp(6.0, 48.0);
        let size = egui::vec2(
            ROW_GUTTER + cols as f32 * (cell_w + GAP),
            COL_HEADER + rows as f32 * (CELL_H + GAP),
        );
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        if !ui.is_rect_visible(rect) {
            return;
        }

        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();
        let empty_color = ui.visuals().faint_bg_color;
        let max = grid.max_value();

        let cell_x = |c: usize| rect.left() + ROW_GUTTER + c as f32 * (cell_w + GAP);
        let cell_y = |r: usize| rect.top() + COL_HEADER + r as f32 * (CELL_H + GAP);

        let label_stride = if cols > 12 { 3 } else { 1 };
        for c in (0..cols).step_by(label_stride) {
            painter.text(
                egui::pos2(cell_x(c) + cell_w / 2.0, rect.top()),
                Align2::CENTER_TOP,
                &grid.col_labels[c],
                FontId::proportional(10.0),
                text_color,
            );
        }

        for r in 0..rows {
            painter.text(
                egui::pos2(rect.left(), cell_y(r) + CELL_H / 2.0),
                Align2::LEFT_CENTER,
                &grid.row_labels[r],
                FontId::proportional(10.0),
                text_color,
            );
            for c in 0..cols {
                let cell_rect = egui::Rect::from_min_size(
                    egui::pos2(cell_x(c), cell_y(r)),
                    egui::vec2(cell_w, CELL_H),
                );
                let color = match grid.cell(r, c) {
                    Some(v) if max > 0.0 => scale.sample(v / max),
                    Some(_) => scale.sample(0.0),
                    None => empty_color,
                };
                painter.rect_filled(cell_rect, 2.0, color);
            }
        }

        if let Some(pos) = response.hover_pos() {
            let c = ((pos.x - rect.left() - ROW_GUTTER) / (cell_w + GAP)).floor();
            let r = ((pos.y - rect.top() - COL_HEADER) / (CELL_H + GAP)).floor();
            if c >= 0.0 && r >= 0.0 && (c as usize) < cols && (r as usize) < rows {
                let (r, c) = (r as usize, c as usize);
                let text = match grid.cell(r, c) {
                    Some(v) => format!(
                        "{} {} · {}: {:.1}",
                        grid.row_labels[r],
                        grid.col_labels[c],
                        grid.metric.label(),
                        v
                    ),
                    None => format!("{} {} · no data", grid.row_labels[r], grid.col_labels[c]),
                };
                let _ = response.on_hover_text(text);
            }
        }
    }

    /// Per-type KPI table, largest total distance first.
    pub fn draw_breakdown_table(ui: &mut egui::Ui, rows: &[TypeBreakdown]) {
        egui::Grid::new("breakdown_table")
            .striped(true)
            .min_col_width(80.0)
            .show(ui, |ui| {
                for header in [
                    "Activity Type",
                    "Activities",
                    "Distance (km)",
                    "Time (hr)",
                    "Elevation (m)",
                    "Calories",
                    "Avg Speed (km/h)",
                ] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();

                for row in rows {
                    ui.label(&row.activity_type);
                    ui.label(format!("{}", row.kpis.activity_count));
                    ui.label(format!("{:.1}", row.kpis.total_distance_km));
                    ui.label(format!("{:.1}", row.kpis.total_time_hr));
                    ui.label(format!("{:.0}", row.kpis.total_elevation_m));
                    ui.label(format!("{:.0}", row.kpis.total_calories));
                    ui.label(format!("{:.1}", row.kpis.avg_speed_kmh));
                    ui.end_row();
                }
            });
    }

    /// Newest-first activity listing.
    pub fn draw_recent_table(ui: &mut egui::Ui, rows: &[RecentActivity]) {
        egui::Grid::new("recent_table")
            .striped(true)
            .min_col_width(70.0)
            .show(ui, |ui| {
                for header in [
                    "Date",
                    "Name",
                    "Type",
                    "Distance (km)",
                    "Time (hr)",
                    "Avg Speed (km/h)",
                    "Elevation (m)",
                    "Calories",
                ] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();

                for row in rows {
                    ui.label(Self::format_stamp(row.start_ts_ms));
                    ui.label(row.name.as_deref().unwrap_or("—"));
                    ui.label(&row.activity_type);
                    ui.label(format!("{:.1}", row.distance_km));
                    ui.label(format!("{:.1}", row.moving_time_hr));
                    ui.label(format!("{:.1}", row.speed_kmh));
                    ui.label(format!("{:.0}", row.elevation_m));
                    match row.calories {
                        Some(c) => ui.label(format!("{c:.0}")),
                        None => ui.label(""),
                    };
                    ui.end_row();
                }
            });
    }

    /// The filtered table as-is, for the raw-data toggle.
    pub fn draw_raw_table(ui: &mut egui::Ui, df: &DataFrame, limit: usize) {
        let columns = df.get_columns();
        let shown = df.height().min(limit);

        egui::Grid::new("raw_table").striped(true).show(ui, |ui| {
            for column in columns {
                ui.label(RichText::new(column.name().to_string()).strong());
            }
            ui.end_row();

            for i in 0..shown {
                for column in columns {
                    let text = match column.get(i) {
                        Ok(value) if !value.is_null() => {
                            value.to_string().trim_matches('"').to_string()
                        }
                        _ => String::new(),
                    };
                    ui.label(text);
                }
                ui.end_row();
            }
        });

        if df.height() > shown {
            ui.label(
                RichText::new(format!("… {} more rows", df.height() - shown))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
    }

    pub fn format_stamp(ts_ms: i64) -> String {
        DateTime::<Utc>::from_timestamp_millis(ts_ms)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }

    fn format_day(days: f64) -> String {
        DateTime::<Utc>::from_timestamp_millis((days * MS_PER_DAY) as i64)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_default()
    }
}
