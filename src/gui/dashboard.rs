//! Dashboard View
//! Central panel: KPI tiles, tabbed charts and tables.

use crate::charts::{ChartPlotter, SCALE_BLUES, SCALE_GREENS, SCALE_HEAT};
use crate::stats::{AggregateView, FilterSelection, Kpis};
use egui::{Color32, RichText, ScrollArea};

/// Cap for the raw-data table so a large export cannot stall a frame.
const RAW_ROW_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Monthly,
    Heatmaps,
    Breakdown,
    Recent,
}

impl DashboardTab {
    const ALL: [DashboardTab; 4] = [
        DashboardTab::Monthly,
        DashboardTab::Heatmaps,
        DashboardTab::Breakdown,
        DashboardTab::Recent,
    ];

    fn label(&self) -> &'static str {
        match self {
            DashboardTab::Monthly => "Monthly Stats",
            DashboardTab::Heatmaps => "Heatmaps",
            DashboardTab::Breakdown => "Breakdown",
            DashboardTab::Recent => "Recent Activities",
        }
    }
}

/// Central dashboard area. The only state it keeps is the active tab;
/// everything drawn comes from the current aggregate view.
pub struct DashboardView {
    tab: DashboardTab,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            tab: DashboardTab::Monthly,
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        view: &AggregateView,
        selection: &FilterSelection,
        show_raw: bool,
    ) {
        ui.heading("My Activity Dashboard");
        ui.label(format!("Displaying data for: {}", selection.describe()));
        ui.add_space(6.0);

        if view.kpis.activity_count == 0 {
            ui.label(
                RichText::new("No activities found for the selected filters.")
                    .size(16.0)
                    .color(Color32::from_rgb(255, 193, 7)),
            );
            return;
        }

        Self::kpi_rows(ui, &view.kpis);
        ui.add_space(8.0);
        ui.separator();

        ui.horizontal(|ui| {
            for tab in DashboardTab::ALL {
                if ui.selectable_label(self.tab == tab, tab.label()).clicked() {
                    self.tab = tab;
                }
            }
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                match self.tab {
                    DashboardTab::Monthly => {
                        Self::section(ui, "Distance per Month by Activity Type");
                        ChartPlotter::draw_monthly_chart(ui, &view.monthly);
                        ui.add_space(12.0);
                        Self::section(ui, "Cumulative Distance Over Time");
                        ChartPlotter::draw_cumulative_chart(ui, &view.cumulative);
                    }
                    DashboardTab::Heatmaps => {
                        Self::section(ui, "Activity by Day of Week and Hour");
                        ChartPlotter::draw_heatmap(ui, &view.by_hour_distance, &SCALE_BLUES);
                        ui.add_space(14.0);
                        ui.columns(3, |cols| {
                            Self::section(&mut cols[0], "Total Distance");
                            ChartPlotter::draw_heatmap(
                                &mut cols[0],
                                &view.by_month_distance,
                                &SCALE_BLUES,
                            );
                            Self::section(&mut cols[1], "Average Speed");
                            ChartPlotter::draw_heatmap(
                                &mut cols[1],
                                &view.by_month_speed,
                                &SCALE_HEAT,
                            );
                            Self::section(&mut cols[2], "Activity Count");
                            ChartPlotter::draw_heatmap(
                                &mut cols[2],
                                &view.by_month_count,
                                &SCALE_GREENS,
                            );
                        });
                    }
                    DashboardTab::Breakdown => {
                        Self::section(ui, "Breakdown by Activity Type");
                        ChartPlotter::draw_breakdown_table(ui, &view.breakdown);
                    }
                    DashboardTab::Recent => {
                        Self::section(ui, "Recent Activities");
                        ChartPlotter::draw_recent_table(ui, &view.recent);
                    }
                }

                if show_raw {
                    ui.add_space(12.0);
                    ui.separator();
                    Self::section(ui, "Raw Data");
                    ScrollArea::horizontal().show(ui, |ui| {
                        ChartPlotter::draw_raw_table(ui, &view.filtered, RAW_ROW_LIMIT);
                    });
                }
            });
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.label(RichText::new(title).size(16.0).strong());
        ui.add_space(4.0);
    }

    fn kpi_rows(ui: &mut egui::Ui, kpis: &Kpis) {
        let top = [
            ("Total Activities", format!("{}", kpis.activity_count)),
            ("Total Distance", format!("{:.1} km", kpis.total_distance_km)),
            ("Total Time", format!("{:.1} hrs", kpis.total_time_hr)),
            ("Total Elevation", format!("{:.0} m", kpis.total_elevation_m)),
        ];
        let bottom = [
            ("Total Calories", format!("{:.0}", kpis.total_calories)),
            ("Avg. Distance", format!("{:.1} km", kpis.avg_distance_km)),
            ("Avg. Time", format!("{:.1} hrs", kpis.avg_time_hr)),
            ("Avg. Speed", format!("{:.1} km/h", kpis.avg_speed_kmh)),
        ];
        Self::tile_row(ui, &top);
        ui.add_space(6.0);
        Self::tile_row(ui, &bottom);
    }

    fn tile_row(ui: &mut egui::Ui, tiles: &[(&str, String)]) {
        ui.columns(tiles.len(), |cols| {
            for (col, (label, value)) in cols.iter_mut().zip(tiles) {
                egui::Frame::none()
                    .fill(col.visuals().widgets.noninteractive.bg_fill)
                    .rounding(6.0)
                    .inner_margin(10.0)
                    .show(col, |ui| {
                        ui.label(RichText::new(*label).size(11.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(20.0).strong());
                    });
            }
        });
    }
}
