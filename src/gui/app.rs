//! Strideboard Main Application
//! Main window wiring the loader, filter panel and dashboard together.

use crate::data::ActivityLoader;
use crate::gui::{DashboardView, FilterPanel, PanelAction};
use crate::report::ReportWriter;
use crate::stats::{AggregateView, Aggregator, FilterSelection};
use egui::{RichText, SidePanel};
use std::path::PathBuf;

/// Conventional location of the export, next to the process.
const DEFAULT_DATA_FILE: &str = "activities.csv";

/// Main application window.
///
/// The raw table is loaded once and shared read-only across renders; the
/// aggregate view is cached per (table generation, filter selection) and
/// recomputed whenever either changes.
pub struct DashboardApp {
    loader: ActivityLoader,
    panel: FilterPanel,
    dashboard: DashboardView,
    load_error: Option<String>,
    seen_generation: u64,
    view: Option<(u64, FilterSelection, AggregateView)>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            loader: ActivityLoader::new(),
            panel: FilterPanel::new(PathBuf::from(DEFAULT_DATA_FILE)),
            dashboard: DashboardView::new(),
            load_error: None,
            seen_generation: 0,
            view: None,
        }
    }

    /// Memoized load; a no-op while the file on disk is unchanged.
    fn ensure_loaded(&mut self) {
        let result = self
            .loader
            .load(&self.panel.data_path)
            .map(|t| (t.df.height(), t.dropped_rows));

        match result {
            Ok((rows, dropped)) => {
                self.load_error = None;
                let generation = self.loader.generation();
                if generation != self.seen_generation {
                    self.seen_generation = generation;
                    self.panel
                        .set_status(format!("Loaded {rows} activities ({dropped} rows dropped)"));
                }
            }
            Err(e) => {
                let message = e.to_string();
                if self.load_error.as_deref() != Some(message.as_str()) {
                    log::error!("load failed: {message}");
                    self.panel.set_status("Error: could not load activity file");
                }
                self.load_error = Some(message);
            }
        }
    }

    /// Recompute the aggregate view when the table or the selection changed.
    fn ensure_view(&mut self) {
        let Some(table) = self.loader.cached() else {
            self.view = None;
            return;
        };
        let generation = self.loader.generation();
        let current = self
            .view
            .as_ref()
            .is_some_and(|(g, sel, _)| *g == generation && sel == &self.panel.selection);
        if !current {
            let view = AggregateView::compute(&table.df, &self.panel.selection);
            self.view = Some((generation, self.panel.selection.clone(), view));
        }
    }

    fn handle_browse(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.panel.data_path = path;
            self.loader.invalidate();
            self.view = None;
        }
    }

    fn handle_reload(&mut self) {
        self.loader.invalidate();
        self.view = None;
    }

    fn handle_export(&mut self) {
        if self.view.is_none() {
            self.panel.set_status("No data to export");
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Zip Archive", &["zip"])
            .set_file_name("strideboard_report.zip")
            .save_file()
        else {
            return;
        };

        let Some((_, selection, view)) = self.view.as_ref() else {
            return;
        };
        match ReportWriter::write_bundle(view, selection, &path) {
            Ok(()) => {
                ReportWriter::reveal(&path);
                self.panel
                    .set_status(format!("Report exported: {}", path.display()));
            }
            Err(e) => {
                log::error!("report export failed: {e:#}");
                self.panel.set_status(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_loaded();

        // Filter options come from the loaded table; type options follow the
        // year filter so the combo only offers types observed that year.
        let (years, types, warnings) = match self.loader.cached() {
            Some(table) => {
                let years = Aggregator::observed_years(&table.df);
                let year_only = FilterSelection {
                    year: self.panel.selection.year,
                    activity_type: None,
                };
                let scoped = Aggregator::apply_filter(&table.df, &year_only);
                let types = Aggregator::observed_types(&scoped);
                (years, types, table.warnings.clone())
            }
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        SidePanel::left("filter_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.panel.show(ui, &years, &types, &warnings);
                    match action {
                        PanelAction::BrowseRequested => self.handle_browse(),
                        PanelAction::ReloadRequested => self.handle_reload(),
                        PanelAction::ExportRequested => self.handle_export(),
                        PanelAction::None => {}
                    }
                });
            });

        // Pick up any reload or filter change from this frame's interactions.
        self.ensure_loaded();
        self.ensure_view();

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.load_error {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.label(
                        RichText::new("⚠ Could not load activity data")
                            .size(20.0)
                            .color(egui::Color32::from_rgb(220, 53, 69)),
                    );
                    ui.add_space(8.0);
                    ui.label(error);
                    ui.label(format!(
                        "Expected an activity export at: {}",
                        self.panel.data_path.display()
                    ));
                });
            } else if let Some((_, selection, view)) = &self.view {
                self.dashboard
                    .show(ui, view, selection, self.panel.show_raw);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
        });
    }
}
