//! Filter Panel Widget
//! Left side panel with the data source row, filter controls and actions.

use crate::stats::FilterSelection;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Actions triggered by the filter panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    None,
    BrowseRequested,
    ReloadRequested,
    ExportRequested,
}

/// Left side panel holding the transient UI state: data path, the current
/// filter selection, and the status line.
pub struct FilterPanel {
    pub data_path: PathBuf,
    pub selection: FilterSelection,
    pub show_raw: bool,
    pub status: String,
}

impl FilterPanel {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            data_path,
            selection: FilterSelection::default(),
            show_raw: false,
            status: "Ready".to_string(),
        }
    }

    /// Draw the panel. Filter edits mutate `self.selection` directly; other
    /// interactions are reported back as an action.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        years: &[i32],
        types: &[String],
        warnings: &[String],
    ) -> PanelAction {
        let mut action = PanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("👟 Strideboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Activity Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .data_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| self.data_path.display().to_string());
                    ui.label(RichText::new(path_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = PanelAction::BrowseRequested;
                        }
                        if ui.button("⟳ Reload").clicked() {
                            action = PanelAction::ReloadRequested;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔎 Filter Your Data").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 60.0;
        let combo_width = 150.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Year:"));
            let selected = match self.selection.year {
                Some(year) => year.to_string(),
                None => "All Years".to_string(),
            };
            ComboBox::from_id_salt("year_filter")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.selection.year.is_none(), "All Years")
                        .clicked()
                    {
                        self.selection.year = None;
                    }
                    for &year in years {
                        if ui
                            .selectable_label(self.selection.year == Some(year), year.to_string())
                            .clicked()
                        {
                            self.selection.year = Some(year);
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Type:"));
            let selected = self
                .selection
                .activity_type
                .clone()
                .unwrap_or_else(|| "All Activities".to_string());
            ComboBox::from_id_salt("type_filter")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.selection.activity_type.is_none(), "All Activities")
                        .clicked()
                    {
                        self.selection.activity_type = None;
                    }
                    for kind in types {
                        if ui
                            .selectable_label(
                                self.selection.activity_type.as_deref() == Some(kind),
                                kind,
                            )
                            .clicked()
                        {
                            self.selection.activity_type = Some(kind.clone());
                        }
                    }
                });
        });

        ui.add_space(8.0);
        ui.checkbox(&mut self.show_raw, "Show raw filtered data");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("📦 Export Report").size(14.0))
                .min_size(egui::vec2(170.0, 30.0));
            if ui.add(button).clicked() {
                action = PanelAction::ExportRequested;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Diagnostics =====
        if !warnings.is_empty() {
            ui.label(RichText::new("⚠ Schema Warnings").size(13.0).strong());
            ui.add_space(3.0);
            for warning in warnings {
                ui.label(
                    RichText::new(warning)
                        .size(11.0)
                        .color(Color32::from_rgb(255, 193, 7)),
                );
            }
            ui.add_space(8.0);
        }

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}
