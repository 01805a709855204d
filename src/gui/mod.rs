//! GUI module - user interface components

mod app;
mod dashboard;
mod side_panel;

pub use app::DashboardApp;
pub use dashboard::DashboardView;
pub use side_panel::{FilterPanel, PanelAction};
