//! Charts module - interactive plots and static rendering

pub mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, ColorScale, PALETTE, SCALE_BLUES, SCALE_GREENS, SCALE_HEAT};
pub use renderer::{ChartRenderer, RenderError};
