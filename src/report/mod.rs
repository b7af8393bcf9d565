//! Report rendering: the text report on stdout and the chart images.

pub mod charts;
pub mod generator;

pub use charts::render_charts;
pub use generator::render_report;
