//! PNG chart rendering.
//!
//! Two images are produced: a grouped bar chart of mean grades per
//! education level, and a distribution chart with pooled grade box plots
//! next to the eta-squared of each subject.

use crate::analysis::group_scores;
use crate::config::OutputConfig;
use crate::models::{AnalysisReport, Dataset, SubjectAnalysis};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const BAR_CHART_SIZE: (u32, u32) = (1200, 600);
const DISTRIBUTION_CHART_SIZE: (u32, u32) = (1500, 600);

/// Longest category label drawn on an axis.
const MAX_LABEL_CHARS: usize = 28;

/// Chart rendering failures.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("chart drawing failed: {0}")]
    Draw(String),

    #[error("nothing to plot")]
    NoData,
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Draw(e.to_string())
    }
}

/// Render both charts into the configured directory.
///
/// Returns the paths written.
pub fn render_charts(
    output: &OutputConfig,
    dataset: &Dataset,
    report: &AnalysisReport,
) -> Result<Vec<PathBuf>, ChartError> {
    std::fs::create_dir_all(&output.directory).map_err(|source| ChartError::OutputDir {
        path: output.directory.display().to_string(),
        source,
    })?;

    let bar_path = output.bar_chart_path();
    render_mean_grades_chart(&bar_path, &report.subjects)?;
    info!("Saved bar chart to {}", bar_path.display());

    let detail_path = output.distribution_chart_path();
    render_distribution_chart(&detail_path, &pooled_scores(dataset), &report.subjects)?;
    info!("Saved distribution chart to {}", detail_path.display());

    Ok(vec![bar_path, detail_path])
}

/// Slot positions for a grouped bar chart.
///
/// Each group takes one slot per bar plus one empty slot as a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarLayout {
    pub groups: u32,
    pub bars_per_group: u32,
}

impl BarLayout {
    pub fn new(groups: usize, bars_per_group: usize) -> Self {
        Self {
            groups: groups as u32,
            bars_per_group: bars_per_group as u32,
        }
    }

    /// Total slot count on the x axis.
    pub fn slots(&self) -> u32 {
        self.groups * (self.bars_per_group + 1)
    }

    /// Slot of bar `bar` within group `group`.
    pub fn slot(&self, group: usize, bar: usize) -> u32 {
        group as u32 * (self.bars_per_group + 1) + bar as u32
    }

    /// Group whose label sits under `slot`, if any.
    pub fn label_group(&self, slot: u32) -> Option<usize> {
        let stride = self.bars_per_group + 1;
        let middle = self.bars_per_group.saturating_sub(1) / 2;
        let group = slot / stride;
        (group < self.groups && slot % stride == middle).then_some(group as usize)
    }
}

/// Shorten a label to `max` characters, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        return label.to_string();
    }
    let kept: String = label.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Round an axis maximum up, leaving headroom above the tallest value.
pub fn axis_upper_bound(max_value: f64) -> f64 {
    if !max_value.is_finite() || max_value <= 0.0 {
        return 1.0;
    }
    let padded = max_value * 1.1;
    let step = 10f64.powf(padded.log10().floor()) / 2.0;
    (padded / step).ceil() * step
}

/// Every subject's scores pooled per education group, in group order.
pub fn pooled_scores(dataset: &Dataset) -> Vec<(String, Vec<f64>)> {
    let mut pooled: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for idx in 0..dataset.subjects.len() {
        for (label, values) in group_scores(dataset, idx) {
            pooled.entry(label.to_string()).or_default().extend(values);
        }
    }

    pooled.into_iter().collect()
}

/// Padded (min, max) over all pooled values.
fn value_range(pooled: &[(String, Vec<f64>)]) -> (f32, f32) {
    let (lo, hi) = pooled
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    ((lo - pad) as f32, (hi + pad) as f32)
}

/// Grouped bar chart of mean grade per education level and subject.
pub fn render_mean_grades_chart(
    path: &Path,
    subjects: &[SubjectAnalysis],
) -> Result<(), ChartError> {
    let first = subjects.first().ok_or(ChartError::NoData)?;
    let labels: Vec<String> = first
        .groups
        .iter()
        .map(|g| truncate_label(&g.label, MAX_LABEL_CHARS))
        .collect();
    let layout = BarLayout::new(labels.len(), subjects.len());

    let max_mean = subjects
        .iter()
        .flat_map(|s| s.groups.iter().map(|g| g.mean))
        .fold(0.0, f64::max);
    let y_max = axis_upper_bound(max_mean);
    debug!("Bar chart: {:?}, y up to {}", layout, y_max);

    let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Student Performance by Parental Education Level",
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(170)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..layout.slots()).into_segmented(), 0f64..y_max)?;

    let x_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(slot) => layout
            .label_group(*slot)
            .and_then(|g| labels.get(g).cloned())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(layout.slots() as usize)
        .x_label_formatter(&x_label)
        .x_label_style(
            ("sans-serif", 13)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_desc("Parent's Education Level")
        .y_desc("Average Grade")
        .draw()?;

    for (bar, subject) in subjects.iter().enumerate() {
        let color = Palette99::pick(bar).mix(0.9);
        chart
            .draw_series(subject.groups.iter().enumerate().map(|(group, stats)| {
                let slot = layout.slot(group, bar);
                let mut rect = Rectangle::new(
                    [
                        (SegmentValue::Exact(slot), 0.0),
                        (SegmentValue::Exact(slot + 1), stats.mean),
                    ],
                    color.filled(),
                );
                rect.set_margin(0, 0, 1, 1);
                rect
            }))?
            .label(subject.subject.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Box plots of pooled grades (left) and eta-squared per subject (right).
pub fn render_distribution_chart(
    path: &Path,
    pooled: &[(String, Vec<f64>)],
    subjects: &[SubjectAnalysis],
) -> Result<(), ChartError> {
    if pooled.is_empty() || subjects.is_empty() {
        return Err(ChartError::NoData);
    }

    let root = BitMapBackend::new(path, DISTRIBUTION_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(DISTRIBUTION_CHART_SIZE.0 / 2);

    draw_grade_boxplots(&left, pooled)?;
    draw_eta_squared_bars(&right, subjects)?;

    root.present()?;
    Ok(())
}

fn draw_grade_boxplots<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    pooled: &[(String, Vec<f64>)],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let labels: Vec<String> = pooled
        .iter()
        .map(|(label, _)| truncate_label(label, MAX_LABEL_CHARS))
        .collect();
    let (lo, hi) = value_range(pooled);

    let mut chart = ChartBuilder::on(area)
        .caption("Grade Distribution by Parental Education", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(220)
        .build_cartesian_2d(lo..hi, labels[..].into_segmented())?;

    let y_label = |v: &SegmentValue<&String>| match v {
        SegmentValue::CenterOf(label) => label.to_string(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .y_labels(labels.len())
        .y_label_formatter(&y_label)
        .x_desc("Grade")
        .light_line_style(WHITE)
        .draw()?;

    chart.draw_series(pooled.iter().zip(&labels).map(|((_, values), label)| {
        let quartiles = Quartiles::new(values.as_slice());
        Boxplot::new_horizontal(SegmentValue::CenterOf(label), &quartiles)
            .width(20)
            .style(BLUE)
    }))?;

    Ok(())
}

fn draw_eta_squared_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    subjects: &[SubjectAnalysis],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let names: Vec<String> = subjects
        .iter()
        .map(|s| truncate_label(&s.subject, MAX_LABEL_CHARS))
        .collect();
    let max_eta = subjects.iter().map(|s| s.eta_squared).fold(0.0, f64::max);
    let y_max = axis_upper_bound(max_eta).min(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(
            "Variance Explained by Parental Education",
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..names.len() as u32).into_segmented(), 0f64..y_max)?;

    let x_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => names.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_label_formatter(&x_label)
        .y_desc("eta-squared")
        .draw()?;

    chart.draw_series(subjects.iter().enumerate().map(|(i, subject)| {
        let slot = i as u32;
        let mut rect = Rectangle::new(
            [
                (SegmentValue::Exact(slot), 0.0),
                (SegmentValue::Exact(slot + 1), subject.eta_squared),
            ],
            Palette99::pick(i).mix(0.9).filled(),
        );
        rect.set_margin(0, 0, 25, 25);
        rect
    }))?;

    Ok(())
}
