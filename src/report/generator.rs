//! Text report generation.
//!
//! This module renders the analysis results as the plain-text report
//! printed to standard output.

use crate::models::{
    AnalysisReport, AnovaResult, GroupStats, OverallRanking, SampleOverview, SubjectAnalysis,
};

const WIDE_RULE: usize = 50;
const NARROW_RULE: usize = 30;

/// Name of the grouping column in printed tables.
const GROUP_HEADER: &str = "parent_education";

/// Generate the complete text report.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&generate_overview_section(&report.overview));
    output.push_str(&generate_detailed_section(&report.subjects));
    output.push_str(&generate_overall_section(&report.overall));
    output.push_str(&generate_correlation_section(&report.subjects));

    output
}

/// Format a float with fixed decimals, spelling out non-finite values.
fn fmt_float(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else {
        format!("{:.*}", decimals, value)
    }
}

fn rule(width: usize) -> String {
    format!("{}\n", "-".repeat(width))
}

/// Generate the sample overview section.
fn generate_overview_section(overview: &SampleOverview) -> String {
    let mut section = String::new();

    section.push_str("\nSample Overview:\n");
    section.push_str(&rule(WIDE_RULE));
    section.push_str(&format!("Rows read: {}\n", overview.rows_read));
    section.push_str(&format!(
        "Rows analyzed: {} ({} dropped for missing values)\n",
        overview.rows_kept, overview.rows_dropped
    ));
    section.push_str(&format!("Distinct students: {}\n", overview.unique_students));

    if let Some((min, mean, max)) = overview.age {
        section.push_str(&format!(
            "Age: min {} / mean {} / max {}\n",
            fmt_float(min, 0),
            fmt_float(mean, 1),
            fmt_float(max, 0)
        ));
    }

    if !overview.by_sex.is_empty() {
        let parts: Vec<String> = overview
            .by_sex
            .iter()
            .map(|(sex, count)| format!("{}: {}", sex, count))
            .collect();
        section.push_str(&format!("By sex: {}\n", parts.join(", ")));
    }

    if !overview.by_grade.is_empty() {
        let parts: Vec<String> = overview
            .by_grade
            .iter()
            .map(|(grade, count)| format!("{}: {}", grade, count))
            .collect();
        section.push_str(&format!("By grade: {}\n", parts.join(", ")));
    }

    section
}

/// Generate the per-subject statistics section.
fn generate_detailed_section(subjects: &[SubjectAnalysis]) -> String {
    let mut section = String::new();

    section.push_str("\nDetailed Statistical Analysis:\n");
    section.push_str(&rule(WIDE_RULE));

    for subject in subjects {
        section.push_str(&format!("\n{} Analysis:\n", subject.subject));
        section.push_str(&rule(NARROW_RULE));
        section.push_str("\nDescriptive Statistics:\n");
        section.push_str(&generate_group_table(&subject.groups));
        section.push_str(&generate_anova_block(&subject.anova));
    }

    section
}

/// Generate the mean/std/count table of one subject.
fn generate_group_table(groups: &[GroupStats]) -> String {
    let label_width = groups
        .iter()
        .map(|g| g.label.chars().count())
        .chain(std::iter::once(GROUP_HEADER.len()))
        .max()
        .unwrap_or(GROUP_HEADER.len());

    let mut table = String::new();
    table.push_str(&format!(
        "{:<w$} {:>8} {:>8} {:>6}\n",
        GROUP_HEADER,
        "mean",
        "std",
        "count",
        w = label_width
    ));

    for group in groups {
        let std = group.std.map_or_else(|| "NaN".to_string(), |s| fmt_float(s, 2));
        table.push_str(&format!(
            "{:<w$} {:>8} {:>8} {:>6}\n",
            group.label,
            fmt_float(group.mean, 2),
            std,
            group.count,
            w = label_width
        ));
    }

    table
}

/// Generate the ANOVA result block.
fn generate_anova_block(anova: &AnovaResult) -> String {
    let mut block = String::new();

    block.push_str("\nOne-way ANOVA:\n");
    block.push_str(&format!("F-statistic: {}\n", fmt_float(anova.f_statistic, 2)));
    block.push_str(&format!("p-value: {}\n", fmt_float(anova.p_value, 4)));
    block.push_str(&format!(
        "Degrees of freedom: {} between, {} within\n",
        anova.df_between, anova.df_within
    ));

    block
}

/// Generate the cross-subject ranking section.
fn generate_overall_section(overall: &OverallRanking) -> String {
    let mut section = String::new();

    section.push_str("\nOverall Performance Analysis:\n");
    section.push_str(&rule(WIDE_RULE));
    section.push_str(&format!("\nBest performing group: {}\n", overall.best));
    section.push_str("Average grades across all subjects:\n");

    let label_width = overall
        .means
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    for (label, mean) in &overall.means {
        section.push_str(&format!(
            "{:<w$} {:>8}\n",
            label,
            fmt_float(*mean, 2),
            w = label_width
        ));
    }

    section.push_str(&format!(
        "\nGrade gap (highest vs lowest): {} points\n",
        fmt_float(overall.gap, 2)
    ));

    section
}

/// Generate the eta-squared section.
fn generate_correlation_section(subjects: &[SubjectAnalysis]) -> String {
    let mut section = String::new();

    section.push_str("\nCorrelation Analysis:\n");
    section.push_str(&rule(WIDE_RULE));

    for subject in subjects {
        section.push_str(&format!(
            "\nCorrelation ratio (eta-squared) for {}: {}\n",
            subject.subject,
            fmt_float(subject.eta_squared, 3)
        ));
        section.push_str(&format!(
            "This suggests that {}% of the variance in {}\n",
            fmt_float(subject.eta_squared * 100.0, 1),
            subject.subject
        ));
        section.push_str("grades can be explained by parental education level.\n");
    }

    section
}
