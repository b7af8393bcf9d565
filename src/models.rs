//! Data models for the grade analysis.
//!
//! This module contains the core data structures shared by the loader,
//! the statistics modules, and the report renderers.

use std::collections::BTreeMap;

/// One student's row after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Student identifier (`Login` column).
    pub login: Option<String>,
    /// Student sex as recorded in the sheet.
    pub sex: Option<String>,
    /// Student age in years, when numeric.
    pub age: Option<f64>,
    /// School grade level.
    pub grade: Option<String>,
    /// Parental education category.
    pub parent_education: String,
    /// Subject scores, in the dataset's subject order.
    pub scores: Vec<f64>,
}

/// The cleaned, read-only dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Subject names, in column order.
    pub subjects: Vec<String>,
    /// Records that survived cleaning.
    pub records: Vec<Record>,
    /// Number of data rows present before cleaning.
    pub rows_read: usize,
}

impl Dataset {
    /// Number of records kept after cleaning.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of raw rows that were dropped for missing values.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.records.len())
    }

    /// Category label of every record, in record order.
    pub fn categories(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.parent_education.as_str())
            .collect()
    }

    /// Scores of one subject across all records, in record order.
    pub fn scores(&self, subject_idx: usize) -> Vec<f64> {
        self.records.iter().map(|r| r.scores[subject_idx]).collect()
    }

    /// Distinct category labels in group order.
    pub fn group_labels(&self) -> Vec<&str> {
        let mut labels = self.categories();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

/// Descriptive statistics for one education group on one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    /// Education category.
    pub label: String,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation; `None` for a single observation.
    pub std: Option<f64>,
    /// Number of observations.
    pub count: usize,
}

/// Result of a one-way analysis of variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
}

/// Everything computed for a single subject.
#[derive(Debug, Clone)]
pub struct SubjectAnalysis {
    /// Subject name.
    pub subject: String,
    /// Per-group descriptive statistics, in group order.
    pub groups: Vec<GroupStats>,
    /// ANOVA across education groups.
    pub anova: AnovaResult,
    /// Correlation ratio between education and this subject.
    pub eta_squared: f64,
}

/// Cross-subject ranking of the education groups.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallRanking {
    /// Mean of per-subject group means, in group order.
    pub means: Vec<(String, f64)>,
    /// Label of the group with the highest overall mean.
    pub best: String,
    /// Highest minus lowest overall mean.
    pub gap: f64,
}

/// Summary of the sample before any grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleOverview {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Distinct non-empty student identifiers among kept records.
    pub unique_students: usize,
    /// Record counts by sex; unknown sex is counted under "unknown".
    pub by_sex: BTreeMap<String, usize>,
    /// Record counts by grade level; unknown grade under "unknown".
    pub by_grade: BTreeMap<String, usize>,
    /// (min, mean, max) over records with a numeric age.
    pub age: Option<(f64, f64, f64)>,
}

/// The complete analysis, ready to be rendered.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub overview: SampleOverview,
    pub subjects: Vec<SubjectAnalysis>,
    pub overall: OverallRanking,
}
