//! Statistical analysis of the cleaned dataset.
//!
//! [`analyze`] runs every computation the report needs: per-subject group
//! statistics, one-way ANOVA and eta-squared, then the overall ranking.

pub mod aggregator;
pub mod anova;
pub mod correlation;

pub use aggregator::*;
pub use anova::one_way_anova;
pub use correlation::correlation_ratio;

use crate::models::{AnalysisReport, Dataset, SubjectAnalysis};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Analyze every subject of the dataset.
pub fn analyze(dataset: &Dataset) -> Result<AnalysisReport> {
    let categories = dataset.categories();
    let mut subjects = Vec::with_capacity(dataset.subjects.len());

    for (idx, subject) in dataset.subjects.iter().enumerate() {
        let grouped = group_scores(dataset, idx);
        let groups: Vec<&[f64]> = grouped.values().map(Vec::as_slice).collect();

        let anova = one_way_anova(&groups)
            .with_context(|| format!("ANOVA failed for subject '{}'", subject))?;
        let eta_squared = correlation_ratio(&categories, &dataset.scores(idx));

        debug!(
            "{}: F={:.3} p={:.4} eta2={:.3}",
            subject, anova.f_statistic, anova.p_value, eta_squared
        );

        subjects.push(SubjectAnalysis {
            subject: subject.clone(),
            groups: describe_by_group(dataset, idx),
            anova,
            eta_squared,
        });
    }

    let tables: Vec<_> = subjects.iter().map(|s| s.groups.clone()).collect();
    let overall = overall_ranking(&tables);
    info!(
        "Analyzed {} subjects across {} education groups",
        subjects.len(),
        overall.means.len()
    );

    Ok(AnalysisReport {
        overview: sample_overview(dataset),
        subjects,
        overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn record(category: &str, scores: [f64; 3]) -> Record {
        Record {
            login: None,
            sex: None,
            age: None,
            grade: None,
            parent_education: category.to_string(),
            scores: scores.to_vec(),
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset {
            subjects: vec![
                "Mathematics or algebra".into(),
                "Russian language".into(),
                "Foreign language (primary)".into(),
            ],
            rows_read: records.len(),
            records,
        }
    }

    #[test]
    fn test_four_row_two_category_scenario() {
        let ds = dataset(vec![
            record("Higher", [5.0, 5.0, 5.0]),
            record("Secondary", [3.0, 3.0, 3.0]),
            record("Higher", [4.0, 4.0, 4.0]),
            record("Secondary", [2.0, 2.0, 2.0]),
        ]);

        let report = analyze(&ds).unwrap();

        assert_eq!(report.subjects.len(), 3);
        for subject in &report.subjects {
            assert_eq!(subject.groups[0].label, "Higher");
            assert_eq!(subject.groups[0].mean, 4.5);
            assert_eq!(subject.groups[1].label, "Secondary");
            assert_eq!(subject.groups[1].mean, 2.5);
            assert!(subject.anova.f_statistic.is_finite());
            assert!(subject.anova.p_value <= 1.0);
            assert!((0.0..=1.0).contains(&subject.eta_squared));
        }
        assert_eq!(report.overall.best, "Higher");
        assert!((report.overall.gap - 2.0).abs() < 1e-12);
        assert_eq!(report.overview.rows_kept, 4);
    }

    #[test]
    fn test_single_group_fails() {
        let ds = dataset(vec![
            record("Higher", [5.0, 5.0, 5.0]),
            record("Higher", [4.0, 4.0, 4.0]),
        ]);
        let err = analyze(&ds).unwrap_err();
        assert!(err.to_string().contains("Mathematics or algebra"));
    }
}
