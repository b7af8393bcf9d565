//! Grouping and descriptive statistics.
//!
//! This module partitions the dataset by parental education and computes
//! per-group summaries, the cross-subject ranking of the groups, and a
//! short overview of the sample itself.

use crate::models::{Dataset, GroupStats, OverallRanking, SampleOverview};
use std::collections::{BTreeMap, BTreeSet};

/// Label used for records without a sex or grade value.
const UNKNOWN: &str = "unknown";

/// Scores of one subject, partitioned by education category.
///
/// Keys iterate in sorted label order, which is the group order used by
/// every table and chart.
pub fn group_scores(dataset: &Dataset, subject_idx: usize) -> BTreeMap<&str, Vec<f64>> {
    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in &dataset.records {
        grouped
            .entry(record.parent_education.as_str())
            .or_default()
            .push(record.scores[subject_idx]);
    }

    grouped
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// `None` when fewer than two values are given.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Mean, standard deviation and count of one group.
pub fn describe(label: &str, values: &[f64]) -> GroupStats {
    GroupStats {
        label: label.to_string(),
        mean: mean(values),
        std: sample_std(values),
        count: values.len(),
    }
}

/// Descriptive statistics of one subject for every group, in group order.
pub fn describe_by_group(dataset: &Dataset, subject_idx: usize) -> Vec<GroupStats> {
    group_scores(dataset, subject_idx)
        .into_iter()
        .map(|(label, values)| describe(label, &values))
        .collect()
}

/// Rank the groups by the mean of their per-subject means.
///
/// `tables` holds one `describe_by_group` result per subject, all in the
/// same group order. Ties go to the group that comes first.
pub fn overall_ranking(tables: &[Vec<GroupStats>]) -> OverallRanking {
    let Some(first) = tables.first() else {
        return OverallRanking {
            means: Vec::new(),
            best: String::new(),
            gap: 0.0,
        };
    };

    let means: Vec<(String, f64)> = first
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let subject_means: Vec<f64> = tables.iter().map(|t| t[i].mean).collect();
            (group.label.clone(), mean(&subject_means))
        })
        .collect();

    let mut best: Option<&(String, f64)> = None;
    for entry in &means {
        match best {
            Some((_, top)) if entry.1 <= *top => {}
            _ => best = Some(entry),
        }
    }

    let max = means.iter().map(|(_, m)| *m).fold(f64::NEG_INFINITY, f64::max);
    let min = means.iter().map(|(_, m)| *m).fold(f64::INFINITY, f64::min);

    OverallRanking {
        best: best.map(|(label, _)| label.clone()).unwrap_or_default(),
        gap: max - min,
        means,
    }
}

/// Summarize the cleaned sample: sizes, sex and grade breakdowns, age range.
pub fn sample_overview(dataset: &Dataset) -> SampleOverview {
    let mut by_sex: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_grade: BTreeMap<String, usize> = BTreeMap::new();
    let mut logins: BTreeSet<&str> = BTreeSet::new();
    let mut ages = Vec::new();

    for record in &dataset.records {
        let sex = record.sex.as_deref().unwrap_or(UNKNOWN);
        *by_sex.entry(sex.to_string()).or_default() += 1;

        let grade = record.grade.as_deref().unwrap_or(UNKNOWN);
        *by_grade.entry(grade.to_string()).or_default() += 1;

        if let Some(ref login) = record.login {
            logins.insert(login.as_str());
        }
        if let Some(age) = record.age {
            ages.push(age);
        }
    }

    let age = if ages.is_empty() {
        None
    } else {
        let min = ages.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, mean(&ages), max))
    };

    SampleOverview {
        rows_read: dataset.rows_read,
        rows_kept: dataset.len(),
        rows_dropped: dataset.rows_dropped(),
        unique_students: logins.len(),
        by_sex,
        by_grade,
        age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn record(category: &str, scores: &[f64]) -> Record {
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
            subjects: vec!["math".into(), "russian".into(), "foreign".into()],
            rows_read: records.len(),
            records,
        }
    }

    fn stats(label: &str, mean: f64) -> GroupStats {
        GroupStats {
            label: label.to_string(),
            mean,
            std: None,
            count: 1,
        }
    }

    #[test]
    fn test_identical_values_have_zero_std() {
        let g = describe("a", &[4.0, 4.0, 4.0]);
        assert_eq!(g.mean, 4.0);
        assert_eq!(g.std, Some(0.0));
        assert_eq!(g.count, 3);
    }

    #[test]
    fn test_sample_std_uses_n_minus_one() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138089935299395).abs() < 1e-12);
        assert_eq!(sample_std(&[3.0]), None);
    }

    #[test]
    fn test_group_scores_sorted_by_label() {
        let ds = dataset(vec![
            record("School", &[3.0, 3.0, 3.0]),
            record("Higher", &[5.0, 4.0, 5.0]),
            record("School", &[4.0, 3.0, 3.0]),
        ]);

        let grouped = group_scores(&ds, 0);
        let labels: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(labels, vec!["Higher", "School"]);
        assert_eq!(grouped["School"], vec![3.0, 4.0]);
    }

    #[test]
    fn test_group_counts_match_cleaned_rows() {
        let ds = dataset(vec![
            record("A", &[3.0, 3.0, 3.0]),
            record("B", &[5.0, 4.0, 5.0]),
            record("A", &[4.0, 3.0, 3.0]),
            record("A", &[4.0, 3.0, 5.0]),
        ]);

        let table = describe_by_group(&ds, 2);
        assert_eq!(table[0].count, 3);
        assert_eq!(table[1].count, 1);
        assert_eq!(table[1].std, None);
        let total: usize = table.iter().map(|g| g.count).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn test_two_by_two_group_means() {
        let ds = dataset(vec![
            record("Higher", &[5.0, 5.0, 5.0]),
            record("School", &[3.0, 3.0, 3.0]),
            record("Higher", &[4.0, 4.0, 4.0]),
            record("School", &[2.0, 2.0, 2.0]),
        ]);

        for subject in 0..3 {
            let table = describe_by_group(&ds, subject);
            assert_eq!(table[0].label, "Higher");
            assert_eq!(table[0].mean, 4.5);
            assert_eq!(table[1].label, "School");
            assert_eq!(table[1].mean, 2.5);
        }
    }

    #[test]
    fn test_overall_ranking_best_and_gap() {
        let tables = vec![
            vec![stats("A", 3.0), stats("B", 4.0), stats("C", 2.0)],
            vec![stats("A", 3.0), stats("B", 5.0), stats("C", 2.0)],
        ];

        let ranking = overall_ranking(&tables);
        assert_eq!(ranking.best, "B");
        assert_eq!(ranking.means[1], ("B".to_string(), 4.5));
        assert!((ranking.gap - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_overall_ranking_tie_goes_to_first_group() {
        let tables = vec![vec![stats("A", 4.0), stats("B", 4.0), stats("C", 1.0)]];
        assert_eq!(overall_ranking(&tables).best, "A");
    }

    #[test]
    fn test_sample_overview() {
        let mut a = record("A", &[3.0, 3.0, 3.0]);
        a.sex = Some("F".into());
        a.age = Some(11.0);
        a.login = Some("s1".into());
        a.grade = Some("5".into());
        let mut b = record("B", &[4.0, 4.0, 4.0]);
        b.sex = Some("M".into());
        b.age = Some(15.0);
        b.login = Some("s1".into());
        let c = record("B", &[4.0, 4.0, 4.0]);

        let mut ds = dataset(vec![a, b, c]);
        ds.rows_read = 5;

        let overview = sample_overview(&ds);
        assert_eq!(overview.rows_kept, 3);
        assert_eq!(overview.rows_dropped, 2);
        assert_eq!(overview.unique_students, 1);
        assert_eq!(overview.by_sex.get("F"), Some(&1));
        assert_eq!(overview.by_sex.get("unknown"), Some(&1));
        assert_eq!(overview.by_grade.get("unknown"), Some(&2));
        assert_eq!(overview.age, Some((11.0, 13.0, 15.0)));
    }
}
