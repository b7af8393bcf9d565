//! Correlation ratio (eta-squared) between a categorical predictor and a
//! numeric outcome.

use std::collections::BTreeMap;

/// Share of the variance in `values` explained by `categories`.
///
/// Computes `SS_between / SS_total`, with each category's squared deviation
/// from the global mean weighted by its size. Returns 0 when `values` has
/// no variance (or is empty), so the result is always in `[0, 1]`.
pub fn correlation_ratio<K: Ord>(categories: &[K], values: &[f64]) -> f64 {
    debug_assert_eq!(categories.len(), values.len());
    if values.is_empty() {
        return 0.0;
    }

    let global_mean = values.iter().sum::<f64>() / values.len() as f64;

    // category -> (sum, count)
    let mut per_category: BTreeMap<&K, (f64, usize)> = BTreeMap::new();
    for (category, value) in categories.iter().zip(values) {
        let entry = per_category.entry(category).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let ss_total: f64 = values.iter().map(|y| (y - global_mean).powi(2)).sum();
    if ss_total == 0.0 {
        return 0.0;
    }

    let ss_between: f64 = per_category
        .values()
        .map(|&(sum, count)| {
            let category_mean = sum / count as f64;
            count as f64 * (category_mean - global_mean).powi(2)
        })
        .sum();

    ss_between / ss_total
}
