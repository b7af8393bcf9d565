//! One-way analysis of variance.
//!
//! Compares the means of two or more independent groups. The p-value is
//! the upper tail of the F distribution with `(k - 1, N - k)` degrees of
//! freedom.

use crate::models::AnovaResult;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use thiserror::Error;
use tracing::warn;

/// Inputs a one-way ANOVA cannot be computed on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnovaError {
    #[error("one-way ANOVA needs at least two groups, got {0}")]
    TooFewGroups(usize),

    #[error("group {0} has no observations")]
    EmptyGroup(usize),
}

/// Run a one-way ANOVA across `groups`.
///
/// Degenerate inputs mirror the usual statistics-library behaviour:
/// no within-group degrees of freedom gives NaN, zero within-group
/// variation gives `F = inf, p = 0` when the means differ and NaN when
/// every value is identical.
pub fn one_way_anova(groups: &[&[f64]]) -> Result<AnovaResult, AnovaError> {
    if groups.len() < 2 {
        return Err(AnovaError::TooFewGroups(groups.len()));
    }
    if let Some(empty) = groups.iter().position(|g| g.is_empty()) {
        return Err(AnovaError::EmptyGroup(empty));
    }

    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let group_mean = group.iter().sum::<f64>() / group.len() as f64;
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += group.iter().map(|x| (x - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = k - 1;
    let df_within = n - k;

    let (f_statistic, p_value) = if df_within == 0 {
        warn!("ANOVA has no within-group degrees of freedom; result is undefined");
        (f64::NAN, f64::NAN)
    } else if ss_within == 0.0 {
        if ss_between == 0.0 {
            warn!("ANOVA input is constant; result is undefined");
            (f64::NAN, f64::NAN)
        } else {
            warn!("ANOVA groups have no within-group variance; F is infinite");
            (f64::INFINITY, 0.0)
        }
    } else {
        let f = (ss_between / df_between as f64) / (ss_within / df_within as f64);
        (f, f_survival(f, df_between as f64, df_within as f64))
    };

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
    })
}

/// Upper-tail probability of the F distribution.
fn f_survival(f: f64, d1: f64, d2: f64) -> f64 {
    match FisherSnedecor::new(d1, d2) {
        Ok(dist) => dist.sf(f),
        Err(e) => {
            warn!("Invalid F distribution parameters ({}, {}): {}", d1, d2, e);
            f64::NAN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_hand_computed_values() {
        // Group means 2, 5, 8; grand mean 5.
        // SSB = 3*9 + 0 + 3*9 = 54, SSW = 2 + 2 + 2 = 6
        // F = (54/2) / (6/6) = 27
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let c = [7.0, 8.0, 9.0];

        let result = one_way_anova(&[&a, &b, &c]).unwrap();

        assert_eq!(result.df_between, 2);
        assert_eq!(result.df_within, 6);
        assert!((result.f_statistic - 27.0).abs() < 1e-10);
        // For F(2, 6) the survival function is (1 + F/3)^-3.
        let expected_p = (1.0f64 + 27.0 / 3.0).powi(-3);
        assert!((result.p_value - expected_p).abs() < 1e-9);
    }

    #[test]
    fn test_identical_groups_give_zero_f() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];

        let result = one_way_anova(&[&a, &b]).unwrap();
        assert_eq!(result.f_statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_groups_with_spread_is_finite() {
        let higher = [5.0, 4.0];
        let school = [3.0, 2.0];

        let result = one_way_anova(&[&higher, &school]).unwrap();
        // SSB = 2*1 + 2*1 = 4, SSW = 0.5 + 0.5 = 1, F = 4 / (1/2) = 8
        assert!((result.f_statistic - 8.0).abs() < 1e-12);
        assert!(result.f_statistic.is_finite());
        assert!(result.p_value > 0.0 && result.p_value <= 1.0);
    }

    #[test]
    fn test_zero_within_variance() {
        let a = [5.0, 5.0];
        let b = [3.0, 3.0];

        let result = one_way_anova(&[&a, &b]).unwrap();
        assert!(result.f_statistic.is_infinite());
        assert_eq!(result.p_value, 0.0);

        let constant = one_way_anova(&[&a, &a]).unwrap();
        assert!(constant.f_statistic.is_nan());
        assert!(constant.p_value.is_nan());
    }

    #[test]
    fn test_no_within_degrees_of_freedom() {
        let result = one_way_anova(&[&[1.0], &[2.0]]).unwrap();
        assert_eq!(result.df_within, 0);
        assert!(result.f_statistic.is_nan());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            one_way_anova(&[&[1.0, 2.0]]),
            Err(AnovaError::TooFewGroups(1))
        );
        assert_eq!(
            one_way_anova(&[&[1.0, 2.0], &[]]),
            Err(AnovaError::EmptyGroup(1))
        );
    }
}
