//! # Robust outlier detection
//!
//! [`find_outliers`] flags extreme values of a numeric series using the
//! median and the MAD-based robust sigma:
//!
//! ```text
//! median = median(finite values)
//! scale  = 1.4826 · median(|v − median|)
//! v is an outlier  ⇔  v is finite and v ≥ median + sigma · scale
//! ```
//!
//! Only the upper bound flags values: finite values above
//! `median − sigma · scale` are cleared as regular, and nothing is ever
//! flagged for lying far below the median.
//!
//! With neighbour joining enabled, regular values sitting within
//! `neighbour_span` positions of an outlier run are absorbed into it (see
//! [`join_neighbouring_outliers`]).
use tracing::debug;

use crate::datasets::{Table, Value};
use crate::phab_errors::PhabError;

/// Normal-consistency factor turning a median absolute deviation into a sigma.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Median of a non-empty slice (mean of the two middle values for even lengths).
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

/// Find outliers in a series and return the mask where outliers are `true`.
///
/// `NaN` and infinities never count as outliers and are left out of the
/// statistics.
///
/// Arguments
/// ---------
/// * `series`: the values to inspect
/// * `sigma`: how many robust sigmas above the median make an outlier
/// * `join_neighbours`: absorb regular values close to outliers into them
/// * `neighbour_span`: how many consecutive regular values count as neighbours
///
/// Return
/// ------
/// * a mask of the same length as `series`
///
/// Examples
/// ----------
/// ```rust
/// use phab::statistics::find_outliers;
///
/// let series = [4., 111., 3., 4., 5., 6., f64::INFINITY, 2., 4., 5.];
/// let mask = find_outliers(&series, 3.0, false, 3);
/// assert_eq!(mask.iter().filter(|m| **m).count(), 1);
/// assert!(mask[1]);
/// ```
pub fn find_outliers(
    series: &[f64],
    sigma: f64,
    join_neighbours: bool,
    neighbour_span: usize,
) -> Vec<bool> {
    let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return vec![false; series.len()];
    }

    let center = median(&finite);
    let deviations: Vec<f64> = finite.iter().map(|v| (v - center).abs()).collect();
    let scale = MAD_TO_SIGMA * median(&deviations);
    let upper = center + sigma * scale;
    debug!("Outliers search: median = {center}, robust sigma = {scale}, upper bound = {upper}");

    let outliers: Vec<bool> = series
        .iter()
        .map(|v| v.is_finite() && *v >= upper)
        .collect();

    if join_neighbours {
        join_neighbouring_outliers(&outliers, neighbour_span)
    } else {
        outliers
    }
}

/// Expand outliers over their regular neighbours.
///
/// The mask is scanned in order while counting regular values since the
/// last outlier. Up to `neighbour_span` of them are kept pending; when the
/// next outlier arrives within the span, the pending values become outliers.
/// A longer regular run drops the pending values and stops the counting
/// until the next outlier. Counting is active from the very start, and values
/// still pending at the end of the series are promoted.
pub fn join_neighbouring_outliers(outliers: &[bool], neighbour_span: usize) -> Vec<bool> {
    let mut joined = outliers.to_vec();
    let mut since_previous_outlier = 0usize;
    let mut counting = true;
    let mut pending: Vec<usize> = Vec::new();

    for (i, is_outlier) in outliers.iter().enumerate() {
        if *is_outlier {
            if counting {
                for p in pending.drain(..) {
                    joined[p] = true;
                }
                since_previous_outlier = 0;
            } else {
                counting = true;
            }
        } else if counting {
            since_previous_outlier += 1;
            if since_previous_outlier > neighbour_span {
                since_previous_outlier = 0;
                counting = false;
                pending.clear();
            } else {
                pending.push(i);
            }
        }
    }

    for p in pending {
        joined[p] = true;
    }
    joined
}

/// Run [`find_outliers`] over a table column and align the mask to the index labels.
///
/// Missing cells are treated as `NaN`; text cells are rejected with
/// [`PhabError::UnexpectedValue`].
pub fn find_outliers_in_column(
    table: &Table,
    column: &str,
    sigma: f64,
    join_neighbours: bool,
    neighbour_span: usize,
) -> Result<Vec<(i64, bool)>, PhabError> {
    let series = table
        .try_column(column)?
        .iter()
        .map(|value| match value {
            Value::Missing => Ok(f64::NAN),
            other => other.as_f64().ok_or_else(|| PhabError::UnexpectedValue {
                column: column.to_string(),
                value: other.to_string(),
            }),
        })
        .collect::<Result<Vec<f64>, PhabError>>()?;

    let mask = find_outliers(&series, sigma, join_neighbours, neighbour_span);
    Ok(table.index().iter().copied().zip(mask).collect())
}

#[cfg(test)]
mod statistics_test {
    use super::*;

    fn reference_series() -> Vec<f64> {
        vec![
            4., 111., 4., 4., 5., 6., f64::INFINITY, 2., 4., 4., f64::NAN, 1., 1e15, 4., 3., 3.,
            101., 2., 4., 3.,
        ]
    }

    fn flagged(mask: &[bool]) -> Vec<usize> {
        mask.iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3., 1., 2.]), 2.);
        assert_eq!(median(&[4., 1., 3., 2.]), 2.5);
    }

    #[test]
    fn test_find_outliers_without_joining() {
        let mask = find_outliers(&reference_series(), 3.0, false, 3);
        assert_eq!(mask.len(), 20);
        assert_eq!(flagged(&mask), vec![1, 12, 16]);
    }

    #[test]
    fn test_find_outliers_with_joining() {
        let mask = find_outliers(&reference_series(), 3.0, true, 3);
        assert_eq!(
            flagged(&mask),
            vec![0, 1, 12, 13, 14, 15, 16, 17, 18, 19]
        );
        // non-finite values stay regular
        assert!(!mask[6]);
        assert!(!mask[10]);
    }

    #[test]
    fn test_low_values_are_never_flagged() {
        // the detector is one-sided: a value far below the median stays regular
        let series = [10., 11., 10., 9., 10., -5000., 10., 11.];
        let mask = find_outliers(&series, 3.0, false, 3);
        assert!(!mask[5]);
        assert_eq!(flagged(&mask), Vec::<usize>::new());
    }

    #[test]
    fn test_all_non_finite() {
        let mask = find_outliers(&[f64::NAN, f64::INFINITY], 3.0, true, 3);
        assert_eq!(mask, vec![false, false]);
        assert!(find_outliers(&[], 3.0, true, 3).is_empty());
    }

    #[test]
    fn test_join_discards_long_regular_runs() {
        let mask = [false, false, true, false, false, false, false, false, true];
        assert_eq!(
            flagged(&join_neighbouring_outliers(&mask, 2)),
            vec![0, 1, 2, 8]
        );
    }

    #[test]
    fn test_find_outliers_in_column() {
        let rows = reference_series().into_iter().map(|v| vec![Value::Float(v)]).collect();
        let index = (100..120).collect();
        let table = Table::from_rows(index, &["flux"], rows).unwrap();

        let mask = find_outliers_in_column(&table, "flux", 3.0, false, 3).unwrap();
        let labels: Vec<i64> = mask.iter().filter(|(_, m)| *m).map(|(l, _)| *l).collect();
        assert_eq!(labels, vec![101, 112, 116]);

        let text = Table::from_rows(vec![0], &["flux"], vec![vec!["bright".into()]]).unwrap();
        assert!(matches!(
            find_outliers_in_column(&text, "flux", 3.0, false, 3),
            Err(PhabError::UnexpectedValue { .. })
        ));
    }
}
