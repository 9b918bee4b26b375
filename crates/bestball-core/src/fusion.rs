// Rank fusion: average several per-row rank signals and re-rank within each
// position group.

use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    #[error("rank signal {signal} has {actual} rows, expected {expected}")]
    LengthMismatch {
        signal: usize,
        expected: usize,
        actual: usize,
    },
}

/// Mean of the present values, or `None` when every signal is missing.
fn row_mean(signals: &[Vec<Option<f64>>], row: usize) -> Option<f64> {
    let (sum, count) = signals
        .iter()
        .filter_map(|s| s[row])
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Fuse rank signals into a dense 1-based rank per group.
///
/// `groups[i]` is row `i`'s position; `signals[k][i]` is signal `k`'s rank for
/// row `i`, with `None` for missing data. Rows are ordered by their mean
/// signal (missing means last, stable on ties) and numbered within their
/// group. The returned ranks are aligned with the input rows.
pub fn fuse<K: Eq + Hash>(groups: &[K], signals: &[Vec<Option<f64>>]) -> Result<Vec<usize>, FusionError> {
    for (signal, values) in signals.iter().enumerate() {
        if values.len() != groups.len() {
            return Err(FusionError::LengthMismatch {
                signal,
                expected: groups.len(),
                actual: values.len(),
            });
        }
    }

    let means: Vec<Option<f64>> = (0..groups.len()).map(|row| row_mean(signals, row)).collect();

    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| match (means[a], means[b]) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut counters: HashMap<&K, usize> = HashMap::new();
    let mut ranks = vec![0; groups.len()];
    for row in order {
        let counter = counters.entry(&groups[row]).or_insert(0);
        *counter += 1;
        ranks[row] = *counter;
    }
    Ok(ranks)
}
