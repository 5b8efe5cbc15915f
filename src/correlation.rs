use crate::stats::{mean, pearson};
use fnv::FnvHashMap as Map;
use ordered_float::OrderedFloat;
use std::hash::Hash;

/// Rows where both sides are present (pairwise deletion).
pub fn complete_pairs<A: Clone, B: Clone>(
  xs: &[Option<A>],
  ys: &[Option<B>],
) -> (Vec<A>, Vec<B>) {
  xs.iter()
    .zip(ys)
    .filter_map(|(x, y)| Some((x.clone()?, y.clone()?)))
    .unzip()
}

/// 1 based ranks, ties share the average of their positions.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
  let mut order: Vec<usize> = (0..values.len()).collect();
  order.sort_by_key(|&i| OrderedFloat(values[i]));

  let mut ranks = vec![0.; values.len()];
  let mut start = 0;
  while start < order.len() {
    let value = OrderedFloat(values[order[start]]);
    let end = start
      + order[start..]
        .iter()
        .take_while(|&&i| OrderedFloat(values[i]) == value)
        .count();
    let rank = (start + end + 1) as f64 / 2.;
    for &i in &order[start..end] {
      ranks[i] = rank;
    }
    start = end;
  }
  ranks
}

pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
  pearson(&average_ranks(xs), &average_ranks(ys))
}

/// Dense codes in first appearance order.
pub fn encode<T: Eq + Hash + Clone>(values: &[T]) -> (Vec<usize>, usize) {
  let mut codes = Map::default();
  let encoded = values
    .iter()
    .map(|v| {
      let next = codes.len();
      *codes.entry(v.clone()).or_insert(next)
    })
    .collect();
  (encoded, codes.len())
}

/// Cramér's V from the χ² statistic of the contingency table, without bias
/// correction. `None` when either side has a single category.
pub fn cramers_v<A, B>(xs: &[A], ys: &[B]) -> Option<f64>
where
  A: Eq + Hash + Clone,
  B: Eq + Hash + Clone,
{
  debug_assert_eq!(xs.len(), ys.len());
  let (xs, rows) = encode(xs);
  let (ys, cols) = encode(ys);
  if rows < 2 || cols < 2 {
    return None;
  }

  let mut table = vec![0usize; rows * cols];
  let mut row_totals = vec![0usize; rows];
  let mut col_totals = vec![0usize; cols];
  for (&x, &y) in xs.iter().zip(&ys) {
    table[x * cols + y] += 1;
    row_totals[x] += 1;
    col_totals[y] += 1;
  }

  let n = xs.len() as f64;
  let mut chi2 = 0.;
  for (x, &row_total) in row_totals.iter().enumerate() {
    for (y, &col_total) in col_totals.iter().enumerate() {
      let expected = row_total as f64 * col_total as f64 / n;
      let diff = table[x * cols + y] as f64 - expected;
      chi2 += diff * diff / expected;
    }
  }

  let k = (rows.min(cols) - 1) as f64;
  Some((chi2 / n / k).sqrt().min(1.))
}

/// η = sqrt(between group / total sum of squares).
pub fn correlation_ratio<C: Eq + Hash + Clone>(
  categories: &[C],
  values: &[f64],
) -> Option<f64> {
  debug_assert_eq!(categories.len(), values.len());
  if values.len() < 2 {
    return None;
  }
  let (codes, count) = encode(categories);
  let mut sums = vec![0.; count];
  let mut counts = vec![0usize; count];
  for (&code, &value) in codes.iter().zip(values) {
    sums[code] += value;
    counts[code] += 1;
  }

  let overall = mean(values);
  let total: f64 = values.iter().map(|v| (v - overall).powi(2)).sum();
  if total <= 0. {
    return None;
  }
  let between: f64 = sums
    .iter()
    .zip(&counts)
    .map(|(&sum, &c)| {
      let group_mean = sum / c as f64;
      c as f64 * (group_mean - overall).powi(2)
    })
    .sum();
  Some((between / total).sqrt().min(1.))
}
