use crate::Adjacency;
use fnv::FnvHashSet as Set;

pub fn mean(values: &[f64]) -> f64 {
  if values.is_empty() {
    0.
  } else {
    values.iter().sum::<f64>() / values.len() as f64
  }
}

fn central_moment(values: &[f64], mean: f64, power: i32) -> f64 {
  values.iter().map(|v| (v - mean).powi(power)).sum::<f64>()
    / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
  if values.is_empty() {
    return 0.;
  }
  central_moment(values, mean(values), 2).sqrt()
}

/// Biased sample skewness `m3 / m2^1.5`, undefined for constant input.
pub fn skewness(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  let mean = mean(values);
  let m2 = central_moment(values, mean, 2);
  if m2 <= f64::EPSILON * mean.abs().max(1.) {
    return None;
  }
  Some(central_moment(values, mean, 3) / m2.powf(1.5))
}

/// `<k^2> / <k>^2`.
pub fn heterogeneity(degrees: &[f64]) -> Option<f64> {
  let mean_degree = mean(degrees);
  if mean_degree == 0. {
    return None;
  }
  let mean_square =
    degrees.iter().map(|d| d * d).sum::<f64>() / degrees.len() as f64;
  Some(mean_square / (mean_degree * mean_degree))
}

/// `max - mean`.
pub fn centralization(values: &[f64]) -> Option<f64> {
  let max = values.iter().cloned().fold(None, |acc: Option<f64>, v| {
    Some(acc.map_or(v, |acc| acc.max(v)))
  })?;
  Some(max - mean(values))
}

/// Pearson correlation of paired samples, `None` when either side has no
/// variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
  debug_assert_eq!(xs.len(), ys.len());
  if xs.len() < 2 {
    return None;
  }
  let (mean_x, mean_y) = (mean(xs), mean(ys));
  let mut cov = 0.;
  let mut var_x = 0.;
  let mut var_y = 0.;
  for (x, y) in xs.iter().zip(ys) {
    let (dx, dy) = (x - mean_x, y - mean_y);
    cov += dx * dy;
    var_x += dx * dx;
    var_y += dy * dy;
  }
  if var_x <= 0. || var_y <= 0. {
    return None;
  }
  Some((cov / (var_x * var_y).sqrt()).max(-1.).min(1.))
}

/// Pearson correlation between the degrees at both ends of every edge,
/// each edge taken in both orientations.
pub fn degree_assortativity(adjacency: &Adjacency) -> Option<f64> {
  let degrees = adjacency.degrees();
  let (xs, ys): (Vec<f64>, Vec<f64>) = adjacency
    .edges()
    .flat_map(|[a, b]| vec![[a, b], [b, a]])
    .map(|[a, b]| (degrees[a] as f64, degrees[b] as f64))
    .unzip();
  pearson(&xs, &ys)
}

/// Share of distinct directed rows `(u, v)`, `u != v`, whose reverse row
/// is also present.
pub fn reciprocity(directed_edges: &[[usize; 2]]) -> Option<f64> {
  let rows: Set<(usize, usize)> = directed_edges
    .iter()
    .filter(|&&[a, b]| a != b)
    .map(|&[a, b]| (a, b))
    .collect();
  if rows.is_empty() {
    return None;
  }
  let reciprocated = rows.iter().filter(|&&(a, b)| rows.contains(&(b, a))).count();
  Some(reciprocated as f64 / rows.len() as f64)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::test::{path_dataset, ring_dataset, star_dataset};

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn moments() {
    let values = [1., 2., 3., 4., 10.];
    assert!(close(mean(&values), 4.));
    assert!(close(std_dev(&values), 10f64.sqrt()));
    // m3 = (-27 - 8 - 1 + 0 + 216) / 5 = 36
    assert!(close(skewness(&values).unwrap(), 36. / 10f64.powf(1.5)));
    assert_eq!(skewness(&[2., 2., 2.]), None);
    assert_eq!(std_dev(&[]), 0.);
  }

  #[test]
  fn heterogeneity_of_star() {
    let degrees: Vec<f64> = star_dataset(4)
      .adjacency()
      .degrees()
      .into_iter()
      .map(|d| d as f64)
      .collect();
    // <k> = 8 / 5, <k^2> = 20 / 5
    assert!(close(heterogeneity(&degrees).unwrap(), 4. / (1.6 * 1.6)));
    assert_eq!(heterogeneity(&[0., 0.]), None);
  }

  #[test]
  fn centralization_of_star() {
    assert!(close(
      centralization(&[1., 0.25, 0.25, 0.25, 0.25]).unwrap(),
      1. - 0.4
    ));
    assert_eq!(centralization(&[]), None);
  }

  #[test]
  fn assortativity() {
    // hub to leaves only: perfectly disassortative
    assert!(close(degree_assortativity(star_dataset(4).adjacency()).unwrap(), -1.));
    // regular graph: no degree variance
    assert_eq!(degree_assortativity(ring_dataset(5).adjacency()), None);
    // path 0-1-2-3: pairs (1,2),(2,1),(2,2),(2,2),(2,1),(1,2)
    let r = degree_assortativity(path_dataset(4).adjacency()).unwrap();
    assert!(close(r, -0.5));
  }

  #[test]
  fn reciprocity_of_rows() {
    assert_eq!(reciprocity(&[]), None);
    assert_eq!(reciprocity(&[[0, 0]]), None);
    assert!(close(reciprocity(&[[0, 1], [1, 0], [1, 2], [0, 1]]).unwrap(), 2. / 3.));
    assert!(close(reciprocity(&[[0, 1], [1, 2]]).unwrap(), 0.));
  }

  #[test]
  fn pearson_basics() {
    assert!(close(pearson(&[1., 2., 3.], &[2., 4., 6.]).unwrap(), 1.));
    assert!(close(pearson(&[1., 2., 3.], &[3., 2., 1.]).unwrap(), -1.));
    assert_eq!(pearson(&[1., 1., 1.], &[1., 2., 3.]), None);
    assert_eq!(pearson(&[1.], &[1.]), None);
  }
}
