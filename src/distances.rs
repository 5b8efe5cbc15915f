use crate::{progress_bar::sources_bar, traversal::Bfs, Adjacency};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use tracing::debug;

struct SourceStats {
  reached: usize,
  total_dist: usize,
  eccentricity: usize,
  inverse_dist_sum: f64,
}

/// Everything derived from one bfs per source.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceSummary {
  pub closeness: Vec<f64>,
  /// Largest distance to a reachable node.
  pub eccentricity: Vec<usize>,
  pub connected: bool,
  pub diameter: Option<usize>,
  pub radius: Option<usize>,
  pub average_path_length: Option<f64>,
  pub global_efficiency: f64,
}

fn source_stats(adjacency: &Adjacency, bfs: &mut Bfs, source: usize) -> SourceStats {
  bfs.run(adjacency, source, None);
  let mut out = SourceStats {
    reached: bfs.order().len(),
    total_dist: 0,
    eccentricity: 0,
    inverse_dist_sum: 0.,
  };
  for &node in &bfs.order()[1..] {
    let dist = bfs.dists()[node];
    out.total_dist += dist;
    out.eccentricity = out.eccentricity.max(dist);
    out.inverse_dist_sum += 1. / dist as f64;
  }
  out
}

impl DistanceSummary {
  pub fn compute(adjacency: &Adjacency) -> Self {
    let n = adjacency.node_count();

    let stats: Vec<SourceStats> = (0..n)
      .into_par_iter()
      .progress_with(sources_bar("distances", n))
      .map_init(
        || Bfs::new(n),
        |bfs, source| source_stats(adjacency, bfs, source),
      )
      .collect();

    let closeness = stats
      .iter()
      .map(|s| {
        if s.total_dist == 0 || n <= 1 {
          0.
        } else {
          let reached = (s.reached - 1) as f64;
          reached / s.total_dist as f64 * reached / (n - 1) as f64
        }
      })
      .collect();

    let eccentricity: Vec<usize> = stats.iter().map(|s| s.eccentricity).collect();
    let connected = n > 0 && stats.iter().all(|s| s.reached == n);
    let pairs = (n * n.saturating_sub(1)) as f64;

    let global_efficiency = if n < 2 {
      0.
    } else {
      stats.iter().map(|s| s.inverse_dist_sum).sum::<f64>() / pairs
    };

    let (diameter, radius, average_path_length) = if connected {
      let total: usize = stats.iter().map(|s| s.total_dist).sum();
      (
        eccentricity.iter().max().cloned(),
        eccentricity.iter().min().cloned(),
        Some(if n < 2 { 0. } else { total as f64 / pairs }),
      )
    } else {
      debug!("graph is disconnected, path length metrics are undefined");
      (None, None, None)
    };

    Self {
      closeness,
      eccentricity,
      connected,
      diameter,
      radius,
      average_path_length,
      global_efficiency,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::{
    self,
    test::{complete_dataset, path_dataset, ring_dataset, two_cliques_dataset},
  };
  use proptest::prelude::*;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn ring() {
    let summary = DistanceSummary::compute(ring_dataset(5).adjacency());
    assert!(summary.connected);
    assert_eq!(summary.diameter, Some(2));
    assert_eq!(summary.radius, Some(2));
    assert!(close(summary.average_path_length.unwrap(), 1.5));
    for &closeness in &summary.closeness {
      assert!(close(closeness, 4. / 6.));
    }
    assert!(close(summary.global_efficiency, 0.75));
  }

  #[test]
  fn path() {
    let summary = DistanceSummary::compute(path_dataset(4).adjacency());
    assert_eq!(summary.eccentricity, vec![3, 2, 2, 3]);
    assert_eq!(summary.diameter, Some(3));
    assert_eq!(summary.radius, Some(2));
    assert!(close(summary.closeness[0], 3. / 6.));
    assert!(close(summary.closeness[1], 3. / 4.));
    assert!(close(summary.average_path_length.unwrap(), 20. / 12.));
  }

  #[test]
  fn complete() {
    let summary = DistanceSummary::compute(complete_dataset(4).adjacency());
    assert_eq!(summary.diameter, Some(1));
    assert!(close(summary.global_efficiency, 1.));
    assert!(summary.closeness.iter().all(|&c| close(c, 1.)));
  }

  #[test]
  fn disconnected() {
    let summary = DistanceSummary::compute(two_cliques_dataset().adjacency());
    assert!(!summary.connected);
    assert_eq!(summary.diameter, None);
    assert_eq!(summary.radius, None);
    assert_eq!(summary.average_path_length, None);
    assert_eq!(summary.closeness[10], 0.);
    // 10 of 11 nodes reachable, scaled down by 9 / 10
    assert!(summary.closeness[0] > 0.);
    assert!(summary.closeness[0] < 1.);
    assert!(summary.global_efficiency > 0.);
  }

  #[test]
  fn single_node() {
    let summary = DistanceSummary::compute(path_dataset(1).adjacency());
    assert!(summary.connected);
    assert_eq!(summary.diameter, Some(0));
    assert_eq!(summary.average_path_length, Some(0.));
    assert_eq!(summary.closeness, vec![0.]);
  }

  proptest::proptest! {
    #[test]
    fn proptest_distances(
      dataset in dataset::test::strategy(1u64..40, 0usize..80),
    ) {
      let summary = DistanceSummary::compute(dataset.adjacency());
      for &closeness in &summary.closeness {
        proptest::prop_assert!((0. ..=1. + 1e-12).contains(&closeness));
      }
      proptest::prop_assert!(summary.global_efficiency <= 1. + 1e-12);
      if let (Some(diameter), Some(radius)) = (summary.diameter, summary.radius) {
        proptest::prop_assert!(radius <= diameter);
        proptest::prop_assert!(diameter <= 2 * radius);
      } else {
        proptest::prop_assert!(!summary.connected);
      }
    }
  }
}
