use crate::Adjacency;
use std::{fmt, str::FromStr};
use tracing::warn;

mod girvan_newman;
mod label_propagation;
mod leiden;
mod louvain;
mod weighted;

pub use girvan_newman::girvan_newman;
pub use label_propagation::label_propagation;
pub use leiden::leiden;
pub use louvain::louvain;
pub use weighted::WeightedGraph;

/// Community label of every node, renumbered `0..count` in order of first
/// appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
  labels: Vec<usize>,
  count: usize,
}

impl Partition {
  pub fn from_labels(labels: impl IntoIterator<Item = usize>) -> Self {
    let mut renumber = fnv::FnvHashMap::default();
    let labels: Vec<usize> = labels
      .into_iter()
      .map(|label| {
        let next = renumber.len();
        *renumber.entry(label).or_insert(next)
      })
      .collect();

    Self {
      labels,
      count: renumber.len(),
    }
  }

  pub fn singletons(num_nodes: usize) -> Self {
    Self {
      labels: (0..num_nodes).collect(),
      count: num_nodes,
    }
  }

  pub fn labels(&self) -> &[usize] {
    &self.labels
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn sizes(&self) -> Vec<usize> {
    let mut sizes = vec![0; self.count];
    for &label in &self.labels {
      sizes[label] += 1;
    }
    sizes
  }

  pub fn communities(&self) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); self.count];
    for (node, &label) in self.labels.iter().enumerate() {
      out[label].push(node);
    }
    out
  }

  /// Newman modularity, `None` for graphs without edges.
  pub fn modularity(&self, adjacency: &Adjacency, resolution: f64) -> Option<f64> {
    debug_assert_eq!(self.len(), adjacency.node_count());
    let m = adjacency.edge_count() as f64;
    if m == 0. {
      return None;
    }

    let mut internal = vec![0.; self.count];
    let mut degree = vec![0.; self.count];
    for (node, neighbors) in adjacency.iter().enumerate() {
      degree[self.labels[node]] += neighbors.len() as f64;
    }
    for [a, b] in adjacency.edges() {
      if self.labels[a] == self.labels[b] {
        internal[self.labels[a]] += 1.;
      }
    }

    Some(
      internal
        .iter()
        .zip(&degree)
        .map(|(i, d)| i / m - resolution * (d / (2. * m)).powi(2))
        .sum(),
    )
  }
}

#[derive(Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone)]
pub enum Algorithm {
  Louvain,
  Leiden,
  LabelPropagation,
  GirvanNewman,
}

impl Algorithm {
  pub const ALL: [Algorithm; 4] = [
    Algorithm::Louvain,
    Algorithm::Leiden,
    Algorithm::LabelPropagation,
    Algorithm::GirvanNewman,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Louvain => "louvain",
      Self::Leiden => "leiden",
      Self::LabelPropagation => "label_propagation",
      Self::GirvanNewman => "girvan_newman",
    }
  }

  fn alias(self) -> &'static str {
    match self {
      Self::Louvain => "lv",
      Self::Leiden => "ld",
      Self::LabelPropagation => "lp",
      Self::GirvanNewman => "gn",
    }
  }
}

impl fmt::Display for Algorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Algorithm {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim().replace('-', "_");
    Self::ALL
      .iter()
      .cloned()
      .find(|a| a.name().eq_ignore_ascii_case(&s) || a.alias().eq_ignore_ascii_case(&s))
      .ok_or_else(|| {
        anyhow::anyhow!(
          "unknown community algorithm \"{}\" (expected one of {})",
          s,
          itertools::join(Self::ALL.iter(), ", ")
        )
      })
  }
}

#[derive(Clone, Debug)]
pub struct CommunityConfig {
  pub seed: u64,
  pub resolution: f64,
  pub leiden_iterations: usize,
  pub max_label_sweeps: usize,
  /// Girvan–Newman is skipped above this many nodes.
  pub girvan_newman_node_limit: usize,
}

impl Default for CommunityConfig {
  fn default() -> Self {
    Self {
      seed: 42,
      resolution: 1.,
      leiden_iterations: 2,
      max_label_sweeps: 1000,
      girvan_newman_node_limit: 2000,
    }
  }
}

/// `None` when the algorithm was skipped.
pub fn detect(
  algorithm: Algorithm,
  adjacency: &Adjacency,
  config: &CommunityConfig,
) -> Option<Partition> {
  match algorithm {
    Algorithm::Louvain => Some(louvain(
      &WeightedGraph::from_adjacency(adjacency),
      config.resolution,
      config.seed,
    )),
    Algorithm::Leiden => Some(leiden(
      &WeightedGraph::from_adjacency(adjacency),
      config.resolution,
      config.leiden_iterations,
      config.seed,
    )),
    Algorithm::LabelPropagation => Some(label_propagation(
      adjacency,
      config.max_label_sweeps,
      config.seed,
    )),
    Algorithm::GirvanNewman => {
      if adjacency.node_count() > config.girvan_newman_node_limit {
        warn!(
          "skipping girvan newman: {} nodes is above the limit of {}",
          adjacency.node_count(),
          config.girvan_newman_node_limit
        );
        None
      } else {
        Some(girvan_newman(adjacency))
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::{
    self,
    test::{two_cliques_dataset, two_triangles_dataset},
  };
  use proptest::prelude::*;

  #[test]
  fn renumbers_in_order_of_appearance() {
    let partition = Partition::from_labels(vec![7, 7, 3, 9, 3]);
    assert_eq!(partition.labels(), &[0, 0, 1, 2, 1]);
    assert_eq!(partition.count(), 3);
    assert_eq!(partition.sizes(), vec![2, 2, 1]);
    assert_eq!(partition.communities(), vec![vec![0, 1], vec![2, 4], vec![3]]);
  }

  #[test]
  fn modularity_values() {
    let dataset = two_triangles_dataset();
    let adjacency = dataset.adjacency();

    let single = Partition::from_labels(vec![0; 6]);
    assert!(single.modularity(adjacency, 1.).unwrap().abs() < 1e-12);

    let split = Partition::from_labels(vec![0, 0, 0, 1, 1, 1]);
    // 2 * (3 / 7 - (7 / 14)^2)
    let expected = 2. * (3. / 7. - 0.25);
    assert!((split.modularity(adjacency, 1.).unwrap() - expected).abs() < 1e-12);

    let empty = crate::Adjacency::from_edges(3, Vec::new());
    assert_eq!(Partition::singletons(3).modularity(&empty, 1.), None);
  }

  #[test]
  fn algorithm_names() {
    assert_eq!("Louvain".parse::<Algorithm>().unwrap(), Algorithm::Louvain);
    assert_eq!("lp".parse::<Algorithm>().unwrap(), Algorithm::LabelPropagation);
    assert_eq!(
      "girvan-newman".parse::<Algorithm>().unwrap(),
      Algorithm::GirvanNewman
    );
    assert!("spectral".parse::<Algorithm>().is_err());
  }

  #[test]
  fn two_triangles_split() {
    let dataset = two_triangles_dataset();
    let config = CommunityConfig::default();
    for &algorithm in &[
      Algorithm::Louvain,
      Algorithm::Leiden,
      Algorithm::GirvanNewman,
    ] {
      let partition = detect(algorithm, dataset.adjacency(), &config).unwrap();
      assert_eq!(
        partition.labels(),
        &[0, 0, 0, 1, 1, 1],
        "{} did not split the triangles",
        algorithm
      );
    }
  }

  #[test]
  fn girvan_newman_limit() {
    let dataset = two_cliques_dataset();
    let config = CommunityConfig {
      girvan_newman_node_limit: 5,
      ..Default::default()
    };
    assert_eq!(detect(Algorithm::GirvanNewman, dataset.adjacency(), &config), None);
  }

  proptest::proptest! {
    #[test]
    fn proptest_every_node_labelled(
      dataset in dataset::test::strategy(1u64..40, 0usize..100),
      seed in 0u64..1000,
    ) {
      let config = CommunityConfig {
        seed,
        ..Default::default()
      };
      let adjacency = dataset.adjacency();
      for &algorithm in &Algorithm::ALL {
        let partition = detect(algorithm, adjacency, &config).unwrap();
        proptest::prop_assert_eq!(partition.len(), adjacency.node_count());
        let sizes = partition.sizes();
        proptest::prop_assert_eq!(sizes.iter().sum::<usize>(), adjacency.node_count());
        proptest::prop_assert!(sizes.iter().all(|&s| s > 0));
        if let Some(q) = partition.modularity(adjacency, 1.) {
          proptest::prop_assert!(q > -0.5 - 1e-9 && q <= 1.);
        }
      }
    }
  }
}
