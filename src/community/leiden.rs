use super::{louvain::NeighborWeights, Partition, WeightedGraph};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::VecDeque;
use tracing::debug;

struct Communities {
  labels: Vec<usize>,
  strengths: Vec<f64>,
  sizes: Vec<usize>,
  /// labels without members
  free: Vec<usize>,
}

impl Communities {
  /// `labels` must be below the node count.
  fn new(graph: &WeightedGraph, labels: Vec<usize>) -> Self {
    let n = graph.node_count();
    let mut strengths = vec![0.; n];
    let mut sizes = vec![0; n];
    for (node, &label) in labels.iter().enumerate() {
      strengths[label] += graph.strength(node);
      sizes[label] += 1;
    }
    let free = (0..n).rev().filter(|&label| sizes[label] == 0).collect();

    Self {
      labels,
      strengths,
      sizes,
      free,
    }
  }

  fn move_node(&mut self, graph: &WeightedGraph, node: usize, to: usize) {
    let from = self.labels[node];
    let strength = graph.strength(node);
    self.strengths[from] -= strength;
    self.sizes[from] -= 1;
    if self.sizes[from] == 0 {
      self.free.push(from);
    }
    if self.sizes[to] == 0 {
      if let Some(pos) = self.free.iter().rposition(|&label| label == to) {
        self.free.swap_remove(pos);
      }
    }
    self.strengths[to] += strength;
    self.sizes[to] += 1;
    self.labels[node] = to;
  }
}

/// Queue based local moving: only neighbours of moved nodes are revisited.
fn move_nodes_fast(
  graph: &WeightedGraph,
  communities: &mut Communities,
  resolution: f64,
  rng: &mut StdRng,
) {
  let n = graph.node_count();
  let two_m = 2. * graph.total_weight();
  let mut order: Vec<usize> = (0..n).collect();
  order.shuffle(rng);
  let mut queue: VecDeque<usize> = order.into_iter().collect();
  let mut in_queue = vec![true; n];
  let mut neighbor_weights = NeighborWeights::new(n);

  while let Some(node) = queue.pop_front() {
    in_queue[node] = false;
    let own = communities.labels[node];
    let strength = graph.strength(node);
    let scale = resolution * strength / two_m;
    neighbor_weights.collect(graph, node, &communities.labels);

    let mut best = own;
    let mut best_gain = neighbor_weights.get(own)
      - scale * (communities.strengths[own] - strength);
    for &other in neighbor_weights.touched() {
      if other == own {
        continue;
      }
      let gain =
        neighbor_weights.get(other) - scale * communities.strengths[other];
      if gain > best_gain {
        best_gain = gain;
        best = other;
      }
    }
    if communities.sizes[own] > 1 && best_gain < 0. {
      if let Some(&empty) = communities.free.last() {
        best = empty;
      }
    }

    if best != own {
      communities.move_node(graph, node, best);
      for &(other, _) in graph.neighbors(node) {
        if communities.labels[other] != best && !in_queue[other] {
          in_queue[other] = true;
          queue.push_back(other);
        }
      }
    }
  }
}

/// Splits every community into well connected sub communities, starting
/// from singletons and merging only within the community.
fn refine(
  graph: &WeightedGraph,
  partition: &Partition,
  resolution: f64,
  rng: &mut StdRng,
) -> Partition {
  let n = graph.node_count();
  let two_m = 2. * graph.total_weight();
  let labels = partition.labels();

  let mut community_strength = vec![0.; partition.count()];
  for node in 0..n {
    community_strength[labels[node]] += graph.strength(node);
  }

  let mut refined: Vec<usize> = (0..n).collect();
  let mut strengths: Vec<f64> = (0..n).map(|v| graph.strength(v)).collect();
  let mut sizes = vec![1; n];
  // weight from each refined community to the rest of its community
  let mut external: Vec<f64> = (0..n)
    .map(|node| {
      graph
        .neighbors(node)
        .iter()
        .filter(|&&(other, _)| labels[other] == labels[node])
        .map(|&(_, weight)| weight)
        .sum()
    })
    .collect();

  let well_connected = |external: f64, strength: f64, total: f64| {
    external >= resolution * strength * (total - strength) / two_m
  };

  let mut order: Vec<usize> = (0..n).collect();
  order.shuffle(rng);
  let mut neighbor_weights = NeighborWeights::new(n);

  for node in order {
    let own = refined[node];
    let total = community_strength[labels[node]];
    let strength = graph.strength(node);
    if sizes[own] != 1 || !well_connected(external[own], strength, total) {
      continue;
    }

    neighbor_weights.collect_where(graph, node, &refined, |other| {
      labels[other] == labels[node]
    });

    let mut best = None;
    let mut best_gain = 0.;
    for &other in neighbor_weights.touched() {
      if other == own
        || !well_connected(external[other], strengths[other], total)
      {
        continue;
      }
      let gain = neighbor_weights.get(other)
        - resolution * strength * strengths[other] / two_m;
      if gain > best_gain {
        best_gain = gain;
        best = Some(other);
      }
    }

    if let Some(best) = best {
      external[best] += external[own] - 2. * neighbor_weights.get(best);
      strengths[best] += strength;
      sizes[best] += 1;
      sizes[own] = 0;
      refined[node] = best;
    }
  }

  Partition::from_labels(refined)
}

/// One full run of the algorithm starting from `initial` (labels below the
/// node count).
fn leiden_pass(
  graph: &WeightedGraph,
  initial: Vec<usize>,
  resolution: f64,
  rng: &mut StdRng,
) -> Vec<usize> {
  let mut membership: Vec<usize> = (0..graph.node_count()).collect();
  let mut current = graph.clone();
  let mut communities = Communities::new(&current, initial);

  loop {
    move_nodes_fast(&current, &mut communities, resolution, rng);
    let partition = Partition::from_labels(communities.labels.iter().cloned());
    if partition.count() == current.node_count() {
      break;
    }

    let refined = refine(&current, &partition, resolution, rng);
    let (aggregate_on, next_initial) =
      if refined.count() < current.node_count() {
        let mut initial = vec![0; refined.count()];
        for (node, &label) in refined.labels().iter().enumerate() {
          initial[label] = partition.labels()[node];
        }
        (refined, initial)
      } else {
        let count = partition.count();
        (partition, (0..count).collect())
      };

    debug!(
      "leiden: aggregating {} nodes into {}",
      current.node_count(),
      aggregate_on.count()
    );
    for node in membership.iter_mut() {
      *node = aggregate_on.labels()[*node];
    }
    current = current.aggregate(aggregate_on.labels(), aggregate_on.count());
    communities = Communities::new(&current, next_initial);
  }

  membership
    .into_iter()
    .map(|node| communities.labels[node])
    .collect()
}

/// Splits communities that are not connected inside. Never lowers
/// modularity.
fn split_disconnected(graph: &WeightedGraph, labels: &[usize]) -> Partition {
  let n = graph.node_count();
  let mut split = vec![usize::MAX; n];
  let mut next = 0;
  let mut stack = Vec::new();
  for start in 0..n {
    if split[start] != usize::MAX {
      continue;
    }
    split[start] = next;
    stack.push(start);
    while let Some(node) = stack.pop() {
      for &(other, _) in graph.neighbors(node) {
        if split[other] == usize::MAX && labels[other] == labels[node] {
          split[other] = next;
          stack.push(other);
        }
      }
    }
    next += 1;
  }

  Partition::from_labels(split)
}

/// Leiden with modularity as quality. Each iteration restarts from the
/// partition found by the previous one.
pub fn leiden(
  graph: &WeightedGraph,
  resolution: f64,
  iterations: usize,
  seed: u64,
) -> Partition {
  let n = graph.node_count();
  if graph.total_weight() <= 0. {
    return Partition::singletons(n);
  }

  let mut rng = StdRng::seed_from_u64(seed);
  let mut labels: Vec<usize> = (0..n).collect();
  for _ in 0..iterations.max(1) {
    let found = leiden_pass(graph, labels, resolution, &mut rng);
    labels = Partition::from_labels(found).labels().to_vec();
  }

  split_disconnected(graph, &labels)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    components::ComponentLabels,
    dataset::{
      self,
      test::{complete_dataset, two_cliques_dataset},
    },
  };
  use proptest::prelude::*;

  #[test]
  fn two_cliques() {
    let dataset = two_cliques_dataset();
    let partition =
      leiden(&WeightedGraph::from_adjacency(dataset.adjacency()), 1., 2, 5);
    let mut expected = vec![0; 5];
    expected.extend(vec![1; 5]);
    expected.push(2);
    assert_eq!(partition.labels(), expected.as_slice());
  }

  #[test]
  fn disconnected_communities_are_split() {
    let graph = WeightedGraph::from_adjacency(&crate::Adjacency::from_edges(
      4,
      vec![[0, 1], [2, 3]],
    ));
    let split = split_disconnected(&graph, &[0, 0, 0, 0]);
    assert_eq!(split.labels(), &[0, 0, 1, 1]);
  }

  #[test]
  fn complete_graph() {
    let dataset = complete_dataset(7);
    let partition =
      leiden(&WeightedGraph::from_adjacency(dataset.adjacency()), 1., 2, 0);
    assert_eq!(partition.count(), 1);
  }

  proptest::proptest! {
    #[test]
    fn proptest_communities_are_connected(
      dataset in dataset::test::strategy(1u64..40, 0usize..100),
      seed in 0u64..100,
    ) {
      let adjacency = dataset.adjacency();
      let partition =
        leiden(&WeightedGraph::from_adjacency(adjacency), 1., 2, seed);
      for members in partition.communities() {
        let sub = adjacency.induced(&members);
        proptest::prop_assert!(ComponentLabels::compute(&sub).is_connected());
      }
    }
  }
}
