use super::{Partition, WeightedGraph};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

/// Levels stop once a pass improves modularity by less than this.
const MIN_IMPROVEMENT: f64 = 1e-7;

/// Community bookkeeping for one level.
struct Status {
  node_to_community: Vec<usize>,
  /// sum of member strengths
  degrees: Vec<f64>,
  /// weight of edges inside, self loops included
  internals: Vec<f64>,
  total_weight: f64,
}

impl Status {
  fn new(graph: &WeightedGraph) -> Self {
    let n = graph.node_count();
    Self {
      node_to_community: (0..n).collect(),
      degrees: (0..n).map(|v| graph.strength(v)).collect(),
      internals: (0..n).map(|v| graph.self_loop(v)).collect(),
      total_weight: graph.total_weight(),
    }
  }

  fn modularity(&self, resolution: f64) -> f64 {
    let m = self.total_weight;
    if m <= 0. {
      return 0.;
    }
    self
      .internals
      .iter()
      .zip(&self.degrees)
      .map(|(internal, degree)| {
        internal / m - resolution * (degree / (2. * m)).powi(2)
      })
      .sum()
  }

  fn remove(
    &mut self,
    graph: &WeightedGraph,
    node: usize,
    community: usize,
    weight: f64,
  ) {
    self.degrees[community] -= graph.strength(node);
    self.internals[community] -= weight + graph.self_loop(node);
  }

  fn insert(
    &mut self,
    graph: &WeightedGraph,
    node: usize,
    community: usize,
    weight: f64,
  ) {
    self.node_to_community[node] = community;
    self.degrees[community] += graph.strength(node);
    self.internals[community] += weight + graph.self_loop(node);
  }
}

/// Weight from `node` to each neighbouring community, in the order the
/// communities are first met.
pub(super) struct NeighborWeights {
  weights: Vec<f64>,
  seen: Vec<bool>,
  touched: Vec<usize>,
}

impl NeighborWeights {
  pub(super) fn new(num_communities: usize) -> Self {
    Self {
      weights: vec![0.; num_communities],
      seen: vec![false; num_communities],
      touched: Vec::new(),
    }
  }

  pub(super) fn collect(
    &mut self,
    graph: &WeightedGraph,
    node: usize,
    communities: &[usize],
  ) {
    self.collect_where(graph, node, communities, |_| true)
  }

  /// Only neighbours passing `keep` are counted.
  pub(super) fn collect_where(
    &mut self,
    graph: &WeightedGraph,
    node: usize,
    communities: &[usize],
    keep: impl Fn(usize) -> bool,
  ) {
    for &community in &self.touched {
      self.weights[community] = 0.;
      self.seen[community] = false;
    }
    self.touched.clear();
    for &(other, weight) in graph.neighbors(node) {
      if !keep(other) {
        continue;
      }
      let community = communities[other];
      if !self.seen[community] {
        self.seen[community] = true;
        self.touched.push(community);
      }
      self.weights[community] += weight;
    }
  }

  pub(super) fn get(&self, community: usize) -> f64 {
    self.weights[community]
  }

  pub(super) fn touched(&self) -> &[usize] {
    &self.touched
  }
}

/// Local moving until no pass improves modularity.
fn one_level(
  graph: &WeightedGraph,
  status: &mut Status,
  resolution: f64,
  rng: &mut StdRng,
) {
  let n = graph.node_count();
  let two_m = 2. * status.total_weight;
  let mut order: Vec<usize> = (0..n).collect();
  let mut neighbor_weights = NeighborWeights::new(n);
  let mut candidates = Vec::new();

  let mut current = status.modularity(resolution);
  loop {
    let mut modified = false;
    order.shuffle(rng);

    for &node in &order {
      let community = status.node_to_community[node];
      let degree_share = graph.strength(node) / two_m;
      neighbor_weights.collect(graph, node, &status.node_to_community);

      let own_weight = neighbor_weights.get(community);
      let remove_cost = -own_weight
        + resolution
          * (status.degrees[community] - graph.strength(node))
          * degree_share;
      status.remove(graph, node, community, own_weight);

      candidates.clear();
      candidates.extend_from_slice(neighbor_weights.touched());
      candidates.shuffle(rng);

      let mut best = community;
      let mut best_increase = 0.;
      for &other in &candidates {
        let increase = remove_cost + neighbor_weights.get(other)
          - resolution * status.degrees[other] * degree_share;
        if increase > best_increase {
          best_increase = increase;
          best = other;
        }
      }

      status.insert(graph, node, best, neighbor_weights.get(best));
      if best != community {
        modified = true;
      }
    }

    let next = status.modularity(resolution);
    if !modified || next - current < MIN_IMPROVEMENT {
      break;
    }
    current = next;
  }
}

/// Multi level Louvain: local moving, then aggregation of the found
/// communities, until modularity stops improving. Graphs without edges
/// give singletons.
pub fn louvain(graph: &WeightedGraph, resolution: f64, seed: u64) -> Partition {
  let n = graph.node_count();
  if graph.total_weight() <= 0. {
    return Partition::singletons(n);
  }

  let mut rng = StdRng::seed_from_u64(seed);
  let mut membership: Vec<usize> = (0..n).collect();
  let mut current = graph.clone();
  let mut modularity = None;
  let mut level = 0;

  loop {
    let mut status = Status::new(&current);
    one_level(&current, &mut status, resolution, &mut rng);
    let next = status.modularity(resolution);
    if let Some(previous) = modularity {
      if next - previous < MIN_IMPROVEMENT {
        break;
      }
    }
    modularity = Some(next);

    let level_partition = Partition::from_labels(status.node_to_community);
    for community in membership.iter_mut() {
      *community = level_partition.labels()[*community];
    }
    debug!(
      "louvain level {}: {} communities, modularity {:.4}",
      level,
      level_partition.count(),
      next
    );
    level += 1;

    if level_partition.count() == current.node_count() {
      break;
    }
    current =
      current.aggregate(level_partition.labels(), level_partition.count());
  }

  Partition::from_labels(membership)
}
