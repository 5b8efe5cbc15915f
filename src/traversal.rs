use crate::Adjacency;

pub const UNREACHED: usize = usize::MAX;

/// Reusable breadth first search state. Buffers are only reset for the nodes
/// the previous search touched, so running it from every source costs
/// O(n + m) per source instead of O(n) extra for clearing.
#[derive(Clone, Debug)]
pub struct Bfs {
  dists: Vec<usize>,
  /// visit order, doubles as the queue
  order: Vec<usize>,
  /// number of shortest paths from the source (only filled when counting)
  sigma: Vec<f64>,
}

impl Bfs {
  #[must_use]
  pub fn new(num_nodes: usize) -> Self {
    Self {
      dists: vec![UNREACHED; num_nodes],
      order: Vec::new(),
      sigma: vec![0.; num_nodes],
    }
  }

  fn reset(&mut self) {
    for &node in &self.order {
      self.dists[node] = UNREACHED;
      self.sigma[node] = 0.;
    }
    self.order.clear();
  }

  /// Nodes further than `limit` from `source` are not visited.
  pub fn run(
    &mut self,
    adjacency: &Adjacency,
    source: usize,
    limit: Option<usize>,
  ) {
    self.traverse(adjacency, source, limit, false)
  }

  /// Also counts shortest paths (Brandes' first phase).
  pub fn run_counting(&mut self, adjacency: &Adjacency, source: usize) {
    self.traverse(adjacency, source, None, true)
  }

  fn traverse(
    &mut self,
    adjacency: &Adjacency,
    source: usize,
    limit: Option<usize>,
    count: bool,
  ) {
    debug_assert_eq!(adjacency.node_count(), self.dists.len());
    self.reset();

    let limit = limit.unwrap_or(UNREACHED);

    self.dists[source] = 0;
    self.sigma[source] = 1.;
    self.order.push(source);

    let mut head = 0;
    while head < self.order.len() {
      let node = self.order[head];
      head += 1;
      let dist = self.dists[node];
      if dist >= limit {
        continue;
      }
      for &neighbor in adjacency.neighbors(node) {
        if self.dists[neighbor] == UNREACHED {
          self.dists[neighbor] = dist + 1;
          self.order.push(neighbor);
        }
        if count && self.dists[neighbor] == dist + 1 {
          self.sigma[neighbor] += self.sigma[node];
        }
      }
    }
  }

  pub fn dist(&self, node: usize) -> Option<usize> {
    match self.dists[node] {
      UNREACHED => None,
      d => Some(d),
    }
  }

  pub fn dists(&self) -> &[usize] {
    &self.dists
  }

  /// Reached nodes (source first) in non decreasing distance.
  pub fn order(&self) -> &[usize] {
    &self.order
  }

  pub fn sigma(&self) -> &[f64] {
    &self.sigma
  }
}
