use crate::Adjacency;
use fnv::FnvHashMap as Map;

/// Weighted undirected graph with self loops, the input of the aggregating
/// community algorithms. Self loops hold the weight of the edges collapsed
/// into a node and are kept out of the neighbour lists.
#[derive(Clone, Debug, Default)]
pub struct WeightedGraph {
  ends: Vec<usize>,
  neighbors: Vec<(usize, f64)>,
  loops: Vec<f64>,
  strengths: Vec<f64>,
  total_weight: f64,
}

impl WeightedGraph {
  pub fn from_adjacency(adjacency: &Adjacency) -> Self {
    let lists = adjacency
      .iter()
      .map(|neighbors| neighbors.iter().map(|&n| (n, 1.)).collect())
      .collect();
    Self::from_lists(lists, vec![0.; adjacency.node_count()])
  }

  fn from_lists(lists: Vec<Vec<(usize, f64)>>, loops: Vec<f64>) -> Self {
    let mut out = Self {
      ends: Vec::with_capacity(lists.len()),
      neighbors: Vec::new(),
      strengths: Vec::with_capacity(lists.len()),
      total_weight: loops.iter().sum(),
      loops,
    };
    for (node, list) in lists.into_iter().enumerate() {
      let external: f64 = list.iter().map(|(_, w)| w).sum();
      out.total_weight += external / 2.;
      out.strengths.push(external + 2. * out.loops[node]);
      out.neighbors.extend(list);
      out.ends.push(out.neighbors.len());
    }
    out
  }

  /// Collapses every community into one node, intra community weight
  /// becomes a self loop. Node `c` of the result is community `c`.
  pub fn aggregate(&self, labels: &[usize], count: usize) -> Self {
    let mut loops = vec![0.; count];
    let mut maps: Vec<Map<usize, f64>> = vec![Map::default(); count];
    for node in 0..self.node_count() {
      let community = labels[node];
      loops[community] += self.loops[node];
      for &(other, weight) in self.neighbors(node) {
        let other_community = labels[other];
        if other_community == community {
          // seen from both ends
          loops[community] += weight / 2.;
        } else {
          *maps[community].entry(other_community).or_insert(0.) += weight;
        }
      }
    }

    let lists = maps
      .into_iter()
      .map(|map| {
        let mut list: Vec<_> = map.into_iter().collect();
        list.sort_unstable_by_key(|&(other, _)| other);
        list
      })
      .collect();
    Self::from_lists(lists, loops)
  }

  pub fn node_count(&self) -> usize {
    self.ends.len()
  }

  pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
    let start = if node == 0 { 0 } else { self.ends[node - 1] };
    &self.neighbors[start..self.ends[node]]
  }

  pub fn self_loop(&self, node: usize) -> f64 {
    self.loops[node]
  }

  /// Weighted degree, self loops count twice.
  pub fn strength(&self, node: usize) -> f64 {
    self.strengths[node]
  }

  /// Sum of edge weights, self loops once.
  pub fn total_weight(&self) -> f64 {
    self.total_weight
  }
}
