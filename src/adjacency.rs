use std::ops;

/// Neighbour lists of an undirected simple graph packed into one buffer.
/// Every list is sorted and free of duplicates and self loops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacency {
  ends: Vec<usize>,
  neighbors: Vec<usize>,
}

impl Adjacency {
  /// Multi edges collapse, self loops are dropped.
  pub fn from_edges(
    num_nodes: usize,
    edges: impl IntoIterator<Item = [usize; 2]>,
  ) -> Self {
    let mut lists = vec![Vec::new(); num_nodes];
    for [a, b] in edges {
      if a == b {
        continue;
      }
      lists[a].push(b);
      lists[b].push(a);
    }

    Self::from_lists(lists)
  }

  fn from_lists(lists: Vec<Vec<usize>>) -> Self {
    let mut out = Self {
      ends: Vec::with_capacity(lists.len()),
      neighbors: Vec::with_capacity(lists.iter().map(Vec::len).sum()),
    };
    for mut list in lists {
      list.sort_unstable();
      list.dedup();
      out.neighbors.extend(list);
      out.ends.push(out.neighbors.len());
    }
    out
  }

  pub fn node_count(&self) -> usize {
    self.ends.len()
  }

  pub fn edge_count(&self) -> usize {
    self.neighbors.len() / 2
  }

  /// Position of `i`'s list in the packed buffer. Slots
  /// `offset(i)..offset(i) + degree(i)` belong to `i`.
  pub fn offset(&self, i: usize) -> usize {
    if i == 0 {
      0
    } else {
      self.ends[i - 1]
    }
  }

  pub fn neighbors(&self, i: usize) -> &[usize] {
    &self[i]
  }

  pub fn degree(&self, i: usize) -> usize {
    self.ends[i] - self.offset(i)
  }

  pub fn degrees(&self) -> Vec<usize> {
    (0..self.node_count()).map(|i| self.degree(i)).collect()
  }

  pub fn has_edge(&self, a: usize, b: usize) -> bool {
    let (small, other) = if self.degree(a) <= self.degree(b) {
      (a, b)
    } else {
      (b, a)
    };
    self[small].binary_search(&other).is_ok()
  }

  /// Packed slot of `b` in `a`'s list.
  pub fn slot(&self, a: usize, b: usize) -> Option<usize> {
    self[a]
      .binary_search(&b)
      .ok()
      .map(|pos| self.offset(a) + pos)
  }

  /// Number of packed slots, twice the edge count.
  pub fn slot_count(&self) -> usize {
    self.neighbors.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
    (0..self.node_count()).map(move |i| &self[i])
  }

  /// Each edge once, lower index first.
  pub fn edges(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
    self.iter().enumerate().flat_map(|(a, neighbors)| {
      neighbors
        .iter()
        .cloned()
        .filter(move |&b| b > a)
        .map(move |b| [a, b])
    })
  }

  /// Subgraph induced by `keep` (old indices, each at most once). Node `i` of
  /// the result is `keep[i]`.
  pub fn induced(&self, keep: &[usize]) -> Self {
    let mut new_idx = vec![None; self.node_count()];
    for (i, &old) in keep.iter().enumerate() {
      new_idx[old] = Some(i);
    }

    let lists = keep
      .iter()
      .map(|&old| {
        self[old]
          .iter()
          .filter_map(|&neighbor| new_idx[neighbor])
          .collect()
      })
      .collect();

    Self::from_lists(lists)
  }
}

impl ops::Index<usize> for Adjacency {
  type Output = [usize];

  fn index(&self, i: usize) -> &Self::Output {
    let start = self.offset(i);
    &self.neighbors[start..self.ends[i]]
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn collapses_multi_edges_and_loops() {
    let adjacency =
      Adjacency::from_edges(4, vec![[0, 1], [1, 0], [0, 1], [2, 2], [3, 1]]);

    assert_eq!(adjacency.node_count(), 4);
    assert_eq!(adjacency.edge_count(), 2);
    assert_eq!(adjacency.neighbors(0), &[1]);
    assert_eq!(adjacency.neighbors(1), &[0, 3]);
    assert!(adjacency.neighbors(2).is_empty());
    assert!(adjacency.has_edge(3, 1));
    assert!(!adjacency.has_edge(2, 2));
    assert_eq!(adjacency.edges().collect::<Vec<_>>(), vec![[0, 1], [1, 3]]);
    assert_eq!(adjacency.slot_count(), 4);
    assert_eq!(adjacency.slot(1, 3), Some(2));
    assert_eq!(adjacency.slot(3, 1), Some(3));
    assert_eq!(adjacency.slot(0, 3), None);
  }

  #[test]
  fn induced_subgraph() {
    let adjacency =
      Adjacency::from_edges(5, vec![[0, 1], [1, 2], [2, 3], [3, 4], [4, 0]]);
    let sub = adjacency.induced(&[4, 0, 1]);

    assert_eq!(sub.node_count(), 3);
    assert_eq!(sub.edge_count(), 2);
    assert_eq!(sub.neighbors(0), &[1]);
    assert_eq!(sub.neighbors(1), &[0, 2]);
    assert_eq!(sub.neighbors(2), &[1]);
  }
}
