use super::Partition;
use crate::{
  centrality::edge_betweenness, components::ComponentLabels, traversal::Bfs,
  Adjacency,
};
use tracing::debug;

/// Betweenness values this close to the maximum count as ties.
const TIE_EPSILON: f64 = 1e-9;

/// Edge with the highest betweenness, lowest edge on ties.
fn most_central_edge(adjacency: &Adjacency) -> Option<[usize; 2]> {
  let values = edge_betweenness(adjacency);
  let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  adjacency
    .edges()
    .zip(values)
    .find(|&(_, value)| value >= max - TIE_EPSILON)
    .map(|(edge, _)| edge)
}

/// First level of the Girvan–Newman hierarchy: removes the most central
/// edge until the number of components grows, then returns the components.
pub fn girvan_newman(adjacency: &Adjacency) -> Partition {
  let n = adjacency.node_count();
  let mut edges: Vec<[usize; 2]> = adjacency.edges().collect();
  let mut current = adjacency.clone();
  let mut bfs = Bfs::new(n);
  let mut removed = 0;

  while let Some([a, b]) = most_central_edge(&current) {
    edges.retain(|&edge| edge != [a, b]);
    current = Adjacency::from_edges(n, edges.iter().cloned());
    removed += 1;

    bfs.run(&current, a, None);
    if bfs.dist(b).is_none() {
      break;
    }
  }
  debug!("girvan newman removed {} edges", removed);

  Partition::from_labels(ComponentLabels::compute(&current).labels().iter().cloned())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::test::{path_dataset, ring_dataset, two_cliques_dataset};

  #[test]
  fn two_cliques() {
    let dataset = two_cliques_dataset();
    let partition = girvan_newman(dataset.adjacency());
    let mut expected = vec![0; 5];
    expected.extend(vec![1; 5]);
    expected.push(2);
    assert_eq!(partition.labels(), expected.as_slice());
  }

  #[test]
  fn path_splits_in_the_middle() {
    let partition = girvan_newman(path_dataset(4).adjacency());
    assert_eq!(partition.labels(), &[0, 0, 1, 1]);
  }

  #[test]
  fn ring_needs_two_removals() {
    let partition = girvan_newman(ring_dataset(6).adjacency());
    assert_eq!(partition.count(), 2);
    assert_eq!(partition.sizes().iter().sum::<usize>(), 6);
  }

  #[test]
  fn no_edges() {
    let adjacency = Adjacency::from_edges(3, Vec::new());
    assert_eq!(girvan_newman(&adjacency), Partition::singletons(3));
  }
}
