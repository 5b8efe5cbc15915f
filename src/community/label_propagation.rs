use super::Partition;
use crate::Adjacency;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::warn;

/// Most frequent labels among the neighbours of `node`, ascending.
fn best_labels(
  adjacency: &Adjacency,
  labels: &[usize],
  node: usize,
  counts: &mut Vec<(usize, usize)>,
) -> Vec<usize> {
  counts.clear();
  counts.extend(adjacency.neighbors(node).iter().map(|&other| (labels[other], 1)));
  counts.sort_unstable();
  counts.dedup_by(|(label, count), (prev_label, prev_count)| {
    if label == prev_label {
      *prev_count += *count;
      true
    } else {
      false
    }
  });
  let max = counts.iter().map(|&(_, count)| count).max().unwrap_or(0);
  counts
    .iter()
    .filter(|&&(_, count)| count == max)
    .map(|&(label, _)| label)
    .collect()
}

/// Asynchronous label propagation. Sweeps visit nodes in a fresh random
/// order and stop once every node carries one of its most frequent
/// neighbour labels.
pub fn label_propagation(
  adjacency: &Adjacency,
  max_sweeps: usize,
  seed: u64,
) -> Partition {
  let n = adjacency.node_count();
  let mut rng = StdRng::seed_from_u64(seed);
  let mut labels: Vec<usize> = (0..n).collect();
  let mut order: Vec<usize> = (0..n).collect();
  let mut counts = Vec::new();

  let mut converged = false;
  for _ in 0..max_sweeps {
    let mut changed = false;
    order.shuffle(&mut rng);
    for &node in &order {
      if adjacency.degree(node) == 0 {
        continue;
      }
      let best = best_labels(adjacency, &labels, node, &mut counts);
      if !best.contains(&labels[node]) {
        if let Some(&label) = best.choose(&mut rng) {
          labels[node] = label;
          changed = true;
        }
      }
    }
    if !changed {
      converged = true;
      break;
    }
  }

  if !converged {
    warn!(
      "label propagation stopped after {} sweeps without settling",
      max_sweeps
    );
  }

  Partition::from_labels(labels)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::test::{complete_dataset, two_cliques_dataset};

  #[test]
  fn settles_on_cliques() {
    let dataset = two_cliques_dataset();
    let adjacency = dataset.adjacency();
    let partition = label_propagation(adjacency, 1000, 11);
    let labels = partition.labels();
    // every node ends with a most frequent neighbour label
    for node in 0..adjacency.node_count() {
      if adjacency.degree(node) > 0 {
        let mut counts = Vec::new();
        let best = best_labels(adjacency, labels, node, &mut counts);
        assert!(best.contains(&labels[node]));
      }
    }
    assert_ne!(labels[10], labels[0]);
    assert!(labels[..4].iter().all(|&l| l == labels[0]));
  }

  #[test]
  fn complete_graph_single_label() {
    let dataset = complete_dataset(6);
    let partition = label_propagation(dataset.adjacency(), 1000, 3);
    assert_eq!(partition.count(), 1);
  }

  #[test]
  fn tie_breaking() {
    let adjacency = Adjacency::from_edges(3, vec![[0, 1], [0, 2]]);
    let mut counts = Vec::new();
    assert_eq!(best_labels(&adjacency, &[0, 1, 2], 0, &mut counts), vec![1, 2]);
    assert_eq!(best_labels(&adjacency, &[0, 5, 5], 0, &mut counts), vec![5]);
  }
}
