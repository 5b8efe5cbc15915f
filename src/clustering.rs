use crate::Adjacency;
use rayon::prelude::*;

fn intersection_len(a: &[usize], b: &[usize]) -> usize {
  let (mut i, mut j, mut count) = (0, 0, 0);
  while i < a.len() && j < b.len() {
    match a[i].cmp(&b[j]) {
      std::cmp::Ordering::Less => i += 1,
      std::cmp::Ordering::Greater => j += 1,
      std::cmp::Ordering::Equal => {
        count += 1;
        i += 1;
        j += 1;
      }
    }
  }
  count
}

/// Triangles through each node.
pub fn triangles(adjacency: &Adjacency) -> Vec<usize> {
  (0..adjacency.node_count())
    .into_par_iter()
    .map(|node| {
      let neighbors = adjacency.neighbors(node);
      let twice: usize = neighbors
        .iter()
        .map(|&other| intersection_len(neighbors, adjacency.neighbors(other)))
        .sum();
      twice / 2
    })
    .collect()
}

/// Fraction of neighbour pairs that are linked, 0 below degree 2.
pub fn local_clustering(adjacency: &Adjacency, triangles: &[usize]) -> Vec<f64> {
  triangles
    .iter()
    .zip(adjacency.iter())
    .map(|(&t, neighbors)| {
      let d = neighbors.len();
      if d < 2 {
        0.
      } else {
        2. * t as f64 / (d * (d - 1)) as f64
      }
    })
    .collect()
}

/// Mean over all nodes, nodes of degree < 2 included as 0.
pub fn average_clustering(local: &[f64]) -> f64 {
  if local.is_empty() {
    0.
  } else {
    local.iter().sum::<f64>() / local.len() as f64
  }
}

/// 3 * triangles / connected triples.
pub fn transitivity(adjacency: &Adjacency, triangles: &[usize]) -> f64 {
  let closed: usize = triangles.iter().sum();
  let triples: usize = adjacency
    .iter()
    .map(|l| l.len() * l.len().saturating_sub(1) / 2)
    .sum();
  if closed == 0 {
    0.
  } else {
    closed as f64 / triples as f64
  }
}

/// Batagelj and Zaversnik bucket algorithm, O(n + m).
pub fn core_numbers(adjacency: &Adjacency) -> Vec<usize> {
  let n = adjacency.node_count();
  let mut degree = adjacency.degrees();
  let max_degree = degree.iter().cloned().max().unwrap_or(0);

  // bucket starts, then nodes sorted by degree
  let mut bin = vec![0; max_degree + 1];
  for &d in &degree {
    bin[d] += 1;
  }
  let mut start = 0;
  for count in bin.iter_mut() {
    let c = *count;
    *count = start;
    start += c;
  }
  let mut pos = vec![0; n];
  let mut vert = vec![0; n];
  for node in 0..n {
    pos[node] = bin[degree[node]];
    vert[pos[node]] = node;
    bin[degree[node]] += 1;
  }
  for d in (1..=max_degree).rev() {
    bin[d] = bin[d - 1];
  }
  if let Some(first) = bin.first_mut() {
    *first = 0;
  }

  for i in 0..n {
    let node = vert[i];
    for &other in adjacency.neighbors(node) {
      if degree[other] > degree[node] {
        let d_other = degree[other];
        let pos_other = pos[other];
        let pos_swap = bin[d_other];
        let swap = vert[pos_swap];
        if other != swap {
          pos[other] = pos_swap;
          vert[pos_other] = swap;
          pos[swap] = pos_other;
          vert[pos_swap] = other;
        }
        bin[d_other] += 1;
        degree[other] -= 1;
      }
    }
  }

  degree
}

/// Size of the innermost (maximum) core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KCore {
  pub k: usize,
  pub nodes: usize,
  pub edges: usize,
}

pub fn max_core(adjacency: &Adjacency, core_numbers: &[usize]) -> KCore {
  let k = core_numbers.iter().cloned().max().unwrap_or(0);
  let inside = |node: usize| core_numbers[node] >= k;
  KCore {
    k,
    nodes: (0..adjacency.node_count()).filter(|&v| inside(v)).count(),
    edges: adjacency
      .edges()
      .filter(|&[a, b]| inside(a) && inside(b))
      .count(),
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::{
    self,
    test::{
      complete_dataset, path_dataset, ring_dataset, star_dataset,
      two_cliques_dataset, two_triangles_dataset,
    },
  };
  use proptest::prelude::*;

  #[test]
  fn two_triangles() {
    let dataset = two_triangles_dataset();
    let adjacency = dataset.adjacency();
    let t = triangles(adjacency);
    assert_eq!(t, vec![1, 1, 1, 1, 1, 1]);

    let local = local_clustering(adjacency, &t);
    let third = 1. / 3.;
    let expected = [1., 1., third, third, 1., 1.];
    for (a, e) in local.iter().zip(&expected) {
      assert!((a - e).abs() < 1e-12);
    }
    assert!((average_clustering(&local) - (4. + 2. * third) / 6.).abs() < 1e-12);
    // 6 closed of 4 * 1 + 2 * 3 triples
    assert!((transitivity(adjacency, &t) - 0.6).abs() < 1e-12);
  }

  #[test]
  fn trees_have_no_triangles() {
    for dataset in vec![path_dataset(6), star_dataset(5)] {
      let t = triangles(dataset.adjacency());
      assert!(t.iter().all(|&t| t == 0));
      assert_eq!(transitivity(dataset.adjacency(), &t), 0.);
      assert_eq!(core_numbers(dataset.adjacency()), vec![1; dataset.node_count()]);
    }
  }

  #[test]
  fn cores() {
    let dataset = two_cliques_dataset();
    let cores = core_numbers(dataset.adjacency());
    let mut expected = vec![4; 10];
    expected.push(0);
    assert_eq!(cores, expected);
    assert_eq!(
      max_core(dataset.adjacency(), &cores),
      KCore {
        k: 4,
        nodes: 10,
        edges: 21,
      }
    );

    let cores = core_numbers(ring_dataset(7).adjacency());
    assert_eq!(cores, vec![2; 7]);
    let cores = core_numbers(complete_dataset(5).adjacency());
    assert_eq!(cores, vec![4; 5]);
  }

  #[test]
  fn triangle_with_tail() {
    // 0 - 1 - 2 - 0 plus tail 2 - 3
    let adjacency = Adjacency::from_edges(4, vec![[0, 1], [1, 2], [2, 0], [2, 3]]);
    assert_eq!(core_numbers(&adjacency), vec![2, 2, 2, 1]);
    let cores = core_numbers(&adjacency);
    assert_eq!(
      max_core(&adjacency, &cores),
      KCore {
        k: 2,
        nodes: 3,
        edges: 3,
      }
    );
  }

  proptest::proptest! {
    #[test]
    fn proptest_clustering(
      dataset in dataset::test::strategy(1u64..40, 0usize..120),
    ) {
      let adjacency = dataset.adjacency();
      let t = triangles(adjacency);
      proptest::prop_assert_eq!(t.iter().sum::<usize>() % 3, 0);
      for c in local_clustering(adjacency, &t) {
        proptest::prop_assert!((0. ..=1.).contains(&c));
      }
      let cores = core_numbers(adjacency);
      for (node, &core) in cores.iter().enumerate() {
        proptest::prop_assert!(core <= adjacency.degree(node));
        let at_least = adjacency
          .neighbors(node)
          .iter()
          .filter(|&&other| cores[other] >= core)
          .count();
        proptest::prop_assert!(at_least >= core);
      }
    }
  }
}
