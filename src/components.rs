use crate::{traversal::Bfs, Adjacency};

struct ComponentIterator<'a, F> {
  adjacency: &'a Adjacency,
  bfs: Bfs,
  visited: Vec<bool>,
  next_start: usize,
  callback: F,
}

impl<'a, F> Iterator for ComponentIterator<'a, F>
where
  F: FnMut(usize),
{
  /// Node indices of the component, in bfs order.
  type Item = Vec<usize>;

  fn next(&mut self) -> Option<Self::Item> {
    let visited = &self.visited;
    let start = (self.next_start..visited.len()).find(|&idx| !visited[idx])?;
    self.next_start = start + 1;

    self.bfs.run(self.adjacency, start, None);
    let component = self.bfs.order().to_vec();
    for &node in &component {
      debug_assert!(!self.visited[node]);
      self.visited[node] = true;
      (self.callback)(node);
    }

    Some(component)
  }
}

/// Components in order of their lowest node index. `callback` sees every
/// node once.
pub fn components_callback<'a>(
  adjacency: &'a Adjacency,
  callback: impl FnMut(usize) + 'a,
) -> impl Iterator<Item = Vec<usize>> + 'a {
  ComponentIterator {
    adjacency,
    bfs: Bfs::new(adjacency.node_count()),
    visited: vec![false; adjacency.node_count()],
    next_start: 0,
    callback,
  }
}

pub fn components(
  adjacency: &Adjacency,
) -> impl Iterator<Item = Vec<usize>> + '_ {
  components_callback(adjacency, |_| {})
}

/// Component label of every node.
#[derive(Clone, Debug, Default)]
pub struct ComponentLabels {
  labels: Vec<usize>,
  sizes: Vec<usize>,
}

impl ComponentLabels {
  pub fn compute(adjacency: &Adjacency) -> Self {
    let mut labels = vec![0; adjacency.node_count()];
    let mut sizes = Vec::new();
    for component in components(adjacency) {
      for &node in &component {
        labels[node] = sizes.len();
      }
      sizes.push(component.len());
    }

    Self { labels, sizes }
  }

  pub fn count(&self) -> usize {
    self.sizes.len()
  }

  pub fn labels(&self) -> &[usize] {
    &self.labels
  }

  pub fn sizes(&self) -> &[usize] {
    &self.sizes
  }

  /// Null graphs count as disconnected.
  pub fn is_connected(&self) -> bool {
    self.count() == 1
  }

  /// Label of the largest component (first one on ties).
  pub fn giant(&self) -> Option<usize> {
    let max = *self.sizes.iter().max()?;
    self.sizes.iter().position(|&size| size == max)
  }

  pub fn giant_nodes(&self) -> Vec<usize> {
    match self.giant() {
      Some(giant) => self.members(giant),
      None => Vec::new(),
    }
  }

  pub fn members(&self, label: usize) -> Vec<usize> {
    self
      .labels
      .iter()
      .enumerate()
      .filter(|&(_, &l)| l == label)
      .map(|(idx, _)| idx)
      .collect()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::{
    self,
    test::{complete_dataset, path_dataset, two_cliques_dataset},
  };
  use proptest::prelude::*;
  use std::collections::HashSet;

  fn sorted(components: impl Iterator<Item = Vec<usize>>) -> Vec<Vec<usize>> {
    components
      .map(|mut component| {
        component.sort_unstable();
        component
      })
      .collect()
  }

  #[test]
  fn empty() {
    let adjacency = Adjacency::default();
    assert_eq!(components(&adjacency).count(), 0);
    let labels = ComponentLabels::compute(&adjacency);
    assert!(!labels.is_connected());
    assert_eq!(labels.giant(), None);
    assert!(labels.giant_nodes().is_empty());
  }

  #[test]
  fn connected() {
    for &n in &[1, 2, 5] {
      let dataset = path_dataset(n);
      let labels = ComponentLabels::compute(dataset.adjacency());
      assert!(labels.is_connected());
      assert_eq!(labels.giant_nodes().len(), n as usize);

      let dataset = complete_dataset(n);
      assert_eq!(
        sorted(components(dataset.adjacency())),
        vec![(0..n as usize).collect::<Vec<_>>()]
      );
    }
  }

  #[test]
  fn cliques_and_isolated() {
    let dataset = two_cliques_dataset();
    let actual = sorted(components(dataset.adjacency()));
    assert_eq!(actual, vec![(0..10).collect::<Vec<_>>(), vec![10]]);

    let labels = ComponentLabels::compute(dataset.adjacency());
    assert_eq!(labels.count(), 2);
    assert_eq!(labels.sizes(), &[10, 1]);
    assert_eq!(labels.giant(), Some(0));
    assert_eq!(labels.members(1), vec![10]);
  }

  #[test]
  fn giant_tie_takes_first() {
    let adjacency = Adjacency::from_edges(4, vec![[2, 3], [0, 1]]);
    let labels = ComponentLabels::compute(&adjacency);
    assert_eq!(labels.giant_nodes(), vec![0, 1]);
  }

  proptest::proptest! {
    #[test]
    fn proptest_components(
      dataset in dataset::test::strategy(1u64..60, 0usize..100),
    ) {
      let adjacency = dataset.adjacency();
      let mut seen = HashSet::new();
      let mut callback_count = 0;
      let found: Vec<_> =
        components_callback(adjacency, |_| callback_count += 1).collect();
      for component in &found {
        let members: HashSet<_> = component.iter().cloned().collect();
        for &node in component {
          proptest::prop_assert!(seen.insert(node));
          for neighbor in adjacency.neighbors(node) {
            proptest::prop_assert!(members.contains(neighbor));
          }
        }
      }
      proptest::prop_assert_eq!(callback_count, adjacency.node_count());
      proptest::prop_assert_eq!(seen.len(), adjacency.node_count());
    }
  }
}
