use crate::{
  components::ComponentLabels,
  output_data::{load_items, save_items},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct ComponentSizeCsvEntry {
  pub size: usize,
  pub count: usize,
}

/// Component size distribution, largest size first.
pub fn component_size_counts(
  labels: &ComponentLabels,
) -> Vec<ComponentSizeCsvEntry> {
  let mut counts = BTreeMap::new();
  for &size in labels.sizes() {
    *counts.entry(size).or_insert(0) += 1;
  }

  counts
    .into_iter()
    .rev()
    .map(|(size, count)| ComponentSizeCsvEntry { size, count })
    .collect()
}

pub fn save_component_sizes(
  labels: &ComponentLabels,
  csv_path: &Path,
) -> Result<()> {
  let entries = component_size_counts(labels);
  debug_assert_eq!(
    entries.iter().map(|e| e.size * e.count).sum::<usize>(),
    labels.labels().len()
  );
  save_items(csv_path, entries)
}

pub fn load_component_sizes(
  csv_path: &Path,
) -> Result<impl Iterator<Item = Result<ComponentSizeCsvEntry>>> {
  load_items(csv_path)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::test::two_cliques_dataset;

  #[test]
  fn save_and_load() {
    let dataset = two_cliques_dataset();
    let labels = ComponentLabels::compute(dataset.adjacency());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("component_sizes.csv");

    save_component_sizes(&labels, &path).unwrap();
    let loaded: Vec<_> = load_component_sizes(&path)
      .unwrap()
      .collect::<Result<_>>()
      .unwrap();
    assert_eq!(
      loaded,
      vec![
        ComponentSizeCsvEntry { size: 10, count: 1 },
        ComponentSizeCsvEntry { size: 1, count: 1 },
      ]
    );
  }
}
