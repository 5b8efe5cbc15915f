use crate::{dataset::Dataset, output_data::save_items};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct DegreeCsvEntry {
  pub degree: usize,
  pub count: usize,
  /// id of the first node with this degree
  pub example_node: u64,
}

pub fn degree_distribution(dataset: &Dataset) -> Vec<DegreeCsvEntry> {
  let mut degree_count = BTreeMap::new();
  for (degree, &id) in dataset
    .adjacency()
    .iter()
    .map(<[usize]>::len)
    .zip(dataset.ids())
  {
    degree_count.entry(degree).or_insert((0, id)).0 += 1;
  }

  degree_count
    .into_iter()
    .map(|(degree, (count, example_node))| DegreeCsvEntry {
      degree,
      count,
      example_node,
    })
    .collect()
}

pub fn save_degree_dist(dataset: &Dataset, csv_path: &Path) -> Result<()> {
  save_items(csv_path, degree_distribution(dataset))
}
