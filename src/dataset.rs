use crate::{
  config::DataPaths,
  csv_items::{EdgeCsvEntry, TargetCsvEntry},
  output_data::load_items,
  progress_bar::get_bar,
  Adjacency, Country, NodeAttributes,
};
use anyhow::Context;
use fnv::FnvHashMap as Map;
use indicatif::ProgressIterator;
#[cfg(test)]
use proptest::prelude::*;
use std::{convert::Infallible, path::Path};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct NodeInput {
  pub id: u64,
  pub attributes: NodeAttributes,
}

/// One country's follow graph. Nodes are indexed `0..node_count()`: rows of
/// the node table first, then nodes only referenced by edges, in the order
/// they were first seen.
#[derive(Default, Debug, Clone)]
pub struct Dataset {
  ids_v: Vec<u64>,
  attributes_v: Vec<Option<NodeAttributes>>,
  id_to_idx: Map<u64, usize>,
  adjacency_v: Adjacency,
  directed_edges_v: Vec<[usize; 2]>,
  listed_v: usize,
}

impl Dataset {
  pub fn node_count(&self) -> usize {
    self.ids_v.len()
  }

  pub fn edge_count(&self) -> usize {
    self.adjacency_v.edge_count()
  }

  /// Nodes that came from the node table.
  pub fn listed_node_count(&self) -> usize {
    self.listed_v
  }

  /// Nodes created because an edge referenced an unknown id.
  pub fn implicit_node_count(&self) -> usize {
    self.node_count() - self.listed_v
  }

  pub fn ids(&self) -> &[u64] {
    &self.ids_v
  }

  /// `None` for implicit nodes.
  pub fn attributes(&self) -> &[Option<NodeAttributes>] {
    &self.attributes_v
  }

  pub fn adjacency(&self) -> &Adjacency {
    &self.adjacency_v
  }

  /// Edge rows as they were read (as indices), including duplicates,
  /// reversed duplicates and self loops.
  pub fn directed_edges(&self) -> &[[usize; 2]] {
    &self.directed_edges_v
  }

  pub fn find_node(&self, id: u64) -> Option<usize> {
    self.id_to_idx.get(&id).cloned()
  }

  pub fn new_error<E>(
    node_iter: impl IntoIterator<Item = Result<NodeInput, E>>,
    edge_iter: impl IntoIterator<Item = Result<(u64, u64), E>>,
  ) -> Result<Self, E> {
    let mut ids_v = Vec::new();
    let mut attributes_v = Vec::new();
    let mut id_to_idx = Map::default();

    for node in node_iter {
      let NodeInput { id, attributes } = node?;
      if let Some(&idx) = id_to_idx.get(&id) {
        // same as re-adding a node: attributes are replaced
        debug!("node {} listed more than once", id);
        attributes_v[idx] = Some(attributes);
        continue;
      }
      id_to_idx.insert(id, ids_v.len());
      ids_v.push(id);
      attributes_v.push(Some(attributes));
    }

    let listed_v = ids_v.len();

    let mut idx_of = |id: u64| {
      *id_to_idx.entry(id).or_insert_with(|| {
        ids_v.push(id);
        attributes_v.push(None);
        ids_v.len() - 1
      })
    };

    let directed_edges_v = itertools::process_results(edge_iter, |iter| {
      iter.map(|(from, to)| [idx_of(from), idx_of(to)]).collect::<Vec<_>>()
    })?;

    let adjacency_v =
      Adjacency::from_edges(ids_v.len(), directed_edges_v.iter().cloned());

    let out = Self {
      ids_v,
      attributes_v,
      id_to_idx,
      adjacency_v,
      directed_edges_v,
      listed_v,
    };

    #[cfg(debug_assertions)]
    out.directed_edges_v.iter().for_each(|&[a, b]| {
      debug_assert!(a == b || out.adjacency_v.has_edge(a, b));
    });

    Ok(out)
  }

  pub fn new(
    node_iter: impl IntoIterator<Item = NodeInput>,
    edge_iter: impl IntoIterator<Item = (u64, u64)>,
  ) -> Self {
    let out: Result<Self, Infallible> = Self::new_error(
      node_iter.into_iter().map(Ok),
      edge_iter.into_iter().map(Ok),
    );
    match out {
      Ok(out) => out,
      Err(never) => match never {},
    }
  }

  pub fn load_files(target_path: &Path, edges_path: &Path) -> anyhow::Result<Self> {
    let get_bar = || get_bar(None, 10_000);

    let node_iter = load_items::<TargetCsvEntry>(target_path)?
      .progress_with(get_bar())
      .map(|entry| {
        entry.map(|entry| {
          let (id, attributes) = entry.attributes();
          NodeInput { id, attributes }
        })
      });
    let edge_iter = load_items::<EdgeCsvEntry>(edges_path)?
      .progress_with(get_bar())
      .map(|entry| entry.map(|EdgeCsvEntry { from, to }| (from, to)));

    let out = Self::new_error(node_iter, edge_iter)?;

    if out.implicit_node_count() > 0 {
      warn!(
        "{} edge endpoints are missing from {}, added them without attributes",
        out.implicit_node_count(),
        target_path.display()
      );
    }

    Ok(out)
  }

  pub fn load(paths: &DataPaths, country: Country) -> anyhow::Result<Self> {
    let target_path = paths.target_csv(country);
    let edges_path = paths.edges_csv(country);

    let out = Self::load_files(&target_path, &edges_path)
      .with_context(|| format!("failed to load the {} graph", country))?;

    info!(
      "{}: {} nodes, {} edges",
      country,
      out.node_count(),
      out.edge_count()
    );

    Ok(out)
  }

  /// Subgraph induced by `keep` (indices into this dataset, any order,
  /// duplicates ignored). Node order follows `keep`.
  pub fn subgraph(&self, keep: impl IntoIterator<Item = usize>) -> Self {
    let mut seen = vec![false; self.node_count()];
    let keep: Vec<usize> = keep
      .into_iter()
      .filter(|&idx| !std::mem::replace(&mut seen[idx], true))
      .collect();

    let mut new_idx = vec![None; self.node_count()];
    for (i, &old) in keep.iter().enumerate() {
      new_idx[old] = Some(i);
    }

    let ids_v: Vec<u64> = keep.iter().map(|&old| self.ids_v[old]).collect();
    let attributes_v = keep
      .iter()
      .map(|&old| self.attributes_v[old].clone())
      .collect();
    let id_to_idx = ids_v.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let listed_v = keep.iter().filter(|&&old| old < self.listed_v).count();
    let directed_edges_v = self
      .directed_edges_v
      .iter()
      .filter_map(|&[a, b]| Some([new_idx[a]?, new_idx[b]?]))
      .collect();

    Self {
      ids_v,
      attributes_v,
      id_to_idx,
      adjacency_v: self.adjacency_v.induced(&keep),
      directed_edges_v,
      listed_v,
    }
  }
}
