use crate::{
  centrality::{
    betweenness_centrality, degree_centrality, eigenvector_centrality,
    katz_centrality, pagerank, ConvergenceError,
  },
  clustering::{
    average_clustering, core_numbers, local_clustering, max_core, transitivity,
    triangles, KCore,
  },
  community::{detect, Algorithm, CommunityConfig, Partition},
  components::ComponentLabels,
  csv_items::deserialize_optional_flag,
  dataset::Dataset,
  distances::DistanceSummary,
  game_type::GameType,
  output_data::{load_items, save_items},
  stats, BroadcasterType,
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{ops, path::Path, time::Instant};
use tracing::{info, warn};

/// Algorithm parameters and which of the expensive metrics to run.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
  /// closeness and the path length statistics
  pub distances: bool,
  pub betweenness: bool,
  pub eigenvector: bool,
  pub pagerank: bool,
  pub katz: bool,
  pub algorithms: Vec<Algorithm>,
  pub eigenvector_max_iter: usize,
  pub pagerank_alpha: f64,
  pub pagerank_max_iter: usize,
  pub katz_alpha: f64,
  pub katz_beta: f64,
  pub katz_max_iter: usize,
  /// per node tolerance of the power iterations
  pub tolerance: f64,
  pub community: CommunityConfig,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      distances: true,
      betweenness: true,
      eigenvector: true,
      pagerank: true,
      katz: true,
      algorithms: Algorithm::ALL.to_vec(),
      eigenvector_max_iter: 100,
      pagerank_alpha: 0.85,
      pagerank_max_iter: 100,
      katz_alpha: 0.1,
      katz_beta: 1.,
      katz_max_iter: 1000,
      tolerance: 1e-6,
      community: CommunityConfig::default(),
    }
  }
}

impl MetricsConfig {
  pub fn validate(&self) -> Result<()> {
    if !(self.katz_alpha > 0. && self.katz_alpha < 1.) {
      bail!("katz alpha must be in (0, 1), got {}", self.katz_alpha);
    }
    if !(self.pagerank_alpha > 0. && self.pagerank_alpha < 1.) {
      bail!("pagerank alpha must be in (0, 1), got {}", self.pagerank_alpha);
    }
    if !(self.tolerance > 0.) {
      bail!("tolerance must be positive, got {}", self.tolerance);
    }
    if !(self.community.resolution > 0.) {
      bail!(
        "resolution must be positive, got {}",
        self.community.resolution
      );
    }
    Ok(())
  }
}

fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
  let start = Instant::now();
  let out = f();
  info!("{} took {:.2?}", name, start.elapsed());
  out
}

fn converged(result: Result<Vec<f64>, ConvergenceError>) -> Option<Vec<f64>> {
  match result {
    Ok(values) => Some(values),
    Err(err) => {
      warn!("{}, leaving the column empty", err);
      None
    }
  }
}

/// One partition per algorithm, `None` for algorithms not run or skipped.
#[derive(Clone, Debug, Default)]
pub struct Communities {
  partitions: [Option<Partition>; 4],
}

impl Communities {
  fn slot(algorithm: Algorithm) -> usize {
    match algorithm {
      Algorithm::Louvain => 0,
      Algorithm::Leiden => 1,
      Algorithm::LabelPropagation => 2,
      Algorithm::GirvanNewman => 3,
    }
  }

  pub fn set(&mut self, algorithm: Algorithm, partition: Option<Partition>) {
    self.partitions[Self::slot(algorithm)] = partition;
  }

  pub fn label(&self, algorithm: Algorithm, node: usize) -> Option<usize> {
    self[algorithm].as_ref().map(|p| p.labels()[node])
  }
}

impl ops::Index<Algorithm> for Communities {
  type Output = Option<Partition>;

  fn index(&self, algorithm: Algorithm) -> &Self::Output {
    &self.partitions[Self::slot(algorithm)]
  }
}

/// Per node metrics of one graph, indexed like the dataset.
#[derive(Clone, Debug, Default)]
pub struct NodeMetrics {
  pub degree: Vec<usize>,
  pub degree_centrality: Vec<f64>,
  pub distances: Option<DistanceSummary>,
  pub betweenness: Option<Vec<f64>>,
  pub eigenvector: Option<Vec<f64>>,
  pub pagerank: Option<Vec<f64>>,
  pub katz: Option<Vec<f64>>,
  pub triangles: Vec<usize>,
  pub clustering: Vec<f64>,
  pub core_number: Vec<usize>,
  pub communities: Communities,
}

impl NodeMetrics {
  pub fn compute(dataset: &Dataset, config: &MetricsConfig) -> Self {
    let adjacency = dataset.adjacency();
    let mut out = Self {
      degree: adjacency.degrees(),
      degree_centrality: degree_centrality(adjacency),
      ..Default::default()
    };

    if config.distances {
      out.distances =
        Some(timed("distances", || DistanceSummary::compute(adjacency)));
    }
    if config.betweenness {
      out.betweenness =
        Some(timed("betweenness", || betweenness_centrality(adjacency)));
    }
    if config.eigenvector {
      out.eigenvector = converged(timed("eigenvector", || {
        eigenvector_centrality(
          adjacency,
          config.eigenvector_max_iter,
          config.tolerance,
        )
      }));
    }
    if config.pagerank {
      out.pagerank = converged(timed("pagerank", || {
        pagerank(
          adjacency,
          config.pagerank_alpha,
          config.pagerank_max_iter,
          config.tolerance,
        )
      }));
    }
    if config.katz {
      out.katz = converged(timed("katz", || {
        katz_centrality(
          adjacency,
          config.katz_alpha,
          config.katz_beta,
          config.katz_max_iter,
          config.tolerance,
        )
      }));
    }

    out.triangles = timed("triangles", || triangles(adjacency));
    out.clustering = local_clustering(adjacency, &out.triangles);
    out.core_number = timed("core numbers", || core_numbers(adjacency));

    for &algorithm in &config.algorithms {
      let partition = timed(algorithm.name(), || {
        detect(algorithm, adjacency, &config.community)
      });
      if let Some(partition) = &partition {
        info!("{}: {} communities", algorithm, partition.count());
      }
      out.communities.set(algorithm, partition);
    }

    out
  }

  /// One row per node, highest degree centrality first.
  pub fn rows(&self, dataset: &Dataset) -> Vec<MetricsRow> {
    let at = |values: &Option<Vec<f64>>, node: usize| {
      values.as_ref().map(|v| v[node])
    };

    let mut rows: Vec<MetricsRow> = (0..dataset.node_count())
      .map(|node| {
        let attributes = dataset.attributes()[node].as_ref();
        MetricsRow {
          node: dataset.ids()[node],
          views: attributes.map(|a| a.views),
          partner: attributes.map(|a| a.partner),
          mature: attributes.map(|a| a.mature),
          days: attributes.map(|a| a.days),
          broadcaster_type: attributes.map(|a| a.broadcaster_type),
          game_name: attributes.and_then(|a| a.game_name.clone()),
          game_type: attributes
            .map(|a| GameType::of(a.game_name.as_ref().map(String::as_str))),
          degree: self.degree[node],
          degree_centrality: self.degree_centrality[node],
          closeness_centrality: self
            .distances
            .as_ref()
            .map(|d| d.closeness[node]),
          betweenness_centrality: at(&self.betweenness, node),
          eigenvector_centrality: at(&self.eigenvector, node),
          pagerank: at(&self.pagerank, node),
          katz_centrality: at(&self.katz, node),
          clustering: self.clustering[node],
          core_number: self.core_number[node],
          louvain_community: self.communities.label(Algorithm::Louvain, node),
          leiden_community: self.communities.label(Algorithm::Leiden, node),
          label_propagation_community: self
            .communities
            .label(Algorithm::LabelPropagation, node),
          girvan_newman_community: self
            .communities
            .label(Algorithm::GirvanNewman, node),
        }
      })
      .collect();

    rows.sort_by(|a, b| {
      b.degree_centrality
        .partial_cmp(&a.degree_centrality)
        .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
  }
}

/// Line of the per country metrics table. Empty fields are attributes of
/// implicit nodes or metrics that were not computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
  pub node: u64,
  pub views: Option<u64>,
  #[serde(default, deserialize_with = "deserialize_optional_flag")]
  pub partner: Option<bool>,
  #[serde(default, deserialize_with = "deserialize_optional_flag")]
  pub mature: Option<bool>,
  pub days: Option<u64>,
  pub broadcaster_type: Option<BroadcasterType>,
  pub game_name: Option<String>,
  pub game_type: Option<GameType>,
  pub degree: usize,
  pub degree_centrality: f64,
  pub closeness_centrality: Option<f64>,
  pub betweenness_centrality: Option<f64>,
  pub eigenvector_centrality: Option<f64>,
  pub pagerank: Option<f64>,
  pub katz_centrality: Option<f64>,
  pub clustering: f64,
  pub core_number: usize,
  pub louvain_community: Option<usize>,
  pub leiden_community: Option<usize>,
  pub label_propagation_community: Option<usize>,
  pub girvan_newman_community: Option<usize>,
}

impl MetricsRow {
  pub fn community(&self, algorithm: Algorithm) -> Option<usize> {
    match algorithm {
      Algorithm::Louvain => self.louvain_community,
      Algorithm::Leiden => self.leiden_community,
      Algorithm::LabelPropagation => self.label_propagation_community,
      Algorithm::GirvanNewman => self.girvan_newman_community,
    }
  }
}

pub fn save_metrics(path: &Path, rows: &[MetricsRow]) -> Result<()> {
  save_items(path, rows)
}

pub fn load_metrics(path: &Path) -> Result<Vec<MetricsRow>> {
  load_items(path)?.collect()
}

/// Whole graph statistics. `None` marks values that are undefined for the
/// graph (e.g. path lengths of a disconnected graph) or were not computed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphMetrics {
  pub nodes: usize,
  pub edges: usize,
  pub density: f64,
  pub components: usize,
  pub giant_nodes: usize,
  pub giant_edges: usize,
  pub k_core: KCore,
  pub diameter: Option<usize>,
  pub radius: Option<usize>,
  pub average_path_length: Option<f64>,
  pub global_efficiency: Option<f64>,
  pub assortativity: Option<f64>,
  pub transitivity: f64,
  pub average_clustering: f64,
  pub degree_std: f64,
  pub degree_skewness: Option<f64>,
  pub heterogeneity: Option<f64>,
  pub reciprocity: Option<f64>,
  pub mean_degree_centrality: f64,
  pub mean_betweenness: Option<f64>,
  pub mean_closeness: Option<f64>,
  pub mean_eigenvector: Option<f64>,
  pub mean_pagerank: Option<f64>,
  pub degree_centralization: Option<f64>,
  pub betweenness_centralization: Option<f64>,
  pub modularity: Option<f64>,
}

impl GraphMetrics {
  pub fn compute(
    dataset: &Dataset,
    metrics: &NodeMetrics,
    resolution: f64,
  ) -> Self {
    let adjacency = dataset.adjacency();
    let n = adjacency.node_count();
    let components = ComponentLabels::compute(adjacency);
    let giant = components.giant();
    let in_giant = |node: usize| Some(components.labels()[node]) == giant;

    let degrees: Vec<f64> = metrics.degree.iter().map(|&d| d as f64).collect();
    let mean_of = |values: &Option<Vec<f64>>| {
      values.as_ref().map(|v| stats::mean(v))
    };
    let distances = metrics.distances.as_ref();

    Self {
      nodes: n,
      edges: adjacency.edge_count(),
      density: if n > 1 {
        2. * adjacency.edge_count() as f64 / (n * (n - 1)) as f64
      } else {
        0.
      },
      components: components.count(),
      giant_nodes: giant.map_or(0, |g| components.sizes()[g]),
      giant_edges: adjacency.edges().filter(|&[a, _]| in_giant(a)).count(),
      k_core: max_core(adjacency, &metrics.core_number),
      diameter: distances.and_then(|d| d.diameter),
      radius: distances.and_then(|d| d.radius),
      average_path_length: distances.and_then(|d| d.average_path_length),
      global_efficiency: distances.map(|d| d.global_efficiency),
      assortativity: stats::degree_assortativity(adjacency),
      transitivity: transitivity(adjacency, &metrics.triangles),
      average_clustering: average_clustering(&metrics.clustering),
      degree_std: stats::std_dev(&degrees),
      degree_skewness: stats::skewness(&degrees),
      heterogeneity: stats::heterogeneity(&degrees),
      reciprocity: stats::reciprocity(dataset.directed_edges()),
      mean_degree_centrality: stats::mean(&metrics.degree_centrality),
      mean_betweenness: mean_of(&metrics.betweenness),
      mean_closeness: distances.map(|d| stats::mean(&d.closeness)),
      mean_eigenvector: mean_of(&metrics.eigenvector),
      mean_pagerank: mean_of(&metrics.pagerank),
      degree_centralization: stats::centralization(&metrics.degree_centrality),
      betweenness_centralization: metrics
        .betweenness
        .as_ref()
        .and_then(|b| stats::centralization(b)),
      modularity: metrics.communities[Algorithm::Louvain]
        .as_ref()
        .and_then(|p| p.modularity(adjacency, resolution)),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dataset::{
    test::{ring_dataset, two_cliques_dataset, two_triangles_dataset},
    Dataset, NodeInput,
  };

  fn fast_config() -> MetricsConfig {
    MetricsConfig {
      katz: false,
      ..Default::default()
    }
  }

  #[test]
  fn ring_metrics() {
    let dataset = ring_dataset(5);
    let metrics = NodeMetrics::compute(&dataset, &MetricsConfig::default());
    assert_eq!(metrics.degree, vec![2; 5]);
    assert!(metrics.degree_centrality.iter().all(|&c| c == 0.5));
    assert!(metrics.katz.is_some());

    let graph = GraphMetrics::compute(&dataset, &metrics, 1.);
    assert_eq!(graph.nodes, 5);
    assert_eq!(graph.edges, 5);
    assert!((graph.density - 0.5).abs() < 1e-12);
    assert_eq!(graph.diameter, Some(2));
    assert_eq!(graph.components, 1);
    assert_eq!(graph.assortativity, None);
    assert_eq!(graph.degree_skewness, None);
    assert_eq!(graph.k_core.k, 2);
    // every edge row read once in one direction
    assert_eq!(graph.reciprocity, Some(0.));
  }

  #[test]
  fn disconnected_graph_has_undefined_paths() {
    let dataset = two_cliques_dataset();
    let metrics = NodeMetrics::compute(&dataset, &fast_config());
    let graph = GraphMetrics::compute(&dataset, &metrics, 1.);
    assert_eq!(graph.components, 2);
    assert_eq!(graph.diameter, None);
    assert_eq!(graph.average_path_length, None);
    assert_eq!(graph.giant_nodes, 10);
    assert_eq!(graph.giant_edges, 21);
    assert!(graph.modularity.unwrap() > 0.4);
  }

  #[test]
  fn non_convergence_leaves_column_empty() {
    let dataset = two_triangles_dataset();
    let config = MetricsConfig {
      eigenvector_max_iter: 1,
      tolerance: 1e-15,
      ..fast_config()
    };
    let metrics = NodeMetrics::compute(&dataset, &config);
    assert!(metrics.eigenvector.is_none());
    let rows = metrics.rows(&dataset);
    assert!(rows.iter().all(|r| r.eigenvector_centrality.is_none()));
    assert!(rows.iter().all(|r| r.katz_centrality.is_none()));
    assert!(rows.iter().all(|r| r.closeness_centrality.is_some()));
  }

  #[test]
  fn rows_sorted_and_round_trip() {
    let dataset = Dataset::new(
      (0..3).map(|id| NodeInput {
        id,
        attributes: crate::dataset::test::test_attributes(id),
      }),
      vec![(0, 1), (1, 2), (1, 42)],
    );
    let metrics = NodeMetrics::compute(&dataset, &fast_config());
    let rows = metrics.rows(&dataset);
    assert_eq!(rows[0].node, 1);
    assert_eq!(rows[0].degree, 3);
    let implicit = rows.iter().find(|r| r.node == 42).unwrap();
    assert_eq!(implicit.views, None);
    assert_eq!(implicit.partner, None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.csv");
    save_metrics(&path, &rows).unwrap();
    let loaded = load_metrics(&path).unwrap();
    assert_eq!(loaded.len(), rows.len());
    for (a, b) in loaded.iter().zip(&rows) {
      assert_eq!(a.node, b.node);
      assert_eq!(a.partner, b.partner);
      assert_eq!(a.broadcaster_type, b.broadcaster_type);
      assert_eq!(a.game_type, b.game_type);
      assert_eq!(a.louvain_community, b.louvain_community);
      assert_eq!(a.girvan_newman_community, b.girvan_newman_community);
      assert!((a.degree_centrality - b.degree_centrality).abs() < 1e-12);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("true") || text.contains("false"));
  }

  #[test]
  fn config_validation() {
    assert!(MetricsConfig::default().validate().is_ok());
    let config = MetricsConfig {
      katz_alpha: 1.5,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }
}
