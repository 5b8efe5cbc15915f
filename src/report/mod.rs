//! Static charts of the per country metrics table: histograms, donut
//! charts, correlation heatmaps and network drawings.

pub mod heatmap;
pub mod histogram;
pub mod network;
pub mod pie;
pub mod svg;

use crate::{community::Algorithm, dataset::Dataset, metrics::MetricsRow, Country};
use anyhow::{bail, Result};
use std::path::Path;
use tracing::{info, warn};

pub const HISTOGRAMS_DIR: &str = "histograms";
pub const PIE_CHARTS_DIR: &str = "pie_charts";
pub const CORRELATIONS_DIR: &str = "correlations";
pub const NETWORKS_DIR: &str = "networks";

#[derive(Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone)]
pub enum NumericColumn {
  Degree,
  DegreeCentrality,
  ClosenessCentrality,
  BetweennessCentrality,
  EigenvectorCentrality,
  PageRank,
  KatzCentrality,
  Clustering,
  CoreNumber,
  Views,
  Days,
}

impl NumericColumn {
  pub const ALL: [NumericColumn; 11] = [
    NumericColumn::Degree,
    NumericColumn::DegreeCentrality,
    NumericColumn::ClosenessCentrality,
    NumericColumn::BetweennessCentrality,
    NumericColumn::EigenvectorCentrality,
    NumericColumn::PageRank,
    NumericColumn::KatzCentrality,
    NumericColumn::Clustering,
    NumericColumn::CoreNumber,
    NumericColumn::Views,
    NumericColumn::Days,
  ];

  /// Header of the column in the metrics table.
  pub fn name(self) -> &'static str {
    match self {
      Self::Degree => "degree",
      Self::DegreeCentrality => "degree_centrality",
      Self::ClosenessCentrality => "closeness_centrality",
      Self::BetweennessCentrality => "betweenness_centrality",
      Self::EigenvectorCentrality => "eigenvector_centrality",
      Self::PageRank => "pagerank",
      Self::KatzCentrality => "katz_centrality",
      Self::Clustering => "clustering",
      Self::CoreNumber => "core_number",
      Self::Views => "views",
      Self::Days => "days",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Degree => "Degree",
      Self::DegreeCentrality => "Degree Centrality",
      Self::ClosenessCentrality => "Closeness Centrality",
      Self::BetweennessCentrality => "Betweenness Centrality",
      Self::EigenvectorCentrality => "Eigenvector Centrality",
      Self::PageRank => "PageRank",
      Self::KatzCentrality => "Katz Centrality",
      Self::Clustering => "Clustering Coefficient",
      Self::CoreNumber => "Core Number",
      Self::Views => "Views",
      Self::Days => "Days",
    }
  }

  pub fn value(self, row: &MetricsRow) -> Option<f64> {
    match self {
      Self::Degree => Some(row.degree as f64),
      Self::DegreeCentrality => Some(row.degree_centrality),
      Self::ClosenessCentrality => row.closeness_centrality,
      Self::BetweennessCentrality => row.betweenness_centrality,
      Self::EigenvectorCentrality => row.eigenvector_centrality,
      Self::PageRank => row.pagerank,
      Self::KatzCentrality => row.katz_centrality,
      Self::Clustering => Some(row.clustering),
      Self::CoreNumber => Some(row.core_number as f64),
      Self::Views => row.views.map(|v| v as f64),
      Self::Days => row.days.map(|d| d as f64),
    }
  }

  pub fn values(self, rows: &[MetricsRow]) -> Vec<Option<f64>> {
    rows.iter().map(|row| self.value(row)).collect()
  }
}

#[derive(Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone)]
pub enum CategoricalColumn {
  Partner,
  Mature,
  BroadcasterType,
  GameType,
  Community(Algorithm),
}

impl CategoricalColumn {
  pub const ALL: [CategoricalColumn; 8] = [
    CategoricalColumn::Partner,
    CategoricalColumn::Mature,
    CategoricalColumn::BroadcasterType,
    CategoricalColumn::GameType,
    CategoricalColumn::Community(Algorithm::Louvain),
    CategoricalColumn::Community(Algorithm::Leiden),
    CategoricalColumn::Community(Algorithm::LabelPropagation),
    CategoricalColumn::Community(Algorithm::GirvanNewman),
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Partner => "partner",
      Self::Mature => "mature",
      Self::BroadcasterType => "broadcaster_type",
      Self::GameType => "game_type",
      Self::Community(Algorithm::Louvain) => "louvain_community",
      Self::Community(Algorithm::Leiden) => "leiden_community",
      Self::Community(Algorithm::LabelPropagation) => {
        "label_propagation_community"
      }
      Self::Community(Algorithm::GirvanNewman) => "girvan_newman_community",
    }
  }

  pub fn title(self) -> String {
    match self {
      Self::Partner => "Partner".to_owned(),
      Self::Mature => "Mature Content".to_owned(),
      Self::BroadcasterType => "Broadcaster Type".to_owned(),
      Self::GameType => "Game Type".to_owned(),
      Self::Community(algorithm) => format!("Communities ({})", algorithm),
    }
  }

  pub fn value(self, row: &MetricsRow) -> Option<String> {
    match self {
      Self::Partner => row.partner.map(|p| p.to_string()),
      Self::Mature => row.mature.map(|m| m.to_string()),
      Self::BroadcasterType => row.broadcaster_type.map(|t| t.to_string()),
      Self::GameType => row.game_type.map(|t| t.to_string()),
      Self::Community(algorithm) => row.community(algorithm).map(|c| c.to_string()),
    }
  }

  pub fn values(self, rows: &[MetricsRow]) -> Vec<Option<String>> {
    rows.iter().map(|row| self.value(row)).collect()
  }
}

/// Parameters of the report, defaults follow the published charts.
#[derive(Clone, Debug)]
pub struct ReportConfig {
  pub bins: usize,
  /// share of nodes (by views) in the network drawing, in percent
  pub top_percent: f64,
  pub layout_iterations: usize,
  pub seed: u64,
  pub community_algorithm: Algorithm,
  /// degree centrality, within the filtered graph, a node needs to be drawn
  pub degree_threshold: f64,
  pub mature_only: bool,
  pub partner_only: bool,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      bins: 30,
      top_percent: 15.,
      layout_iterations: 50,
      seed: 42,
      community_algorithm: Algorithm::Leiden,
      degree_threshold: 0.0025,
      mature_only: false,
      partner_only: false,
    }
  }
}

impl ReportConfig {
  pub fn validate(&self) -> Result<()> {
    if self.bins == 0 {
      bail!("need at least one histogram bin");
    }
    if !(self.top_percent > 0. && self.top_percent <= 100.) {
      bail!("top percent must be in (0, 100], got {}", self.top_percent);
    }
    Ok(())
  }
}

/// Writes every chart of one country under `out_dir`.
pub fn render_country(
  country: Country,
  dataset: &Dataset,
  rows: &[MetricsRow],
  out_dir: &Path,
  config: &ReportConfig,
) -> Result<()> {
  config.validate()?;

  let histograms = out_dir.join(HISTOGRAMS_DIR);
  let mut drawn = 0;
  for &column in &NumericColumn::ALL {
    let values: Vec<f64> = column.values(rows).into_iter().flatten().collect();
    match histogram::Histogram::compute(&values, config.bins) {
      Some(hist) => {
        hist.save(&histograms, column, country)?;
        drawn += 1;
      }
      None => warn!("{}: no values for {}, skipping histogram", country, column.name()),
    }
  }
  info!("{}: {} histograms", country, drawn);

  let pies = out_dir.join(PIE_CHARTS_DIR);
  for &column in &[
    CategoricalColumn::Partner,
    CategoricalColumn::Mature,
    CategoricalColumn::BroadcasterType,
    CategoricalColumn::GameType,
    CategoricalColumn::Community(config.community_algorithm),
  ] {
    let slices = pie::value_counts(column.values(rows).into_iter().flatten());
    if slices.is_empty() {
      warn!("{}: no values for {}, skipping pie chart", country, column.name());
      continue;
    }
    pie::save_pie(&pies, column, country, &slices)?;
  }

  heatmap::save_heatmaps(&out_dir.join(CORRELATIONS_DIR), country, rows)?;

  let networks = out_dir.join(NETWORKS_DIR);
  network::save_top_viewed(&networks, country, dataset, config)?;
  network::save_communities(&networks, country, dataset, rows, config)?;

  info!("{}: report written to {}", country, out_dir.display());
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    dataset::test::two_cliques_dataset,
    metrics::{MetricsConfig, NodeMetrics},
  };

  pub(super) fn two_cliques_rows() -> (Dataset, Vec<MetricsRow>) {
    let dataset = two_cliques_dataset();
    let config = MetricsConfig {
      katz: false,
      ..Default::default()
    };
    let rows = NodeMetrics::compute(&dataset, &config).rows(&dataset);
    (dataset, rows)
  }

  #[test]
  fn column_values() {
    let (_, rows) = two_cliques_rows();
    assert!(NumericColumn::KatzCentrality
      .values(&rows)
      .iter()
      .all(Option::is_none));
    assert!(NumericColumn::Degree.values(&rows).iter().all(Option::is_some));
    let communities =
      CategoricalColumn::Community(Algorithm::Louvain).values(&rows);
    assert!(communities.iter().all(Option::is_some));
    assert_eq!(CategoricalColumn::GameType.name(), "game_type");
  }

  #[test]
  fn writes_every_kind() {
    let (dataset, rows) = two_cliques_rows();
    let dir = tempfile::tempdir().unwrap();
    let config = ReportConfig {
      top_percent: 50.,
      degree_threshold: 0.,
      ..Default::default()
    };
    render_country(Country::Es, &dataset, &rows, dir.path(), &config).unwrap();

    let exists = |kind: &str, name: &str| dir.path().join(kind).join(name).exists();
    assert!(exists(HISTOGRAMS_DIR, "degree_ES.svg"));
    assert!(exists(HISTOGRAMS_DIR, "degree_ES.csv"));
    assert!(!exists(HISTOGRAMS_DIR, "katz_centrality_ES.svg"));
    assert!(exists(PIE_CHARTS_DIR, "leiden_community_ES.svg"));
    assert!(exists(CORRELATIONS_DIR, "pearson_ES.csv"));
    assert!(exists(CORRELATIONS_DIR, "mixed_ES.svg"));
    assert!(exists(NETWORKS_DIR, "subgraph_ES.svg"));
    assert!(exists(NETWORKS_DIR, "subgraph_ES.dot"));
    assert!(exists(NETWORKS_DIR, "communities_ES.svg"));
  }

  #[test]
  fn bad_config() {
    let config = ReportConfig {
      top_percent: 0.,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }
}
