use crate::{
  dataset::Dataset,
  game_type::GameType,
  metrics::GraphMetrics,
  output_data::{load_items, save_items},
  stats, BroadcasterType, Country,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Counts and view statistics over the node table rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeStats {
  pub mature: usize,
  pub non_mature: usize,
  pub partner: usize,
  pub non_partner: usize,
  pub views_mean: f64,
  pub views_std: f64,
  pub views_total: u64,
  pub broadcaster_types: [usize; 4],
  pub game_types: [usize; 4],
}

impl AttributeStats {
  pub fn compute(dataset: &Dataset) -> Self {
    let mut out = Self::default();
    let mut views = Vec::new();
    for attributes in dataset.attributes().iter().flatten() {
      if attributes.mature {
        out.mature += 1;
      } else {
        out.non_mature += 1;
      }
      if attributes.partner {
        out.partner += 1;
      } else {
        out.non_partner += 1;
      }
      views.push(attributes.views as f64);
      out.views_total += attributes.views;

      let broadcaster = BroadcasterType::ALL
        .iter()
        .position(|&t| t == attributes.broadcaster_type);
      if let Some(i) = broadcaster {
        out.broadcaster_types[i] += 1;
      }
      let game_type = GameType::of(attributes.game_name.as_ref().map(String::as_str));
      if let Some(i) = GameType::ALL.iter().position(|&t| t == game_type) {
        out.game_types[i] += 1;
      }
    }
    out.views_mean = stats::mean(&views);
    out.views_std = stats::std_dev(&views);
    out
  }

  pub fn broadcaster_count(&self, broadcaster_type: BroadcasterType) -> usize {
    BroadcasterType::ALL
      .iter()
      .position(|&t| t == broadcaster_type)
      .map_or(0, |i| self.broadcaster_types[i])
  }

  pub fn game_type_count(&self, game_type: GameType) -> usize {
    GameType::ALL
      .iter()
      .position(|&t| t == game_type)
      .map_or(0, |i| self.game_types[i])
  }
}

/// One line of the cross country summary table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountrySummary {
  #[serde(rename = "Country")]
  pub country: String,
  #[serde(rename = "Number of Nodes")]
  pub nodes: usize,
  #[serde(rename = "Number of Edges")]
  pub edges: usize,
  #[serde(rename = "Implicit Nodes")]
  pub implicit_nodes: usize,
  #[serde(rename = "Number of Components")]
  pub components: usize,
  #[serde(rename = "Diameter")]
  pub diameter: Option<usize>,
  #[serde(rename = "Radius")]
  pub radius: Option<usize>,
  #[serde(rename = "Density")]
  pub density: f64,
  #[serde(rename = "Average Clustering Coefficient")]
  pub average_clustering: f64,
  #[serde(rename = "Transitivity")]
  pub transitivity: f64,
  #[serde(rename = "Average Path Length")]
  pub average_path_length: Option<f64>,
  #[serde(rename = "Assortativity")]
  pub assortativity: Option<f64>,
  #[serde(rename = "Modularity")]
  pub modularity: Option<f64>,
  #[serde(rename = "Degree Centrality (mean)")]
  pub mean_degree_centrality: f64,
  #[serde(rename = "Betweenness Centrality (mean)")]
  pub mean_betweenness: Option<f64>,
  #[serde(rename = "Closeness Centrality (mean)")]
  pub mean_closeness: Option<f64>,
  #[serde(rename = "Eigenvector Centrality (mean)")]
  pub mean_eigenvector: Option<f64>,
  #[serde(rename = "PageRank Centrality (mean)")]
  pub mean_pagerank: Option<f64>,
  #[serde(rename = "Degree Centralization")]
  pub degree_centralization: Option<f64>,
  #[serde(rename = "Betweenness Centralization")]
  pub betweenness_centralization: Option<f64>,
  #[serde(rename = "Reciprocity")]
  pub reciprocity: Option<f64>,
  #[serde(rename = "Degree Std")]
  pub degree_std: f64,
  #[serde(rename = "Degree Skewness")]
  pub degree_skewness: Option<f64>,
  #[serde(rename = "Heterogeneity")]
  pub heterogeneity: Option<f64>,
  #[serde(rename = "Global Efficiency")]
  pub global_efficiency: Option<f64>,
  #[serde(rename = "Giant Component Nodes")]
  pub giant_nodes: usize,
  #[serde(rename = "Giant Component Edges")]
  pub giant_edges: usize,
  #[serde(rename = "K-Core K")]
  pub k_core: usize,
  #[serde(rename = "Number of Nodes in K-Core")]
  pub k_core_nodes: usize,
  #[serde(rename = "Number of Edges in K-Core")]
  pub k_core_edges: usize,
  #[serde(rename = "Number of Mature Nodes")]
  pub mature: usize,
  #[serde(rename = "Number of Non-Mature Nodes")]
  pub non_mature: usize,
  #[serde(rename = "Number of Partner Nodes")]
  pub partner: usize,
  #[serde(rename = "Number of Non-Partner Nodes")]
  pub non_partner: usize,
  #[serde(rename = "Average Views")]
  pub views_mean: f64,
  #[serde(rename = "Views Std")]
  pub views_std: f64,
  #[serde(rename = "Total Views")]
  pub views_total: u64,
  #[serde(rename = "Partner Broadcasters")]
  pub partner_broadcasters: usize,
  #[serde(rename = "Affiliate Broadcasters")]
  pub affiliate_broadcasters: usize,
  #[serde(rename = "Account Deleted Broadcasters")]
  pub account_deleted_broadcasters: usize,
  #[serde(rename = "Non-Streamer Broadcasters")]
  pub non_streamer_broadcasters: usize,
  #[serde(rename = "On-Videogame Channels")]
  pub online_channels: usize,
  #[serde(rename = "Off-Videogame Channels")]
  pub offline_channels: usize,
  #[serde(rename = "Non-Videogame Channels")]
  pub non_videogame_channels: usize,
  #[serde(rename = "Non-Content")]
  pub no_content_channels: usize,
}

impl CountrySummary {
  pub fn new(
    country: Country,
    dataset: &Dataset,
    graph: &GraphMetrics,
    attributes: &AttributeStats,
  ) -> Self {
    Self {
      country: country.to_string(),
      nodes: graph.nodes,
      edges: graph.edges,
      implicit_nodes: dataset.implicit_node_count(),
      components: graph.components,
      diameter: graph.diameter,
      radius: graph.radius,
      density: graph.density,
      average_clustering: graph.average_clustering,
      transitivity: graph.transitivity,
      average_path_length: graph.average_path_length,
      assortativity: graph.assortativity,
      modularity: graph.modularity,
      mean_degree_centrality: graph.mean_degree_centrality,
      mean_betweenness: graph.mean_betweenness,
      mean_closeness: graph.mean_closeness,
      mean_eigenvector: graph.mean_eigenvector,
      mean_pagerank: graph.mean_pagerank,
      degree_centralization: graph.degree_centralization,
      betweenness_centralization: graph.betweenness_centralization,
      reciprocity: graph.reciprocity,
      degree_std: graph.degree_std,
      degree_skewness: graph.degree_skewness,
      heterogeneity: graph.heterogeneity,
      global_efficiency: graph.global_efficiency,
      giant_nodes: graph.giant_nodes,
      giant_edges: graph.giant_edges,
      k_core: graph.k_core.k,
      k_core_nodes: graph.k_core.nodes,
      k_core_edges: graph.k_core.edges,
      mature: attributes.mature,
      non_mature: attributes.non_mature,
      partner: attributes.partner,
      non_partner: attributes.non_partner,
      views_mean: attributes.views_mean,
      views_std: attributes.views_std,
      views_total: attributes.views_total,
      partner_broadcasters: attributes
        .broadcaster_count(BroadcasterType::Partner),
      affiliate_broadcasters: attributes
        .broadcaster_count(BroadcasterType::Affiliate),
      account_deleted_broadcasters: attributes
        .broadcaster_count(BroadcasterType::AccountDeleted),
      non_streamer_broadcasters: attributes
        .broadcaster_count(BroadcasterType::NonStreamer),
      online_channels: attributes.game_type_count(GameType::Online),
      offline_channels: attributes.game_type_count(GameType::Offline),
      non_videogame_channels: attributes
        .game_type_count(GameType::NonVideogame),
      no_content_channels: attributes.game_type_count(GameType::NoContent),
    }
  }

  pub fn compute(
    country: Country,
    dataset: &Dataset,
    graph: &GraphMetrics,
  ) -> Self {
    Self::new(country, dataset, graph, &AttributeStats::compute(dataset))
  }
}

/// Overwrites `path` with one line per summary, in the given order.
pub fn save_summaries(path: &Path, summaries: &[CountrySummary]) -> Result<()> {
  save_items(path, summaries)
    .with_context(|| format!("failed to save the summary to {}", path.display()))
}

pub fn load_summaries(path: &Path) -> Result<Vec<CountrySummary>> {
  load_items(path)?.collect()
}
