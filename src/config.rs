use crate::{
  community::{Algorithm, CommunityConfig},
  metrics::MetricsConfig,
  output_data::resolve_input,
  Country,
};
use std::{env, path::PathBuf};
use structopt::StructOpt;

/// Input and output locations. Read from the environment (and `.env`), the
/// binaries allow overriding both.
#[derive(Clone, Debug)]
pub struct DataPaths {
  pub data_dir: PathBuf,
  pub output_dir: PathBuf,
}

impl DataPaths {
  pub fn from_env() -> Self {
    dotenv::dotenv().ok();

    Self {
      data_dir: env::var("TWITCH_DATA_DIR")
        .unwrap_or_else(|_| "data".to_owned())
        .into(),
      output_dir: env::var("TWITCH_OUTPUT_DIR")
        .unwrap_or_else(|_| "output_data".to_owned())
        .into(),
    }
  }

  #[must_use]
  pub fn with_overrides(
    mut self,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
  ) -> Self {
    if let Some(data_dir) = data_dir {
      self.data_dir = data_dir;
    }
    if let Some(output_dir) = output_dir {
      self.output_dir = output_dir;
    }
    self
  }

  pub fn target_csv(&self, country: Country) -> PathBuf {
    resolve_input(
      self
        .data_dir
        .join(country.code())
        .join(format!("musae_{}_target.csv", country)),
    )
  }

  pub fn edges_csv(&self, country: Country) -> PathBuf {
    resolve_input(
      self
        .data_dir
        .join(country.code())
        .join(format!("musae_{}_edges.csv", country)),
    )
  }

  pub fn country_dir(&self, country: Country) -> PathBuf {
    self.output_dir.join(country.code())
  }

  pub fn metrics_csv(&self, country: Country) -> PathBuf {
    self
      .country_dir(country)
      .join(format!("twitch_network_metrics_{}.csv", country))
  }

  pub fn degrees_csv(&self, country: Country) -> PathBuf {
    self.country_dir(country).join("degrees.csv")
  }

  pub fn component_sizes_csv(&self, country: Country) -> PathBuf {
    self.country_dir(country).join("component_sizes.csv")
  }

  pub fn summary_csv(&self) -> PathBuf {
    self.output_dir.join("network_metrics_summary.csv")
  }
}

/// Flags shared by the binaries that compute metrics.
#[derive(StructOpt, Clone, Debug)]
pub struct MetricsOpt {
  /// Countries to process, all of them by default.
  #[structopt(long, use_delimiter = true)]
  pub countries: Vec<Country>,

  /// Overrides TWITCH_DATA_DIR.
  #[structopt(long, parse(from_os_str))]
  pub data_dir: Option<PathBuf>,

  /// Overrides TWITCH_OUTPUT_DIR.
  #[structopt(long, parse(from_os_str))]
  pub output_dir: Option<PathBuf>,

  /// Skip closeness and the path length statistics.
  #[structopt(long)]
  pub no_distances: bool,

  #[structopt(long)]
  pub no_betweenness: bool,

  #[structopt(long)]
  pub no_eigenvector: bool,

  #[structopt(long)]
  pub no_pagerank: bool,

  #[structopt(long)]
  pub no_katz: bool,

  /// Community algorithms to run (louvain, leiden, label_propagation,
  /// girvan_newman), all of them by default.
  #[structopt(long, use_delimiter = true)]
  pub algorithms: Vec<Algorithm>,

  #[structopt(long, default_value = "42")]
  pub seed: u64,

  /// Modularity resolution of Louvain and Leiden.
  #[structopt(long, default_value = "1")]
  pub resolution: f64,

  #[structopt(long, default_value = "2")]
  pub leiden_iterations: usize,

  /// Girvan-Newman is skipped on graphs with more nodes than this.
  #[structopt(long, default_value = "2000")]
  pub girvan_newman_node_limit: usize,

  #[structopt(long, default_value = "0.85")]
  pub pagerank_alpha: f64,

  #[structopt(long, default_value = "0.1")]
  pub katz_alpha: f64,

  #[structopt(long, default_value = "1e-6")]
  pub tolerance: f64,
}

impl MetricsOpt {
  pub fn paths(&self) -> DataPaths {
    DataPaths::from_env()
      .with_overrides(self.data_dir.clone(), self.output_dir.clone())
  }

  pub fn countries(&self) -> Vec<Country> {
    if self.countries.is_empty() {
      Country::ALL.to_vec()
    } else {
      self.countries.clone()
    }
  }

  pub fn metrics_config(&self) -> anyhow::Result<MetricsConfig> {
    let defaults = MetricsConfig::default();
    let config = MetricsConfig {
      distances: !self.no_distances,
      betweenness: !self.no_betweenness,
      eigenvector: !self.no_eigenvector,
      pagerank: !self.no_pagerank,
      katz: !self.no_katz,
      algorithms: if self.algorithms.is_empty() {
        Algorithm::ALL.to_vec()
      } else {
        self.algorithms.clone()
      },
      pagerank_alpha: self.pagerank_alpha,
      katz_alpha: self.katz_alpha,
      tolerance: self.tolerance,
      community: CommunityConfig {
        seed: self.seed,
        resolution: self.resolution,
        leiden_iterations: self.leiden_iterations,
        girvan_newman_node_limit: self.girvan_newman_node_limit,
        ..defaults.community.clone()
      },
      ..defaults
    };
    config.validate()?;
    Ok(config)
  }
}

/// Installs the fmt subscriber, `RUST_LOG` overrides the default level.
pub fn init_tracing() {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("twitch_net=info"));
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_layout() {
    let paths = DataPaths {
      data_dir: "in".into(),
      output_dir: "out".into(),
    };
    assert_eq!(
      paths.edges_csv(Country::De),
      PathBuf::from("in/DE/musae_DE_edges.csv")
    );
    assert_eq!(
      paths.metrics_csv(Country::Ptbr),
      PathBuf::from("out/PTBR/twitch_network_metrics_PTBR.csv")
    );
    assert_eq!(
      paths.summary_csv(),
      PathBuf::from("out/network_metrics_summary.csv")
    );
  }

  #[test]
  fn metrics_flags() {
    let opt = MetricsOpt::from_iter(&[
      "country_metrics",
      "--countries",
      "de,ptbr",
      "--no-katz",
      "--algorithms",
      "lv,leiden",
      "--seed",
      "7",
    ]);
    assert_eq!(opt.countries(), vec![Country::De, Country::Ptbr]);
    let config = opt.metrics_config().unwrap();
    assert!(!config.katz);
    assert!(config.betweenness);
    assert_eq!(config.algorithms, vec![Algorithm::Louvain, Algorithm::Leiden]);
    assert_eq!(config.community.seed, 7);

    let all = MetricsOpt::from_iter(&["country_metrics"]);
    assert_eq!(all.countries(), Country::ALL.to_vec());
    assert_eq!(all.metrics_config().unwrap().algorithms.len(), 4);

    let bad = MetricsOpt::from_iter(&["country_metrics", "--katz-alpha", "2"]);
    assert!(bad.metrics_config().is_err());
    assert!(
      MetricsOpt::from_iter_safe(&["country_metrics", "--countries", "us"])
        .is_err()
    );
  }

  #[test]
  fn overrides() {
    let paths = DataPaths {
      data_dir: "in".into(),
      output_dir: "out".into(),
    }
    .with_overrides(None, Some("elsewhere".into()));
    assert_eq!(paths.data_dir, PathBuf::from("in"));
    assert_eq!(paths.output_dir, PathBuf::from("elsewhere"));
  }
}
