use anyhow::Result;
use structopt::StructOpt;
use tracing::info;
use twitch_net::{
  config::{init_tracing, MetricsOpt},
  dataset::Dataset,
  metrics::{save_metrics, GraphMetrics, NodeMetrics},
  summary::{save_summaries, CountrySummary},
};

#[derive(StructOpt)]
#[structopt(
  name = "network_summary",
  about = "compute whole graph statistics of every country into one summary csv"
)]
struct Opt {
  #[structopt(flatten)]
  metrics: MetricsOpt,

  /// Also write the per node metrics of each country.
  #[structopt(long)]
  save_metrics: bool,
}

pub fn main() -> Result<()> {
  init_tracing();
  let opt = Opt::from_args();
  let paths = opt.metrics.paths();
  let config = opt.metrics.metrics_config()?;

  let mut summaries = Vec::new();
  for country in opt.metrics.countries() {
    let dataset = Dataset::load(&paths, country)?;
    let metrics = NodeMetrics::compute(&dataset, &config);
    if opt.save_metrics {
      save_metrics(&paths.metrics_csv(country), &metrics.rows(&dataset))?;
    }
    let graph =
      GraphMetrics::compute(&dataset, &metrics, config.community.resolution);
    summaries.push(CountrySummary::compute(country, &dataset, &graph));
  }

  let path = paths.summary_csv();
  save_summaries(&path, &summaries)?;
  info!("wrote {} countries to {}", summaries.len(), path.display());

  Ok(())
}
