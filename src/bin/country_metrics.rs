use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::info;
use twitch_net::{
  component_sizes_csv::save_component_sizes,
  components::ComponentLabels,
  config::{init_tracing, MetricsOpt},
  dataset::Dataset,
  degree_dist_csv::save_degree_dist,
  metrics::{save_metrics, NodeMetrics},
};

#[derive(StructOpt)]
#[structopt(
  name = "country_metrics",
  about = "compute per node metrics and communities, one csv per country"
)]
struct Opt {
  #[structopt(flatten)]
  metrics: MetricsOpt,

  /// Also save the degree distribution and the component sizes.
  #[structopt(long)]
  distributions: bool,
}

pub fn main() -> Result<()> {
  init_tracing();
  let opt = Opt::from_args();
  let paths = opt.metrics.paths();
  let config = opt.metrics.metrics_config()?;

  for country in opt.metrics.countries() {
    let dataset = Dataset::load(&paths, country)?;

    if opt.distributions {
      save_degree_dist(&dataset, &paths.degrees_csv(country))?;
      save_component_sizes(
        &ComponentLabels::compute(dataset.adjacency()),
        &paths.component_sizes_csv(country),
      )?;
    }

    let rows = NodeMetrics::compute(&dataset, &config).rows(&dataset);
    let path = paths.metrics_csv(country);
    save_metrics(&path, &rows)
      .with_context(|| format!("failed to save the {} metrics", country))?;
    info!("{}: wrote {}", country, path.display());
  }

  Ok(())
}
