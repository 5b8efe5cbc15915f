use anyhow::{Context, Result};
use std::path::PathBuf;
use structopt::StructOpt;
use twitch_net::{
  community::Algorithm,
  config::{init_tracing, DataPaths},
  dataset::Dataset,
  metrics::load_metrics,
  report::{render_country, ReportConfig},
  Country,
};

#[derive(StructOpt)]
#[structopt(
  name = "render_report",
  about = "draw histograms, pie charts, heatmaps and networks from the metrics csv files"
)]
struct Opt {
  /// Countries to draw, all of them by default.
  #[structopt(long, use_delimiter = true)]
  countries: Vec<Country>,

  #[structopt(long, parse(from_os_str))]
  data_dir: Option<PathBuf>,

  #[structopt(long, parse(from_os_str))]
  output_dir: Option<PathBuf>,

  #[structopt(long, default_value = "30")]
  bins: usize,

  /// Percentage of the nodes, by views, in the network drawing.
  #[structopt(long, default_value = "15")]
  top_percent: f64,

  #[structopt(long, default_value = "50")]
  layout_iterations: usize,

  #[structopt(long, default_value = "42")]
  seed: u64,

  /// Partition used for the community pie chart and drawing.
  #[structopt(long, default_value = "leiden")]
  community_algorithm: Algorithm,

  /// Minimum degree centrality, within the filtered graph, of nodes in the
  /// community drawing.
  #[structopt(long, default_value = "0.0025")]
  degree_threshold: f64,

  /// Only draw mature channels in the community drawing.
  #[structopt(long)]
  mature_only: bool,

  /// Only draw partner channels in the community drawing.
  #[structopt(long)]
  partner_only: bool,
}

pub fn main() -> Result<()> {
  init_tracing();
  let opt = Opt::from_args();
  let paths = DataPaths::from_env()
    .with_overrides(opt.data_dir.clone(), opt.output_dir.clone());
  let config = ReportConfig {
    bins: opt.bins,
    top_percent: opt.top_percent,
    layout_iterations: opt.layout_iterations,
    seed: opt.seed,
    community_algorithm: opt.community_algorithm,
    degree_threshold: opt.degree_threshold,
    mature_only: opt.mature_only,
    partner_only: opt.partner_only,
  };
  config.validate()?;

  let countries = if opt.countries.is_empty() {
    Country::ALL.to_vec()
  } else {
    opt.countries.clone()
  };

  for country in countries {
    let dataset = Dataset::load(&paths, country)?;
    let metrics_path = paths.metrics_csv(country);
    let rows = load_metrics(&metrics_path).with_context(|| {
      format!(
        "no metrics for {}, run country_metrics first",
        country
      )
    })?;
    render_country(
      country,
      &dataset,
      &rows,
      &paths.country_dir(country),
      &config,
    )?;
  }

  Ok(())
}
