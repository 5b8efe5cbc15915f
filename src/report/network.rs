use super::{
  svg::{palette, Anchor, Svg, FOREGROUND},
  ReportConfig,
};
use crate::{
  centrality::degree_centrality, community::Algorithm, dataset::Dataset,
  metrics::MetricsRow, Adjacency, BroadcasterType, Country,
};
use anyhow::{Context, Result};
use fnv::FnvHashMap as Map;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use std::{
  borrow::Cow,
  fs::{self, File},
  io::{BufWriter, Write},
  path::Path,
};
use tracing::{info, warn};

/// Optimal distance between nodes in the force layout.
const SUBGRAPH_SPACING: f64 = 1.;
const COMMUNITY_SPACING: f64 = 0.7;
const MISSING_COLOR: &str = "#808080";
const EDGE_COLOR: &str = "#a9a9a9";

pub fn broadcaster_color(broadcaster_type: BroadcasterType) -> &'static str {
  match broadcaster_type {
    BroadcasterType::Partner => "#9146ff",
    BroadcasterType::Affiliate => "#00a9ff",
    BroadcasterType::AccountDeleted => "#e91916",
    BroadcasterType::NonStreamer => "#1fe5b6",
  }
}

/// Fruchterman–Reingold force directed layout from seeded uniform random
/// positions, rescaled so coordinates lie in `[-1, 1]` around the origin.
pub fn fruchterman_reingold(
  adjacency: &Adjacency,
  spacing: f64,
  iterations: usize,
  seed: u64,
) -> Vec<[f64; 2]> {
  let n = adjacency.node_count();
  let mut rng = StdRng::seed_from_u64(seed);
  let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen(), rng.gen()]).collect();
  if n == 0 {
    return pos;
  }

  let extent = |pos: &[[f64; 2]], axis: usize| {
    let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
      (lo.min(p[axis]), hi.max(p[axis]))
    });
    hi - lo
  };
  let mut temperature = extent(&pos, 0).max(extent(&pos, 1)) * 0.1;
  let cooling = temperature / (iterations + 1) as f64;

  for _ in 0..iterations {
    let moves: Vec<[f64; 2]> = (0..n)
      .into_par_iter()
      .map(|i| {
        let mut disp = [0., 0.];
        for j in 0..n {
          if i == j {
            continue;
          }
          let delta = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
          let distance = delta[0].hypot(delta[1]).max(0.01);
          let attraction = if adjacency.has_edge(i, j) {
            distance / spacing
          } else {
            0.
          };
          let force = spacing * spacing / (distance * distance) - attraction;
          disp[0] += delta[0] * force;
          disp[1] += delta[1] * force;
        }
        let length = disp[0].hypot(disp[1]);
        let length = if length < 0.01 { 0.1 } else { length };
        [disp[0] * temperature / length, disp[1] * temperature / length]
      })
      .collect();

    let mut total = 0.;
    for (p, m) in pos.iter_mut().zip(&moves) {
      p[0] += m[0];
      p[1] += m[1];
      total += m[0].hypot(m[1]);
    }
    temperature -= cooling;
    if total / (n as f64) < 1e-4 {
      break;
    }
  }

  let center = pos.iter().fold([0., 0.], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
  let center = [center[0] / n as f64, center[1] / n as f64];
  let mut scale: f64 = 0.;
  for p in pos.iter_mut() {
    p[0] -= center[0];
    p[1] -= center[1];
    scale = scale.max(p[0].abs()).max(p[1].abs());
  }
  if scale > 0. {
    for p in pos.iter_mut() {
      p[0] /= scale;
      p[1] /= scale;
    }
  }
  pos
}

/// Top `percent` of the nodes by views, then up to half as many of their
/// neighbours (lowest index first). Implicit nodes rank last.
pub fn top_viewed(dataset: &Dataset, percent: f64) -> Vec<usize> {
  let count = (dataset.node_count() as f64 * percent / 100.) as usize;
  let views = |node: usize| dataset.attributes()[node].as_ref().map(|a| a.views);

  let mut order: Vec<usize> = (0..dataset.node_count()).collect();
  order.sort_by(|&a, &b| views(b).cmp(&views(a)));
  order.truncate(count);

  let mut selected = vec![false; dataset.node_count()];
  for &node in &order {
    selected[node] = true;
  }
  let mut neighbors: Vec<usize> = order
    .iter()
    .flat_map(|&node| dataset.adjacency().neighbors(node).iter().cloned())
    .filter(|&other| !selected[other])
    .collect();
  neighbors.sort_unstable();
  neighbors.dedup();
  neighbors.truncate(count / 2);

  order.extend(neighbors);
  order
}

struct Canvas {
  size: f64,
  margin: f64,
}

impl Canvas {
  fn place(&self, p: [f64; 2]) -> [f64; 2] {
    let half = (self.size - 2. * self.margin) / 2.;
    [
      self.margin + half + p[0] * half,
      self.margin + half + p[1] * half,
    ]
  }
}

fn draw_edges(svg: &mut Svg, adjacency: &Adjacency, points: &[[f64; 2]], width: f64) {
  svg.begin_group(0.2);
  for [a, b] in adjacency.edges() {
    svg.line(points[a], points[b], EDGE_COLOR, width, false);
  }
  svg.end_group();
}

/// Radius from min-max scaled views, constant views give the smallest size.
fn view_radii(dataset: &Dataset) -> Vec<f64> {
  let views: Vec<f64> = dataset
    .attributes()
    .iter()
    .map(|a| a.as_ref().map_or(0., |a| a.views as f64))
    .collect();
  let min = views.iter().cloned().fold(f64::INFINITY, f64::min);
  let max = views.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  views
    .iter()
    .map(|&v| {
      let scaled = if max > min { (v - min) / (max - min) } else { 0. };
      (100. + 1500. * scaled).sqrt() / 2.
    })
    .collect()
}

pub fn render_top_viewed(title: &str, subgraph: &Dataset, positions: &[[f64; 2]]) -> Svg {
  let canvas = Canvas {
    size: 1000.,
    margin: 60.,
  };
  let mut svg = Svg::new(canvas.size + 220., canvas.size);
  svg.title(title);

  let points: Vec<_> = positions.iter().map(|&p| canvas.place(p)).collect();
  draw_edges(&mut svg, subgraph.adjacency(), &points, 0.8);

  let radii = view_radii(subgraph);
  svg.begin_group(0.9);
  for (node, attributes) in subgraph.attributes().iter().enumerate() {
    let [x, y] = points[node];
    let r = radii[node];
    let color = attributes
      .as_ref()
      .map_or(MISSING_COLOR, |a| broadcaster_color(a.broadcaster_type));
    if attributes.as_ref().map_or(false, |a| a.mature) {
      svg.rect(x - r, y - r, 2. * r, 2. * r, color, Some("white"));
    } else {
      svg.circle(x, y, r, color, Some("white"));
    }
  }
  svg.end_group();

  let left = canvas.size + 20.;
  svg.text(left, 80., 14., Anchor::Start, FOREGROUND, "broadcaster type");
  for (i, &t) in BroadcasterType::ALL.iter().enumerate() {
    let y = 106. + 24. * i as f64;
    svg.circle(left + 8., y - 4., 7., broadcaster_color(t), Some("white"));
    svg.text(left + 22., y, 13., Anchor::Start, FOREGROUND, t.name());
  }
  svg.text(left, 230., 14., Anchor::Start, FOREGROUND, "mature");
  svg.rect(left + 1., 244., 14., 14., MISSING_COLOR, Some("white"));
  svg.text(left + 22., 256., 13., Anchor::Start, FOREGROUND, "square: mature");
  svg.circle(left + 8., 276., 7., MISSING_COLOR, Some("white"));
  svg.text(left + 22., 280., 13., Anchor::Start, FOREGROUND, "circle: not mature");
  svg
}

pub fn render_communities(
  title: &str,
  subgraph: &Dataset,
  positions: &[[f64; 2]],
  labels: &[Option<usize>],
) -> Svg {
  let canvas = Canvas {
    size: 1000.,
    margin: 40.,
  };
  let mut svg = Svg::new(canvas.size, canvas.size);
  svg.title(title);

  let points: Vec<_> = positions.iter().map(|&p| canvas.place(p)).collect();
  draw_edges(&mut svg, subgraph.adjacency(), &points, 0.2);

  svg.begin_group(0.7);
  for (node, &[x, y]) in points.iter().enumerate() {
    let color = labels[node].map_or(MISSING_COLOR, palette);
    svg.circle(x, y, 4., color, None);
  }
  svg.end_group();
  svg
}

/// Undirected DOT view of a dataset, nodes named by id.
struct DotGraph<'a> {
  dataset: &'a Dataset,
}

type DotEdge = [usize; 2];

impl<'a> dot::Labeller<'a, usize, DotEdge> for DotGraph<'a> {
  fn graph_id(&'a self) -> dot::Id<'a> {
    dot::Id::new("twitch").unwrap_or_else(|()| unreachable!())
  }

  fn node_id(&'a self, n: &usize) -> dot::Id<'a> {
    let id = self.dataset.ids()[*n];
    dot::Id::new(format!("n{}", id))
      .unwrap_or_else(|()| panic!("no dot id for node {}", id))
  }

  fn node_label(&'a self, n: &usize) -> dot::LabelText<'a> {
    let label = match &self.dataset.attributes()[*n] {
      Some(a) => format!("{} ({} views)", self.dataset.ids()[*n], a.views),
      None => self.dataset.ids()[*n].to_string(),
    };
    dot::LabelText::LabelStr(Cow::Owned(label))
  }

  fn node_shape(&'a self, n: &usize) -> Option<dot::LabelText<'a>> {
    let mature = self.dataset.attributes()[*n]
      .as_ref()
      .map_or(false, |a| a.mature);
    let shape = if mature { "box" } else { "ellipse" };
    Some(dot::LabelText::LabelStr(Cow::Borrowed(shape)))
  }

  fn kind(&self) -> dot::Kind {
    dot::Kind::Graph
  }
}

impl<'a> dot::GraphWalk<'a, usize, DotEdge> for DotGraph<'a> {
  fn nodes(&'a self) -> dot::Nodes<'a, usize> {
    Cow::Owned((0..self.dataset.node_count()).collect())
  }

  fn edges(&'a self) -> dot::Edges<'a, DotEdge> {
    Cow::Owned(self.dataset.adjacency().edges().collect())
  }

  fn source(&'a self, edge: &DotEdge) -> usize {
    edge[0]
  }

  fn target(&'a self, edge: &DotEdge) -> usize {
    edge[1]
  }
}

pub fn save_dot(dataset: &Dataset, path: &Path) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  let file = File::create(path)
    .with_context(|| format!("failed to create {}", path.display()))?;
  let mut writer = BufWriter::new(file);
  dot::render(&DotGraph { dataset }, &mut writer)?;
  writer.flush()?;
  Ok(())
}

/// `subgraph_<country>.svg` and `.dot` of the most viewed channels.
pub fn save_top_viewed(
  dir: &Path,
  country: Country,
  dataset: &Dataset,
  config: &ReportConfig,
) -> Result<()> {
  let nodes = top_viewed(dataset, config.top_percent);
  if nodes.is_empty() {
    warn!("{}: top {}% is empty, skipping the network drawing", country, config.top_percent);
    return Ok(());
  }
  let subgraph = dataset.subgraph(nodes);
  info!(
    "{}: drawing {} nodes and {} edges",
    country,
    subgraph.node_count(),
    subgraph.edge_count()
  );

  let positions = fruchterman_reingold(
    subgraph.adjacency(),
    SUBGRAPH_SPACING,
    config.layout_iterations,
    config.seed,
  );
  let stem = format!("subgraph_{}", country);
  render_top_viewed(&format!("Twitch network {}", country), &subgraph, &positions)
    .save(&dir.join(format!("{}.svg", stem)))?;
  save_dot(&subgraph, &dir.join(format!("{}.dot", stem)))
}

/// Nodes passing the flag filters whose degree centrality, within the
/// filtered graph, is above the threshold.
pub fn community_subgraph(dataset: &Dataset, rows: &[MetricsRow], config: &ReportConfig) -> Dataset {
  let keep = rows
    .iter()
    .filter(|row| !config.mature_only || row.mature == Some(true))
    .filter(|row| !config.partner_only || row.partner == Some(true))
    .filter_map(|row| dataset.find_node(row.node));
  let filtered = dataset.subgraph(keep);
  let centrality = degree_centrality(filtered.adjacency());
  filtered.subgraph(
    centrality
      .iter()
      .enumerate()
      .filter(|&(_, &c)| c > config.degree_threshold)
      .map(|(node, _)| node),
  )
}

pub fn save_communities(
  dir: &Path,
  country: Country,
  dataset: &Dataset,
  rows: &[MetricsRow],
  config: &ReportConfig,
) -> Result<()> {
  let algorithm: Algorithm = config.community_algorithm;
  let subgraph = community_subgraph(dataset, rows, config);
  if subgraph.node_count() == 0 {
    warn!("{}: no node passes the community drawing filters", country);
    return Ok(());
  }

  let by_id: Map<u64, Option<usize>> =
    rows.iter().map(|row| (row.node, row.community(algorithm))).collect();
  let labels: Vec<Option<usize>> = subgraph
    .ids()
    .iter()
    .map(|id| by_id.get(id).cloned().flatten())
    .collect();

  let positions = fruchterman_reingold(
    subgraph.adjacency(),
    COMMUNITY_SPACING,
    config.layout_iterations,
    config.seed,
  );
  render_communities(
    &format!("Communities ({}) {}", algorithm, country),
    &subgraph,
    &positions,
    &labels,
  )
  .save(&dir.join(format!("communities_{}.svg", country)))
}
