use crate::{progress_bar::sources_bar, traversal::Bfs, Adjacency};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::{error::Error, fmt};

/// A power iteration ran out of iterations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvergenceError {
  pub algorithm: &'static str,
  pub iterations: usize,
}

impl fmt::Display for ConvergenceError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} did not converge in {} iterations",
      self.algorithm, self.iterations
    )
  }
}

impl Error for ConvergenceError {}

pub fn degree_centrality(adjacency: &Adjacency) -> Vec<f64> {
  let n = adjacency.node_count();
  if n <= 1 {
    return vec![0.; n];
  }
  let scale = 1. / (n - 1) as f64;
  adjacency.iter().map(|l| l.len() as f64 * scale).collect()
}

const SOURCE_CHUNKS: usize = 64;

/// Runs `per_source` for every source and sums the `len` long accumulators.
/// Sources are split into a fixed number of chunks which are summed in
/// order, so the result does not depend on scheduling.
fn accumulate_sources<S: Send>(
  adjacency: &Adjacency,
  bar: ProgressBar,
  len: usize,
  init: impl Fn() -> S + Sync + Send,
  per_source: impl Fn(&mut S, usize, &mut [f64]) + Sync + Send,
) -> Vec<f64> {
  let n = adjacency.node_count();
  let chunk_size = ((n + SOURCE_CHUNKS - 1) / SOURCE_CHUNKS).max(1);

  let partials: Vec<Vec<f64>> = (0..n)
    .step_by(chunk_size)
    .collect::<Vec<_>>()
    .into_par_iter()
    .map(|start| {
      let mut state = init();
      let mut acc = vec![0.; len];
      for source in start..(start + chunk_size).min(n) {
        per_source(&mut state, source, &mut acc);
        bar.inc(1);
      }
      acc
    })
    .collect();
  bar.finish_and_clear();

  let mut out = vec![0.; len];
  for partial in partials {
    for (o, p) in out.iter_mut().zip(partial) {
      *o += p;
    }
  }
  out
}

struct BrandesState {
  bfs: Bfs,
  delta: Vec<f64>,
}

impl BrandesState {
  fn new(num_nodes: usize) -> Self {
    Self {
      bfs: Bfs::new(num_nodes),
      delta: vec![0.; num_nodes],
    }
  }

  /// Dependency accumulation from `source`. `on_pred` sees every shortest
  /// path dag edge `(pred, node)` with its share of the dependency.
  fn accumulate(
    &mut self,
    adjacency: &Adjacency,
    source: usize,
    mut on_node: impl FnMut(usize, f64),
    mut on_pred: impl FnMut(usize, usize, f64),
  ) {
    let Self { bfs, delta } = self;
    bfs.run_counting(adjacency, source);
    for &node in bfs.order() {
      delta[node] = 0.;
    }

    let dists = bfs.dists();
    let sigma = bfs.sigma();
    for &node in bfs.order().iter().rev() {
      let coeff = (1. + delta[node]) / sigma[node];
      for &pred in adjacency.neighbors(node) {
        if dists[pred].wrapping_add(1) == dists[node] {
          let share = sigma[pred] * coeff;
          on_pred(pred, node, share);
          delta[pred] += share;
        }
      }
      if node != source {
        on_node(node, delta[node]);
      }
    }
  }
}

/// Brandes betweenness. Normalised by `1 / ((n - 1)(n - 2))` when `n > 2`.
pub fn betweenness_centrality(adjacency: &Adjacency) -> Vec<f64> {
  let n = adjacency.node_count();
  let mut out = accumulate_sources(
    adjacency,
    sources_bar("betweenness", n),
    n,
    || BrandesState::new(n),
    |state, source, acc| {
      state.accumulate(
        adjacency,
        source,
        |node, delta| acc[node] += delta,
        |_, _, _| {},
      )
    },
  );

  let scale = if n > 2 {
    1. / ((n - 1) * (n - 2)) as f64
  } else {
    0.5
  };
  out.iter_mut().for_each(|v| *v *= scale);
  out
}

/// Unnormalised edge betweenness (each unordered pair counted once), in
/// `adjacency.edges()` order. Runs repeatedly inside Girvan–Newman, so no
/// bar is drawn.
pub fn edge_betweenness(adjacency: &Adjacency) -> Vec<f64> {
  let n = adjacency.node_count();
  let per_slot = accumulate_sources(
    adjacency,
    ProgressBar::hidden(),
    adjacency.slot_count(),
    || BrandesState::new(n),
    |state, source, acc| {
      state.accumulate(
        adjacency,
        source,
        |_, _| {},
        |pred, node, share| {
          if let Some(slot) = adjacency.slot(pred, node) {
            acc[slot] += share;
          }
        },
      )
    },
  );

  adjacency
    .edges()
    .map(|[a, b]| {
      let forward = adjacency.slot(a, b).map_or(0., |s| per_slot[s]);
      let backward = adjacency.slot(b, a).map_or(0., |s| per_slot[s]);
      0.5 * (forward + backward)
    })
    .collect()
}

fn l1_diff(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

fn l2_normalise(x: &mut [f64]) {
  let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
  if norm > 0. {
    x.iter_mut().for_each(|v| *v /= norm);
  }
}

/// Power iteration on `A + I` starting from the uniform vector.
pub fn eigenvector_centrality(
  adjacency: &Adjacency,
  max_iter: usize,
  tol: f64,
) -> Result<Vec<f64>, ConvergenceError> {
  let n = adjacency.node_count();
  if n == 0 {
    return Ok(Vec::new());
  }

  let mut x = vec![1. / n as f64; n];
  for _ in 0..max_iter {
    let mut next = x.clone();
    for (node, neighbors) in adjacency.iter().enumerate() {
      for &neighbor in neighbors {
        next[neighbor] += x[node];
      }
    }
    l2_normalise(&mut next);

    let err = l1_diff(&next, &x);
    x = next;
    if err < n as f64 * tol {
      return Ok(x);
    }
  }

  Err(ConvergenceError {
    algorithm: "eigenvector centrality",
    iterations: max_iter,
  })
}

/// Dangling nodes spread their mass uniformly. Sums to 1.
pub fn pagerank(
  adjacency: &Adjacency,
  alpha: f64,
  max_iter: usize,
  tol: f64,
) -> Result<Vec<f64>, ConvergenceError> {
  let n = adjacency.node_count();
  if n == 0 {
    return Ok(Vec::new());
  }

  let uniform = 1. / n as f64;
  let mut x = vec![uniform; n];
  for _ in 0..max_iter {
    let dangling: f64 = x
      .iter()
      .zip(adjacency.iter())
      .filter(|(_, neighbors)| neighbors.is_empty())
      .map(|(v, _)| v)
      .sum();
    let base = alpha * dangling * uniform + (1. - alpha) * uniform;

    let mut next = vec![base; n];
    for (node, neighbors) in adjacency.iter().enumerate() {
      if neighbors.is_empty() {
        continue;
      }
      let share = alpha * x[node] / neighbors.len() as f64;
      for &neighbor in neighbors {
        next[neighbor] += share;
      }
    }

    let err = l1_diff(&next, &x);
    x = next;
    if err < n as f64 * tol {
      let total: f64 = x.iter().sum();
      x.iter_mut().for_each(|v| *v /= total);
      return Ok(x);
    }
  }

  Err(ConvergenceError {
    algorithm: "pagerank",
    iterations: max_iter,
  })
}

/// `x = alpha * A x + beta` from zero, L2 normalised. Only converges for
/// `alpha < 1 / lambda_max`.
pub fn katz_centrality(
  adjacency: &Adjacency,
  alpha: f64,
  beta: f64,
  max_iter: usize,
  tol: f64,
) -> Result<Vec<f64>, ConvergenceError> {
  let n = adjacency.node_count();
  if n == 0 {
    return Ok(Vec::new());
  }

  let mut x = vec![0.; n];
  for _ in 0..max_iter {
    let mut next = vec![0.; n];
    for (node, neighbors) in adjacency.iter().enumerate() {
      for &neighbor in neighbors {
        next[neighbor] += x[node];
      }
    }
    next.iter_mut().for_each(|v| *v = alpha * *v + beta);

    let err = l1_diff(&next, &x);
    x = next;
    if !err.is_finite() {
      break;
    }
    if err < n as f64 * tol {
      l2_normalise(&mut x);
      return Ok(x);
    }
  }

  Err(ConvergenceError {
    algorithm: "katz centrality",
    iterations: max_iter,
  })
}
