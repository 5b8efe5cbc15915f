use indicatif::{ProgressBar, ProgressStyle};

#[must_use]
pub fn get_bar(count: Option<u64>, draw_delta: u64) -> ProgressBar {
  labelled_bar("", count, draw_delta)
}

/// Bar prefixed with `label`, e.g. the metric being computed.
#[must_use]
pub fn labelled_bar(
  label: &str,
  count: Option<u64>,
  draw_delta: u64,
) -> ProgressBar {
  let bar = ProgressBar::new(count.unwrap_or(!0));
  let template = if count.is_some() {
    "{msg:>12} [{elapsed_precise}] {bar} {pos:>7} / {len:>7} {eta_precise}"
  } else {
    "{msg:>12} [{elapsed_precise}] {pos} {per_sec}"
  };
  bar.set_style(ProgressStyle::default_bar().template(template));
  bar.set_draw_delta(draw_delta);
  bar.set_message(label);
  bar
}

/// Bar over the sources of an all-pairs pass, redrawn about 100 times.
#[must_use]
pub fn sources_bar(label: &str, num_nodes: usize) -> ProgressBar {
  labelled_bar(
    label,
    Some(num_nodes as u64),
    (num_nodes as u64 / 100).max(1),
  )
}
