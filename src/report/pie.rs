use super::{
  svg::{palette, Anchor, Svg, BACKGROUND, FOREGROUND},
  CategoricalColumn,
};
use crate::{output_data::save_items, Country};
use anyhow::Result;
use fnv::FnvHashMap as Map;
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, path::Path};

/// Slices beyond this many are drawn as one "other" slice.
const MAX_SLICES: usize = 12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceCsvEntry {
  pub value: String,
  pub count: usize,
  pub percent: f64,
}

/// Most frequent first, ties by value.
pub fn value_counts(values: impl IntoIterator<Item = String>) -> Vec<SliceCsvEntry> {
  let mut counts: Map<String, usize> = Map::default();
  for value in values {
    *counts.entry(value).or_insert(0) += 1;
  }
  let total: usize = counts.values().sum();
  let mut out: Vec<_> = counts
    .into_iter()
    .map(|(value, count)| SliceCsvEntry {
      value,
      count,
      percent: 100. * count as f64 / total as f64,
    })
    .collect();
  out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
  out
}

fn drawn_slices(slices: &[SliceCsvEntry]) -> Vec<SliceCsvEntry> {
  if slices.len() <= MAX_SLICES {
    return slices.to_vec();
  }
  let mut out = slices[..MAX_SLICES - 1].to_vec();
  let rest = &slices[MAX_SLICES - 1..];
  out.push(SliceCsvEntry {
    value: format!("other ({})", rest.len()),
    count: rest.iter().map(|s| s.count).sum(),
    percent: rest.iter().map(|s| s.percent).sum(),
  });
  out
}

fn point(center: [f64; 2], radius: f64, angle: f64) -> [f64; 2] {
  [center[0] + radius * angle.sin(), center[1] - radius * angle.cos()]
}

/// Donut slice between two angles, clockwise from the top.
fn slice_path(center: [f64; 2], outer: f64, inner: f64, from: f64, to: f64) -> String {
  let large = if to - from > PI { 1 } else { 0 };
  let [ox0, oy0] = point(center, outer, from);
  let [ox1, oy1] = point(center, outer, to);
  let [ix1, iy1] = point(center, inner, to);
  let [ix0, iy0] = point(center, inner, from);
  format!(
    "M {:.2} {:.2} A {o} {o} 0 {l} 1 {:.2} {:.2} L {:.2} {:.2} A {i} {i} 0 {l} 0 {:.2} {:.2} Z",
    ox0,
    oy0,
    ox1,
    oy1,
    ix1,
    iy1,
    ix0,
    iy0,
    o = outer,
    i = inner,
    l = large,
  )
}

pub fn render(title: &str, slices: &[SliceCsvEntry]) -> Svg {
  let (width, height) = (820., 640.);
  let center = [320., 340.];
  let (outer, inner) = (250., 120.);

  let mut svg = Svg::new(width, height);
  svg.title(title);

  let slices = drawn_slices(slices);
  let total: usize = slices.iter().map(|s| s.count).sum();

  let mut angle = 0.;
  for (i, slice) in slices.iter().enumerate() {
    let sweep = 2. * PI * slice.count as f64 / total.max(1) as f64;
    let color = palette(i);
    if slices.len() == 1 {
      svg.circle(center[0], center[1], outer, color, Some(BACKGROUND));
      svg.circle(center[0], center[1], inner, BACKGROUND, None);
    } else {
      svg.path(
        &slice_path(center, outer, inner, angle, angle + sweep),
        color,
        Some(BACKGROUND),
      );
    }

    let [lx, ly] = point(center, (outer + inner) / 2., angle + sweep / 2.);
    svg.text(lx, ly, 12., Anchor::Middle, "black", &format!("{:.1}%", slice.percent));
    svg.text(lx, ly + 14., 11., Anchor::Middle, "black", &format!("({})", slice.count));

    let legend_y = 90. + 24. * i as f64;
    svg.rect(620., legend_y - 12., 14., 14., color, None);
    svg.text(642., legend_y, 13., Anchor::Start, FOREGROUND, &slice.value);

    angle += sweep;
  }
  svg
}

/// `<dir>/<column>_<country>.svg` and the counts as `.csv`.
pub fn save_pie(
  dir: &Path,
  column: CategoricalColumn,
  country: Country,
  slices: &[SliceCsvEntry],
) -> Result<()> {
  let stem = format!("{}_{}", column.name(), country);
  save_items(&dir.join(format!("{}.csv", stem)), slices)?;
  render(&format!("{} ({})", column.title(), country), slices)
    .save(&dir.join(format!("{}.svg", stem)))
}

#[cfg(test)]
mod test {
  use super::*;

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn counts() {
    let slices = value_counts(strings(&["b", "a", "b", "c", "a", "b"]));
    let values: Vec<_> = slices.iter().map(|s| (s.value.as_str(), s.count)).collect();
    assert_eq!(values, vec![("b", 3), ("a", 2), ("c", 1)]);
    assert!((slices[0].percent - 50.).abs() < 1e-12);
    assert!(value_counts(Vec::new()).is_empty());
  }

  #[test]
  fn many_slices_are_grouped() {
    let values: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    let slices = value_counts(values);
    let drawn = drawn_slices(&slices);
    assert_eq!(drawn.len(), MAX_SLICES);
    assert_eq!(drawn.last().unwrap().count, 9);
    assert_eq!(drawn.iter().map(|s| s.count).sum::<usize>(), 20);
  }

  #[test]
  fn annotations() {
    let slices = value_counts(strings(&["true", "false", "false", "false"]));
    let text = render("Partner (DE)", &slices).finish();
    assert!(text.contains("75.0%"));
    assert!(text.contains("(1)"));

    let single = render("Mature", &value_counts(strings(&["false"]))).finish();
    assert!(single.contains("100.0%"));
  }
}
