use super::{
  svg::{format_value, ticks, Anchor, Svg, ACCENT, FOREGROUND, GRID},
  NumericColumn,
};
use crate::{output_data::save_items, stats, Country};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinCsvEntry {
  pub lower: f64,
  pub upper: f64,
  pub count: usize,
}

/// Equal width bins over `[min, max]`, the last bin closed on the right.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
  pub bins: Vec<BinCsvEntry>,
  pub mean: f64,
}

impl Histogram {
  /// `None` without values. A constant sample is spread over a unit wide
  /// range centred on the value.
  pub fn compute(values: &[f64], bin_count: usize) -> Option<Self> {
    if values.is_empty() || bin_count == 0 {
      return None;
    }
    let mut min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
      min -= 0.5;
      max += 0.5;
    }
    let width = (max - min) / bin_count as f64;

    let mut bins: Vec<BinCsvEntry> = (0..bin_count)
      .map(|i| BinCsvEntry {
        lower: min + i as f64 * width,
        upper: if i + 1 == bin_count {
          max
        } else {
          min + (i + 1) as f64 * width
        },
        count: 0,
      })
      .collect();
    for &value in values {
      let idx = (((value - min) / width) as usize).min(bin_count - 1);
      bins[idx].count += 1;
    }

    Some(Self {
      bins,
      mean: stats::mean(values),
    })
  }

  pub fn render(&self, title: &str, label: &str) -> Svg {
    let (width, height) = (900., 560.);
    let (left, right, top, bottom) = (80., 30., 60., 70.);
    let plot_w = width - left - right;
    let plot_h = height - top - bottom;

    let mut svg = Svg::new(width, height);
    svg.title(title);

    let lo = self.bins.first().map_or(0., |b| b.lower);
    let hi = self.bins.last().map_or(1., |b| b.upper);
    let max_count = self.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let x_of = |v: f64| left + (v - lo) / (hi - lo) * plot_w;
    let y_of = |c: f64| top + plot_h - c / max_count as f64 * plot_h;

    for tick in ticks(0., max_count as f64, 5) {
      let y = y_of(tick);
      svg.line([left, y], [left + plot_w, y], GRID, 0.5, false);
      svg.text(left - 8., y + 4., 11., Anchor::End, FOREGROUND, &format_value(tick));
    }
    for tick in ticks(lo, hi, 6) {
      let x = x_of(tick);
      svg.line([x, top + plot_h], [x, top + plot_h + 5.], FOREGROUND, 1., false);
      svg.text(x, top + plot_h + 20., 11., Anchor::Middle, FOREGROUND, &format_value(tick));
    }

    for bin in &self.bins {
      let x0 = x_of(bin.lower);
      let x1 = x_of(bin.upper);
      let y = y_of(bin.count as f64);
      svg.rect(x0, y, x1 - x0, top + plot_h - y, super::svg::palette(1), Some("black"));
    }

    let mean_x = x_of(self.mean);
    svg.line([mean_x, top], [mean_x, top + plot_h], ACCENT, 1.5, true);
    svg.text(
      mean_x + 6.,
      top + 16.,
      12.,
      Anchor::Start,
      ACCENT,
      &format!("mean: {:.2}", self.mean),
    );

    svg.line([left, top + plot_h], [left + plot_w, top + plot_h], FOREGROUND, 1., false);
    svg.line([left, top], [left, top + plot_h], FOREGROUND, 1., false);
    svg.text(left + plot_w / 2., height - 20., 14., Anchor::Middle, FOREGROUND, label);
    svg.vertical_text(22., top, 14., "frequency");
    svg
  }

  /// `<dir>/<column>_<country>.svg` and the bins as `.csv`.
  pub fn save(&self, dir: &Path, column: NumericColumn, country: Country) -> Result<()> {
    let stem = format!("{}_{}", column.name(), country);
    save_items(&dir.join(format!("{}.csv", stem)), &self.bins)?;
    self
      .render(&format!("{} ({})", column.title(), country), column.name())
      .save(&dir.join(format!("{}.svg", stem)))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::output_data::load_items;
  use proptest::prelude::*;

  #[test]
  fn bins() {
    let hist = Histogram::compute(&[0., 1., 2., 3., 4.], 4).unwrap();
    let counts: Vec<_> = hist.bins.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 1, 1, 2]);
    assert_eq!(hist.bins[0].lower, 0.);
    assert_eq!(hist.bins[3].upper, 4.);
    assert_eq!(hist.mean, 2.);
  }

  #[test]
  fn constant_and_empty() {
    let hist = Histogram::compute(&[7.; 3], 30).unwrap();
    assert_eq!(hist.bins.len(), 30);
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    assert_eq!(hist.bins[0].lower, 6.5);
    assert!(Histogram::compute(&[], 30).is_none());
  }

  #[test]
  fn files() {
    let dir = tempfile::tempdir().unwrap();
    let hist = Histogram::compute(&[1., 2., 2., 10.], 30).unwrap();
    hist.save(dir.path(), NumericColumn::Views, Country::De).unwrap();

    let svg = std::fs::read_to_string(dir.path().join("views_DE.svg")).unwrap();
    assert!(svg.contains("mean: 3.75"));
    let bins: Vec<BinCsvEntry> = load_items(&dir.path().join("views_DE.csv"))
      .unwrap()
      .collect::<Result<_>>()
      .unwrap();
    assert_eq!(bins, hist.bins);
  }

  proptest::proptest! {
    #[test]
    fn proptest_counts(
      values in proptest::collection::vec(-1e6f64..1e6, 1..200),
      bin_count in 1usize..40,
    ) {
      let hist = Histogram::compute(&values, bin_count).unwrap();
      proptest::prop_assert_eq!(hist.bins.len(), bin_count);
      proptest::prop_assert_eq!(
        hist.bins.iter().map(|b| b.count).sum::<usize>(),
        values.len()
      );
    }
  }
}
