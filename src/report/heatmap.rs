use super::{
  svg::{diverging, Anchor, Svg, FOREGROUND, GRID},
  CategoricalColumn, NumericColumn,
};
use crate::{
  correlation::{complete_pairs, correlation_ratio, cramers_v, spearman},
  metrics::MetricsRow,
  output_data::csv_writer,
  stats::pearson,
  Country,
};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
  Pearson,
  Spearman,
}

impl Method {
  fn apply(self, xs: &[f64], ys: &[f64]) -> Option<f64> {
    match self {
      Self::Pearson => pearson(xs, ys),
      Self::Spearman => spearman(xs, ys),
    }
  }
}

/// Symmetric matrix of associations, `None` where undefined.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
  pub labels: Vec<String>,
  values: Vec<Option<f64>>,
}

impl Matrix {
  fn build(labels: Vec<String>, mut cell: impl FnMut(usize, usize) -> Option<f64>) -> Self {
    let n = labels.len();
    let mut values = vec![None; n * n];
    for i in 0..n {
      for j in i..n {
        let value = cell(i, j);
        values[i * n + j] = value;
        values[j * n + i] = value;
      }
    }
    Self { labels, values }
  }

  pub fn size(&self) -> usize {
    self.labels.len()
  }

  pub fn get(&self, i: usize, j: usize) -> Option<f64> {
    self.values[i * self.size() + j]
  }

  /// Header row of labels, then one row per label, empty cells undefined.
  pub fn save_csv(&self, path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;
    let mut header = vec![String::new()];
    header.extend(self.labels.iter().cloned());
    writer.write_record(&header)?;
    for (i, label) in self.labels.iter().enumerate() {
      let mut record = vec![label.clone()];
      record.extend(
        (0..self.size()).map(|j| self.get(i, j).map_or_else(String::new, |v| v.to_string())),
      );
      writer.write_record(&record)?;
    }
    writer
      .flush()
      .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
  }

  pub fn render(&self, title: &str) -> Svg {
    let n = self.size();
    let cell = 56.;
    let (left, top) = (200., 70.);
    let width = left + cell * n as f64 + 40.;
    let height = top + cell * n as f64 + 180.;

    let mut svg = Svg::new(width, height);
    svg.title(title);

    for i in 0..n {
      for j in 0..n {
        let (x, y) = (left + cell * j as f64, top + cell * i as f64);
        match self.get(i, j) {
          Some(value) => {
            svg.rect(x, y, cell, cell, &diverging(value), Some(GRID));
            svg.text(
              x + cell / 2.,
              y + cell / 2. + 4.,
              11.,
              Anchor::Middle,
              "black",
              &format!("{:.2}", value),
            );
          }
          None => svg.rect(x, y, cell, cell, "#333333", Some(GRID)),
        }
      }
    }
    for (i, label) in self.labels.iter().enumerate() {
      let offset = cell * i as f64 + cell / 2.;
      svg.text(left - 8., top + offset + 4., 12., Anchor::End, FOREGROUND, label);
      svg.vertical_text(left + offset + 4., top + cell * n as f64 + 8., 12., label);
    }
    svg
  }
}

/// Numeric columns with at least two values, the others are left out.
fn present_columns(rows: &[MetricsRow]) -> Vec<(NumericColumn, Vec<Option<f64>>)> {
  NumericColumn::ALL
    .iter()
    .map(|&column| (column, column.values(rows)))
    .filter(|(_, values)| values.iter().flatten().count() > 1)
    .collect()
}

pub fn numeric_matrix(rows: &[MetricsRow], method: Method) -> Matrix {
  let columns = present_columns(rows);
  let labels = columns.iter().map(|(c, _)| c.name().to_owned()).collect();
  Matrix::build(labels, |i, j| {
    let (xs, ys) = complete_pairs(&columns[i].1, &columns[j].1);
    method.apply(&xs, &ys)
  })
}

/// Pearson between numeric columns, Cramér's V between categorical ones and
/// the correlation ratio across.
pub fn mixed_matrix(rows: &[MetricsRow]) -> Matrix {
  enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
  }

  let mut labels = Vec::new();
  let mut columns = Vec::new();
  for (column, values) in present_columns(rows) {
    labels.push(column.name().to_owned());
    columns.push(Column::Numeric(values));
  }
  for &column in &CategoricalColumn::ALL {
    let values = column.values(rows);
    if values.iter().flatten().count() > 1 {
      labels.push(column.name().to_owned());
      columns.push(Column::Categorical(values));
    }
  }

  Matrix::build(labels, |i, j| match (&columns[i], &columns[j]) {
    (Column::Numeric(xs), Column::Numeric(ys)) => {
      let (xs, ys) = complete_pairs(xs, ys);
      pearson(&xs, &ys)
    }
    (Column::Categorical(xs), Column::Categorical(ys)) => {
      let (xs, ys) = complete_pairs(xs, ys);
      cramers_v(&xs, &ys)
    }
    (Column::Categorical(categories), Column::Numeric(values))
    | (Column::Numeric(values), Column::Categorical(categories)) => {
      let (categories, values) = complete_pairs(categories, values);
      correlation_ratio(&categories, &values)
    }
  })
}

/// Pearson, Spearman and mixed matrices as `<name>_<country>.{svg,csv}`.
pub fn save_heatmaps(dir: &Path, country: Country, rows: &[MetricsRow]) -> Result<()> {
  let matrices = vec![
    ("pearson", "Pearson correlation", numeric_matrix(rows, Method::Pearson)),
    ("spearman", "Spearman correlation", numeric_matrix(rows, Method::Spearman)),
    ("mixed", "Mixed association", mixed_matrix(rows)),
  ];
  for (name, title, matrix) in matrices {
    let stem = format!("{}_{}", name, country);
    matrix.save_csv(&dir.join(format!("{}.csv", stem)))?;
    matrix
      .render(&format!("{} ({})", title, country))
      .save(&dir.join(format!("{}.svg", stem)))?;
  }
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::report::test::two_cliques_rows;

  #[test]
  fn numeric() {
    let (_, rows) = two_cliques_rows();
    let matrix = numeric_matrix(&rows, Method::Pearson);
    assert!(!matrix.labels.contains(&"katz_centrality".to_owned()));
    let degree = matrix.labels.iter().position(|l| l == "degree").unwrap();
    let centrality = matrix
      .labels
      .iter()
      .position(|l| l == "degree_centrality")
      .unwrap();
    assert!((matrix.get(degree, centrality).unwrap() - 1.).abs() < 1e-9);
    assert!((matrix.get(degree, degree).unwrap() - 1.).abs() < 1e-9);
    assert_eq!(matrix.get(degree, centrality), matrix.get(centrality, degree));
  }

  #[test]
  fn mixed() {
    let (_, rows) = two_cliques_rows();
    let matrix = mixed_matrix(&rows);
    let find = |name: &str| matrix.labels.iter().position(|l| l == name).unwrap();
    let louvain = find("louvain_community");
    let leiden = find("leiden_community");
    // same split, different ids
    assert!((matrix.get(louvain, leiden).unwrap() - 1.).abs() < 1e-9);
    let eta = matrix.get(find("degree"), louvain).unwrap();
    assert!((0. ..=1.).contains(&eta));
  }

  #[test]
  fn csv_layout() {
    let (_, rows) = two_cliques_rows();
    let dir = tempfile::tempdir().unwrap();
    save_heatmaps(dir.path(), Country::Ru, &rows).unwrap();
    let text = std::fs::read_to_string(dir.path().join("spearman_RU.csv")).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with(",degree,degree_centrality"));
    assert!(dir.path().join("mixed_RU.svg").exists());
  }
}
