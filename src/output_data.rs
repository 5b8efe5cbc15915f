use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::{de::DeserializeOwned, Serialize};
use std::{
  fs::{self, File},
  io::{BufReader, Read},
  path::{Path, PathBuf},
};

pub fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  let file = File::create(path)
    .with_context(|| format!("failed to create {}", path.display()))?;
  let out = csv::Writer::from_writer(file);
  Ok(out)
}

fn is_gz(path: &Path) -> bool {
  path.extension().map_or(false, |ext| ext == "gz")
}

/// Opens `path`, decompressing on the fly when it ends in `.gz`.
pub fn csv_reader(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
  let file = File::open(path)
    .with_context(|| format!("failed to open {}", path.display()))?;
  let reader: Box<dyn Read> = if is_gz(path) {
    Box::new(GzDecoder::new(BufReader::new(file)))
  } else {
    Box::new(BufReader::new(file))
  };
  Ok(csv::Reader::from_reader(reader))
}

/// Prefer `path`, fall back to `path.gz` when only the compressed copy
/// exists.
pub fn resolve_input(path: PathBuf) -> PathBuf {
  if path.exists() {
    return path;
  }
  let mut gz = path.clone().into_os_string();
  gz.push(".gz");
  let gz = PathBuf::from(gz);
  if gz.exists() {
    gz
  } else {
    path
  }
}

pub fn load_items<T: DeserializeOwned>(
  path: &Path,
) -> Result<impl Iterator<Item = Result<T>>> {
  let path_display = path.display().to_string();
  Ok(
    csv_reader(path)?
      .into_deserialize()
      .map(move |item: csv::Result<T>| {
        item.with_context(|| format!("malformed row in {}", path_display))
      }),
  )
}

pub fn save_items<T: Serialize>(
  path: &Path,
  items: impl IntoIterator<Item = T>,
) -> Result<()> {
  let mut writer = csv_writer(path)?;
  for item in items {
    writer
      .serialize(item)
      .with_context(|| format!("failed to write {}", path.display()))?;
  }
  writer.flush()?;
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use flate2::{write::GzEncoder, Compression};
  use serde::Deserialize;
  use std::io::Write;

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Row {
    a: u32,
    b: Option<f64>,
  }

  #[test]
  fn plain_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("rows.csv");
    let rows = vec![Row { a: 1, b: Some(0.5) }, Row { a: 2, b: None }];
    save_items(&path, &rows).unwrap();

    let loaded: Vec<Row> =
      load_items(&path).unwrap().collect::<Result<_>>().unwrap();
    assert_eq!(loaded, rows);
  }

  #[test]
  fn gz_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("rows.csv");
    let gz_path = dir.path().join("rows.csv.gz");

    let mut encoder =
      GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(b"a,b\n3,\n4,1.5\n").unwrap();
    encoder.finish().unwrap();

    let resolved = resolve_input(plain);
    assert_eq!(resolved, gz_path);
    let loaded: Vec<Row> =
      load_items(&resolved).unwrap().collect::<Result<_>>().unwrap();
    assert_eq!(
      loaded,
      vec![Row { a: 3, b: None }, Row { a: 4, b: Some(1.5) }]
    );
  }

  #[test]
  fn missing_file_names_path() {
    let err = csv_reader(Path::new("does/not/exist.csv"))
      .err()
      .unwrap()
      .to_string();
    assert!(err.contains("does/not/exist.csv"));
  }
}
