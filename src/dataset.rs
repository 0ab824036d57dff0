use std::{
  fs,
  io::{Cursor, Read},
  path::{Path, PathBuf},
};

use polars::prelude::*;

use crate::error::{Error, Result};

pub const STEP: &str = "step";
pub const HEAP_HEIGHT: &str = "heapHeight";
pub const NUM_TREES: &str = "numTrees";
pub const CASCADING_CUTS: &str = "cascadingCuts";

/// Columns every heap evolution trace must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = [STEP, HEAP_HEIGHT, NUM_TREES, CASCADING_CUTS];

/// A heap evolution trace, one row per sampled extract-min step.
///
/// The required columns are checked and converted to `f64` once, when the
/// dataset is built. Other columns are kept as read and ignored by the charts.
#[derive(Debug, Clone)]
pub struct Dataset {
  frame: DataFrame,
}

impl Dataset {
  pub fn load(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::file_access(path, e))?;

    let dataset = Dataset::parse(bytes, Some(path))?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "loaded dataset");
    Ok(dataset)
  }

  pub fn from_reader(mut reader: impl Read) -> Result<Dataset> {
    let mut bytes = vec![];
    reader.read_to_end(&mut bytes)?;
    Dataset::parse(bytes, None)
  }

  pub fn from_frame(frame: DataFrame) -> Result<Dataset> { Dataset::validate(frame, None) }

  fn parse(bytes: Vec<u8>, path: Option<&Path>) -> Result<Dataset> {
    let frame = CsvReadOptions::default()
      .with_has_header(true)
      .with_infer_schema_length(None)
      .into_reader_with_file_handle(Cursor::new(bytes))
      .finish()
      .map_err(|e| Error::format(path.map(Path::to_path_buf), e.to_string()))?;

    Dataset::validate(frame, path)
  }

  fn validate(mut frame: DataFrame, path: Option<&Path>) -> Result<Dataset> {
    let source = || path.map(PathBuf::from);

    let missing = REQUIRED_COLUMNS
      .iter()
      .copied()
      .filter(|name| frame.get_column_index(name).is_none())
      .collect::<Vec<_>>();
    if !missing.is_empty() {
      return Err(Error::format(source(), format!("missing column(s): {}", missing.join(", "))));
    }

    for name in REQUIRED_COLUMNS {
      let column = frame
        .column(name)
        .and_then(|c| c.cast(&DataType::Float64))
        .map_err(|e| Error::format(source(), e.to_string()))?;

      let invalid = column.null_count();
      if invalid > 0 {
        return Err(Error::format(
          source(),
          format!("column `{name}` has {invalid} blank or non-numeric value(s)"),
        ));
      }

      let non_finite = column
        .f64()
        .map_err(|e| Error::format(source(), e.to_string()))?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_finite())
        .count();
      if non_finite > 0 {
        return Err(Error::format(
          source(),
          format!("column `{name}` has {non_finite} NaN or infinite value(s)"),
        ));
      }

      frame.with_column(column).map_err(|e| Error::format(source(), e.to_string()))?;
    }

    Ok(Dataset { frame })
  }

  pub fn len(&self) -> usize { self.frame.height() }
  pub fn is_empty(&self) -> bool { self.frame.height() == 0 }

  pub fn column(&self, name: &str) -> Result<&Column> {
    self.frame.column(name).map_err(|_| Error::column_not_found(name))
  }
}

impl PartialEq for Dataset {
  fn eq(&self, other: &Self) -> bool { self.frame.equals_missing(&other.frame) }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  const SAMPLE: &str = "step,heapHeight,numTrees,cascadingCuts\n1,2,3,0\n2,3,3,0\n3,3,2,1\n";

  fn values(dataset: &Dataset, name: &str) -> Vec<f64> {
    dataset.column(name).unwrap().f64().unwrap().into_iter().flatten().collect()
  }

  fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn keeps_rows_in_source_order() {
    let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(values(&dataset, STEP), [1.0, 2.0, 3.0]);
    assert_eq!(values(&dataset, HEAP_HEIGHT), [2.0, 3.0, 3.0]);
    assert_eq!(values(&dataset, NUM_TREES), [3.0, 3.0, 2.0]);
    assert_eq!(values(&dataset, CASCADING_CUTS), [0.0, 0.0, 1.0]);
  }

  #[test]
  fn duplicate_and_unsorted_rows_are_kept() {
    let csv = "step,heapHeight,numTrees,cascadingCuts\n3,1,1,1\n1,1,1,1\n1,1,1,1\n";
    let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(values(&dataset, STEP), [3.0, 1.0, 1.0]);
  }

  #[test]
  fn column_order_does_not_matter() {
    let csv = "heapSize,cascadingCuts,numTrees,step,heapHeight\n10,0,3,1,2\n9,1,2,2,4\n";
    let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(values(&dataset, STEP), [1.0, 2.0]);
    assert_eq!(values(&dataset, HEAP_HEIGHT), [2.0, 4.0]);
    assert!(dataset.column("heapSize").is_ok());
  }

  #[test]
  fn header_only_is_empty() {
    let csv = "step,heapHeight,numTrees,cascadingCuts\n";
    let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

    assert!(dataset.is_empty());
    assert_eq!(values(&dataset, NUM_TREES), Vec::<f64>::new());
  }

  #[test]
  fn missing_columns_are_listed() {
    let csv = "step,heapHeight\n1,2\n";
    match Dataset::from_reader(csv.as_bytes()) {
      Err(Error::Format { message, .. }) => {
        assert!(message.contains("numTrees"), "{message}");
        assert!(message.contains("cascadingCuts"), "{message}");
        assert!(!message.contains("heapHeight"), "{message}");
      }
      other => panic!("expected a format error, got {other:?}"),
    }
  }

  #[test]
  fn blank_cells_are_rejected() {
    let csv = "step,heapHeight,numTrees,cascadingCuts\n1,2,,0\n2,3,3,0\n";
    match Dataset::from_reader(csv.as_bytes()) {
      Err(Error::Format { message, .. }) => assert!(message.contains("numTrees"), "{message}"),
      other => panic!("expected a format error, got {other:?}"),
    }
  }

  #[test]
  fn non_numeric_cells_are_rejected() {
    let csv = "step,heapHeight,numTrees,cascadingCuts\n1,2,3,0\n2,tall,3,0\n";
    match Dataset::from_reader(csv.as_bytes()) {
      Err(Error::Format { message, .. }) => assert!(message.contains("heapHeight"), "{message}"),
      other => panic!("expected a format error, got {other:?}"),
    }
  }

  #[test]
  fn nan_and_infinite_cells_are_rejected() {
    for cell in ["NaN", "inf", "-inf"] {
      let csv = format!("step,heapHeight,numTrees,cascadingCuts\n1,2,3,0\n2,{cell},3,0\n");
      match Dataset::from_reader(csv.as_bytes()) {
        Err(Error::Format { message, .. }) => {
          assert!(message.contains("heapHeight"), "{cell}: {message}")
        }
        other => panic!("expected a format error for {cell}, got {other:?}"),
      }
    }
  }

  #[test]
  fn non_finite_frames_are_rejected() {
    let frame = df! {
      "step" => &[1.0, 2.0],
      "heapHeight" => &[1.0, 2.0],
      "numTrees" => &[1.0, f64::INFINITY],
      "cascadingCuts" => &[0.0, 0.0],
    }
    .unwrap();

    match Dataset::from_frame(frame) {
      Err(Error::Format { message, .. }) => {
        assert!(message.contains("numTrees"), "{message}");
        assert!(message.contains("infinite"), "{message}");
      }
      other => panic!("expected a format error, got {other:?}"),
    }
  }

  #[test]
  fn missing_file_is_a_file_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heap_evolution_fibonacci.csv");

    match Dataset::load(&path) {
      Err(Error::FileAccess { path: p, .. }) => assert_eq!(p, path),
      other => panic!("expected a file access error, got {other:?}"),
    }
  }

  #[test]
  fn load_errors_name_the_file() {
    let file = write_csv("step,heapHeight\n1,2\n");

    let err = Dataset::load(file.path()).unwrap_err();
    assert!(matches!(&err, Error::Format { path: Some(p), .. } if p == file.path()));
    assert!(err.to_string().contains(&file.path().display().to_string()));
  }

  #[test]
  fn loading_twice_gives_equal_datasets() {
    let file = write_csv(SAMPLE);

    let first = Dataset::load(file.path()).unwrap();
    let second = Dataset::load(file.path()).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn frames_are_validated_too() {
    let frame = df! {
      "step" => &[1i64, 2],
      "heapHeight" => &[1i64, 2],
      "numTrees" => &[1i64, 1],
    }
    .unwrap();

    assert!(matches!(Dataset::from_frame(frame), Err(Error::Format { path: None, .. })));
  }

  #[test]
  fn unknown_columns_are_not_found() {
    let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

    assert!(matches!(
      dataset.column("decreaseKeys"),
      Err(Error::ColumnNotFound { name }) if name == "decreaseKeys"
    ));
  }
}
