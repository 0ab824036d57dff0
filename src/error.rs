//! Error types for loading and rendering heap metrics.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// The input file could not be opened or read.
  #[error("cannot read {}: {source}", path.display())]
  FileAccess {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The input is not a table of the expected shape.
  #[error("invalid table{}: {message}", source_suffix(path))]
  Format { path: Option<PathBuf>, message: String },

  /// A chart referenced a column the dataset does not have.
  #[error("column not found: {name}")]
  ColumnNotFound { name: String },

  /// Windowing, GPU or image encoding failed.
  #[error("render error: {0}")]
  Render(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

fn source_suffix(path: &Option<PathBuf>) -> String {
  match path {
    Some(path) => format!(" in {}", path.display()),
    None => String::new(),
  }
}

impl Error {
  pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::FileAccess { path: path.into(), source }
  }

  pub fn format(path: Option<PathBuf>, message: impl Into<String>) -> Self {
    Error::Format { path, message: message.into() }
  }

  pub fn column_not_found(name: impl Into<String>) -> Self {
    Error::ColumnNotFound { name: name.into() }
  }

  pub fn render(err: impl std::fmt::Display) -> Self { Error::Render(err.to_string()) }
}
