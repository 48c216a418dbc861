//! Error types for `stammbaum-chart`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("pdf error: {0}")]
  Pdf(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
