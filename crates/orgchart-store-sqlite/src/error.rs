//! Error type for `orgchart-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain invariant rejected the write (missing reference, cycle, ...).
  #[error("{0}")]
  Core(#[from] orgchart_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl orgchart_core::store::StoreError for Error {
  fn into_domain(self) -> Result<orgchart_core::Error, Self> {
    match self {
      Self::Core(e) => Ok(e),
      other => Err(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
