//! Error types for `orgchart-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Coarse classification of an [`Error`], used by request layers to pick a
/// response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A required identifier was not supplied.
  InvalidArgument,
  /// A referenced record does not resolve to a live row.
  NotFound,
  /// The write would violate a structural invariant.
  Conflict,
  /// The backing store failed.
  StoreFailure,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("department not found: {0}")]
  DepartmentNotFound(Uuid),

  #[error("position not found: {0}")]
  PositionNotFound(Uuid),

  #[error("employee not found: {0}")]
  EmployeeNotFound(Uuid),

  #[error("hierarchy link not found: {0}")]
  LinkNotFound(Uuid),

  #[error("a position cannot be its own parent")]
  SelfParent,

  #[error(
    "position {parent} is already beneath {child} in department {department}; \
     the link would create a cycle"
  )]
  HierarchyCycle {
    child:      Uuid,
    parent:     Uuid,
    department: Uuid,
  },

  #[error(
    "position {child} already reports to {parent} in department {department}"
  )]
  DuplicateLink {
    child:      Uuid,
    parent:     Uuid,
    department: Uuid,
  },

  #[error("department {0} cannot be moved beneath its own descendant")]
  DepartmentCycle(Uuid),

  #[error("employee in category position {0} needs a category parent position")]
  CategoryParentRequired(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Lift an error from an [`OrgStore`](crate::store::OrgStore) call,
  /// re-raising domain errors the backend produced instead of wrapping them.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    e.into_domain().unwrap_or_else(Self::store)
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Self::DepartmentNotFound(_)
      | Self::PositionNotFound(_)
      | Self::EmployeeNotFound(_)
      | Self::LinkNotFound(_) => ErrorKind::NotFound,
      Self::SelfParent
      | Self::HierarchyCycle { .. }
      | Self::DuplicateLink { .. }
      | Self::DepartmentCycle(_)
      | Self::CategoryParentRequired(_) => ErrorKind::Conflict,
      Self::Store(_) => ErrorKind::StoreFailure,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_follow_taxonomy() {
    let id = Uuid::new_v4();
    assert_eq!(
      Error::InvalidArgument("x".into()).kind(),
      ErrorKind::InvalidArgument
    );
    assert_eq!(Error::PositionNotFound(id).kind(), ErrorKind::NotFound);
    assert_eq!(Error::SelfParent.kind(), ErrorKind::Conflict);
    assert_eq!(
      Error::store(std::io::Error::other("disk")).kind(),
      ErrorKind::StoreFailure
    );
  }

  #[derive(Debug, Error)]
  enum FakeStoreError {
    #[error("{0}")]
    Domain(Error),
    #[error("disk on fire")]
    Io,
  }

  impl StoreError for FakeStoreError {
    fn into_domain(self) -> Result<Error, Self> {
      match self {
        Self::Domain(e) => Ok(e),
        other => Err(other),
      }
    }
  }

  #[test]
  fn from_store_unwraps_domain_errors() {
    let id = Uuid::new_v4();
    let err = Error::from_store(FakeStoreError::Domain(Error::LinkNotFound(id)));
    assert!(matches!(err, Error::LinkNotFound(got) if got == id));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = Error::from_store(FakeStoreError::Io);
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    assert_eq!(err.to_string(), "store error: disk on fire");
  }

  #[test]
  fn cycle_message_describes_ancestry() {
    let (child, parent, department) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let msg = Error::HierarchyCycle { child, parent, department }.to_string();
    assert!(msg.starts_with(&format!("position {parent} is already beneath {child}")));
  }

  #[test]
  fn self_parent_message() {
    assert_eq!(
      Error::SelfParent.to_string(),
      "a position cannot be its own parent"
    );
  }
}
