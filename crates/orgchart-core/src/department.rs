//! Departments: the tree the organisation is carved into.
//!
//! The parent reference forms a forest. Top-level organisations have no
//! parent and carry `is_organization = true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub department_id:   Uuid,
  pub name:            String,
  pub parent_id:       Option<Uuid>,
  pub is_organization: bool,
  pub sort_order:      i64,
  pub created_at:      DateTime<Utc>,
  /// Set when the department is soft-deleted. Live reads never return rows
  /// with this set.
  pub deleted_at:      Option<DateTime<Utc>>,
}

/// Input for [`OrgStore::add_department`](crate::store::OrgStore::add_department).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDepartment {
  pub name:            String,
  pub parent_id:       Option<Uuid>,
  #[serde(default)]
  pub is_organization: bool,
  #[serde(default)]
  pub sort_order:      i64,
}

impl NewDepartment {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn under(name: impl Into<String>, parent_id: Uuid) -> Self {
    Self { name: name.into(), parent_id: Some(parent_id), ..Self::default() }
  }
}
