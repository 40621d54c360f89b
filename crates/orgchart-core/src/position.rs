//! Positions: job definitions that are placed into departments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub position_id: Uuid,
  pub name:        String,
  /// A category is a grouping placeholder, not an assignable job.
  pub is_category: bool,
  pub sort_order:  i64,
  pub created_at:  DateTime<Utc>,
  pub deleted_at:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPosition {
  pub name:        String,
  #[serde(default)]
  pub is_category: bool,
  #[serde(default)]
  pub sort_order:  i64,
}

impl NewPosition {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn category(name: impl Into<String>) -> Self {
    Self { name: name.into(), is_category: true, ..Self::default() }
  }
}
