//! The two link kinds of the graph: position placements into departments
//! ("assignments") and department-scoped position hierarchy edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Assignments ─────────────────────────────────────────────────────────────

/// "This position exists as `staff_units` slots inside this department."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub link_id:       Uuid,
  pub position_id:   Uuid,
  pub department_id: Uuid,
  /// Declared slot quota.
  pub staff_units:   u32,
  /// Cached number of live employees holding this placement.
  pub current_count: u32,
  /// Cached `max(0, staff_units - current_count)`.
  pub vacancy_count: u32,
  pub sort_order:    i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
  pub position_id:   Uuid,
  pub department_id: Uuid,
  #[serde(default = "default_staff_units")]
  pub staff_units:   u32,
  #[serde(default)]
  pub sort_order:    i64,
}

fn default_staff_units() -> u32 { 1 }

impl NewAssignment {
  pub fn new(position_id: Uuid, department_id: Uuid) -> Self {
    Self {
      position_id,
      department_id,
      staff_units: default_staff_units(),
      sort_order: 0,
    }
  }
}

// ─── Hierarchy edges ─────────────────────────────────────────────────────────

/// `child` reports to `parent`, but only within `department`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLink {
  pub link_id:            Uuid,
  pub child_position_id:  Uuid,
  pub parent_position_id: Uuid,
  pub department_id:      Uuid,
  pub sort_order:         i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHierarchyLink {
  pub child_position_id:  Uuid,
  pub parent_position_id: Uuid,
  pub department_id:      Uuid,
  #[serde(default)]
  pub sort_order:         i64,
}

impl NewHierarchyLink {
  pub fn new(child: Uuid, parent: Uuid, department: Uuid) -> Self {
    Self {
      child_position_id:  child,
      parent_position_id: parent,
      department_id:      department,
      sort_order:         0,
    }
  }
}

/// Partial update for a hierarchy edge; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkUpdate {
  pub child_position_id:  Option<Uuid>,
  pub parent_position_id: Option<Uuid>,
  pub department_id:      Option<Uuid>,
  pub sort_order:         Option<i64>,
}

impl LinkUpdate {
  pub fn apply(&self, link: &HierarchyLink) -> HierarchyLink {
    HierarchyLink {
      link_id:            link.link_id,
      child_position_id:  self.child_position_id.unwrap_or(link.child_position_id),
      parent_position_id: self.parent_position_id.unwrap_or(link.parent_position_id),
      department_id:      self.department_id.unwrap_or(link.department_id),
      sort_order:         self.sort_order.unwrap_or(link.sort_order),
    }
  }
}
