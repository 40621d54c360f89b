//! Employees and the category-parent invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, position::Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub employee_id:        Uuid,
  pub full_name:          String,
  pub position_id:        Option<Uuid>,
  pub department_id:      Option<Uuid>,
  pub manager_id:         Option<Uuid>,
  /// Which concrete branch beneath a category position the employee belongs
  /// to. Only set when `position_id` names a category.
  pub category_parent_id: Option<Uuid>,
  pub created_at:         DateTime<Utc>,
  pub deleted_at:         Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEmployee {
  pub full_name:          String,
  pub position_id:        Option<Uuid>,
  pub department_id:      Option<Uuid>,
  pub manager_id:         Option<Uuid>,
  pub category_parent_id: Option<Uuid>,
}

impl NewEmployee {
  pub fn new(full_name: impl Into<String>) -> Self {
    Self { full_name: full_name.into(), ..Self::default() }
  }

  pub fn in_department(full_name: impl Into<String>, department_id: Uuid) -> Self {
    Self {
      full_name: full_name.into(),
      department_id: Some(department_id),
      ..Self::default()
    }
  }

  /// Enforce the category-parent invariant against the resolved position.
  ///
  /// A category position requires `category_parent_id`; any other position
  /// (or none) clears it.
  pub fn normalize(mut self, position: Option<&Position>) -> Result<Self> {
    match position {
      Some(p) if p.is_category => {
        if self.category_parent_id.is_none() {
          return Err(Error::CategoryParentRequired(p.position_id));
        }
      }
      _ => self.category_parent_id = None,
    }
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn position(is_category: bool) -> Position {
    Position {
      position_id: Uuid::new_v4(),
      name:        "Engineers".into(),
      is_category,
      sort_order:  0,
      created_at:  Utc::now(),
      deleted_at:  None,
    }
  }

  #[test]
  fn category_position_requires_parent() {
    let p = position(true);
    let input = NewEmployee {
      position_id: Some(p.position_id),
      ..NewEmployee::new("Ada")
    };
    let err = input.normalize(Some(&p)).unwrap_err();
    assert!(matches!(err, Error::CategoryParentRequired(id) if id == p.position_id));
  }

  #[test]
  fn category_parent_kept_for_category_position() {
    let p = position(true);
    let parent = Uuid::new_v4();
    let input = NewEmployee {
      position_id:        Some(p.position_id),
      category_parent_id: Some(parent),
      ..NewEmployee::new("Ada")
    };
    let out = input.normalize(Some(&p)).unwrap();
    assert_eq!(out.category_parent_id, Some(parent));
  }

  #[test]
  fn category_parent_cleared_otherwise() {
    let p = position(false);
    let input = NewEmployee {
      position_id:        Some(p.position_id),
      category_parent_id: Some(Uuid::new_v4()),
      ..NewEmployee::new("Ada")
    };
    assert_eq!(input.normalize(Some(&p)).unwrap().category_parent_id, None);

    let unplaced = NewEmployee {
      category_parent_id: Some(Uuid::new_v4()),
      ..NewEmployee::new("Grace")
    };
    assert_eq!(unplaced.normalize(None).unwrap().category_parent_id, None);
  }
}
