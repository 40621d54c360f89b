//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use orgchart_core::{
  department::Department,
  employee::Employee,
  link::{Assignment, HierarchyLink},
  position::Position,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_opt_uuid(id: Option<Uuid>) -> Option<String> { id.map(encode_uuid) }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

pub fn encode_uuids(ids: &[Uuid]) -> Vec<String> {
  ids.iter().copied().map(encode_uuid).collect()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

/// `?, ?, ?` with one placeholder per bound value.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const DEPARTMENT_COLUMNS: &str =
  "department_id, name, parent_id, is_organization, sort_order, created_at, deleted_at";

/// Raw values read directly from a `departments` row.
pub struct RawDepartment {
  pub department_id:   String,
  pub name:            String,
  pub parent_id:       Option<String>,
  pub is_organization: bool,
  pub sort_order:      i64,
  pub created_at:      String,
  pub deleted_at:      Option<String>,
}

impl RawDepartment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      department_id:   row.get(0)?,
      name:            row.get(1)?,
      parent_id:       row.get(2)?,
      is_organization: row.get(3)?,
      sort_order:      row.get(4)?,
      created_at:      row.get(5)?,
      deleted_at:      row.get(6)?,
    })
  }

  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      department_id:   decode_uuid(&self.department_id)?,
      name:            self.name,
      parent_id:       decode_opt_uuid(self.parent_id.as_deref())?,
      is_organization: self.is_organization,
      sort_order:      self.sort_order,
      created_at:      decode_dt(&self.created_at)?,
      deleted_at:      decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}

pub const POSITION_COLUMNS: &str =
  "position_id, name, is_category, sort_order, created_at, deleted_at";

pub struct RawPosition {
  pub position_id: String,
  pub name:        String,
  pub is_category: bool,
  pub sort_order:  i64,
  pub created_at:  String,
  pub deleted_at:  Option<String>,
}

impl RawPosition {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      position_id: row.get(0)?,
      name:        row.get(1)?,
      is_category: row.get(2)?,
      sort_order:  row.get(3)?,
      created_at:  row.get(4)?,
      deleted_at:  row.get(5)?,
    })
  }

  pub fn into_position(self) -> Result<Position> {
    Ok(Position {
      position_id: decode_uuid(&self.position_id)?,
      name:        self.name,
      is_category: self.is_category,
      sort_order:  self.sort_order,
      created_at:  decode_dt(&self.created_at)?,
      deleted_at:  decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}

pub const ASSIGNMENT_COLUMNS: &str = "link_id, position_id, department_id, staff_units, \
                                      current_count, vacancy_count, sort_order";

pub struct RawAssignment {
  pub link_id:       String,
  pub position_id:   String,
  pub department_id: String,
  pub staff_units:   u32,
  pub current_count: u32,
  pub vacancy_count: u32,
  pub sort_order:    i64,
}

impl RawAssignment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      link_id:       row.get(0)?,
      position_id:   row.get(1)?,
      department_id: row.get(2)?,
      staff_units:   row.get(3)?,
      current_count: row.get(4)?,
      vacancy_count: row.get(5)?,
      sort_order:    row.get(6)?,
    })
  }

  pub fn into_assignment(self) -> Result<Assignment> {
    Ok(Assignment {
      link_id:       decode_uuid(&self.link_id)?,
      position_id:   decode_uuid(&self.position_id)?,
      department_id: decode_uuid(&self.department_id)?,
      staff_units:   self.staff_units,
      current_count: self.current_count,
      vacancy_count: self.vacancy_count,
      sort_order:    self.sort_order,
    })
  }
}

pub const LINK_COLUMNS: &str =
  "link_id, child_position_id, parent_position_id, department_id, sort_order";

pub struct RawLink {
  pub link_id:            String,
  pub child_position_id:  String,
  pub parent_position_id: String,
  pub department_id:      String,
  pub sort_order:         i64,
}

impl RawLink {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      link_id:            row.get(0)?,
      child_position_id:  row.get(1)?,
      parent_position_id: row.get(2)?,
      department_id:      row.get(3)?,
      sort_order:         row.get(4)?,
    })
  }

  pub fn into_link(self) -> Result<HierarchyLink> {
    Ok(HierarchyLink {
      link_id:            decode_uuid(&self.link_id)?,
      child_position_id:  decode_uuid(&self.child_position_id)?,
      parent_position_id: decode_uuid(&self.parent_position_id)?,
      department_id:      decode_uuid(&self.department_id)?,
      sort_order:         self.sort_order,
    })
  }
}

pub const EMPLOYEE_COLUMNS: &str = "employee_id, full_name, position_id, department_id, \
                                    manager_id, category_parent_id, created_at, deleted_at";

pub struct RawEmployee {
  pub employee_id:        String,
  pub full_name:          String,
  pub position_id:        Option<String>,
  pub department_id:      Option<String>,
  pub manager_id:         Option<String>,
  pub category_parent_id: Option<String>,
  pub created_at:         String,
  pub deleted_at:         Option<String>,
}

impl RawEmployee {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employee_id:        row.get(0)?,
      full_name:          row.get(1)?,
      position_id:        row.get(2)?,
      department_id:      row.get(3)?,
      manager_id:         row.get(4)?,
      category_parent_id: row.get(5)?,
      created_at:         row.get(6)?,
      deleted_at:         row.get(7)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      employee_id:        decode_uuid(&self.employee_id)?,
      full_name:          self.full_name,
      position_id:        decode_opt_uuid(self.position_id.as_deref())?,
      department_id:      decode_opt_uuid(self.department_id.as_deref())?,
      manager_id:         decode_opt_uuid(self.manager_id.as_deref())?,
      category_parent_id: decode_opt_uuid(self.category_parent_id.as_deref())?,
      created_at:         decode_dt(&self.created_at)?,
      deleted_at:         decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}
