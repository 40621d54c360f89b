//! [`SqliteStore`], the SQLite implementation of [`OrgStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, Row};
use uuid::Uuid;

use orgchart_core::{
  closure::department_closure,
  department::{Department, NewDepartment},
  employee::{Employee, NewEmployee},
  link::{Assignment, HierarchyLink, NewAssignment, NewHierarchyLink},
  position::{NewPosition, Position},
  store::OrgStore,
};

use crate::{
  Error, Result,
  encode::{
    ASSIGNMENT_COLUMNS, DEPARTMENT_COLUMNS, EMPLOYEE_COLUMNS, LINK_COLUMNS,
    POSITION_COLUMNS, RawAssignment, RawDepartment, RawEmployee, RawLink,
    RawPosition, encode_dt, encode_opt_uuid, encode_uuid, encode_uuids,
    decode_uuid, placeholders,
  },
  schema::SCHEMA,
};

type CoreError = orgchart_core::Error;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An organisation graph backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a read query bound to string parameters and map every row.
  async fn fetch_all<R>(
    &self,
    sql: String,
    params: Vec<String>,
    from_row: fn(&Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a single-row read query keyed by one id.
  async fn fetch_one<R>(
    &self,
    sql: String,
    id: Uuid,
    from_row: fn(&Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
  {
    let id_str = encode_uuid(id);
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  /// `SELECT COUNT(*) FROM {view} WHERE department_id IN (...)`.
  async fn count_in(&self, view: &'static str, department_ids: Vec<Uuid>) -> Result<u64> {
    if department_ids.is_empty() {
      return Ok(0);
    }
    let ids = encode_uuids(&department_ids);
    let sql = format!(
      "SELECT COUNT(*) FROM {view} WHERE department_id IN ({})",
      placeholders(ids.len())
    );
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(ids.iter()), |r| r.get(0))?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }

  /// Stamp `deleted_at` on a live row. Returns `false` if none matched.
  async fn soft_delete(
    &self,
    table: &'static str,
    key: &'static str,
    id: Uuid,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());
    let sql = format!(
      "UPDATE {table} SET deleted_at = ?2 WHERE {key} = ?1 AND deleted_at IS NULL"
    );
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id_str, at_str])?))
      .await?;
    Ok(changed > 0)
  }

  async fn require_department(&self, id: Uuid) -> Result<Department> {
    self
      .get_department(id)
      .await?
      .ok_or_else(|| CoreError::DepartmentNotFound(id).into())
  }

  async fn require_position(&self, id: Uuid) -> Result<Position> {
    self
      .get_position(id)
      .await?
      .ok_or_else(|| CoreError::PositionNotFound(id).into())
  }
}

/// Map a UNIQUE or CHECK violation on `position_hierarchy` to the domain
/// error. Other constraint failures stay database errors.
fn link_write_error(e: tokio_rusqlite::Error, link: &HierarchyLink) -> Error {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(ref f, _)) = e else {
    return e.into();
  };
  let code = f.extended_code;
  match code {
    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => CoreError::DuplicateLink {
      child:      link.child_position_id,
      parent:     link.parent_position_id,
      department: link.department_id,
    }
    .into(),
    rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => CoreError::SelfParent.into(),
    _ => e.into(),
  }
}

// ─── OrgStore impl ───────────────────────────────────────────────────────────

impl OrgStore for SqliteStore {
  type Error = Error;

  // ── Departments ───────────────────────────────────────────────────────────

  async fn add_department(&self, input: NewDepartment) -> Result<Department> {
    if let Some(parent) = input.parent_id {
      self.require_department(parent).await?;
    }

    let department = Department {
      department_id:   Uuid::new_v4(),
      name:            input.name,
      parent_id:       input.parent_id,
      is_organization: input.is_organization,
      sort_order:      input.sort_order,
      created_at:      Utc::now(),
      deleted_at:      None,
    };

    let id_str     = encode_uuid(department.department_id);
    let name       = department.name.clone();
    let parent_str = encode_opt_uuid(department.parent_id);
    let is_org     = department.is_organization;
    let sort_order = department.sort_order;
    let at_str     = encode_dt(department.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO departments
             (department_id, name, parent_id, is_organization, sort_order, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, parent_str, is_org, sort_order, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(department)
  }

  async fn get_department(&self, id: Uuid) -> Result<Option<Department>> {
    let sql = format!(
      "SELECT {DEPARTMENT_COLUMNS} FROM live_departments WHERE department_id = ?1"
    );
    self
      .fetch_one(sql, id, RawDepartment::from_row)
      .await?
      .map(RawDepartment::into_department)
      .transpose()
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let sql = format!(
      "SELECT {DEPARTMENT_COLUMNS} FROM live_departments ORDER BY sort_order, name"
    );
    self
      .fetch_all(sql, vec![], RawDepartment::from_row)
      .await?
      .into_iter()
      .map(RawDepartment::into_department)
      .collect()
  }

  async fn child_department_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .fetch_all(
        "SELECT department_id FROM live_departments WHERE parent_id = ?1
         ORDER BY sort_order, name"
          .to_owned(),
        vec![encode_uuid(id)],
        |row| row.get(0),
      )
      .await?;
    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn move_department(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Department> {
    self.require_department(id).await?;
    if let Some(parent) = new_parent {
      self.require_department(parent).await?;
      let subtree = department_closure(self, id).await?;
      if subtree.contains(&parent) {
        tracing::warn!(department = %id, %parent, "rejected department move into own sub-tree");
        return Err(CoreError::DepartmentCycle(id).into());
      }
    }

    let id_str     = encode_uuid(id);
    let parent_str = encode_opt_uuid(new_parent);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE departments SET parent_id = ?2 WHERE department_id = ?1",
          rusqlite::params![id_str, parent_str],
        )?;
        Ok(())
      })
      .await?;

    self.require_department(id).await
  }

  async fn soft_delete_department(&self, id: Uuid) -> Result<bool> {
    self.soft_delete("departments", "department_id", id).await
  }

  // ── Positions ─────────────────────────────────────────────────────────────

  async fn add_position(&self, input: NewPosition) -> Result<Position> {
    let position = Position {
      position_id: Uuid::new_v4(),
      name:        input.name,
      is_category: input.is_category,
      sort_order:  input.sort_order,
      created_at:  Utc::now(),
      deleted_at:  None,
    };

    let id_str      = encode_uuid(position.position_id);
    let name        = position.name.clone();
    let is_category = position.is_category;
    let sort_order  = position.sort_order;
    let at_str      = encode_dt(position.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO positions (position_id, name, is_category, sort_order, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, is_category, sort_order, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(position)
  }

  async fn get_position(&self, id: Uuid) -> Result<Option<Position>> {
    let sql = format!("SELECT {POSITION_COLUMNS} FROM live_positions WHERE position_id = ?1");
    self
      .fetch_one(sql, id, RawPosition::from_row)
      .await?
      .map(RawPosition::into_position)
      .transpose()
  }

  async fn list_positions(&self) -> Result<Vec<Position>> {
    let sql = format!("SELECT {POSITION_COLUMNS} FROM live_positions ORDER BY sort_order, name");
    self
      .fetch_all(sql, vec![], RawPosition::from_row)
      .await?
      .into_iter()
      .map(RawPosition::into_position)
      .collect()
  }

  async fn soft_delete_position(&self, id: Uuid) -> Result<bool> {
    self.soft_delete("positions", "position_id", id).await
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn add_assignment(&self, input: NewAssignment) -> Result<Assignment> {
    self.require_position(input.position_id).await?;
    self.require_department(input.department_id).await?;

    let assignment = Assignment {
      link_id:       Uuid::new_v4(),
      position_id:   input.position_id,
      department_id: input.department_id,
      staff_units:   input.staff_units,
      current_count: 0,
      vacancy_count: input.staff_units,
      sort_order:    input.sort_order,
    };

    let link_str       = encode_uuid(assignment.link_id);
    let position_str   = encode_uuid(assignment.position_id);
    let department_str = encode_uuid(assignment.department_id);
    let staff_units    = assignment.staff_units;
    let sort_order     = assignment.sort_order;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO position_departments
             (link_id, position_id, department_id, staff_units, current_count,
              vacancy_count, sort_order)
           VALUES (?1, ?2, ?3, ?4, 0, ?4, ?5)",
          rusqlite::params![link_str, position_str, department_str, staff_units, sort_order],
        )?;
        Ok(())
      })
      .await?;

    Ok(assignment)
  }

  async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    let sql = format!(
      "SELECT {ASSIGNMENT_COLUMNS} FROM live_position_departments ORDER BY sort_order, link_id"
    );
    self
      .fetch_all(sql, vec![], RawAssignment::from_row)
      .await?
      .into_iter()
      .map(RawAssignment::into_assignment)
      .collect()
  }

  async fn assignment_department_ids(&self, position_id: Uuid) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .fetch_all(
        "SELECT DISTINCT department_id FROM live_position_departments WHERE position_id = ?1"
          .to_owned(),
        vec![encode_uuid(position_id)],
        |row| row.get(0),
      )
      .await?;
    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn count_assignments_in(&self, department_ids: Vec<Uuid>) -> Result<u64> {
    self.count_in("live_position_departments", department_ids).await
  }

  async fn refresh_assignment_counts(&self) -> Result<u64> {
    let changed = self
      .conn
      .call(|conn| {
        Ok(conn.execute(
          "UPDATE position_departments SET
             current_count = (
               SELECT COUNT(*) FROM live_employees e
               WHERE e.position_id   = position_departments.position_id
                 AND e.department_id = position_departments.department_id
             ),
             vacancy_count = MAX(0, staff_units - (
               SELECT COUNT(*) FROM live_employees e
               WHERE e.position_id   = position_departments.position_id
                 AND e.department_id = position_departments.department_id
             ))
           WHERE deleted_at IS NULL",
          [],
        )?)
      })
      .await?;
    tracing::debug!(changed, "refreshed cached assignment counts");
    Ok(changed as u64)
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn add_employee(&self, input: NewEmployee) -> Result<Employee> {
    let position = match input.position_id {
      Some(id) => Some(self.require_position(id).await?),
      None => None,
    };
    if let Some(id) = input.department_id {
      self.require_department(id).await?;
    }
    if let Some(id) = input.manager_id
      && self.get_employee(id).await?.is_none()
    {
      return Err(CoreError::EmployeeNotFound(id).into());
    }
    let input = input.normalize(position.as_ref())?;
    if let Some(id) = input.category_parent_id {
      self.require_position(id).await?;
    }

    let employee = Employee {
      employee_id:        Uuid::new_v4(),
      full_name:          input.full_name,
      position_id:        input.position_id,
      department_id:      input.department_id,
      manager_id:         input.manager_id,
      category_parent_id: input.category_parent_id,
      created_at:         Utc::now(),
      deleted_at:         None,
    };

    let id_str       = encode_uuid(employee.employee_id);
    let full_name    = employee.full_name.clone();
    let position_str = encode_opt_uuid(employee.position_id);
    let dept_str     = encode_opt_uuid(employee.department_id);
    let manager_str  = encode_opt_uuid(employee.manager_id);
    let category_str = encode_opt_uuid(employee.category_parent_id);
    let at_str       = encode_dt(employee.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (
             employee_id, full_name, position_id, department_id,
             manager_id, category_parent_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            full_name,
            position_str,
            dept_str,
            manager_str,
            category_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(employee)
  }

  async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM live_employees WHERE employee_id = ?1");
    self
      .fetch_one(sql, id, RawEmployee::from_row)
      .await?
      .map(RawEmployee::into_employee)
      .transpose()
  }

  async fn count_employees_in(&self, department_ids: Vec<Uuid>) -> Result<u64> {
    self.count_in("live_employees", department_ids).await
  }

  async fn soft_delete_employee(&self, id: Uuid) -> Result<bool> {
    self.soft_delete("employees", "employee_id", id).await
  }

  // ── Hierarchy links ───────────────────────────────────────────────────────

  async fn get_link(&self, id: Uuid) -> Result<Option<HierarchyLink>> {
    let sql = format!("SELECT {LINK_COLUMNS} FROM position_hierarchy WHERE link_id = ?1");
    self
      .fetch_one(sql, id, RawLink::from_row)
      .await?
      .map(RawLink::into_link)
      .transpose()
  }

  async fn list_links(&self) -> Result<Vec<HierarchyLink>> {
    let sql = format!(
      "SELECT {LINK_COLUMNS} FROM position_hierarchy ORDER BY sort_order, link_id"
    );
    self
      .fetch_all(sql, vec![], RawLink::from_row)
      .await?
      .into_iter()
      .map(RawLink::into_link)
      .collect()
  }

  async fn list_links_in_department(&self, department_id: Uuid) -> Result<Vec<HierarchyLink>> {
    let sql = format!(
      "SELECT {LINK_COLUMNS} FROM position_hierarchy WHERE department_id = ?1
       ORDER BY sort_order, link_id"
    );
    self
      .fetch_all(sql, vec![encode_uuid(department_id)], RawLink::from_row)
      .await?
      .into_iter()
      .map(RawLink::into_link)
      .collect()
  }

  async fn insert_link(&self, input: NewHierarchyLink) -> Result<HierarchyLink> {
    let link = HierarchyLink {
      link_id:            Uuid::new_v4(),
      child_position_id:  input.child_position_id,
      parent_position_id: input.parent_position_id,
      department_id:      input.department_id,
      sort_order:         input.sort_order,
    };

    let id_str     = encode_uuid(link.link_id);
    let child_str  = encode_uuid(link.child_position_id);
    let parent_str = encode_uuid(link.parent_position_id);
    let dept_str   = encode_uuid(link.department_id);
    let sort_order = link.sort_order;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO position_hierarchy
             (link_id, child_position_id, parent_position_id, department_id, sort_order)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, child_str, parent_str, dept_str, sort_order],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| link_write_error(e, &link))?;

    Ok(link)
  }

  async fn update_link(&self, link: HierarchyLink) -> Result<HierarchyLink> {
    let id_str     = encode_uuid(link.link_id);
    let child_str  = encode_uuid(link.child_position_id);
    let parent_str = encode_uuid(link.parent_position_id);
    let dept_str   = encode_uuid(link.department_id);
    let sort_order = link.sort_order;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE position_hierarchy SET
             child_position_id = ?2, parent_position_id = ?3,
             department_id = ?4, sort_order = ?5
           WHERE link_id = ?1",
          rusqlite::params![id_str, child_str, parent_str, dept_str, sort_order],
        )?)
      })
      .await
      .map_err(|e| link_write_error(e, &link))?;

    if changed == 0 {
      return Err(CoreError::LinkNotFound(link.link_id).into());
    }
    Ok(link)
  }

  async fn delete_link(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM position_hierarchy WHERE link_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
