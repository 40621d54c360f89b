//! The `OrgStore` trait, the graph store contract.
//!
//! Implemented by storage backends (e.g. `orgchart-store-sqlite`). Every read
//! returns live rows only; the soft-delete filter is the backend's duty and is
//! not a parameter, so no call site can forget it.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error,
  department::{Department, NewDepartment},
  employee::{Employee, NewEmployee},
  link::{Assignment, HierarchyLink, NewAssignment, NewHierarchyLink},
  position::{NewPosition, Position},
};

/// A backend failure that may be carrying a domain [`Error`] raised by the
/// backend itself, such as a constraint violation it recognised.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error, or `self` back when this is a plain backend failure.
  fn into_domain(self) -> Result<Error, Self>
  where
    Self: Sized,
  {
    Err(self)
  }
}

/// Abstraction over an organisation graph backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait OrgStore: Send + Sync {
  type Error: StoreError;

  // ── Departments ───────────────────────────────────────────────────────

  fn add_department(
    &self,
    input: NewDepartment,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Retrieve a live department. Returns `None` if missing or soft-deleted.
  fn get_department(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Ids of live departments whose parent is `id`.
  fn child_department_ids(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Re-parent a department. Must reject a move beneath one of its own
  /// descendants.
  fn move_department(
    &self,
    id: Uuid,
    new_parent: Option<Uuid>,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Returns `false` if no live department had this id.
  fn soft_delete_department(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Positions ─────────────────────────────────────────────────────────

  fn add_position(
    &self,
    input: NewPosition,
  ) -> impl Future<Output = Result<Position, Self::Error>> + Send + '_;

  fn get_position(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Position>, Self::Error>> + Send + '_;

  fn list_positions(
    &self,
  ) -> impl Future<Output = Result<Vec<Position>, Self::Error>> + Send + '_;

  fn soft_delete_position(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Place a position into a department. Both must be live.
  fn add_assignment(
    &self,
    input: NewAssignment,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;

  /// All live assignments, in stored sort order.
  fn list_assignments(
    &self,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Departments `position_id` is assigned to.
  fn assignment_department_ids(
    &self,
    position_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Number of live assignments whose department is in `department_ids`.
  fn count_assignments_in(
    &self,
    department_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Recompute the cached current/vacancy counts of every live assignment.
  /// Returns the number of assignments touched.
  fn refresh_assignment_counts(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Insert an employee after enforcing the category-parent invariant.
  fn add_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  fn get_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Number of live employees whose department is in `department_ids`.
  fn count_employees_in(
    &self,
    department_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn soft_delete_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Hierarchy links ───────────────────────────────────────────────────

  fn get_link(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<HierarchyLink>, Self::Error>> + Send + '_;

  fn list_links(
    &self,
  ) -> impl Future<Output = Result<Vec<HierarchyLink>, Self::Error>> + Send + '_;

  fn list_links_in_department(
    &self,
    department_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HierarchyLink>, Self::Error>> + Send + '_;

  /// Persist a new edge. Validation is the caller's job (see
  /// [`crate::mutator`]); the backend only enforces uniqueness.
  fn insert_link(
    &self,
    input: NewHierarchyLink,
  ) -> impl Future<Output = Result<HierarchyLink, Self::Error>> + Send + '_;

  /// Overwrite every field of an existing edge.
  fn update_link(
    &self,
    link: HierarchyLink,
  ) -> impl Future<Output = Result<HierarchyLink, Self::Error>> + Send + '_;

  /// Hard delete. Returns `false` if the edge did not exist.
  fn delete_link(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
