//! SQL schema for the organisation graph store.
//!
//! Executed once at connection startup. Reads of soft-deletable tables go
//! through the `live_*` views, which carry the soft-delete predicate; writes
//! go to the base tables. Hierarchy links are hard-deleted and have no view.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    department_id   TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    parent_id       TEXT REFERENCES departments(department_id),
    is_organization INTEGER NOT NULL DEFAULT 0,
    sort_order      INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    deleted_at      TEXT
);

CREATE TABLE IF NOT EXISTS positions (
    position_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    is_category INTEGER NOT NULL DEFAULT 0,
    sort_order  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    deleted_at  TEXT
);

-- \"This position exists as N slots inside this department.\"
CREATE TABLE IF NOT EXISTS position_departments (
    link_id       TEXT PRIMARY KEY,
    position_id   TEXT NOT NULL REFERENCES positions(position_id),
    department_id TEXT NOT NULL REFERENCES departments(department_id),
    staff_units   INTEGER NOT NULL DEFAULT 1,
    current_count INTEGER NOT NULL DEFAULT 0,
    vacancy_count INTEGER NOT NULL DEFAULT 0,
    sort_order    INTEGER NOT NULL DEFAULT 0,
    deleted_at    TEXT
);

-- Department-scoped reporting lines. Rows are hard-deleted.
CREATE TABLE IF NOT EXISTS position_hierarchy (
    link_id            TEXT PRIMARY KEY,
    child_position_id  TEXT NOT NULL REFERENCES positions(position_id),
    parent_position_id TEXT NOT NULL REFERENCES positions(position_id),
    department_id      TEXT NOT NULL REFERENCES departments(department_id),
    sort_order         INTEGER NOT NULL DEFAULT 0,
    UNIQUE (child_position_id, parent_position_id, department_id),
    CHECK  (child_position_id != parent_position_id)
);

CREATE TABLE IF NOT EXISTS employees (
    employee_id        TEXT PRIMARY KEY,
    full_name          TEXT NOT NULL,
    position_id        TEXT REFERENCES positions(position_id),
    department_id      TEXT REFERENCES departments(department_id),
    manager_id         TEXT REFERENCES employees(employee_id),
    category_parent_id TEXT REFERENCES positions(position_id),
    created_at         TEXT NOT NULL,
    deleted_at         TEXT
);

CREATE VIEW IF NOT EXISTS live_departments AS
    SELECT * FROM departments WHERE deleted_at IS NULL;
CREATE VIEW IF NOT EXISTS live_positions AS
    SELECT * FROM positions WHERE deleted_at IS NULL;
CREATE VIEW IF NOT EXISTS live_position_departments AS
    SELECT * FROM position_departments WHERE deleted_at IS NULL;
CREATE VIEW IF NOT EXISTS live_employees AS
    SELECT * FROM employees WHERE deleted_at IS NULL;

CREATE INDEX IF NOT EXISTS departments_parent_idx     ON departments(parent_id);
CREATE INDEX IF NOT EXISTS assignments_position_idx   ON position_departments(position_id);
CREATE INDEX IF NOT EXISTS assignments_department_idx ON position_departments(department_id);
CREATE INDEX IF NOT EXISTS hierarchy_department_idx   ON position_hierarchy(department_id);
CREATE INDEX IF NOT EXISTS employees_department_idx   ON employees(department_id);

PRAGMA user_version = 1;
";
