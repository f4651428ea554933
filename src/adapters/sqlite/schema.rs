//! Table definitions.

/// Tables that carry an external identifier, with the column holding it.
///
/// `lock_tail` only reads tables listed here, which also keeps table names
/// interpolated into SQL to a fixed set.
pub const IDENTIFIED_TABLES: &[(&str, &str)] = &[("employees", "employee_id")];

/// Idempotent schema creation.
///
/// Keys use `AUTOINCREMENT` so a key is never handed out twice, even after
/// the row holding it is gone.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id     TEXT UNIQUE,
    full_name       TEXT NOT NULL DEFAULT '',
    email           TEXT NOT NULL UNIQUE,
    gender          TEXT,
    position        TEXT,
    department      TEXT,
    date_of_birth   TEXT,
    employment_date TEXT NOT NULL,
    phone_number    TEXT NOT NULL DEFAULT '',
    address         TEXT NOT NULL DEFAULT '',
    archived_on     TEXT
);

CREATE TABLE IF NOT EXISTS tasks (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    assigned_to   INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    assigned_date TEXT NOT NULL,
    deadline      TEXT NOT NULL,
    complete      INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS tasks_by_assignee ON tasks (assigned_to, complete);

CREATE TABLE IF NOT EXISTS leave_requests (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    employee    INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    reason      TEXT NOT NULL,
    leave_type  TEXT NOT NULL DEFAULT 'other',
    status      TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'rejected')),
    applied_on  TEXT NOT NULL,
    decided_on  TEXT
);

CREATE INDEX IF NOT EXISTS leave_by_employee ON leave_requests (employee, applied_on);

CREATE TABLE IF NOT EXISTS attendance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    employee    INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    check_in    TEXT,
    check_out   TEXT,
    status      TEXT NOT NULL DEFAULT 'present'
                CHECK (status IN ('present', 'absent', 'on-leave')),
    remarks     TEXT,
    UNIQUE (employee, date)
);

CREATE INDEX IF NOT EXISTS attendance_by_date ON attendance (date);
";

/// Column holding the external identifier of `table`, if it has one.
#[must_use]
pub fn id_column(table: &str) -> Option<&'static str> {
    IDENTIFIED_TABLES.iter().find(|(t, _)| *t == table).map(|(_, column)| *column)
}
