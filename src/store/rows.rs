//! Row decoding and key conversion shared by the store queries.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::ident::ExternalId;
use crate::records::{Attendance, Choice, Employee, LeaveRequest, Task};

pub(crate) const EMPLOYEE_COLUMNS: &str = "id, employee_id, full_name, email, gender, position, \
     department, date_of_birth, employment_date, phone_number, address, archived_on";

pub(crate) const TASK_COLUMNS: &str =
    "id, assigned_to, title, description, assigned_date, deadline, complete";

pub(crate) const LEAVE_COLUMNS: &str =
    "id, employee, start_date, end_date, reason, leave_type, status, applied_on, decided_on";

pub(crate) const ATTENDANCE_COLUMNS: &str =
    "id, employee, date, check_in, check_out, status, remarks";

fn key(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    u64::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

fn choice<T: Choice>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let Some(label) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };
    T::from_label(&label)
        .map(Some)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn required_choice<T: Choice>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    choice(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        T::KIND.to_string(),
        Type::Null,
    ))
}

pub(crate) fn employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: key(row, 0)?,
        employee_id: row.get::<_, Option<String>>(1)?.map(ExternalId::from_stored),
        full_name: row.get(2)?,
        email: row.get(3)?,
        gender: choice(row, 4)?,
        position: choice(row, 5)?,
        department: choice(row, 6)?,
        date_of_birth: row.get(7)?,
        employment_date: row.get(8)?,
        phone_number: row.get(9)?,
        address: row.get(10)?,
        archived_on: row.get(11)?,
    })
}

pub(crate) fn task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: key(row, 0)?,
        assigned_to: key(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        assigned_date: row.get(4)?,
        deadline: row.get(5)?,
        complete: row.get(6)?,
    })
}

pub(crate) fn leave(row: &Row<'_>) -> rusqlite::Result<LeaveRequest> {
    Ok(LeaveRequest {
        id: key(row, 0)?,
        employee: key(row, 1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        reason: row.get(4)?,
        leave_type: required_choice(row, 5)?,
        status: required_choice(row, 6)?,
        applied_on: row.get(7)?,
        decided_on: row.get(8)?,
    })
}

pub(crate) fn attendance(row: &Row<'_>) -> rusqlite::Result<Attendance> {
    Ok(Attendance {
        id: key(row, 0)?,
        employee: key(row, 1)?,
        date: row.get(2)?,
        check_in: row.get(3)?,
        check_out: row.get(4)?,
        status: required_choice(row, 5)?,
        remarks: row.get(6)?,
    })
}

/// Converts a caller-supplied key for use as a SQL parameter. Keys beyond
/// `i64::MAX` cannot exist in `SQLite`, so they are reported as missing.
pub(crate) fn sql_key(entity: &'static str, id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| StoreError::NotFound { entity, key: id.to_string() })
}

/// Key of the row most recently inserted through `conn`.
pub(crate) fn inserted_key(conn: &Connection) -> Result<u64, StoreError> {
    let raw = conn.last_insert_rowid();
    u64::try_from(raw).map_err(|_| StoreError::Corrupt(format!("negative row key {raw}")))
}

pub(crate) fn find_employee(conn: &Connection, employee_id: &str) -> Result<Employee, StoreError> {
    conn.query_row(
        &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1"),
        [employee_id],
        employee,
    )
    .optional()
    .map_err(decode_error)?
    .ok_or_else(|| StoreError::NotFound { entity: "employee", key: employee_id.to_string() })
}

pub(crate) fn find_employee_by_key(conn: &Connection, id: u64) -> Result<Employee, StoreError> {
    conn.query_row(
        &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
        [sql_key("employee", id)?],
        employee,
    )
    .optional()
    .map_err(decode_error)?
    .ok_or_else(|| StoreError::NotFound { entity: "employee", key: format!("#{id}") })
}

pub(crate) fn find_task(conn: &Connection, id: u64) -> Result<Task, StoreError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [sql_key("task", id)?],
        task,
    )
    .optional()
    .map_err(decode_error)?
    .ok_or_else(|| StoreError::NotFound { entity: "task", key: id.to_string() })
}

pub(crate) fn find_leave(conn: &Connection, id: u64) -> Result<LeaveRequest, StoreError> {
    conn.query_row(
        &format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?1"),
        [sql_key("leave request", id)?],
        leave,
    )
    .optional()
    .map_err(decode_error)?
    .ok_or_else(|| StoreError::NotFound { entity: "leave request", key: id.to_string() })
}

/// The entry for `employee` on `date`, if one was recorded.
pub(crate) fn find_attendance(
    conn: &Connection,
    employee: u64,
    date: NaiveDate,
) -> Result<Option<Attendance>, StoreError> {
    conn.query_row(
        &format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee = ?1 AND date = ?2"),
        params![sql_key("employee", employee)?, date],
        attendance,
    )
    .optional()
    .map_err(decode_error)
}

/// Decoding failures become [`StoreError::Corrupt`]; everything else stays a
/// database error.
pub(crate) fn decode_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::Corrupt(err.to_string()),
        other => StoreError::Sqlite(other),
    }
}
