//! Daily check-in, check-out, and attendance marking.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::params;
use tracing::info;

use super::rows::{self, decode_error, sql_key, ATTENDANCE_COLUMNS};
use super::RosterStore;
use crate::error::StoreError;
use crate::records::{Attendance, AttendanceStatus, Choice};
use crate::validate;

impl RosterStore<'_> {
    /// Records today's arrival for an employee, at `at` or the clock's
    /// current time. Creates the day's entry as present, or fills in the
    /// time on an entry marked earlier without one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when the employee already checked
    /// in today and [`StoreError::NotFound`] for an unknown or archived
    /// employee.
    pub fn check_in(
        &mut self,
        employee_id: &str,
        at: Option<NaiveTime>,
    ) -> Result<Attendance, StoreError> {
        let now = self.ctx.clock.now();
        let (date, at) = (now.date_naive(), at.unwrap_or_else(|| now.time()));

        let txn = self.db.begin()?;
        let employee = Self::active_employee(txn.conn(), employee_id)?;
        let existing = rows::find_attendance(txn.conn(), employee.id, date)?;
        validate::check_can_check_in(
            &employee.to_string(),
            date,
            existing.as_ref().and_then(|e| e.check_in),
        )?;

        txn.conn().execute(
            "INSERT INTO attendance (employee, date, check_in, status) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (employee, date) DO UPDATE
             SET check_in = excluded.check_in, status = excluded.status",
            params![
                sql_key("employee", employee.id)?,
                date,
                at,
                AttendanceStatus::Present.label()
            ],
        )?;
        let entry = Self::entry(txn.conn(), employee.id, date)?;
        txn.commit()?;

        info!(employee_id, %date, check_in = %at, "checked in");
        Ok(entry)
    }

    /// Records today's departure for an employee who checked in today.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] without a check-in, after an
    /// earlier check-out, or when `at` precedes the check-in, and
    /// [`StoreError::NotFound`] for an unknown employee.
    pub fn check_out(
        &mut self,
        employee_id: &str,
        at: Option<NaiveTime>,
    ) -> Result<Attendance, StoreError> {
        let now = self.ctx.clock.now();
        let (date, at) = (now.date_naive(), at.unwrap_or_else(|| now.time()));

        let txn = self.db.begin()?;
        let employee = rows::find_employee(txn.conn(), employee_id)?;
        let existing = rows::find_attendance(txn.conn(), employee.id, date)?;
        validate::check_can_check_out(
            &employee.to_string(),
            date,
            existing.as_ref().and_then(|e| e.check_in),
            existing.as_ref().and_then(|e| e.check_out),
            at,
        )?;
        let Some(mut entry) = existing else {
            return Err(StoreError::NotFound {
                entity: "attendance",
                key: employee_id.to_string(),
            });
        };

        txn.conn().execute(
            "UPDATE attendance SET check_out = ?1 WHERE id = ?2",
            params![at, sql_key("attendance", entry.id)?],
        )?;
        txn.commit()?;

        info!(employee_id, %date, check_out = %at, "checked out");
        entry.check_out = Some(at);
        Ok(entry)
    }

    /// Sets the status of an employee's day, today unless `date` is given.
    /// Remarks replace any earlier note when given and are kept otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown employee.
    pub fn mark_attendance(
        &mut self,
        employee_id: &str,
        date: Option<NaiveDate>,
        status: AttendanceStatus,
        remarks: Option<String>,
    ) -> Result<Attendance, StoreError> {
        let date = date.unwrap_or_else(|| self.ctx.clock.today());

        let txn = self.db.begin()?;
        let employee = rows::find_employee(txn.conn(), employee_id)?;
        txn.conn().execute(
            "INSERT INTO attendance (employee, date, status, remarks) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (employee, date) DO UPDATE
             SET status = excluded.status, remarks = COALESCE(excluded.remarks, remarks)",
            params![sql_key("employee", employee.id)?, date, status.label(), remarks],
        )?;
        let entry = Self::entry(txn.conn(), employee.id, date)?;
        txn.commit()?;

        info!(employee_id, %date, status = status.label(), "attendance marked");
        Ok(entry)
    }

    /// Attendance entries, newest day first, optionally narrowed to one
    /// employee, one day, or both.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown `owner`, or a query
    /// failure.
    pub fn attendance(
        &self,
        owner: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, StoreError> {
        let conn = self.db.connection();
        let employee = match owner {
            Some(owner) => Some(sql_key("employee", rows::find_employee(conn, owner)?.id)?),
            None => None,
        };
        let mut stmt = conn.prepare(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance
             WHERE (?1 IS NULL OR employee = ?1) AND (?2 IS NULL OR date = ?2)
             ORDER BY date DESC, employee"
        ))?;
        let entries = stmt
            .query_map(params![employee, date], rows::attendance)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)?;
        Ok(entries)
    }

    fn entry(
        conn: &rusqlite::Connection,
        employee: u64,
        date: NaiveDate,
    ) -> Result<Attendance, StoreError> {
        rows::find_attendance(conn, employee, date)?.ok_or_else(|| StoreError::NotFound {
            entity: "attendance",
            key: format!("#{employee} on {date}"),
        })
    }
}
