//! Leave submission, decisions, and the queries built on them.

use rusqlite::params;
use tracing::info;

use super::rows::{self, decode_error, sql_key, EMPLOYEE_COLUMNS, LEAVE_COLUMNS};
use super::RosterStore;
use crate::error::StoreError;
use crate::records::{Choice, Employee, LeaveDecision, LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::validate;

impl RosterStore<'_> {
    /// Submits a pending leave request dated today.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a reversed date range or blank
    /// reason, and [`StoreError::NotFound`] for an unknown or archived
    /// employee.
    pub fn submit_leave(
        &mut self,
        employee_id: &str,
        new: NewLeaveRequest,
    ) -> Result<LeaveRequest, StoreError> {
        validate::check_leave_range(new.start_date, new.end_date)?;
        validate::check_not_blank("reason", &new.reason)?;
        let today = self.ctx.clock.today();

        let txn = self.db.begin()?;
        let employee = Self::active_employee(txn.conn(), employee_id)?;
        txn.conn().execute(
            "INSERT INTO leave_requests (employee, start_date, end_date, reason, leave_type,
                 status, applied_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                sql_key("employee", employee.id)?,
                new.start_date,
                new.end_date,
                new.reason,
                new.leave_type.label(),
                LeaveStatus::Pending.label(),
                today,
            ],
        )?;
        let request = rows::find_leave(txn.conn(), rows::inserted_key(txn.conn())?)?;
        txn.commit()?;

        info!(
            leave = request.id,
            employee_id,
            start = %request.start_date,
            end = %request.end_date,
            "leave submitted"
        );
        Ok(request)
    }

    /// Approves or rejects a pending request, stamping today as the
    /// decision date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown request and
    /// [`StoreError::Validation`] when it was already decided.
    pub fn decide_leave(
        &mut self,
        leave_id: u64,
        decision: LeaveDecision,
    ) -> Result<LeaveRequest, StoreError> {
        let today = self.ctx.clock.today();
        let txn = self.db.begin()?;
        let mut request = rows::find_leave(txn.conn(), leave_id)?;
        validate::check_pending(leave_id, request.status)?;

        let status = decision.status();
        txn.conn().execute(
            "UPDATE leave_requests SET status = ?1, decided_on = ?2 WHERE id = ?3",
            params![status.label(), today, sql_key("leave request", leave_id)?],
        )?;
        txn.commit()?;

        info!(leave = leave_id, status = status.label(), "leave decided");
        request.status = status;
        request.decided_on = Some(today);
        Ok(request)
    }

    /// Lists leave requests, newest first, optionally for one employee.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown `owner`, or a query
    /// failure.
    pub fn leave_requests(&self, owner: Option<&str>) -> Result<Vec<LeaveRequest>, StoreError> {
        let conn = self.db.connection();
        let requests = match owner {
            Some(owner) => {
                let employee = rows::find_employee(conn, owner)?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee = ?1
                     ORDER BY applied_on DESC, id DESC"
                ))?;
                let found = stmt
                    .query_map([sql_key("employee", employee.id)?], rows::leave)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                found
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {LEAVE_COLUMNS} FROM leave_requests ORDER BY applied_on DESC, id DESC"
                ))?;
                let found = stmt.query_map([], rows::leave)?.collect::<rusqlite::Result<Vec<_>>>();
                found
            }
        };
        requests.map_err(decode_error)
    }

    /// Rejections the employee should still be told about: decided within
    /// the configured notice window.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown employee.
    pub fn rejection_notices(&self, employee_id: &str) -> Result<Vec<LeaveRequest>, StoreError> {
        let today = self.ctx.clock.today();
        let window = self.ctx.config.rejection_notice_days;
        Ok(self
            .leave_requests(Some(employee_id))?
            .into_iter()
            .filter(|r| r.is_recent_rejection(today, window))
            .collect())
    }

    /// Active employees on approved leave today, with the request covering
    /// them. Archived employees appear in neither this nor
    /// [`present_today`](Self::present_today).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn on_leave(&self) -> Result<Vec<(Employee, LeaveRequest)>, StoreError> {
        let today = self.ctx.clock.today();
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests
             WHERE status = ?1 AND start_date <= ?2 AND end_date >= ?2
               AND employee IN (SELECT id FROM employees WHERE archived_on IS NULL)
             ORDER BY employee, start_date"
        ))?;
        let requests = stmt
            .query_map(params![LeaveStatus::Approved.label(), today], rows::leave)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)?;

        requests
            .into_iter()
            .filter(|r| r.is_active_on(today))
            .map(|r| Ok((rows::find_employee_by_key(conn, r.employee)?, r)))
            .collect()
    }

    /// Employees with no approved leave covering today.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn present_today(&self) -> Result<Vec<Employee>, StoreError> {
        let today = self.ctx.clock.today();
        let mut stmt = self.db.connection().prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees e
             WHERE archived_on IS NULL AND NOT EXISTS (
                 SELECT 1 FROM leave_requests l
                 WHERE l.employee = e.id AND l.status = ?1
                   AND l.start_date <= ?2 AND l.end_date >= ?2)
             ORDER BY id"
        ))?;
        let present = stmt
            .query_map(params![LeaveStatus::Approved.label(), today], rows::employee)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)?;
        Ok(present)
    }
}
