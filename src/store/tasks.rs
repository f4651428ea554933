//! Task assignment, edits, completion, and overdue queries.

use rusqlite::params;
use tracing::info;

use super::rows::{self, decode_error, sql_key, TASK_COLUMNS};
use super::RosterStore;
use crate::error::StoreError;
use crate::records::{NewTask, Task, TaskChanges};
use crate::validate::{self, ValidationError};

impl RosterStore<'_> {
    /// Assigns a task, enforcing the active-task cap inside the same
    /// transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when the title is invalid or the
    /// assignee already holds `max_active_tasks` incomplete tasks, and
    /// [`StoreError::NotFound`] for an unknown or archived employee.
    pub fn assign_task(&mut self, employee_id: &str, new: NewTask) -> Result<Task, StoreError> {
        validate::check_task_title(&new.title)?;
        let today = self.ctx.clock.today();
        let cap = self.ctx.config.max_active_tasks;

        let txn = self.db.begin()?;
        let employee = Self::active_employee(txn.conn(), employee_id)?;
        let assignee = sql_key("employee", employee.id)?;

        let active = active_tasks(txn.conn(), assignee)?;
        validate::check_task_cap(&employee.to_string(), active, cap)?;

        txn.conn().execute(
            "INSERT INTO tasks (assigned_to, title, description, assigned_date, deadline, complete)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![assignee, new.title, new.description, today, new.deadline],
        )?;
        let task = rows::find_task(txn.conn(), rows::inserted_key(txn.conn())?)?;
        txn.commit()?;

        info!(task = task.id, employee_id, active = active + 1, cap, "task assigned");
        Ok(task)
    }

    /// Marks a task complete. With `owner`, the task must belong to that
    /// employee, otherwise it is reported as not found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown task or owner
    /// mismatch.
    pub fn complete_task(&mut self, task_id: u64, owner: Option<&str>) -> Result<Task, StoreError> {
        let txn = self.db.begin()?;
        let mut task = rows::find_task(txn.conn(), task_id)?;
        if let Some(owner) = owner {
            let employee = rows::find_employee(txn.conn(), owner)?;
            if employee.id != task.assigned_to {
                return Err(StoreError::NotFound {
                    entity: "task",
                    key: format!("{task_id} for {owner}"),
                });
            }
        }
        if !task.complete {
            txn.conn()
                .execute("UPDATE tasks SET complete = 1 WHERE id = ?1", [sql_key("task", task_id)?])?;
            task.complete = true;
        }
        txn.commit()?;

        info!(task = task_id, "task completed");
        Ok(task)
    }

    /// Edits a task's title, description, deadline, or completion. Reopening
    /// a completed task counts against the assignee's cap again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an empty edit, an invalid
    /// title, or a reopen past the cap, and [`StoreError::NotFound`] for an
    /// unknown task.
    pub fn update_task(&mut self, task_id: u64, changes: TaskChanges) -> Result<Task, StoreError> {
        if changes.is_empty() {
            return Err(ValidationError::NoChanges.into());
        }
        if let Some(title) = &changes.title {
            validate::check_task_title(title)?;
        }
        let cap = self.ctx.config.max_active_tasks;

        let txn = self.db.begin()?;
        let mut task = rows::find_task(txn.conn(), task_id)?;
        if task.complete && changes.complete == Some(false) {
            let employee = rows::find_employee_by_key(txn.conn(), task.assigned_to)?;
            let active = active_tasks(txn.conn(), sql_key("employee", employee.id)?)?;
            validate::check_task_cap(&employee.to_string(), active, cap)?;
        }
        changes.apply(&mut task);
        txn.conn().execute(
            "UPDATE tasks SET title = ?1, description = ?2, deadline = ?3, complete = ?4
             WHERE id = ?5",
            params![
                task.title,
                task.description,
                task.deadline,
                task.complete,
                sql_key("task", task_id)?
            ],
        )?;
        txn.commit()?;

        info!(task = task_id, "task updated");
        Ok(task)
    }

    /// Deletes a task and returns what was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown task.
    pub fn delete_task(&mut self, task_id: u64) -> Result<Task, StoreError> {
        let txn = self.db.begin()?;
        let task = rows::find_task(txn.conn(), task_id)?;
        txn.conn().execute("DELETE FROM tasks WHERE id = ?1", [sql_key("task", task_id)?])?;
        txn.commit()?;

        info!(task = task_id, "task deleted");
        Ok(task)
    }

    /// Lists tasks, incomplete first, then by deadline.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown `owner`, or a query
    /// failure.
    pub fn tasks(&self, owner: Option<&str>) -> Result<Vec<Task>, StoreError> {
        let conn = self.db.connection();
        let tasks = match owner {
            Some(owner) => {
                let employee = rows::find_employee(conn, owner)?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE assigned_to = ?1
                     ORDER BY complete, deadline, id"
                ))?;
                let found = stmt
                    .query_map([sql_key("employee", employee.id)?], rows::task)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                found
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks ORDER BY complete, deadline, id"
                ))?;
                let found = stmt.query_map([], rows::task)?.collect::<rusqlite::Result<Vec<_>>>();
                found
            }
        };
        tasks.map_err(decode_error)
    }

    /// Incomplete tasks whose deadline plus the configured grace period has
    /// passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn overdue_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let today = self.ctx.clock.today();
        let grace = self.ctx.config.overdue_grace_days;
        let mut stmt = self.db.connection().prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE complete = 0 AND deadline < ?1
             ORDER BY deadline, id"
        ))?;
        let candidates = stmt
            .query_map([today], rows::task)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)?;
        Ok(candidates.into_iter().filter(|t| t.is_overdue(today, grace)).collect())
    }
}

fn active_tasks(conn: &rusqlite::Connection, assignee: i64) -> Result<u32, StoreError> {
    let active = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1 AND complete = 0",
        [assignee],
        |row| row.get(0),
    )?;
    Ok(active)
}
