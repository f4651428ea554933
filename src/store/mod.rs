//! Roster store: employee, task, leave, and attendance operations over
//! `SQLite`.
//!
//! Every write runs in one [`SqliteTxn`](crate::adapters::SqliteTxn):
//! identifier allocation, validation reads, and the insert or update
//! commit together or not at all. An error returned before `commit` drops
//! the transaction, which rolls it back.

mod attendance;
mod leave;
mod rows;
mod tasks;

use std::path::Path;

use rusqlite::params;
use tracing::info;

use crate::adapters::SqliteStore;
use crate::allocator::{Allocation, AllocationError};
use crate::context::ServiceContext;
use crate::error::{is_unique_violation, StoreError};
use crate::ports::LastValueProvider;
use crate::records::{Choice, Department, Employee, NewEmployee, Position, EMPLOYEES};
use crate::validate;

use rows::{decode_error, EMPLOYEE_COLUMNS};

/// Narrows an employee listing. The default matches every active employee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    /// Case-insensitive substring of the name, email, or employee number.
    pub query: Option<String>,
    /// Only this department.
    pub department: Option<Department>,
    /// Only this position.
    pub position: Option<Position>,
    /// Also match archived employees.
    pub include_archived: bool,
}

/// Domain operations over a roster database.
pub struct RosterStore<'a> {
    ctx: &'a ServiceContext,
    db: SqliteStore,
}

impl<'a> RosterStore<'a> {
    /// Wraps an already opened database.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, db: SqliteStore) -> Self {
        Self { ctx, db }
    }

    /// Opens the database named by the context's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(ctx: &'a ServiceContext) -> Result<Self, StoreError> {
        Self::open_at(ctx, &ctx.config.database)
    }

    /// Opens the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_at(ctx: &'a ServiceContext, path: &Path) -> Result<Self, StoreError> {
        let db = SqliteStore::open(path, ctx.config.lock_timeout())?;
        Ok(Self::new(ctx, db))
    }

    /// Creates the schema if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn init(&self) -> Result<(), StoreError> {
        self.db.init_schema()
    }

    /// Registers an employee, allocating the next employee number in the
    /// same transaction as the insert.
    ///
    /// A draft that already carries an employee number keeps it, provided
    /// the number sorts after every number issued so far; otherwise later
    /// allocations would derive numbers that are already taken.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a blank name, malformed email,
    /// or out-of-sequence preassigned number, [`StoreError::Duplicate`] when
    /// the email or number is taken,
    /// and lock or allocation failures.
    pub fn register_employee(&mut self, mut draft: NewEmployee) -> Result<Employee, StoreError> {
        validate::check_not_blank("full name", &draft.full_name)?;
        validate::check_email(&draft.email)?;
        let employment_date = draft.employment_date.unwrap_or_else(|| self.ctx.clock.today());

        let mut txn = self.db.begin()?;
        let taken: bool = txn.conn().query_row(
            "SELECT EXISTS (SELECT 1 FROM employees WHERE email = ?1)",
            [&draft.email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(StoreError::Duplicate(format!(
                "an employee with email {} already exists",
                draft.email
            )));
        }
        if let Some(preassigned) = &draft.employee_id {
            let tail = txn.lock_tail(EMPLOYEES).map_err(AllocationError::from)?;
            let next = self.ctx.allocator.next_value(EMPLOYEES, tail.as_ref())?;
            validate::check_preassigned(self.ctx.allocator.format(), preassigned, next)?;
        }
        let allocation = self.ctx.allocator.allocate(&mut txn, &mut draft)?;

        txn.conn()
            .execute(
                "INSERT INTO employees (employee_id, full_name, email, gender, position,
                     department, date_of_birth, employment_date, phone_number, address)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    allocation.id().as_str(),
                    draft.full_name,
                    draft.email,
                    draft.gender.map(Choice::label),
                    draft.position.map(Choice::label),
                    draft.department.map(Choice::label),
                    draft.date_of_birth,
                    employment_date,
                    draft.phone_number,
                    draft.address,
                ],
            )
            .map_err(|err| duplicate_employee(err, &draft))?;
        let id = rows::inserted_key(txn.conn())?;
        let tag = txn.tag();
        txn.commit()?;

        match &allocation {
            Allocation::Assigned(number) => info!(%tag, employee_id = %number, "employee registered"),
            Allocation::AlreadyAssigned(number) => {
                info!(%tag, employee_id = %number, "employee registered with preassigned number");
            }
        }

        Ok(Employee {
            id,
            employee_id: Some(allocation.into_id()),
            full_name: draft.full_name,
            email: draft.email,
            gender: draft.gender,
            position: draft.position,
            department: draft.department,
            date_of_birth: draft.date_of_birth,
            employment_date,
            phone_number: draft.phone_number,
            address: draft.address,
            archived_on: None,
        })
    }

    /// Lists employees in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn employees(&self, include_archived: bool) -> Result<Vec<Employee>, StoreError> {
        self.search_employees(&EmployeeFilter { include_archived, ..EmployeeFilter::default() })
    }

    /// Employees matching every criterion in `filter`, in registration
    /// order. A blank query matches everyone.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn search_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        let needle = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let mut stmt = self.db.connection().prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees
             WHERE (?1 OR archived_on IS NULL)
               AND (?2 IS NULL
                    OR instr(lower(full_name), ?2) > 0
                    OR instr(lower(email), ?2) > 0
                    OR instr(lower(coalesce(employee_id, '')), ?2) > 0)
               AND (?3 IS NULL OR department = ?3)
               AND (?4 IS NULL OR position = ?4)
             ORDER BY id"
        ))?;
        let employees = stmt
            .query_map(
                params![
                    filter.include_archived,
                    needle,
                    filter.department.map(Choice::label),
                    filter.position.map(Choice::label),
                ],
                rows::employee,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)?;
        Ok(employees)
    }

    /// Looks an employee up by employee number.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no employee has that number.
    pub fn employee(&self, employee_id: &str) -> Result<Employee, StoreError> {
        rows::find_employee(self.db.connection(), employee_id)
    }

    /// Archives an employee. The row and its number stay in the table, so
    /// the number is never allocated again; archived employees receive no
    /// new tasks or leave.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown number.
    pub fn archive_employee(&mut self, employee_id: &str) -> Result<Employee, StoreError> {
        let today = self.ctx.clock.today();
        let txn = self.db.begin()?;
        let mut employee = rows::find_employee(txn.conn(), employee_id)?;
        if employee.archived_on.is_some() {
            return Ok(employee);
        }
        txn.conn().execute(
            "UPDATE employees SET archived_on = ?1 WHERE id = ?2",
            params![today, rows::sql_key("employee", employee.id)?],
        )?;
        txn.commit()?;
        info!(employee_id, "employee archived");

        employee.archived_on = Some(today);
        Ok(employee)
    }

    /// Resolves an employee number to an employee who may receive new work.
    fn active_employee(
        conn: &rusqlite::Connection,
        employee_id: &str,
    ) -> Result<Employee, StoreError> {
        let employee = rows::find_employee(conn, employee_id)?;
        if employee.archived_on.is_some() {
            return Err(StoreError::NotFound {
                entity: "active employee",
                key: employee_id.to_string(),
            });
        }
        Ok(employee)
    }
}

fn duplicate_employee(err: rusqlite::Error, draft: &NewEmployee) -> StoreError {
    if !is_unique_violation(&err) {
        return StoreError::Sqlite(err);
    }
    // SQLite names the column as "UNIQUE constraint failed: employees.email".
    // The email is checked earlier under the same write lock, so this only
    // fires if that check and the schema disagree.
    if err.to_string().contains("employees.email") {
        StoreError::Duplicate(format!("an employee with email {} already exists", draft.email))
    } else {
        let number = draft.employee_id.as_ref().map_or("?", |id| id.as_str());
        StoreError::Duplicate(format!("employee number {number} is already in use"))
    }
}
