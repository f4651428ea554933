//! CLI argument definitions.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};

use crate::records::{AttendanceStatus, Department, Gender, LeaveType, Position};

/// Top-level CLI parser for `roster`.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Employee records, tasks, leave, and attendance")]
pub struct Cli {
    /// YAML config file (defaults to `ROSTER_CONFIG`, then `./roster.yaml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// SQLite database file, overriding the config.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,
    /// Log filter such as `info` or `roster=debug` (defaults to `ROSTER_LOG`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database schema.
    Init,
    /// Register, list, and archive employees.
    #[command(subcommand)]
    Employee(EmployeeCommand),
    /// Assign and complete tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Request and decide leave.
    #[command(subcommand)]
    Leave(LeaveCommand),
    /// Check in, check out, and record daily attendance.
    #[command(subcommand)]
    Attendance(AttendanceCommand),
}

/// `roster employee ...`
#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    /// Register an employee and print the allocated employee number.
    Add(AddEmployee),
    /// List employees, optionally searched and filtered.
    List {
        /// Include archived employees.
        #[arg(long)]
        all: bool,
        /// Match a substring of the name, email, or employee number.
        #[arg(long)]
        search: Option<String>,
        /// Only this department.
        #[arg(long, value_enum)]
        department: Option<Department>,
        /// Only this position.
        #[arg(long, value_enum)]
        position: Option<Position>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one employee.
    Show {
        /// Employee number, e.g. EMP0001.
        employee_id: String,
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
    /// Archive an employee. The number is never reused.
    Remove {
        /// Employee number.
        employee_id: String,
    },
}

/// Fields for `roster employee add`.
#[derive(Debug, Args)]
pub struct AddEmployee {
    /// Full name.
    #[arg(long)]
    pub name: String,
    /// Email address, unique across employees.
    #[arg(long)]
    pub email: String,
    /// Gender.
    #[arg(long, value_enum)]
    pub gender: Option<Gender>,
    /// Job title.
    #[arg(long, value_enum)]
    pub position: Option<Position>,
    /// Department.
    #[arg(long, value_enum)]
    pub department: Option<Department>,
    /// Date of birth (YYYY-MM-DD).
    #[arg(long)]
    pub born: Option<NaiveDate>,
    /// Employment date (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    pub employed: Option<NaiveDate>,
    /// Phone number.
    #[arg(long, default_value = "")]
    pub phone: String,
    /// Postal address.
    #[arg(long, default_value = "")]
    pub address: String,
}

/// `roster task ...`
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Assign a task to an employee.
    Assign {
        /// Employee number of the assignee.
        employee_id: String,
        /// Short title, at most 100 characters.
        #[arg(long)]
        title: String,
        /// Longer description.
        #[arg(long, default_value = "")]
        description: String,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        deadline: NaiveDate,
    },
    /// Change a task's title, description, deadline, or completion.
    Edit {
        /// Task key.
        task_id: u64,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New due date (YYYY-MM-DD).
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Mark the task done.
        #[arg(long, conflicts_with = "reopen")]
        done: bool,
        /// Mark a completed task open again.
        #[arg(long)]
        reopen: bool,
    },
    /// Delete a task.
    Delete {
        /// Task key.
        task_id: u64,
    },
    /// Mark a task complete.
    Complete {
        /// Task key.
        task_id: u64,
        /// Only complete the task if it belongs to this employee.
        #[arg(long)]
        employee: Option<String>,
    },
    /// List tasks.
    List {
        /// Only this employee's tasks.
        #[arg(long)]
        employee: Option<String>,
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
    /// List incomplete tasks past their deadline and grace period.
    Overdue {
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
}

/// `roster leave ...`
#[derive(Debug, Subcommand)]
pub enum LeaveCommand {
    /// Submit a leave request.
    Submit {
        /// Employee number of the requester.
        employee_id: String,
        /// First day of leave (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,
        /// Last day of leave, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,
        /// Reason for the request.
        #[arg(long)]
        reason: String,
        /// Kind of leave.
        #[arg(long, value_enum, default_value_t = LeaveType::Other)]
        kind: LeaveType,
    },
    /// Approve a pending request.
    Approve {
        /// Leave request key.
        leave_id: u64,
    },
    /// Reject a pending request.
    Reject {
        /// Leave request key.
        leave_id: u64,
    },
    /// List leave requests, newest first.
    List {
        /// Only this employee's requests.
        #[arg(long)]
        employee: Option<String>,
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
    /// Recently rejected requests for an employee.
    Notices {
        /// Employee number.
        employee_id: String,
    },
    /// Who is on approved leave today and who is present.
    Today,
}

/// `roster attendance ...`
#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Record today's arrival.
    CheckIn {
        /// Employee number.
        employee_id: String,
        /// Time of arrival (HH:MM[:SS]), defaults to now.
        #[arg(long)]
        at: Option<NaiveTime>,
    },
    /// Record today's departure.
    CheckOut {
        /// Employee number.
        employee_id: String,
        /// Time of departure (HH:MM[:SS]), defaults to now.
        #[arg(long)]
        at: Option<NaiveTime>,
    },
    /// Set the status of a day.
    Mark {
        /// Employee number.
        employee_id: String,
        /// Status to record.
        #[arg(long, value_enum)]
        status: AttendanceStatus,
        /// Day to mark (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Note to attach.
        #[arg(long)]
        remarks: Option<String>,
    },
    /// List attendance, newest day first.
    List {
        /// Only this employee.
        #[arg(long)]
        employee: Option<String>,
        /// Only this day (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_init_subcommand() {
        let cli = Cli::parse_from(["roster", "init"]);
        assert!(matches!(cli.command, Command::Init));
        assert!(cli.database.is_none());
    }

    #[test]
    fn parses_employee_add_with_choices() {
        let cli = Cli::parse_from([
            "roster",
            "employee",
            "add",
            "--name",
            "Ada Lovelace",
            "--email",
            "ada@example.com",
            "--position",
            "software-engineer",
            "--born",
            "1815-12-10",
        ]);
        let Command::Employee(EmployeeCommand::Add(add)) = cli.command else {
            panic!("expected employee add");
        };
        assert_eq!(add.name, "Ada Lovelace");
        assert_eq!(add.position, Some(Position::SoftwareEngineer));
        assert_eq!(add.born, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert!(add.employed.is_none());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::parse_from(["roster", "task", "overdue", "--database", "x.db", "--json"]);
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
        assert!(matches!(cli.command, Command::Task(TaskCommand::Overdue { json: true })));
    }

    #[test]
    fn leave_kind_defaults_to_other() {
        let cli = Cli::parse_from([
            "roster", "leave", "submit", "EMP0001", "--from", "2025-04-01", "--to", "2025-04-02",
            "--reason", "rest",
        ]);
        let Command::Leave(LeaveCommand::Submit { kind, .. }) = cli.command else {
            panic!("expected leave submit");
        };
        assert_eq!(kind, LeaveType::Other);
    }

    #[test]
    fn parses_employee_filters() {
        let cli = Cli::parse_from([
            "roster", "employee", "list", "--search", "ada", "--department", "marketing",
        ]);
        let Command::Employee(EmployeeCommand::List { search, department, position, .. }) =
            cli.command
        else {
            panic!("expected employee list");
        };
        assert_eq!(search.as_deref(), Some("ada"));
        assert_eq!(department, Some(Department::Marketing));
        assert!(position.is_none());
    }

    #[test]
    fn task_edit_cannot_both_finish_and_reopen() {
        let result = Cli::try_parse_from(["roster", "task", "edit", "3", "--done", "--reopen"]);
        assert!(result.is_err());
        let cli = Cli::parse_from(["roster", "task", "edit", "3", "--deadline", "2025-07-01"]);
        assert!(matches!(
            cli.command,
            Command::Task(TaskCommand::Edit { task_id: 3, done: false, reopen: false, .. })
        ));
    }

    #[test]
    fn parses_attendance_commands() {
        let cli =
            Cli::parse_from(["roster", "attendance", "check-in", "EMP0001", "--at", "09:15:00"]);
        let Command::Attendance(AttendanceCommand::CheckIn { employee_id, at }) = cli.command else {
            panic!("expected attendance check-in");
        };
        assert_eq!(employee_id, "EMP0001");
        assert_eq!(at, NaiveTime::from_hms_opt(9, 15, 0));

        let cli = Cli::parse_from([
            "roster", "attendance", "mark", "EMP0001", "--status", "on-leave",
        ]);
        assert!(matches!(
            cli.command,
            Command::Attendance(AttendanceCommand::Mark {
                status: AttendanceStatus::OnLeave,
                date: None,
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "roster", "task", "assign", "EMP0001", "--title", "x", "--deadline", "next week",
        ]);
        assert!(result.is_err());
    }
}
