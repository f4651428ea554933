//! `roster attendance` commands.

use std::collections::HashMap;

use crate::cli::AttendanceCommand;
use crate::context::ServiceContext;
use crate::records::{Attendance, Choice};

/// Execute an `attendance` subcommand.
///
/// # Errors
///
/// Returns an error string if the store rejects the operation.
pub fn run(ctx: &ServiceContext, command: &AttendanceCommand) -> Result<(), String> {
    let mut store = super::open_store(ctx)?;
    match command {
        AttendanceCommand::CheckIn { employee_id, at } => {
            let entry = store.check_in(employee_id, *at).map_err(|e| e.to_string())?;
            println!("{employee_id} checked in on {} at {}", entry.date, time(entry.check_in));
            Ok(())
        }
        AttendanceCommand::CheckOut { employee_id, at } => {
            let entry = store.check_out(employee_id, *at).map_err(|e| e.to_string())?;
            println!("{employee_id} checked out on {} at {}", entry.date, time(entry.check_out));
            Ok(())
        }
        AttendanceCommand::Mark { employee_id, status, date, remarks } => {
            let entry = store
                .mark_attendance(employee_id, *date, *status, remarks.clone())
                .map_err(|e| e.to_string())?;
            println!("{employee_id} marked {} on {}", entry.status.label(), entry.date);
            Ok(())
        }
        AttendanceCommand::List { employee, date, json } => {
            let entries =
                store.attendance(employee.as_deref(), *date).map_err(|e| e.to_string())?;
            if *json {
                return super::print_json(&entries);
            }
            if entries.is_empty() {
                println!("No attendance recorded.");
                return Ok(());
            }
            let numbers: HashMap<u64, String> = store
                .employees(true)
                .map_err(|e| e.to_string())?
                .into_iter()
                .filter_map(|e| Some((e.id, e.employee_id?.into_string())))
                .collect();
            let rows: Vec<[String; 6]> = entries.iter().map(|a| row(a, &numbers)).collect();
            super::print_table(["DATE", "EMPLOYEE", "STATUS", "IN", "OUT", "REMARKS"], &rows);
            Ok(())
        }
    }
}

fn time(value: Option<chrono::NaiveTime>) -> String {
    value.map_or_else(|| "-".to_string(), |t| t.format("%H:%M").to_string())
}

fn row(entry: &Attendance, numbers: &HashMap<u64, String>) -> [String; 6] {
    [
        entry.date.to_string(),
        numbers.get(&entry.employee).cloned().unwrap_or_else(|| format!("#{}", entry.employee)),
        entry.status.label().to_string(),
        time(entry.check_in),
        time(entry.check_out),
        entry.remarks.clone().unwrap_or_default(),
    ]
}
