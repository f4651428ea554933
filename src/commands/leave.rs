//! `roster leave` commands.

use crate::cli::LeaveCommand;
use crate::context::ServiceContext;
use crate::records::{Choice, LeaveDecision, LeaveRequest, NewLeaveRequest};

/// Execute a `leave` subcommand.
///
/// # Errors
///
/// Returns an error string if the store rejects the operation.
pub fn run(ctx: &ServiceContext, command: &LeaveCommand) -> Result<(), String> {
    let mut store = super::open_store(ctx)?;
    match command {
        LeaveCommand::Submit { employee_id, from, to, reason, kind } => {
            let new = NewLeaveRequest {
                start_date: *from,
                end_date: *to,
                reason: reason.clone(),
                leave_type: *kind,
            };
            let request = store.submit_leave(employee_id, new).map_err(|e| e.to_string())?;
            println!(
                "Submitted leave request {} for {employee_id}: {} to {} (pending)",
                request.id, request.start_date, request.end_date
            );
            Ok(())
        }
        LeaveCommand::Approve { leave_id } => decide(&mut store, *leave_id, LeaveDecision::Approve),
        LeaveCommand::Reject { leave_id } => decide(&mut store, *leave_id, LeaveDecision::Reject),
        LeaveCommand::List { employee, json } => {
            let requests = store.leave_requests(employee.as_deref()).map_err(|e| e.to_string())?;
            if *json {
                return super::print_json(&requests);
            }
            if requests.is_empty() {
                println!("No leave requests.");
                return Ok(());
            }
            let rows: Vec<[String; 6]> = requests.iter().map(row).collect();
            super::print_table(["ID", "FROM", "TO", "TYPE", "STATUS", "REASON"], &rows);
            Ok(())
        }
        LeaveCommand::Notices { employee_id } => {
            let notices = store.rejection_notices(employee_id).map_err(|e| e.to_string())?;
            if notices.is_empty() {
                println!("No recent rejections for {employee_id}.");
            }
            for r in &notices {
                let decided = r.decided_on.map_or_else(String::new, |d| format!(" on {d}"));
                println!(
                    "Leave request {} ({} to {}) was rejected{decided}.",
                    r.id, r.start_date, r.end_date
                );
            }
            Ok(())
        }
        LeaveCommand::Today => {
            let away = store.on_leave().map_err(|e| e.to_string())?;
            let present = store.present_today().map_err(|e| e.to_string())?;
            println!("On leave today ({}):", away.len());
            for (employee, request) in &away {
                println!("  {employee} until {} ({})", request.end_date, request.leave_type.label());
            }
            println!("Present today ({}):", present.len());
            for employee in &present {
                println!("  {employee}");
            }
            Ok(())
        }
    }
}

fn decide(
    store: &mut crate::store::RosterStore<'_>,
    leave_id: u64,
    decision: LeaveDecision,
) -> Result<(), String> {
    let request = store.decide_leave(leave_id, decision).map_err(|e| e.to_string())?;
    println!("Leave request {} {}", request.id, request.status.label());
    Ok(())
}

fn row(r: &LeaveRequest) -> [String; 6] {
    [
        r.id.to_string(),
        r.start_date.to_string(),
        r.end_date.to_string(),
        r.leave_type.label().to_string(),
        r.status.label().to_string(),
        r.reason.clone(),
    ]
}
