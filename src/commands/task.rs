//! `roster task` commands.

use crate::cli::TaskCommand;
use crate::context::ServiceContext;
use crate::records::{NewTask, Task, TaskChanges};

/// Execute a `task` subcommand.
///
/// # Errors
///
/// Returns an error string if the store rejects the operation.
pub fn run(ctx: &ServiceContext, command: &TaskCommand) -> Result<(), String> {
    let mut store = super::open_store(ctx)?;
    match command {
        TaskCommand::Assign { employee_id, title, description, deadline } => {
            let new = NewTask {
                title: title.clone(),
                description: description.clone(),
                deadline: *deadline,
            };
            let task = store.assign_task(employee_id, new).map_err(|e| e.to_string())?;
            println!("Assigned task {} to {employee_id}, due {}", task.id, task.deadline);
            Ok(())
        }
        TaskCommand::Edit { task_id, title, description, deadline, done, reopen } => {
            let changes = TaskChanges {
                title: title.clone(),
                description: description.clone(),
                deadline: *deadline,
                complete: if *done {
                    Some(true)
                } else if *reopen {
                    Some(false)
                } else {
                    None
                },
            };
            let task = store.update_task(*task_id, changes).map_err(|e| e.to_string())?;
            println!("Updated task {}: {}, due {}", task.id, task.title, task.deadline);
            Ok(())
        }
        TaskCommand::Delete { task_id } => {
            let task = store.delete_task(*task_id).map_err(|e| e.to_string())?;
            println!("Deleted task {}: {}", task.id, task.title);
            Ok(())
        }
        TaskCommand::Complete { task_id, employee } => {
            let task =
                store.complete_task(*task_id, employee.as_deref()).map_err(|e| e.to_string())?;
            println!("Completed task {}: {}", task.id, task.title);
            Ok(())
        }
        TaskCommand::List { employee, json } => {
            let tasks = store.tasks(employee.as_deref()).map_err(|e| e.to_string())?;
            print_tasks(&tasks, *json, "No tasks.")
        }
        TaskCommand::Overdue { json } => {
            let tasks = store.overdue_tasks().map_err(|e| e.to_string())?;
            print_tasks(&tasks, *json, "No overdue tasks.")
        }
    }
}

fn print_tasks(tasks: &[Task], json: bool, empty: &str) -> Result<(), String> {
    if json {
        return super::print_json(tasks);
    }
    if tasks.is_empty() {
        println!("{empty}");
        return Ok(());
    }
    let rows: Vec<[String; 5]> = tasks
        .iter()
        .map(|t| {
            [
                t.id.to_string(),
                t.title.clone(),
                t.assigned_date.to_string(),
                t.deadline.to_string(),
                if t.is_active() { "open" } else { "done" }.to_string(),
            ]
        })
        .collect();
    super::print_table(["ID", "TITLE", "ASSIGNED", "DEADLINE", "STATE"], &rows);
    println!("\n{} task(s).", rows.len());
    Ok(())
}
