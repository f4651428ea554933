//! `roster employee` commands.

use crate::cli::{AddEmployee, EmployeeCommand};
use crate::context::ServiceContext;
use crate::records::{Choice, Employee, NewEmployee};
use crate::store::EmployeeFilter;

/// Execute an `employee` subcommand.
///
/// # Errors
///
/// Returns an error string if the store rejects the operation.
pub fn run(ctx: &ServiceContext, command: &EmployeeCommand) -> Result<(), String> {
    let mut store = super::open_store(ctx)?;
    match command {
        EmployeeCommand::Add(add) => {
            let employee = store.register_employee(draft(add)).map_err(|e| e.to_string())?;
            println!("{}", number(&employee));
            Ok(())
        }
        EmployeeCommand::List { all, search, department, position, json } => {
            let filter = EmployeeFilter {
                query: search.clone(),
                department: *department,
                position: *position,
                include_archived: *all,
            };
            let employees = store.search_employees(&filter).map_err(|e| e.to_string())?;
            if *json {
                return super::print_json(&employees);
            }
            if employees.is_empty() {
                println!("No matching employees.");
                return Ok(());
            }
            let rows: Vec<[String; 5]> = employees
                .iter()
                .map(|e| {
                    [
                        number(e),
                        e.full_name.clone(),
                        e.email.clone(),
                        e.department.map_or("-", Choice::label).to_string(),
                        e.archived_on.map_or_else(|| "active".to_string(), |d| format!("archived {d}")),
                    ]
                })
                .collect();
            super::print_table(["NUMBER", "NAME", "EMAIL", "DEPARTMENT", "STATUS"], &rows);
            println!("\n{} employee(s).", rows.len());
            Ok(())
        }
        EmployeeCommand::Show { employee_id, json } => {
            let employee = store.employee(employee_id).map_err(|e| e.to_string())?;
            if *json {
                return super::print_json(&employee);
            }
            print_employee(&employee);
            Ok(())
        }
        EmployeeCommand::Remove { employee_id } => {
            let employee = store.archive_employee(employee_id).map_err(|e| e.to_string())?;
            println!("Archived {employee}");
            Ok(())
        }
    }
}

fn draft(add: &AddEmployee) -> NewEmployee {
    NewEmployee {
        employee_id: None,
        full_name: add.name.clone(),
        email: add.email.clone(),
        gender: add.gender,
        position: add.position,
        department: add.department,
        date_of_birth: add.born,
        employment_date: add.employed,
        phone_number: add.phone.clone(),
        address: add.address.clone(),
    }
}

fn number(employee: &Employee) -> String {
    employee.employee_id.as_ref().map_or_else(|| format!("#{}", employee.id), ToString::to_string)
}

fn print_employee(employee: &Employee) {
    println!("Employee: {}", number(employee));
    println!("Name: {}", employee.full_name);
    println!("Email: {}", employee.email);
    if let Some(gender) = employee.gender {
        println!("Gender: {}", gender.label());
    }
    if let Some(position) = employee.position {
        println!("Position: {}", position.label());
    }
    if let Some(department) = employee.department {
        println!("Department: {}", department.label());
    }
    if let Some(born) = employee.date_of_birth {
        println!("Born: {born}");
    }
    println!("Employed since: {}", employee.employment_date);
    if !employee.phone_number.is_empty() {
        println!("Phone: {}", employee.phone_number);
    }
    if !employee.address.is_empty() {
        println!("Address: {}", employee.address);
    }
    if let Some(day) = employee.archived_on {
        println!("Archived: {day}");
    }
}
