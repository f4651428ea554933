//! Record types persisted by the roster store.
//!
//! Choice fields are closed enums stored as their kebab-case label, the
//! same spelling used on the command line and in JSON output.

mod attendance;
mod choice;
mod employee;
mod leave;
mod task;

pub use attendance::{Attendance, AttendanceStatus};
pub use choice::{Choice, UnknownChoice};
pub use employee::{Department, Employee, Gender, NewEmployee, Position, EMPLOYEES};
pub use leave::{LeaveDecision, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest};
pub use task::{NewTask, Task, TaskChanges};
