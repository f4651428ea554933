//! Cross-record validation rules.
//!
//! These predicates run inside the same transaction as the insert or
//! update they guard, after any counts they need have been read under that
//! transaction. They never touch the datastore themselves.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::ident::{ExternalId, IdFormat};
use crate::records::LeaveStatus;

/// Longest accepted task title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// A rule rejected the requested change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The assignee already has the maximum number of incomplete tasks.
    #[error("{employee} already has {active} active tasks (limit {cap})")]
    TaskCapReached {
        /// Display form of the assignee.
        employee: String,
        /// Incomplete tasks currently assigned.
        active: u32,
        /// Configured limit.
        cap: u32,
    },
    /// Task title is empty or too long.
    #[error("task title must be 1 to {MAX_TITLE_CHARS} characters, got {0}")]
    TitleLength(usize),
    /// Leave ends before it starts.
    #[error("leave cannot end ({end}) before it starts ({start})")]
    InvalidLeaveRange {
        /// First day requested.
        start: NaiveDate,
        /// Last day requested.
        end: NaiveDate,
    },
    /// The request was already approved or rejected.
    #[error("leave request {id} is already {status}")]
    AlreadyDecided {
        /// Request key.
        id: u64,
        /// Current status label.
        status: &'static str,
    },
    /// Required text field left blank.
    #[error("{0} must not be blank")]
    Blank(&'static str),
    /// Email lacks the `local@domain` shape.
    #[error("{0:?} is not a valid email address")]
    Email(String),
    /// A preassigned number does not use the configured prefix and digits.
    #[error("employee number {0} does not match the configured format")]
    ForeignNumber(String),
    /// A preassigned number sorts at or before one already issued.
    #[error("employee number {id} is out of sequence; the lowest acceptable is {lowest}")]
    NumberOutOfSequence {
        /// The rejected number.
        id: String,
        /// Formatted form of `next`.
        lowest: String,
        /// Numeric value the allocator would hand out next.
        next: u64,
    },
    /// The employee already checked in that day.
    #[error("{employee} already checked in on {date} at {at}")]
    AlreadyCheckedIn {
        /// Display form of the employee.
        employee: String,
        /// Day of the entry.
        date: NaiveDate,
        /// Recorded check-in time.
        at: NaiveTime,
    },
    /// Check-out without a check-in that day.
    #[error("{employee} has not checked in on {date}")]
    NotCheckedIn {
        /// Display form of the employee.
        employee: String,
        /// Day of the entry.
        date: NaiveDate,
    },
    /// The employee already checked out that day.
    #[error("{employee} already checked out on {date} at {at}")]
    AlreadyCheckedOut {
        /// Display form of the employee.
        employee: String,
        /// Day of the entry.
        date: NaiveDate,
        /// Recorded check-out time.
        at: NaiveTime,
    },
    /// Check-out time earlier than the check-in time.
    #[error("check-out at {check_out} is before check-in at {check_in}")]
    CheckOutBeforeCheckIn {
        /// Recorded check-in time.
        check_in: NaiveTime,
        /// Requested check-out time.
        check_out: NaiveTime,
    },
    /// An edit that names no field.
    #[error("nothing to change")]
    NoChanges,
}

/// Rejects a new assignment when `active` incomplete tasks already meet `cap`.
///
/// # Errors
///
/// Returns [`ValidationError::TaskCapReached`] when `active >= cap`.
pub fn check_task_cap(employee: &str, active: u32, cap: u32) -> Result<(), ValidationError> {
    if active >= cap {
        return Err(ValidationError::TaskCapReached {
            employee: employee.to_string(),
            active,
            cap,
        });
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::TitleLength`] for an empty or over-long title.
pub fn check_task_title(title: &str) -> Result<(), ValidationError> {
    let len = title.trim().chars().count();
    if len == 0 || title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleLength(title.chars().count()));
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::InvalidLeaveRange`] when `end < start`.
pub fn check_leave_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::InvalidLeaveRange { start, end });
    }
    Ok(())
}

/// Only pending requests may be decided.
///
/// # Errors
///
/// Returns [`ValidationError::AlreadyDecided`] for approved or rejected
/// requests.
pub fn check_pending(id: u64, status: LeaveStatus) -> Result<(), ValidationError> {
    use crate::records::Choice;

    if status != LeaveStatus::Pending {
        return Err(ValidationError::AlreadyDecided { id, status: status.label() });
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::Blank`] when `value` is empty after trimming.
pub fn check_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(())
}

/// Shape check only: one `@` with text on both sides and a dot in the domain.
///
/// # Errors
///
/// Returns [`ValidationError::Email`] for anything else.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Email(email.to_string()))
    }
}

/// Accepts a preassigned number only if it parses in `format` and is no
/// lower than `next`, the value the allocator would derive from the
/// current tail.
///
/// # Errors
///
/// Returns [`ValidationError::ForeignNumber`] or
/// [`ValidationError::NumberOutOfSequence`].
pub fn check_preassigned(
    format: &IdFormat,
    id: &ExternalId,
    next: u64,
) -> Result<(), ValidationError> {
    let value = format
        .parse_suffix(id.as_str())
        .map_err(|_| ValidationError::ForeignNumber(id.to_string()))?;
    if value < next {
        return Err(ValidationError::NumberOutOfSequence {
            id: id.to_string(),
            lowest: format.format(next).into_string(),
            next,
        });
    }
    Ok(())
}

/// A day allows one check-in.
///
/// # Errors
///
/// Returns [`ValidationError::AlreadyCheckedIn`] when `existing` is set.
pub fn check_can_check_in(
    employee: &str,
    date: NaiveDate,
    existing: Option<NaiveTime>,
) -> Result<(), ValidationError> {
    match existing {
        Some(at) => {
            Err(ValidationError::AlreadyCheckedIn { employee: employee.to_string(), date, at })
        }
        None => Ok(()),
    }
}

/// A check-out needs an earlier check-in the same day and may happen once.
///
/// # Errors
///
/// Returns [`ValidationError::NotCheckedIn`],
/// [`ValidationError::AlreadyCheckedOut`], or
/// [`ValidationError::CheckOutBeforeCheckIn`].
pub fn check_can_check_out(
    employee: &str,
    date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    at: NaiveTime,
) -> Result<(), ValidationError> {
    let Some(check_in) = check_in else {
        return Err(ValidationError::NotCheckedIn { employee: employee.to_string(), date });
    };
    if let Some(done) = check_out {
        return Err(ValidationError::AlreadyCheckedOut {
            employee: employee.to_string(),
            date,
            at: done,
        });
    }
    if at < check_in {
        return Err(ValidationError::CheckOutBeforeCheckIn { check_in, check_out: at });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_cap_allows_up_to_the_limit() {
        assert!(check_task_cap("EMP0001", 0, 5).is_ok());
        assert!(check_task_cap("EMP0001", 4, 5).is_ok());
        assert_eq!(
            check_task_cap("EMP0001", 5, 5),
            Err(ValidationError::TaskCapReached { employee: "EMP0001".into(), active: 5, cap: 5 })
        );
    }

    #[test]
    fn zero_cap_blocks_every_assignment() {
        assert!(check_task_cap("EMP0001", 0, 0).is_err());
    }

    #[test]
    fn title_length_is_bounded() {
        assert!(check_task_title("Write quarterly report").is_ok());
        assert!(check_task_title(&"x".repeat(MAX_TITLE_CHARS)).is_ok());
        assert_eq!(check_task_title(&"x".repeat(101)), Err(ValidationError::TitleLength(101)));
        assert!(check_task_title("   ").is_err());
    }

    #[test]
    fn leave_range_must_not_be_inverted() {
        let a = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        assert!(check_leave_range(a, b).is_ok());
        assert!(check_leave_range(a, a).is_ok());
        assert!(check_leave_range(b, a).is_err());
    }

    #[test]
    fn only_pending_requests_can_be_decided() {
        assert!(check_pending(1, LeaveStatus::Pending).is_ok());
        let err = check_pending(1, LeaveStatus::Approved).unwrap_err();
        assert_eq!(err.to_string(), "leave request 1 is already approved");
    }

    #[test]
    fn email_shape() {
        assert!(check_email("ada@example.com").is_ok());
        assert!(check_email("ada@example").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("ada example@x.com").is_err());
        assert!(check_email("a@b@c.com").is_err());
    }

    #[test]
    fn preassigned_numbers_must_not_precede_the_sequence() {
        let format = IdFormat::default();
        let id = |raw: &str| ExternalId::from_stored(raw);
        assert!(check_preassigned(&format, &id("EMP0006"), 6).is_ok());
        assert!(check_preassigned(&format, &id("EMP0500"), 6).is_ok());
        assert_eq!(
            check_preassigned(&format, &id("EMP0005"), 6),
            Err(ValidationError::NumberOutOfSequence {
                id: "EMP0005".into(),
                lowest: "EMP0006".into(),
                next: 6,
            })
        );
        assert_eq!(
            check_preassigned(&format, &id("EMPX"), 1),
            Err(ValidationError::ForeignNumber("EMPX".into()))
        );
    }

    #[test]
    fn check_out_follows_a_single_check_in() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();

        assert!(check_can_check_in("Ada", date, None).is_ok());
        assert!(matches!(
            check_can_check_in("Ada", date, Some(at(9))),
            Err(ValidationError::AlreadyCheckedIn { .. })
        ));

        assert!(check_can_check_out("Ada", date, Some(at(9)), None, at(17)).is_ok());
        assert!(check_can_check_out("Ada", date, Some(at(9)), None, at(9)).is_ok());
        assert!(matches!(
            check_can_check_out("Ada", date, None, None, at(17)),
            Err(ValidationError::NotCheckedIn { .. })
        ));
        assert!(matches!(
            check_can_check_out("Ada", date, Some(at(9)), Some(at(12)), at(17)),
            Err(ValidationError::AlreadyCheckedOut { .. })
        ));
        assert_eq!(
            check_can_check_out("Ada", date, Some(at(9)), None, at(8)),
            Err(ValidationError::CheckOutBeforeCheckIn { check_in: at(9), check_out: at(8) })
        );
    }
}
