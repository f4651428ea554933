//! Leave requests and their approval state.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::choice::Choice;

/// Kind of leave requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum LeaveType {
    Sick,
    Annual,
    Unpaid,
    Maternity,
    Paternity,
    Bereavement,
    #[default]
    Other,
}

impl Choice for LeaveType {
    const KIND: &'static str = "leave type";
    const ALL: &'static [Self] = &[
        Self::Sick,
        Self::Annual,
        Self::Unpaid,
        Self::Maternity,
        Self::Paternity,
        Self::Bereavement,
        Self::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Annual => "annual",
            Self::Unpaid => "unpaid",
            Self::Maternity => "maternity",
            Self::Paternity => "paternity",
            Self::Bereavement => "bereavement",
            Self::Other => "other",
        }
    }
}

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved by an administrator.
    Approved,
    /// Rejected by an administrator.
    Rejected,
}

impl Choice for LeaveStatus {
    const KIND: &'static str = "leave status";
    const ALL: &'static [Self] = &[Self::Pending, Self::Approved, Self::Rejected];

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Administrator decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    /// Move to [`LeaveStatus::Approved`].
    Approve,
    /// Move to [`LeaveStatus::Rejected`].
    Reject,
}

impl LeaveDecision {
    /// Status the request ends up in.
    #[must_use]
    pub fn status(self) -> LeaveStatus {
        match self {
            Self::Approve => LeaveStatus::Approved,
            Self::Reject => LeaveStatus::Rejected,
        }
    }
}

/// A leave request to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaveRequest {
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Why leave is requested.
    pub reason: String,
    /// Kind of leave.
    pub leave_type: LeaveType,
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Internal key.
    pub id: u64,
    /// Internal key of the requesting employee.
    pub employee: u64,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Why leave is requested.
    pub reason: String,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// Approval state.
    pub status: LeaveStatus,
    /// Day the request was submitted.
    pub applied_on: NaiveDate,
    /// Day the request was approved or rejected.
    pub decided_on: Option<NaiveDate>,
}

impl LeaveRequest {
    /// Approved and `day` falls within the requested range.
    #[must_use]
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.status == LeaveStatus::Approved && self.start_date <= day && day <= self.end_date
    }

    /// Rejected no more than `window_days` before `today`.
    #[must_use]
    pub fn is_recent_rejection(&self, today: NaiveDate, window_days: u32) -> bool {
        if self.status != LeaveStatus::Rejected {
            return false;
        }
        let Some(decided) = self.decided_on else {
            return false;
        };
        let expires = decided
            .checked_add_days(chrono::Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MAX);
        decided <= today && today <= expires
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn request(status: LeaveStatus, decided_on: Option<NaiveDate>) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            employee: 1,
            start_date: day(10),
            end_date: day(12),
            reason: "family".into(),
            leave_type: LeaveType::Annual,
            status,
            applied_on: day(1),
            decided_on,
        }
    }

    #[test]
    fn active_only_when_approved_and_in_range() {
        let approved = request(LeaveStatus::Approved, Some(day(2)));
        assert!(!approved.is_active_on(day(9)));
        assert!(approved.is_active_on(day(10)));
        assert!(approved.is_active_on(day(12)));
        assert!(!approved.is_active_on(day(13)));
        assert!(!request(LeaveStatus::Pending, None).is_active_on(day(11)));
    }

    #[test]
    fn rejection_notice_expires_after_window() {
        let rejected = request(LeaveStatus::Rejected, Some(day(3)));
        assert!(rejected.is_recent_rejection(day(3), 7));
        assert!(rejected.is_recent_rejection(day(10), 7));
        assert!(!rejected.is_recent_rejection(day(11), 7));
        assert!(!request(LeaveStatus::Approved, Some(day(3))).is_recent_rejection(day(4), 7));
    }

    #[test]
    fn decision_maps_to_status() {
        assert_eq!(LeaveDecision::Approve.status(), LeaveStatus::Approved);
        assert_eq!(LeaveDecision::Reject.status(), LeaveStatus::Rejected);
        assert_eq!(LeaveStatus::from_label("rejected"), Ok(LeaveStatus::Rejected));
    }
}
