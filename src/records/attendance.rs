//! Daily attendance: one row per employee per day.

use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::choice::Choice;

/// How an employee's day was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    /// At work. Checking in records this.
    #[default]
    Present,
    /// Did not attend.
    Absent,
    /// Away on leave.
    OnLeave,
}

impl Choice for AttendanceStatus {
    const KIND: &'static str = "attendance status";
    const ALL: &'static [Self] = &[Self::Present, Self::Absent, Self::OnLeave];

    fn label(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::OnLeave => "on-leave",
        }
    }
}

/// A persisted attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Internal key.
    pub id: u64,
    /// Internal key of the employee.
    pub employee: u64,
    /// Day the entry covers.
    pub date: NaiveDate,
    /// Arrival time, if checked in.
    pub check_in: Option<NaiveTime>,
    /// Departure time, if checked out.
    pub check_out: Option<NaiveTime>,
    /// How the day was recorded.
    pub status: AttendanceStatus,
    /// Free-form note.
    pub remarks: Option<String>,
}

impl Attendance {
    /// Time between check-in and check-out, once both are recorded.
    #[must_use]
    pub fn worked(&self) -> Option<chrono::Duration> {
        Some(self.check_out? - self.check_in?)
    }
}
