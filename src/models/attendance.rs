//! Attendance records and work-hours arithmetic.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::employee::EmployeeId;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Attendance record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Open record, no clock-out yet.
    ClockedIn,
    /// Closed record with computed hours.
    Present,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockedIn => f.pad("Clocked In"),
            Self::Present => f.pad("Present"),
        }
    }
}

/// One clock-in/clock-out session of an employee on a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: EmployeeId,
    /// Name at clock-in time, kept for display after roster changes.
    #[serde(default)]
    pub employee_name: String,
    pub date: NaiveDate,
    pub clock_in: NaiveTime,
    #[serde(default)]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    pub total_hours: f64,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Open a new record at `now`, truncated to the minute.
    pub fn open(id: u64, employee_id: EmployeeId, employee_name: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            employee_id,
            employee_name,
            date: now.date(),
            clock_in: truncate_to_minute(now.time()),
            clock_out: None,
            total_hours: 0.0,
            status: AttendanceStatus::ClockedIn,
        }
    }

    /// Close the record at `now`'s time of day and compute hours.
    pub fn close(&mut self, now: NaiveDateTime) {
        let clock_out = truncate_to_minute(now.time());
        self.clock_out = Some(clock_out);
        self.total_hours = hours_between(self.clock_in, clock_out);
        self.status = AttendanceStatus::Present;
    }

    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    /// Whether this is the open record of `employee_id` on `date`.
    pub fn is_open_for(&self, employee_id: &EmployeeId, date: NaiveDate) -> bool {
        self.is_open() && self.date == date && &self.employee_id == employee_id
    }

    pub fn clock_in_at(&self) -> NaiveDateTime {
        self.date.and_time(self.clock_in)
    }

    pub fn clock_out_at(&self) -> Option<NaiveDateTime> {
        self.clock_out.map(|t| self.date.and_time(t))
    }
}

/// Hours from `clock_in` to `clock_out`, two decimals, never negative.
pub fn hours_between(clock_in: NaiveTime, clock_out: NaiveTime) -> f64 {
    let millis = (clock_out - clock_in).num_milliseconds().max(0);
    round_hours(millis as f64 / MILLIS_PER_HOUR)
}

/// Round to two decimals, half away from zero.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_hours_between() {
        assert_eq!(hours_between(at(9, 0), at(17, 30)), 8.5);
        assert_eq!(hours_between(at(9, 0), at(9, 0)), 0.0);
        // 20 minutes = 0.3333.. -> 0.33
        assert_eq!(hours_between(at(9, 0), at(9, 20)), 0.33);
        // 1 minute = 0.01666.. -> 0.02
        assert_eq!(hours_between(at(9, 0), at(9, 1)), 0.02);
    }

    #[test]
    fn test_hours_never_negative() {
        assert_eq!(hours_between(at(17, 0), at(9, 0)), 0.0);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_hours(0.125), 0.13);
        assert_eq!(round_hours(2.0), 2.0);
    }

    #[test]
    fn test_open_truncates_seconds() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 42)
            .unwrap();
        let mut record = AttendanceRecord::open(1, EmployeeId::from("E1"), "Alice".to_string(), now);
        assert_eq!(record.clock_in, at(9, 0));
        assert!(record.is_open_for(&EmployeeId::from("E1"), now.date()));

        record.close(now.date().and_hms_opt(12, 15, 59).unwrap());
        assert_eq!(record.clock_out, Some(at(12, 15)));
        assert_eq!(record.total_hours, 3.25);
        assert_eq!(record.status, AttendanceStatus::Present);
        assert!(!record.is_open());
    }
}
