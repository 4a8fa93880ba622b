//! Weekly timesheets and their lifecycle states.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::attendance::round_hours;
use super::employee::EmployeeId;

/// Timesheet identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimesheetId(String);

impl TimesheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimesheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TimesheetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle: Draft -> Submitted -> Approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimesheetStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
}

impl TimesheetStatus {
    /// Next status for `action`, or `None` if the transition is not allowed.
    pub fn transition(self, action: TimesheetAction) -> Option<Self> {
        match (self, action) {
            (Self::Draft, TimesheetAction::Submit) => Some(Self::Submitted),
            (Self::Submitted, TimesheetAction::Approve) => Some(Self::Approved),
            _ => None,
        }
    }

    /// Lowercase tag used by calendar events.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.pad("Draft"),
            Self::Submitted => f.pad("Submitted"),
            Self::Approved => f.pad("Approved"),
        }
    }
}

/// Timesheet lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimesheetAction {
    Submit,
    Approve,
}

impl fmt::Display for TimesheetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => f.pad("submit"),
            Self::Approve => f.pad("approve"),
        }
    }
}

/// Kind of hours on a daily entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Regular,
    Overtime,
    Holiday,
    Sick,
    Vacation,
}

/// Hours booked on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
}

/// Weekly timesheet for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timesheet {
    pub id: TimesheetId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub week_ending: NaiveDate,
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    #[serde(default)]
    pub status: TimesheetStatus,
    #[serde(default)]
    pub submitted_date: Option<NaiveDate>,
    #[serde(default)]
    pub entries: Vec<TimesheetEntry>,
}

impl Timesheet {
    /// Build a draft timesheet with totals derived from `entries`.
    ///
    /// Overtime entries count as overtime, every other type as regular.
    pub fn from_entries(
        id: TimesheetId,
        employee_id: EmployeeId,
        employee_name: String,
        week_ending: NaiveDate,
        entries: Vec<TimesheetEntry>,
    ) -> Self {
        let (regular, overtime) = entries.iter().fold((0.0, 0.0), |(regular, overtime), entry| {
            match entry.entry_type {
                EntryType::Overtime => (regular, overtime + entry.hours),
                _ => (regular + entry.hours, overtime),
            }
        });

        Self {
            id,
            employee_id,
            employee_name,
            week_ending,
            total_hours: round_hours(regular + overtime),
            regular_hours: round_hours(regular),
            overtime_hours: round_hours(overtime),
            status: TimesheetStatus::Draft,
            submitted_date: None,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_transitions() {
        use TimesheetAction::*;
        use TimesheetStatus::*;

        assert_eq!(Draft.transition(Submit), Some(Submitted));
        assert_eq!(Submitted.transition(Approve), Some(Approved));
        assert_eq!(Draft.transition(Approve), None);
        assert_eq!(Submitted.transition(Submit), None);
        assert_eq!(Approved.transition(Submit), None);
        assert_eq!(Approved.transition(Approve), None);
    }

    #[test]
    fn test_totals_from_entries() {
        let entries = vec![
            TimesheetEntry { date: day(1), hours: 8.0, entry_type: EntryType::Regular },
            TimesheetEntry { date: day(2), hours: 8.0, entry_type: EntryType::Sick },
            TimesheetEntry { date: day(3), hours: 2.5, entry_type: EntryType::Overtime },
        ];
        let ts = Timesheet::from_entries(
            TimesheetId::from("TS1"),
            EmployeeId::from("E1"),
            "Alice".to_string(),
            day(5),
            entries,
        );
        assert_eq!(ts.regular_hours, 16.0);
        assert_eq!(ts.overtime_hours, 2.5);
        assert_eq!(ts.total_hours, 18.5);
        assert_eq!(ts.status, TimesheetStatus::Draft);
        assert!(ts.submitted_date.is_none());
    }

    #[test]
    fn test_status_tags() {
        assert_eq!(TimesheetStatus::Draft.tag(), "draft");
        assert_eq!(TimesheetStatus::Submitted.tag(), "submitted");
        assert_eq!(TimesheetStatus::Approved.tag(), "approved");
    }
}
