//! Calendar events projected from the attendance ledger and timesheets.
//!
//! Nothing is cached; events are rebuilt from the state on every call.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::models::{AttendanceRecord, AttendanceStatus, Timesheet, TimesheetStatus};
use crate::tracker::TrackerState;

/// What a calendar event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Attendance,
    ClockedIn,
    Timesheet(TimesheetStatus),
}

impl EventKind {
    /// Tag used by the calendar for styling.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::ClockedIn => "clocked-in",
            Self::Timesheet(status) => status.tag(),
        }
    }
}

/// Displayable calendar event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(skip)]
    pub kind: EventKind,
    pub tag: &'static str,
}

impl CalendarEvent {
    fn new(title: String, start: NaiveDateTime, end: NaiveDateTime, kind: EventKind) -> Self {
        Self {
            title,
            start,
            end,
            kind,
            tag: kind.tag(),
        }
    }

    /// Whether the event starts within `[from, to]`, both inclusive.
    pub fn starts_between(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let date = self.start.date();
        from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
    }
}

/// Project every record and timesheet into events.
///
/// Attendance events come first in ledger order, then timesheet events in
/// store order. Open records run until `end_of_day` on their date, or are
/// zero-length when they start after it.
pub fn project(state: &TrackerState, end_of_day: NaiveTime) -> Vec<CalendarEvent> {
    let attendance = state
        .attendance()
        .iter()
        .map(|record| attendance_event(record, end_of_day));
    let timesheets = state.timesheets().iter().map(timesheet_event);

    attendance.chain(timesheets).collect()
}

fn attendance_event(record: &AttendanceRecord, end_of_day: NaiveTime) -> CalendarEvent {
    let start = record.clock_in_at();
    match (record.status, record.clock_out_at()) {
        (AttendanceStatus::Present, Some(end)) => CalendarEvent::new(
            format!("{} - {}", record.employee_name, AttendanceStatus::Present),
            start,
            end,
            EventKind::Attendance,
        ),
        // Open, or a seeded Present record without a clock-out.
        _ => CalendarEvent::new(
            format!("{} - {}", record.employee_name, AttendanceStatus::ClockedIn),
            start,
            record.date.and_time(end_of_day).max(start),
            EventKind::ClockedIn,
        ),
    }
}

fn timesheet_event(timesheet: &Timesheet) -> CalendarEvent {
    let at = timesheet.week_ending.and_time(NaiveTime::MIN);
    CalendarEvent::new(
        format!(
            "Timesheet {} ({}) - {}",
            timesheet.id, timesheet.employee_name, timesheet.status
        ),
        at,
        at,
        EventKind::Timesheet(timesheet.status),
    )
}
