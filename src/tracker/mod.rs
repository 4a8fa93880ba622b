//! Attendance tracker: the single owner of roster, ledger and timesheets.
//!
//! # Example
//!
//! ```ignore
//! use hr_attendance::clock::SystemClock;
//! use hr_attendance::notify::NotificationLog;
//! use hr_attendance::tracker::AttendanceTracker;
//!
//! let log = NotificationLog::default();
//! let mut tracker = AttendanceTracker::new(state, SystemClock, log.clone());
//! let record = tracker.clock_in(&"1".into())?;
//! println!("{}", log.drain()[0]);
//! ```

mod state;


pub use state::{Action, Outcome, TrackerState};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use crate::calendar::{self, CalendarEvent};
use crate::clock::Clock;
use crate::error::Result;
use crate::models::{
    AttendanceRecord, DepartmentStats, Employee, EmployeeForm, EmployeeId, Timesheet, TimesheetAction,
    TimesheetId,
};
use crate::notify::{Notification, NotificationLevel, Notifier};

/// Departments offered by the directory when none are configured.
pub const DEFAULT_DEPARTMENTS: [&str; 7] = ["Engineering", "Product", "Design", "Marketing", "Sales", "HR", "Finance"];

/// Tracker over an in-memory [`TrackerState`].
pub struct AttendanceTracker {
    state: TrackerState,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
    departments: Vec<String>,
    end_of_day: NaiveTime,
}

impl AttendanceTracker {
    /// Create a tracker with the default departments and a 23:59:59 day end.
    pub fn new(state: TrackerState, clock: impl Clock + 'static, notifier: impl Notifier + 'static) -> Self {
        Self {
            state,
            clock: Box::new(clock),
            notifier: Box::new(notifier),
            departments: DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect(),
            end_of_day: NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Replace the department list used by [`Self::department_stats`].
    pub fn with_departments(mut self, departments: Vec<String>) -> Self {
        self.departments = departments;
        self
    }

    /// Set the end time shown for records still open.
    pub fn with_end_of_day(mut self, end_of_day: NaiveTime) -> Self {
        self.end_of_day = end_of_day;
        self
    }

    /// Current state snapshot.
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Apply an action, swapping in the new state on success.
    ///
    /// Emits exactly one notification either way.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        self.commit(|state, now| state.apply(action, now), Outcome::message)
    }

    pub fn clock_in(&mut self, employee_id: &EmployeeId) -> Result<AttendanceRecord> {
        self.commit(
            |state, now| state.clock_in(employee_id, now),
            |record| Outcome::ClockedIn(record.clone()).message(),
        )
    }

    pub fn clock_out(&mut self, employee_id: &EmployeeId) -> Result<AttendanceRecord> {
        self.commit(
            |state, now| state.clock_out(employee_id, now),
            |record| Outcome::ClockedOut(record.clone()).message(),
        )
    }

    pub fn submit_timesheet(&mut self, timesheet_id: &TimesheetId) -> Result<Timesheet> {
        self.commit(
            |state, now| state.transition_timesheet(timesheet_id, TimesheetAction::Submit, now.date()),
            |ts| Outcome::TimesheetSubmitted(ts.clone()).message(),
        )
    }

    pub fn approve_timesheet(&mut self, timesheet_id: &TimesheetId) -> Result<Timesheet> {
        self.commit(
            |state, now| state.transition_timesheet(timesheet_id, TimesheetAction::Approve, now.date()),
            |ts| Outcome::TimesheetApproved(ts.clone()).message(),
        )
    }

    pub fn add_employee(&mut self, form: EmployeeForm) -> Result<Employee> {
        self.commit(
            |state, _| state.add_employee(form),
            |employee| Outcome::EmployeeAdded(employee.clone()).message(),
        )
    }

    pub fn update_employee(&mut self, employee_id: &EmployeeId, form: EmployeeForm) -> Result<Employee> {
        self.commit(
            |state, _| state.update_employee(employee_id, form),
            |employee| Outcome::EmployeeUpdated(employee.clone()).message(),
        )
    }

    pub fn remove_employee(&mut self, employee_id: &EmployeeId) -> Result<Employee> {
        self.commit(
            |state, now| state.remove_employee(employee_id, now.date()),
            |employee| Outcome::EmployeeRemoved(employee.clone()).message(),
        )
    }

    /// Employees currently clocked in, recomputed from the ledger.
    pub fn clocked_in(&self) -> BTreeSet<EmployeeId> {
        self.state.clocked_in(self.today())
    }

    pub fn is_clocked_in(&self, employee_id: &EmployeeId) -> bool {
        self.state.is_clocked_in(employee_id, self.today())
    }

    pub fn today_record(&self, employee_id: &EmployeeId) -> Option<&AttendanceRecord> {
        self.state.today_record(employee_id, self.today())
    }

    pub fn today_hours(&self, employee_id: &EmployeeId) -> f64 {
        self.state.today_hours(employee_id, self.today())
    }

    pub fn daily_totals(&self, date: NaiveDate) -> BTreeMap<EmployeeId, f64> {
        self.state.daily_totals(date)
    }

    pub fn search(&self, term: &str) -> Vec<&Employee> {
        self.state.search(term)
    }

    pub fn department_stats(&self) -> DepartmentStats {
        self.state.department_stats(&self.departments)
    }

    /// Calendar events, rebuilt on every call.
    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        let events = calendar::project(&self.state, self.end_of_day);
        debug!("Projected {} calendar events", events.len());
        events
    }

    /// Run one operation at a single sampled "now".
    fn commit<T>(
        &mut self,
        op: impl FnOnce(&TrackerState, NaiveDateTime) -> Result<(TrackerState, T)>,
        message: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        let now = self.clock.now();
        match op(&self.state, now) {
            Ok((next, value)) => {
                self.state = next;
                let text = message(&value);
                info!("{text}");
                self.notify(now, NotificationLevel::Success, text);
                Ok(value)
            }
            Err(e) => {
                warn!("Operation rejected: {e}");
                self.notify(now, NotificationLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    fn notify(&self, timestamp: NaiveDateTime, level: NotificationLevel, message: String) {
        self.notifier.notify(Notification {
            timestamp,
            level,
            message,
        });
    }
}
