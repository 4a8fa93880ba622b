//! Immutable tracker state and the reducer that produces its successors.
//!
//! Every mutating operation takes `&self` and returns a new [`TrackerState`]
//! together with its result. The caller swaps the new state in only when the
//! operation succeeds.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{AppError, InvalidTransition, Result};
use crate::models::{
    AttendanceRecord, DepartmentStats, Employee, EmployeeForm, EmployeeId, Timesheet, TimesheetAction,
    TimesheetId, round_hours,
};

/// A user action against the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ClockIn { employee_id: EmployeeId },
    ClockOut { employee_id: EmployeeId },
    SubmitTimesheet { timesheet_id: TimesheetId },
    ApproveTimesheet { timesheet_id: TimesheetId },
    AddEmployee { form: EmployeeForm },
    UpdateEmployee { employee_id: EmployeeId, form: EmployeeForm },
    RemoveEmployee { employee_id: EmployeeId },
}

/// Result of a successfully applied [`Action`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    ClockedIn(AttendanceRecord),
    ClockedOut(AttendanceRecord),
    TimesheetSubmitted(Timesheet),
    TimesheetApproved(Timesheet),
    EmployeeAdded(Employee),
    EmployeeUpdated(Employee),
    EmployeeRemoved(Employee),
}

impl Outcome {
    /// Success message shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::ClockedIn(record) => format!(
                "{} clocked in at {}",
                record.employee_name,
                record.clock_in.format("%H:%M")
            ),
            Self::ClockedOut(record) => format!(
                "{} clocked out. Total hours: {}",
                record.employee_name, record.total_hours
            ),
            Self::TimesheetSubmitted(ts) => format!("Timesheet {} submitted successfully", ts.id),
            Self::TimesheetApproved(ts) => format!("Timesheet {} approved", ts.id),
            Self::EmployeeAdded(_) => "Employee added successfully!".to_string(),
            Self::EmployeeUpdated(_) => "Employee updated successfully!".to_string(),
            Self::EmployeeRemoved(_) => "Employee removed successfully!".to_string(),
        }
    }
}

/// Roster, attendance ledger and timesheets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerState {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRecord>,
    timesheets: Vec<Timesheet>,
    #[serde(skip)]
    next_employee_id: u64,
    #[serde(skip)]
    next_record_id: u64,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}

impl TrackerState {
    /// Build a state from seed data.
    pub fn new(employees: Vec<Employee>, attendance: Vec<AttendanceRecord>, timesheets: Vec<Timesheet>) -> Self {
        let next_employee_id = employees
            .iter()
            .filter_map(|e| e.id.as_str().parse::<u64>().ok())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let next_record_id = attendance
            .iter()
            .map(|r| r.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));

        Self {
            employees,
            attendance,
            timesheets,
            next_employee_id,
            next_record_id,
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    pub fn timesheets(&self) -> &[Timesheet] {
        &self.timesheets
    }

    pub fn employee(&self, employee_id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == employee_id)
    }

    pub fn timesheet(&self, timesheet_id: &TimesheetId) -> Option<&Timesheet> {
        self.timesheets.iter().find(|t| &t.id == timesheet_id)
    }

    /// Employees with an open record dated `today`, derived from the ledger.
    pub fn clocked_in(&self, today: NaiveDate) -> BTreeSet<EmployeeId> {
        self.attendance
            .iter()
            .filter(|r| r.is_open() && r.date == today)
            .map(|r| r.employee_id.clone())
            .collect()
    }

    pub fn is_clocked_in(&self, employee_id: &EmployeeId, today: NaiveDate) -> bool {
        self.attendance.iter().any(|r| r.is_open_for(employee_id, today))
    }

    /// Most recent record of `employee_id` dated `today`.
    pub fn today_record(&self, employee_id: &EmployeeId, today: NaiveDate) -> Option<&AttendanceRecord> {
        self.attendance
            .iter()
            .rev()
            .find(|r| &r.employee_id == employee_id && r.date == today)
    }

    /// Hours worked by `employee_id` on `today` across all closed sessions.
    pub fn today_hours(&self, employee_id: &EmployeeId, today: NaiveDate) -> f64 {
        round_hours(
            self.attendance
                .iter()
                .filter(|r| &r.employee_id == employee_id && r.date == today)
                .map(|r| r.total_hours)
                .sum(),
        )
    }

    /// Hours per employee on `date`.
    pub fn daily_totals(&self, date: NaiveDate) -> BTreeMap<EmployeeId, f64> {
        let mut totals = BTreeMap::new();
        for record in self.attendance.iter().filter(|r| r.date == date) {
            *totals.entry(record.employee_id.clone()).or_insert(0.0) += record.total_hours;
        }
        totals.values_mut().for_each(|h| *h = round_hours(*h));
        totals
    }

    /// Employees matching `term` case-insensitively; empty term matches all.
    pub fn search(&self, term: &str) -> Vec<&Employee> {
        let needle = term.trim().to_lowercase();
        self.employees.iter().filter(|e| e.matches(&needle)).collect()
    }

    pub fn department_stats(&self, departments: &[String]) -> DepartmentStats {
        DepartmentStats::from_roster(departments, &self.employees)
    }

    /// Apply `action` at `now`, returning the successor state.
    pub fn apply(&self, action: Action, now: NaiveDateTime) -> Result<(Self, Outcome)> {
        match action {
            Action::ClockIn { employee_id } => {
                self.clock_in(&employee_id, now).map(|(s, r)| (s, Outcome::ClockedIn(r)))
            }
            Action::ClockOut { employee_id } => {
                self.clock_out(&employee_id, now).map(|(s, r)| (s, Outcome::ClockedOut(r)))
            }
            Action::SubmitTimesheet { timesheet_id } => self
                .transition_timesheet(&timesheet_id, TimesheetAction::Submit, now.date())
                .map(|(s, t)| (s, Outcome::TimesheetSubmitted(t))),
            Action::ApproveTimesheet { timesheet_id } => self
                .transition_timesheet(&timesheet_id, TimesheetAction::Approve, now.date())
                .map(|(s, t)| (s, Outcome::TimesheetApproved(t))),
            Action::AddEmployee { form } => self.add_employee(form).map(|(s, e)| (s, Outcome::EmployeeAdded(e))),
            Action::UpdateEmployee { employee_id, form } => self
                .update_employee(&employee_id, form)
                .map(|(s, e)| (s, Outcome::EmployeeUpdated(e))),
            Action::RemoveEmployee { employee_id } => self
                .remove_employee(&employee_id, now.date())
                .map(|(s, e)| (s, Outcome::EmployeeRemoved(e))),
        }
    }

    /// Open an attendance record for `employee_id`.
    pub fn clock_in(&self, employee_id: &EmployeeId, now: NaiveDateTime) -> Result<(Self, AttendanceRecord)> {
        let employee = self
            .employee(employee_id)
            .ok_or_else(|| AppError::not_found(format!("employee {employee_id}")))?;

        if self.is_clocked_in(employee_id, now.date()) {
            return Err(InvalidTransition::AlreadyClockedIn {
                employee_id: employee_id.clone(),
            }
            .into());
        }

        let mut next = self.clone();
        let record_id = next.next_record_id;
        next.next_record_id = record_id
            .checked_add(1)
            .ok_or_else(|| AppError::validation("Attendance record ids exhausted"))?;
        let record = AttendanceRecord::open(record_id, employee_id.clone(), employee.full_name(), now);
        next.attendance.push(record.clone());

        Ok((next, record))
    }

    /// Close the first open record of `employee_id` dated today.
    pub fn clock_out(&self, employee_id: &EmployeeId, now: NaiveDateTime) -> Result<(Self, AttendanceRecord)> {
        let today = now.date();
        let index = self
            .attendance
            .iter()
            .position(|r| r.is_open_for(employee_id, today))
            .ok_or_else(|| InvalidTransition::NotClockedIn {
                employee_id: employee_id.clone(),
                date: today,
            })?;

        let mut next = self.clone();
        let record = &mut next.attendance[index];
        record.close(now);
        let record = record.clone();

        Ok((next, record))
    }

    /// Move a timesheet along its lifecycle.
    pub fn transition_timesheet(
        &self,
        timesheet_id: &TimesheetId,
        action: TimesheetAction,
        today: NaiveDate,
    ) -> Result<(Self, Timesheet)> {
        let index = self
            .timesheets
            .iter()
            .position(|t| &t.id == timesheet_id)
            .ok_or_else(|| AppError::not_found(format!("timesheet {timesheet_id}")))?;

        let from = self.timesheets[index].status;
        let to = from.transition(action).ok_or_else(|| InvalidTransition::Timesheet {
            timesheet_id: timesheet_id.clone(),
            action,
            from,
        })?;

        let mut next = self.clone();
        let timesheet = &mut next.timesheets[index];
        timesheet.status = to;
        if action == TimesheetAction::Submit {
            timesheet.submitted_date = Some(today);
        }
        let timesheet = timesheet.clone();

        Ok((next, timesheet))
    }

    pub fn add_employee(&self, form: EmployeeForm) -> Result<(Self, Employee)> {
        form.validate().map_err(AppError::validation)?;

        let mut next = self.clone();
        let id = next.allocate_employee_id()?;
        let employee = Employee::from_form(id, form);
        next.employees.push(employee.clone());

        Ok((next, employee))
    }

    /// Replace an employee's details; status returns to Active.
    pub fn update_employee(&self, employee_id: &EmployeeId, form: EmployeeForm) -> Result<(Self, Employee)> {
        form.validate().map_err(AppError::validation)?;

        let index = self
            .employees
            .iter()
            .position(|e| &e.id == employee_id)
            .ok_or_else(|| AppError::not_found(format!("employee {employee_id}")))?;

        let mut next = self.clone();
        let employee = Employee::from_form(employee_id.clone(), form);
        next.employees[index] = employee.clone();

        Ok((next, employee))
    }

    /// Remove an employee from the roster. Attendance and timesheets stay.
    pub fn remove_employee(&self, employee_id: &EmployeeId, today: NaiveDate) -> Result<(Self, Employee)> {
        let index = self
            .employees
            .iter()
            .position(|e| &e.id == employee_id)
            .ok_or_else(|| AppError::not_found(format!("employee {employee_id}")))?;

        if self.is_clocked_in(employee_id, today) {
            return Err(InvalidTransition::EmployeeClockedIn {
                employee_id: employee_id.clone(),
            }
            .into());
        }

        let mut next = self.clone();
        let removed = next.employees.remove(index);

        Ok((next, removed))
    }

    fn allocate_employee_id(&mut self) -> Result<EmployeeId> {
        loop {
            let id = EmployeeId::new(self.next_employee_id.to_string());
            self.next_employee_id = self
                .next_employee_id
                .checked_add(1)
                .ok_or_else(|| AppError::validation("Employee ids exhausted"))?;
            if self.employee(&id).is_none() {
                return Ok(id);
            }
        }
    }
}
