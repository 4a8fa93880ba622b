//! Initial tracker data: built-in sample data or a TOML seed file.
//!
//! Seed file layout:
//!
//! ```toml
//! [[employees]]
//! id = "1"
//! first_name = "Sarah"
//! last_name = "Johnson"
//! email = "sarah.johnson@company.com"
//! position = "Software Engineer"
//! department = "Engineering"
//! hire_date = "2023-01-15"
//!
//! [[attendance]]
//! id = 1
//! employee_id = "1"
//! date = "2024-03-04"
//! clock_in = "09:00:00"
//! clock_out = "17:30:00"
//! total_hours = 8.5
//! status = "Present"
//!
//! [[timesheets]]
//! id = "TS-001"
//! employee_id = "1"
//! week_ending = "2024-03-08"
//! entries = [{ date = "2024-03-04", hours = 8.0, type = "regular" }]
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Weekday};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Employee, EmployeeId, EmployeeStatus, EntryType, Timesheet,
    TimesheetEntry, TimesheetId, TimesheetStatus, hours_between,
};
use crate::tracker::TrackerState;

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub employees: Vec<Employee>,
    pub attendance: Vec<AttendanceRecord>,
    pub timesheets: Vec<TimesheetSeed>,
}

/// Timesheet as written in a seed file; totals default to the entry sums.
#[derive(Debug, Deserialize)]
pub struct TimesheetSeed {
    pub id: TimesheetId,
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub employee_name: Option<String>,
    pub week_ending: NaiveDate,
    #[serde(default)]
    pub status: TimesheetStatus,
    #[serde(default)]
    pub submitted_date: Option<NaiveDate>,
    #[serde(default)]
    pub entries: Vec<TimesheetEntry>,
    pub total_hours: Option<f64>,
    pub regular_hours: Option<f64>,
    pub overtime_hours: Option<f64>,
}

impl SeedData {
    /// Parse seed TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AppError::seed(e.to_string()))
    }

    /// Check uniqueness, id range and the one-open-record-per-day rule, then build the state.
    ///
    /// Record status follows `clock_out`: open records are `ClockedIn` with
    /// zero hours, closed ones are `Present`.
    pub fn into_state(self) -> Result<TrackerState> {
        let mut ids = HashSet::new();
        for employee in &self.employees {
            if !ids.insert(&employee.id) {
                return Err(AppError::seed(format!("duplicate employee id {}", employee.id)));
            }
            if employee.id.as_str().parse::<u64>() == Ok(u64::MAX) {
                return Err(AppError::seed(format!("employee id {} is out of range", employee.id)));
            }
        }

        let name_of = |id: &EmployeeId| {
            self.employees
                .iter()
                .find(|e| &e.id == id)
                .map(Employee::full_name)
                .unwrap_or_else(|| id.to_string())
        };

        let mut record_ids = HashSet::new();
        let mut open = HashSet::new();
        let mut attendance = Vec::with_capacity(self.attendance.len());
        for mut record in self.attendance {
            if !record_ids.insert(record.id) {
                return Err(AppError::seed(format!("duplicate attendance id {}", record.id)));
            }
            if record.is_open() && !open.insert((record.employee_id.clone(), record.date)) {
                return Err(AppError::seed(format!(
                    "employee {} has more than one open record on {}",
                    record.employee_id, record.date
                )));
            }
            if record.id == u64::MAX {
                return Err(AppError::seed(format!("attendance id {} is out of range", record.id)));
            }
            if record.employee_name.is_empty() {
                record.employee_name = name_of(&record.employee_id);
            }
            normalize_record(&mut record)?;
            attendance.push(record);
        }

        let mut timesheet_ids = HashSet::new();
        let mut timesheets = Vec::with_capacity(self.timesheets.len());
        for seed in self.timesheets {
            if !timesheet_ids.insert(seed.id.clone()) {
                return Err(AppError::seed(format!("duplicate timesheet id {}", seed.id)));
            }
            let name = seed.employee_name.unwrap_or_else(|| name_of(&seed.employee_id));
            let mut timesheet = Timesheet::from_entries(seed.id, seed.employee_id, name, seed.week_ending, seed.entries);
            timesheet.status = seed.status;
            timesheet.submitted_date = seed.submitted_date;
            if let Some(total) = seed.total_hours {
                timesheet.total_hours = total;
            }
            if let Some(regular) = seed.regular_hours {
                timesheet.regular_hours = regular;
            }
            if let Some(overtime) = seed.overtime_hours {
                timesheet.overtime_hours = overtime;
            }
            timesheets.push(timesheet);
        }

        Ok(TrackerState::new(self.employees, attendance, timesheets))
    }
}

/// Make status and hours agree with `clock_out`.
fn normalize_record(record: &mut AttendanceRecord) -> Result<()> {
    match record.clock_out {
        Some(clock_out) if clock_out < record.clock_in => Err(AppError::seed(format!(
            "attendance record {} clocks out at {} before clocking in at {}",
            record.id, clock_out, record.clock_in
        ))),
        Some(clock_out) => {
            if record.status != AttendanceStatus::Present {
                warn!("Attendance record {} has a clock-out, marking Present", record.id);
                record.status = AttendanceStatus::Present;
            }
            // Closed records may leave hours out.
            if record.total_hours == 0.0 {
                record.total_hours = hours_between(record.clock_in, clock_out);
            }
            Ok(())
        }
        None => {
            if record.status != AttendanceStatus::ClockedIn {
                warn!("Attendance record {} has no clock-out, marking Clocked In", record.id);
                record.status = AttendanceStatus::ClockedIn;
            }
            record.total_hours = 0.0;
            Ok(())
        }
    }
}

/// Load a seed file into a fresh state.
pub fn load(path: &Path) -> Result<TrackerState> {
    let content = std::fs::read_to_string(path)?;
    let state = SeedData::from_toml(&content)?.into_state()?;
    info!(
        "Seed loaded from {:?}: {} employees, {} attendance records, {} timesheets",
        path,
        state.employees().len(),
        state.attendance().len(),
        state.timesheets().len()
    );
    Ok(state)
}

/// Built-in sample roster, yesterday's attendance and three timesheets
/// (one per lifecycle state) for the week before `today`.
pub fn sample_state(today: NaiveDate) -> TrackerState {
    let employees = vec![
        sample_employee("1", "Sarah", "Johnson", "Software Engineer", "Engineering", (2023, 1, 15)),
        sample_employee("2", "Michael", "Chen", "Product Manager", "Product", (2022, 11, 8)),
        sample_employee("3", "Emily", "Rodriguez", "UX Designer", "Design", (2023, 3, 22)),
    ];

    let yesterday = today - TimeDelta::days(1);
    let attendance = [("1", (9, 0), (17, 30)), ("2", (8, 45), (17, 0))]
        .into_iter()
        .zip(1..)
        .map(|((id, (in_h, in_m), (out_h, out_m)), record_id)| {
            let employee = &employees[record_id as usize - 1];
            let clock_in = time(in_h, in_m);
            let clock_out = time(out_h, out_m);
            AttendanceRecord {
                id: record_id,
                employee_id: EmployeeId::from(id),
                employee_name: employee.full_name(),
                date: yesterday,
                clock_in,
                clock_out: Some(clock_out),
                total_hours: hours_between(clock_in, clock_out),
                status: AttendanceStatus::Present,
            }
        })
        .collect();

    let week_ending = previous_friday(today);
    let timesheets = [
        ("TS-001", TimesheetStatus::Draft),
        ("TS-002", TimesheetStatus::Submitted),
        ("TS-003", TimesheetStatus::Approved),
    ]
    .into_iter()
    .zip(&employees)
    .map(|((id, status), employee)| {
        let mut ts = Timesheet::from_entries(
            TimesheetId::from(id),
            employee.id.clone(),
            employee.full_name(),
            week_ending,
            week_entries(week_ending),
        );
        ts.status = status;
        if status != TimesheetStatus::Draft {
            ts.submitted_date = Some(week_ending);
        }
        ts
    })
    .collect();

    TrackerState::new(employees, attendance, timesheets)
}

fn sample_employee(
    id: &str,
    first_name: &str,
    last_name: &str,
    position: &str,
    department: &str,
    (y, m, d): (i32, u32, u32),
) -> Employee {
    Employee {
        id: EmployeeId::from(id),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}.{}@company.com", first_name.to_lowercase(), last_name.to_lowercase()),
        position: position.to_string(),
        department: department.to_string(),
        hire_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        status: EmployeeStatus::Active,
    }
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

/// Last Friday strictly before `today`.
fn previous_friday(today: NaiveDate) -> NaiveDate {
    let back = (today.weekday().num_days_from_monday() + 7 - Weekday::Fri.num_days_from_monday()) % 7;
    let back = if back == 0 { 7 } else { back };
    today - TimeDelta::days(i64::from(back))
}

/// Monday to Friday of the week ending `friday`: 8h regular, plus 2h overtime on Thursday.
fn week_entries(friday: NaiveDate) -> Vec<TimesheetEntry> {
    let mut entries: Vec<_> = (0..5)
        .rev()
        .map(|offset| TimesheetEntry {
            date: friday - TimeDelta::days(offset),
            hours: 8.0,
            entry_type: EntryType::Regular,
        })
        .collect();
    entries.push(TimesheetEntry {
        date: friday - TimeDelta::days(1),
        hours: 2.0,
        entry_type: EntryType::Overtime,
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"
        [[employees]]
        id = "E1"
        first_name = "Alice"
        last_name = "Smith"
        email = "alice@company.com"
        position = "Engineer"
        department = "Engineering"
        hire_date = "2022-05-01"

        [[attendance]]
        id = 7
        employee_id = "E1"
        date = "2024-03-04"
        clock_in = "09:00:00"
        clock_out = "17:30:00"
        status = "Present"

        [[attendance]]
        id = 8
        employee_id = "E1"
        date = "2024-03-05"
        clock_in = "09:15:00"
        status = "ClockedIn"

        [[timesheets]]
        id = "TS1"
        employee_id = "E1"
        week_ending = "2024-03-08"
        status = "Submitted"
        submitted_date = "2024-03-08"
        entries = [
            { date = "2024-03-04", hours = 8.5 },
            { date = "2024-03-05", hours = 1.5, type = "overtime" },
        ]
    "#;

    #[test]
    fn test_seed_file() {
        let state = SeedData::from_toml(SEED).unwrap().into_state().unwrap();

        assert_eq!(state.employees().len(), 1);
        let closed = &state.attendance()[0];
        assert_eq!(closed.employee_name, "Alice Smith");
        assert_eq!(closed.total_hours, 8.5);
        assert!(state.attendance()[1].is_open());

        let ts = &state.timesheets()[0];
        assert_eq!(ts.status, TimesheetStatus::Submitted);
        assert_eq!(ts.regular_hours, 8.5);
        assert_eq!(ts.overtime_hours, 1.5);
        assert_eq!(ts.total_hours, 10.0);
        assert_eq!(ts.employee_name, "Alice Smith");
    }

    #[test]
    fn test_duplicate_open_records_rejected() {
        let seed = r#"
            [[attendance]]
            id = 1
            employee_id = "E1"
            employee_name = "Alice"
            date = "2024-03-05"
            clock_in = "09:00:00"
            status = "ClockedIn"

            [[attendance]]
            id = 2
            employee_id = "E1"
            employee_name = "Alice"
            date = "2024-03-05"
            clock_in = "10:00:00"
            status = "ClockedIn"
        "#;
        let err = SeedData::from_toml(seed).unwrap().into_state().unwrap_err();
        assert!(matches!(err, AppError::Seed(_)));
    }

    const ALICE_RECORD: &str = r#"
        [[attendance]]
        id = 1
        employee_id = "E1"
        employee_name = "Alice"
        date = "2024-03-05"
        clock_in = "09:00:00"
    "#;

    fn seed_record(rest: &str) -> Result<TrackerState> {
        SeedData::from_toml(&format!("{ALICE_RECORD}{rest}"))?.into_state()
    }

    #[test]
    fn test_clocked_in_record_with_clock_out_is_present() {
        let state = seed_record("clock_out = \"17:00:00\"\nstatus = \"ClockedIn\"").unwrap();
        let record = &state.attendance()[0];

        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.total_hours, 8.0);
        assert!(state.clocked_in(record.date).is_empty());
    }

    #[test]
    fn test_present_record_without_clock_out_is_open() {
        let state = seed_record("total_hours = 5.0\nstatus = \"Present\"").unwrap();
        let record = &state.attendance()[0];

        assert_eq!(record.status, AttendanceStatus::ClockedIn);
        assert_eq!(record.total_hours, 0.0);
        assert!(state.is_clocked_in(&EmployeeId::from("E1"), record.date));
    }

    #[test]
    fn test_clock_out_before_clock_in_rejected() {
        let err = seed_record("clock_out = \"08:00:00\"\nstatus = \"Present\"").unwrap_err();
        assert!(matches!(err, AppError::Seed(_)));
    }

    #[test]
    fn test_same_minute_clock_out_accepted() {
        let state = seed_record("clock_out = \"09:00:00\"\nstatus = \"Present\"").unwrap();
        let record = &state.attendance()[0];
        assert_eq!(record.total_hours, 0.0);
        assert_eq!(record.clock_out_at(), Some(record.clock_in_at()));
    }

    #[test]
    fn test_unextendable_ids_rejected() {
        let employee = r#"
            [[employees]]
            id = "18446744073709551615"
            first_name = "Max"
            last_name = "Id"
            email = "max@company.com"
            position = "Engineer"
            department = "Engineering"
            hire_date = "2022-05-01"
        "#;
        let err = SeedData::from_toml(employee).unwrap().into_state().unwrap_err();
        assert!(matches!(err, AppError::Seed(_)));

        let record = ALICE_RECORD.replace("id = 1\n", "id = 18446744073709551615\n");
        let err = SeedData::from_toml(&format!("{record}status = \"ClockedIn\""))
            .unwrap()
            .into_state()
            .unwrap_err();
        assert!(matches!(err, AppError::Seed(_)));
    }

    #[test]
    fn test_malformed_seed() {
        assert!(matches!(SeedData::from_toml("employees = 3"), Err(AppError::Seed(_))));
    }

    #[test]
    fn test_previous_friday() {
        let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(previous_friday(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()), friday);
        assert_eq!(previous_friday(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()), friday);
        assert_eq!(
            previous_friday(friday),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_sample_state() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let state = sample_state(today);

        assert_eq!(state.employees().len(), 3);
        assert!(state.clocked_in(today).is_empty());
        assert_eq!(state.attendance()[0].total_hours, 8.5);
        assert_eq!(state.attendance()[1].total_hours, 8.25);

        let statuses: Vec<_> = state.timesheets().iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![TimesheetStatus::Draft, TimesheetStatus::Submitted, TimesheetStatus::Approved]
        );
        assert_eq!(state.timesheets()[0].total_hours, 42.0);
        assert_eq!(state.timesheets()[0].overtime_hours, 2.0);
    }
}
