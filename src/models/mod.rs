//! Data models for employees, attendance records, timesheets and departments.

pub mod attendance;
pub mod department;
pub mod employee;
pub mod timesheet;

pub use attendance::{AttendanceRecord, AttendanceStatus, hours_between, round_hours};
pub use department::{DepartmentCount, DepartmentStats};
pub use employee::{Employee, EmployeeForm, EmployeeId, EmployeeStatus};
pub use timesheet::{EntryType, Timesheet, TimesheetAction, TimesheetEntry, TimesheetId, TimesheetStatus};
