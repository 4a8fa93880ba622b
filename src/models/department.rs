//! Department head-count statistics.

use serde::Serialize;

use super::employee::Employee;

/// Head count of one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub name: String,
    pub count: usize,
}

/// Department overview derived from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStats {
    pub departments: Vec<DepartmentCount>,
    pub total_employees: usize,
}

impl DepartmentStats {
    /// Count employees per known department, in `departments` order.
    ///
    /// Employees in departments outside the list still count towards the total.
    pub fn from_roster(departments: &[String], employees: &[Employee]) -> Self {
        let departments = departments
            .iter()
            .map(|name| DepartmentCount {
                name: name.clone(),
                count: employees.iter().filter(|e| &e.department == name).count(),
            })
            .collect();

        Self {
            departments,
            total_employees: employees.len(),
        }
    }

    /// Departments with at least one employee.
    pub fn active_departments(&self) -> usize {
        self.departments.iter().filter(|d| d.count > 0).count()
    }

    /// First department with the highest non-zero count.
    pub fn largest(&self) -> Option<&DepartmentCount> {
        self.departments.iter().fold(None, |max, dept| match max {
            Some(current) if dept.count <= current.count => Some(current),
            _ if dept.count == 0 => max,
            _ => Some(dept),
        })
    }
}
