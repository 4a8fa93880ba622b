//! Employee model and the add/edit form DTO.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable employee identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Employment status shown in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.pad("Active"),
            Self::Inactive => f.pad("Inactive"),
        }
    }
}

/// Employee in the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl Employee {
    /// Build an active employee from a validated form.
    pub fn from_form(id: EmployeeId, form: EmployeeForm) -> Self {
        Self {
            id,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            position: form.position,
            department: form.department,
            hire_date: form.hire_date,
            status: EmployeeStatus::Active,
        }
    }

    /// Display name, "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive substring match against the searchable fields.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.department,
            &self.position,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// DTO for the add/edit employee form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
}

impl EmployeeForm {
    /// Check required fields and e-mail shape.
    ///
    /// Returns the user-facing message on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        let required = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.position,
            &self.department,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err("Please fill in all required fields");
        }
        if !is_valid_email(&self.email) {
            return Err("Please enter a valid email address");
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EmployeeForm {
        EmployeeForm {
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            email: "sarah.johnson@company.com".to_string(),
            position: "Software Engineer".to_string(),
            department: "Engineering".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut f = form();
        f.position = "   ".to_string();
        assert_eq!(f.validate(), Err("Please fill in all required fields"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@example"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@example."));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("a@b.c\n"));
        assert!(is_valid_email("a@b..com"));
        assert!(is_valid_email("a@.b.c"));

        let mut f = form();
        f.email = "not-an-email".to_string();
        assert_eq!(f.validate(), Err("Please enter a valid email address"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let emp = Employee::from_form(EmployeeId::from("1"), form());
        assert!(emp.matches("johnson"));
        assert!(emp.matches("engineer"));
        assert!(emp.matches("company.com"));
        assert!(!emp.matches("design"));
        assert_eq!(emp.full_name(), "Sarah Johnson");
        assert_eq!(emp.status, EmployeeStatus::Active);
    }
}
