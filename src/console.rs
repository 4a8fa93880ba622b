//! Line-oriented console front-end.
//!
//! Each input line is one user action, parsed with clap in multicall mode.
//! Notifications raised by the action are printed after its output.

use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::models::{Employee, EmployeeForm, EmployeeId, TimesheetId};
use crate::notify::NotificationLog;
use crate::tracker::{Action, AttendanceTracker};

/// One console line.
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// Console commands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List employees, optionally filtered by a search term
    Employees { term: Vec<String> },
    /// Add an employee
    Add(FormArgs),
    /// Edit an employee
    Edit {
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Remove an employee
    Remove { id: String },
    /// Department head counts
    Departments,
    /// Clock an employee in
    ClockIn { id: String },
    /// Clock an employee out
    ClockOut { id: String },
    /// Today's attendance for an employee
    Status { id: String },
    /// Employees currently clocked in
    ClockedIn,
    /// List timesheets
    Timesheets,
    /// Submit a draft timesheet
    Submit { id: String },
    /// Approve a submitted timesheet
    Approve { id: String },
    /// Calendar events
    Calendar {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

/// Employee form fields.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct FormArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub position: String,
    #[arg(long)]
    pub department: String,
    #[arg(long)]
    pub hire_date: NaiveDate,
}

impl From<FormArgs> for EmployeeForm {
    fn from(args: FormArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            position: args.position,
            department: args.department,
            hire_date: args.hire_date,
        }
    }
}

/// Parse a console line into a command.
pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
    Line::try_parse_from(split_args(line)).map(|l| l.command)
}

/// Split on whitespace, keeping double-quoted segments together.
fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(current);
    }
    args
}

/// Interactive console over a tracker.
pub struct Console<W: Write> {
    tracker: AttendanceTracker,
    notifications: NotificationLog,
    out: W,
    json: bool,
}

impl<W: Write> Console<W> {
    /// `notifications` must be the log the tracker notifies.
    pub fn new(tracker: AttendanceTracker, notifications: NotificationLog, out: W, json: bool) -> Self {
        Self {
            tracker,
            notifications,
            out,
            json,
        }
    }

    pub fn tracker(&self) -> &AttendanceTracker {
        &self.tracker
    }

    /// Read commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("Failed to read console input")?;
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    debug!("Console command: {command:?}");
                    self.execute(command)?;
                }
                Err(e) => write!(self.out, "{}", e.render())?,
            }
            self.flush_notifications()?;
        }
        Ok(())
    }

    /// Run one command. Rejected actions surface through notifications.
    pub fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Employees { term } => {
                let employees: Vec<Employee> = self.tracker.search(&term.join(" ")).into_iter().cloned().collect();
                let text = if employees.is_empty() {
                    "No employees found matching your search.".to_string()
                } else {
                    employees
                        .iter()
                        .map(|e| {
                            format!(
                                "{:<6} {:<24} {:<20} {:<12} {:<8} hired {}",
                                e.id,
                                e.full_name(),
                                e.position,
                                e.department,
                                e.status,
                                e.hire_date.format("%b %d, %Y")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                self.emit(&employees, text)?;
            }
            Command::Add(form) => {
                self.act(Action::AddEmployee { form: form.into() });
            }
            Command::Edit { id, form } => {
                self.act(Action::UpdateEmployee {
                    employee_id: EmployeeId::new(id),
                    form: form.into(),
                });
            }
            Command::Remove { id } => {
                self.act(Action::RemoveEmployee {
                    employee_id: EmployeeId::new(id),
                });
            }
            Command::Departments => {
                let stats = self.tracker.department_stats();
                let mut lines: Vec<String> = stats
                    .departments
                    .iter()
                    .map(|d| {
                        let noun = if d.count == 1 { "Employee" } else { "Employees" };
                        format!("{:<14} {} {noun}", d.name, d.count)
                    })
                    .collect();
                lines.push(format!("Total Employees: {}", stats.total_employees));
                lines.push(format!("Active Departments: {}", stats.active_departments()));
                lines.push(format!(
                    "Largest Department: {}",
                    stats.largest().map_or("None", |d| d.name.as_str())
                ));
                let text = lines.join("\n");
                self.emit(&stats, text)?;
            }
            Command::ClockIn { id } => {
                self.act(Action::ClockIn {
                    employee_id: EmployeeId::new(id),
                });
            }
            Command::ClockOut { id } => {
                self.act(Action::ClockOut {
                    employee_id: EmployeeId::new(id),
                });
            }
            Command::Status { id } => {
                let id = EmployeeId::new(id);
                let record = self.tracker.today_record(&id).cloned();
                let hours = self.tracker.today_hours(&id);
                let text = match &record {
                    Some(r) => format!(
                        "{} {}: in {} out {} ({}) - {} hours today",
                        r.employee_name,
                        r.date,
                        r.clock_in.format("%H:%M"),
                        r.clock_out.map_or("--:--".to_string(), |t| t.format("%H:%M").to_string()),
                        r.status,
                        hours
                    ),
                    None => format!("No attendance recorded today for {id}"),
                };
                self.emit(&record, text)?;
            }
            Command::ClockedIn => {
                let ids = self.tracker.clocked_in();
                let text = if ids.is_empty() {
                    "Nobody is clocked in".to_string()
                } else {
                    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                };
                self.emit(&ids, text)?;
            }
            Command::Timesheets => {
                let timesheets = self.tracker.state().timesheets();
                let text = timesheets
                    .iter()
                    .map(|t| {
                        format!(
                            "{:<8} {:<24} week ending {} {:>6}h ({} regular, {} overtime) {}",
                            t.id,
                            t.employee_name,
                            t.week_ending,
                            t.total_hours,
                            t.regular_hours,
                            t.overtime_hours,
                            t.status
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let timesheets = timesheets.to_vec();
                self.emit(&timesheets, text)?;
            }
            Command::Submit { id } => {
                self.act(Action::SubmitTimesheet {
                    timesheet_id: TimesheetId::new(id),
                });
            }
            Command::Approve { id } => {
                self.act(Action::ApproveTimesheet {
                    timesheet_id: TimesheetId::new(id),
                });
            }
            Command::Calendar { from, to } => {
                let events: Vec<_> = self
                    .tracker
                    .calendar_events()
                    .into_iter()
                    .filter(|e| e.starts_between(from, to))
                    .collect();
                let text = events
                    .iter()
                    .map(|e| {
                        format!(
                            "{} - {}  [{}] {}",
                            e.start.format("%Y-%m-%d %H:%M"),
                            e.end.format("%H:%M"),
                            e.tag,
                            e.title
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                self.emit(&events, text)?;
            }
            Command::Quit => {}
        }
        Ok(())
    }

    fn act(&mut self, action: Action) {
        // Outcome and rejection are both shown through the notifier.
        match self.tracker.dispatch(action) {
            Ok(outcome) => debug!("Console action applied: {}", outcome.message()),
            Err(e) => debug!("Console action rejected: {e}"),
        }
    }

    fn emit<T: Serialize + ?Sized>(&mut self, value: &T, text: String) -> anyhow::Result<()> {
        if self.json {
            writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?;
        } else if !text.is_empty() {
            writeln!(self.out, "{text}")?;
        }
        Ok(())
    }

    fn flush_notifications(&mut self) -> anyhow::Result<()> {
        for notification in self.notifications.drain() {
            if self.json {
                writeln!(self.out, "{}", serde_json::to_string(&notification)?)?;
            } else {
                writeln!(self.out, "{notification}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::seed;

    fn console(json: bool) -> (Console<Vec<u8>>, Rc<ManualClock>) {
        let today = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let clock = Rc::new(ManualClock::new(today.and_hms_opt(9, 0, 0).unwrap()));
        let log = NotificationLog::default();
        let tracker = AttendanceTracker::new(seed::sample_state(today), clock.clone(), log.clone());
        (Console::new(tracker, log, Vec::new(), json), clock)
    }

    fn output(console: &Console<Vec<u8>>) -> String {
        String::from_utf8(console.out.clone()).unwrap()
    }

    #[test]
    fn test_split_args_quotes() {
        assert_eq!(
            split_args(r#"add --position "UX Designer" --department HR"#),
            vec!["add", "--position", "UX Designer", "--department", "HR"]
        );
        assert_eq!(split_args("  clock-in   1 "), vec!["clock-in", "1"]);
        assert_eq!(split_args(r#"employees """#), vec!["employees", ""]);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("clock-in 1").unwrap(), Command::ClockIn { id: "1".to_string() });
        assert_eq!(parse_line("exit").unwrap(), Command::Quit);
        assert_eq!(
            parse_line("calendar --from 2024-03-01").unwrap(),
            Command::Calendar {
                from: NaiveDate::from_ymd_opt(2024, 3, 1),
                to: None
            }
        );
        assert!(parse_line("clock-in").is_err());
        assert!(parse_line("teleport 1").is_err());
    }

    #[test]
    fn test_session() {
        let (mut console, _clock) = console(false);
        let input = "clock-in 1\nclocked-in\nclock-in 1\nsubmit TS-003\nquit\nclock-out 1\n";
        console.run(Cursor::new(input)).unwrap();

        let out = output(&console);
        assert!(out.contains("[OK] Sarah Johnson clocked in at 09:00"));
        assert!(out.contains("\n1\n"));
        assert!(out.contains("[ERROR] Invalid state transition: employee 1 is already clocked in"));
        assert!(out.contains("cannot submit timesheet TS-003 in Approved state"));
        // Nothing after quit runs.
        assert!(console.tracker().is_clocked_in(&EmployeeId::from("1")));
    }

    #[test]
    fn test_add_employee_command() {
        let (mut console, _clock) = console(false);
        let input = concat!(
            r#"add --first-name Dana --last-name Lee --email dana@company.com "#,
            r#"--position "Sales Lead" --department Sales --hire-date 2024-02-01"#,
            "\nemployees sales lead\ndepartments\n"
        );
        console.run(Cursor::new(input)).unwrap();

        let out = output(&console);
        assert!(out.contains("[OK] Employee added successfully!"));
        assert!(out.contains("Dana Lee"));
        assert!(out.contains("Total Employees: 4"));
        assert!(out.contains("Active Departments: 4"));
        assert!(out.contains("Largest Department: Engineering"));
    }

    #[test]
    fn test_json_output() {
        let (mut console, clock) = console(true);
        console.run(Cursor::new("clock-in 2\n")).unwrap();
        clock.set(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap().and_hms_opt(12, 0, 0).unwrap());
        console.run(Cursor::new("clock-out 2\nstatus 2\n")).unwrap();

        let out = output(&console);
        assert!(out.contains(r#""level":"success""#));
        assert!(out.contains(r#""total_hours": 3.0"#));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let (mut console, _clock) = console(false);
        console.run(Cursor::new("approve\n")).unwrap();
        assert!(output(&console).contains("error"));
    }

    #[test]
    fn test_rejected_action_reported_once() {
        let (mut console, _clock) = console(false);
        let before = console.tracker().state().clone();
        console.run(Cursor::new("clock-out 3
approve TS-001
")).unwrap();

        let out = output(&console);
        assert_eq!(out.matches("[ERROR]").count(), 2);
        assert!(out.contains("cannot approve timesheet TS-001 in Draft state"));
        assert_eq!(console.tracker().state(), &before);
    }
}
