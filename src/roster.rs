use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{AttendanceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Present,
    Absent,
}

impl Status {
    /// Single-letter code written to the record store.
    pub fn code(self) -> &'static str {
        match self {
            Status::Present => "P",
            Status::Absent => "A",
        }
    }
}

impl FromStr for Status {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P" | "PRESENT" => Ok(Status::Present),
            "A" | "ABSENT" => Ok(Status::Absent),
            other => Err(AttendanceError::Validation(format!(
                "unknown attendance status: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    pub status: Status,
}

/// Students added during this session, in insertion order.
#[derive(Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a student with the default `Present` selection and returns the
    /// stored (trimmed) name.
    pub fn add_student(&mut self, name: &str) -> Result<&str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AttendanceError::Validation(
                "Student name cannot be empty.".to_string(),
            ));
        }
        if self.contains(name) {
            return Err(AttendanceError::Duplicate(name.to_string()));
        }

        self.students.push(Student {
            name: name.to_string(),
            status: Status::default(),
        });
        info!(student = name, total = self.students.len(), "student added");

        let added = &self.students[self.students.len() - 1];
        Ok(added.name.as_str())
    }

    /// Updates the pending selection for `name`. Unknown names are ignored and
    /// reported as `false`.
    pub fn set_selection(&mut self, name: &str, status: Status) -> bool {
        match self.students.iter_mut().find(|s| s.name == name) {
            Some(student) => {
                student.status = status;
                true
            }
            None => {
                debug!(student = name, "selection ignored for unknown student");
                false
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.students.iter().any(|s| s.name == name)
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
