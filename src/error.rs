use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the roster, recorder and aggregator.
///
/// Every variant is recoverable: the IPC layer turns it into an error response
/// and keeps serving requests.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} is already in the student list.")]
    Duplicate(String),

    #[error("Add students before saving attendance.")]
    NoStudents,

    #[error("Error reading {}: {source}", path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Error writing to {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No attendance records found.")]
    NoStore,

    #[error("No valid attendance data found.")]
    NoData,
}

impl AttendanceError {
    /// Stable error code reported to the UI.
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceError::Validation(_) => "validation",
            AttendanceError::Duplicate(_) => "duplicate",
            AttendanceError::NoStudents => "no_students",
            AttendanceError::StoreRead { .. } => "store_read_failed",
            AttendanceError::StoreWrite { .. } => "store_write_failed",
            AttendanceError::NoStore => "no_store",
            AttendanceError::NoData => "no_data",
        }
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
