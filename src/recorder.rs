use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{AttendanceError, Result};
use crate::roster::Roster;
use crate::store::{AttendanceRecord, RecordStore};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub date: NaiveDate,
    pub written: usize,
    pub skipped: usize,
}

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        AttendanceError::Validation(format!("date must be YYYY-MM-DD, got {:?}", raw.trim()))
    })
}

/// Appends one row per roster student for `today`, skipping students that
/// already have a row for that date.
///
/// Not transactional: if a write fails part-way, rows appended before the
/// failure stay in the store.
pub fn save_attendance(roster: &Roster, store: &RecordStore, today: NaiveDate) -> Result<SaveSummary> {
    if roster.is_empty() {
        return Err(AttendanceError::NoStudents);
    }

    let date = today.format(DATE_FORMAT).to_string();
    let existing = store.existing_keys().inspect_err(|e| {
        warn!(error = %e, "could not read existing attendance; nothing written");
    })?;

    let mut appender = store.appender()?;
    let mut written = 0;
    let mut skipped = 0;
    for student in roster.students() {
        if existing.contains(&(student.name.clone(), date.clone())) {
            debug!(student = %student.name, %date, "already recorded");
            skipped += 1;
            continue;
        }
        let record = AttendanceRecord {
            name: student.name.clone(),
            date: date.clone(),
            status: student.status.code().to_ascii_uppercase(),
        };
        if let Err(e) = appender.append(&record) {
            warn!(error = %e, written, "save aborted part-way; earlier rows kept");
            return Err(e);
        }
        written += 1;
    }

    info!(%date, written, skipped, store = %store.path().display(), "attendance saved");
    Ok(SaveSummary {
        date: today,
        written,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Status;

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).expect("date")
    }

    fn roster_of(entries: &[(&str, Status)]) -> Roster {
        let mut roster = Roster::new();
        for (name, status) in entries {
            roster.add_student(name).expect("add");
            roster.set_selection(name, *status);
        }
        roster
    }

    fn data_rows(store: &RecordStore) -> Vec<AttendanceRecord> {
        let mut rows = Vec::new();
        store.for_each_record(|r| rows.push(r)).expect("read");
        rows
    }

    #[test]
    fn empty_roster_is_rejected_without_touching_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        let e = save_attendance(&Roster::new(), &store, may_first()).unwrap_err();
        assert!(matches!(e, AttendanceError::NoStudents));
        assert!(!store.exists());
    }

    #[test]
    fn second_save_on_same_day_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        let roster = roster_of(&[("Alice", Status::Present), ("Bob", Status::Absent)]);

        let first = save_attendance(&roster, &store, may_first()).expect("first save");
        assert_eq!((first.written, first.skipped), (2, 0));
        let second = save_attendance(&roster, &store, may_first()).expect("second save");
        assert_eq!((second.written, second.skipped), (0, 2));

        let rows = data_rows(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].status, "A");
    }

    #[test]
    fn existing_day_rows_are_kept_not_overwritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        let mut roster = roster_of(&[("Alice", Status::Present)]);
        save_attendance(&roster, &store, may_first()).expect("save");

        roster.set_selection("Alice", Status::Absent);
        roster.add_student("Carol").expect("add");
        let summary = save_attendance(&roster, &store, may_first()).expect("save again");
        assert_eq!((summary.written, summary.skipped), (1, 1));

        let rows = data_rows(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, "P");
        assert_eq!(rows[1].name, "Carol");
    }

    #[test]
    fn a_new_day_records_everyone_again() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        let roster = roster_of(&[("Alice", Status::Present)]);
        save_attendance(&roster, &store, may_first()).expect("save");
        let next = may_first().succ_opt().expect("next day");
        let summary = save_attendance(&roster, &store, next).expect("save");
        assert_eq!(summary.written, 1);
        assert_eq!(data_rows(&store)[1].date, "2024-05-02");
    }

    #[test]
    fn unreadable_store_aborts_before_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        std::fs::write(store.path(), b"Name,Date,Status\n\xff\xfe,2024-05-01,P\n").expect("seed");
        let before = std::fs::read(store.path()).expect("read");

        let roster = roster_of(&[("Alice", Status::Present)]);
        let e = save_attendance(&roster, &store, may_first()).unwrap_err();
        assert!(matches!(e, AttendanceError::StoreRead { .. }));
        assert_eq!(std::fs::read(store.path()).expect("read"), before);
    }

    #[test]
    fn save_after_unterminated_last_line_keeps_both_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        std::fs::write(store.path(), "Name,Date,Status\nAlice,2024-05-01,P").expect("seed");

        let roster = roster_of(&[("Bob", Status::Absent)]);
        let next = may_first().succ_opt().expect("next day");
        let summary = save_attendance(&roster, &store, next).expect("save");
        assert_eq!(summary.written, 1);

        let rows = data_rows(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, "P");
        assert_eq!(
            (rows[1].name.as_str(), rows[1].date.as_str(), rows[1].status.as_str()),
            ("Bob", "2024-05-02", "A")
        );
    }

    #[test]
    fn unwritable_store_reports_a_write_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        std::fs::create_dir(store.path()).expect("directory in place of the store");

        let roster = roster_of(&[("Alice", Status::Present)]);
        let e = save_attendance(&roster, &store, may_first()).unwrap_err();
        assert!(matches!(e, AttendanceError::StoreWrite { .. }), "{e:?}");
        assert_eq!(e.code(), "store_write_failed");
    }

    #[test]
    fn parse_date_accepts_iso_only() {
        assert_eq!(parse_date(" 2024-05-01 ").expect("iso"), may_first());
        assert!(matches!(
            parse_date("05/01/2024"),
            Err(AttendanceError::Validation(_))
        ));
    }
}
