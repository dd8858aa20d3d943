use std::collections::BTreeMap;

use tracing::info;

use crate::error::{AttendanceError, Result};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq)]
pub struct StudentPercentage {
    pub name: String,
    pub present: u32,
    pub total: u32,
    pub percent: f64,
}

impl StudentPercentage {
    /// `Alice: 100.0% (1/1)`
    pub fn line(&self) -> String {
        format!(
            "{}: {:.1}% ({}/{})",
            self.name, self.percent, self.present, self.total
        )
    }
}

pub fn percent_of(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    present as f64 / total as f64 * 100.0
}

/// Per-student attendance over the whole store, sorted by name.
///
/// Rows without a name are skipped; a status counts as present when it reads
/// `P` in any casing.
pub fn compute_percentages(store: &RecordStore) -> Result<Vec<StudentPercentage>> {
    if !store.exists() {
        return Err(AttendanceError::NoStore);
    }

    // name -> (present, total)
    let mut tally: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    store.for_each_record(|r| {
        if r.name.is_empty() {
            return;
        }
        let entry = tally.entry(r.name).or_insert((0, 0));
        entry.1 += 1;
        if r.status.trim().eq_ignore_ascii_case("P") {
            entry.0 += 1;
        }
    })?;

    if tally.is_empty() {
        return Err(AttendanceError::NoData);
    }

    let rows: Vec<StudentPercentage> = tally
        .into_iter()
        .map(|(name, (present, total))| StudentPercentage {
            percent: percent_of(present, total),
            name,
            present,
            total,
        })
        .collect();
    info!(students = rows.len(), "attendance percentages computed");
    Ok(rows)
}
