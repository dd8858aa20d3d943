use crate::calc;
use crate::ipc::error::{attendance_err, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::recorder::{self, DATE_FORMAT};
use chrono::Local;
use serde_json::json;

fn handle_attendance_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let today = match req.params.get("date") {
        None | Some(serde_json::Value::Null) => Local::now().date_naive(),
        Some(v) => {
            let Some(raw) = v.as_str() else {
                return err(&req.id, "bad_params", "date must be a string", None);
            };
            match recorder::parse_date(raw) {
                Ok(d) => d,
                Err(e) => return attendance_err(&req.id, &e),
            }
        }
    };

    match recorder::save_attendance(&state.roster, &store, today) {
        Ok(summary) => {
            let date = summary.date.format(DATE_FORMAT).to_string();
            let file_name = store
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            ok(
                &req.id,
                json!({
                    "date": date,
                    "written": summary.written,
                    "skipped": summary.skipped,
                    "storePath": store.path().to_string_lossy(),
                    "message": format!(
                        "Attendance for {} saved to {} ({} new rows).",
                        date, file_name, summary.written
                    )
                }),
            )
        }
        Err(e) => attendance_err(&req.id, &e),
    }
}

fn handle_attendance_percentages(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    match calc::compute_percentages(&store) {
        Ok(rows) => {
            let lines: Vec<String> = rows.iter().map(|r| r.line()).collect();
            let rows_json: Vec<serde_json::Value> = rows
                .iter()
                .zip(&lines)
                .map(|(r, line)| {
                    json!({
                        "name": r.name,
                        "present": r.present,
                        "total": r.total,
                        "percent": r.percent,
                        "line": line
                    })
                })
                .collect();
            ok(
                &req.id,
                json!({
                    "rows": rows_json,
                    "message": lines.join("\n")
                }),
            )
        }
        Err(e) => attendance_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.save" => Some(handle_attendance_save(state, req)),
        "attendance.percentages" => Some(handle_attendance_percentages(state, req)),
        _ => None,
    }
}
