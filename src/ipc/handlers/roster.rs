use crate::ipc::error::{attendance_err, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster::Status;
use serde_json::json;

fn get_required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn handle_roster_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let students: Vec<serde_json::Value> = state
        .roster
        .students()
        .map(|s| json!({ "name": s.name, "status": s.status.code() }))
        .collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_roster_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match get_required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.roster.add_student(raw) {
        Ok(name) => ok(
            &req.id,
            json!({
                "name": name,
                "status": Status::default().code(),
                "message": format!("{} added.", name)
            }),
        ),
        Err(e) => attendance_err(&req.id, &e),
    }
}

fn handle_roster_set_selection(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match get_required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match get_required_str(req, "status").map(str::parse::<Status>) {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => return err(&req.id, "bad_params", e.to_string(), None),
        Err(resp) => return resp,
    };
    let updated = state.roster.set_selection(name, status);
    ok(
        &req.id,
        json!({ "name": name, "status": status.code(), "updated": updated }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.list" => Some(handle_roster_list(state, req)),
        "roster.add" => Some(handle_roster_add(state, req)),
        "roster.setSelection" => Some(handle_roster_set_selection(state, req)),
        _ => None,
    }
}
