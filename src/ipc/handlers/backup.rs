use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_backup_export_store(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let Some(store) = state.store() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if !store.exists() {
        return err(
            &req.id,
            "no_store",
            "No attendance records found.",
            Some(json!({ "path": store.path().to_string_lossy() })),
        );
    }

    let out = PathBuf::from(&out_path);
    let export = match backup::export_store_bundle(store.path(), &out) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "store export failed");
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            );
        }
    };
    info!(path = %out_path, records = export.record_count, "store exported");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "recordCount": export.record_count,
            "sha256": export.sha256
        }),
    )
}

fn handle_backup_import_store(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    let Some(store) = state.store() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    let import = match backup::import_store_bundle(&src, store.path()) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "store import failed");
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "path": src.to_string_lossy() })),
            );
        }
    };
    info!(path = %in_path, format = %import.bundle_format_detected, "store imported");

    ok(
        &req.id,
        json!({
            "storePath": store.path().to_string_lossy(),
            "bundleFormatDetected": import.bundle_format_detected
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportStore" => Some(handle_backup_export_store(state, req)),
        "backup.importStore" => Some(handle_backup_import_store(state, req)),
        _ => None,
    }
}
