mod backup;
mod calc;
mod config;
mod error;
mod ipc;
mod logging;
mod recorder;
mod roster;
mod store;

use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

fn main() {
    let cfg = config::Config::from_env();
    logging::init_logging(cfg.log_filter.as_deref());

    if let Some(ws) = cfg.workspace.as_ref() {
        if let Err(e) = std::fs::create_dir_all(ws) {
            warn!(workspace = %ws.display(), error = %e, "configured workspace unavailable");
        }
    }
    let mut state = ipc::AppState::new(cfg.workspace);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        workspace = ?state.workspace,
        "attendanced ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request line");
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed; exiting");
}
