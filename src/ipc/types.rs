use std::path::PathBuf;

use serde::Deserialize;

use crate::roster::Roster;
use crate::store::RecordStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Session state owned by the main loop and lent to each handler.
#[derive(Debug, Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub roster: Roster,
}

impl AppState {
    pub fn new(workspace: Option<PathBuf>) -> Self {
        AppState {
            workspace,
            roster: Roster::new(),
        }
    }

    pub fn store(&self) -> Option<RecordStore> {
        self.workspace
            .as_deref()
            .map(RecordStore::in_workspace)
    }
}
