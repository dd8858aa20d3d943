use std::path::PathBuf;

pub const WORKSPACE_ENV: &str = "ATTENDANCED_WORKSPACE";
pub const LOG_ENV: &str = "ATTENDANCED_LOG";

/// Startup settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Config {
            workspace: non_blank(WORKSPACE_ENV).map(|v| PathBuf::from(v.trim())),
            log_filter: non_blank(LOG_ENV),
        }
    }
}
