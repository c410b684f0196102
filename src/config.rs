//! Process configuration

/// Settings consumed from the environment.
///
/// The allow-list value is re-read per evaluation by callers that want
/// rotation without restart; this snapshot is just the conventional way to
/// pick it up at the edges.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub db_path: Option<String>,
    pub allowed_ranges: Option<String>,
}

impl Settings {
    pub fn from_env() -> Settings {
        Settings {
            db_path: std::env::var("UNITGATE_DB").ok(),
            allowed_ranges: std::env::var("UNITGATE_ALLOWED_RANGES").ok(),
        }
    }
}
