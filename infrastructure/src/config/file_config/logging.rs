//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// # Example
///
/// ```toml
/// [logging]
/// dir = "logs"                            # daily-rotated agent.log files
/// transcript = "logs/conversation.jsonl"  # structured conversation events
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for rotating operation logs. Unset disables file logging.
    pub dir: Option<String>,
    /// JSONL conversation transcript path. Unset disables the transcript.
    pub transcript: Option<String>,
}

impl FileLoggingConfig {
    pub fn dir_path(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }

    pub fn transcript_path(&self) -> Option<PathBuf> {
        self.transcript.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
