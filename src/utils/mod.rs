mod atomic;

pub use atomic::atomic_write;

use std::path::PathBuf;

/// The name of the per-user folio folder
pub const FOLIO_FOLDER: &str = ".folio";

/// Name of the default data directory inside the folio folder
pub const DATA_FOLDER: &str = "data";

/// Get the path to the per-user folio folder (`~/.folio`).
///
/// Falls back to the current directory when no home directory is known.
#[must_use]
pub fn folio_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(FOLIO_FOLDER)
}

/// Default location of the collection files (`~/.folio/data`)
#[must_use]
pub fn default_data_dir() -> PathBuf {
    folio_home().join(DATA_FOLDER)
}

/// Get current timestamp in ISO 8601 format
#[must_use]
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
