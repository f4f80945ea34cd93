//! Startup: environment, data directory and settings database.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dotmatrix_engine::FontBook;
use label_store::{Database, SettingsStore};

/// Overrides the data directory (default `~/.dotlabel`).
pub const DATA_DIR_ENV: &str = "DOTLABEL_DATA_DIR";

const DB_FILE: &str = "settings.db";
const FONTS_DIR: &str = "fonts";

/// Handles shared by every subcommand.
pub struct Foundation {
    pub store: SettingsStore,
    pub data_dir: PathBuf,
}

/// Determine the data directory for the application.
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dotlabel")
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::debug!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}

/// Create the data directory and open the settings database.
pub fn init_foundation() -> anyhow::Result<Foundation> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))?;

    let db_path = dir.join(DB_FILE);
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    tracing::debug!(data_dir = %dir.display(), "Foundation ready");

    Ok(Foundation {
        store: SettingsStore::new(db),
        data_dir: dir,
    })
}

/// Fonts from `<data>/fonts` plus an optional extra directory.
pub fn load_fonts(data_dir: &Path, extra: Option<&Path>) -> anyhow::Result<FontBook> {
    let mut fonts = FontBook::new();

    let bundled = data_dir.join(FONTS_DIR);
    if bundled.is_dir() {
        fonts.load_dir(&bundled)?;
    }
    if let Some(dir) = extra {
        let loaded = fonts
            .load_dir(dir)
            .with_context(|| format!("failed to read font directory {}", dir.display()))?;
        if loaded == 0 {
            tracing::warn!(dir = %dir.display(), "No usable fonts found");
        }
    }

    tracing::debug!(?fonts, "Fonts loaded");
    Ok(fonts)
}
