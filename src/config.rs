// ── Configuration ─────────────────────────────────────────────────────────────
//
// Reads and writes `%APPDATA%\<app>\sysdep.json`.
// No `unsafe`; plain serde_json.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ── Format version ────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

const FILE_NAME: &str = "sysdep.json";

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub error_dialog: ErrorDialogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            error_dialog: ErrorDialogConfig::default(),
        }
    }
}

/// Tunables for the program-error dialog.
///
/// Every field has a default, so a file that names only some of them
/// still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDialogConfig {
    /// Caption of the dialog window.
    pub title: String,
    /// Minimum window width in pixels at 96 DPI.
    pub min_track_width: i32,
    /// Minimum window height in pixels at 96 DPI.
    pub min_track_height: i32,
    /// Capacity, in UTF-16 units, of the buffer the Copy button reads into.
    pub copy_buffer_chars: usize,
    /// Render the text area in the stock fixed-pitch system font.
    pub fixed_font: bool,
}

impl Default for ErrorDialogConfig {
    fn default() -> Self {
        Self {
            title: "Program Error".to_owned(),
            // Smallest size at which no anchored control lands at a negative
            // coordinate (Windows would clip it and the next delta would be off).
            min_track_width: 407,
            min_track_height: 159,
            copy_buffer_chars: 128 * 1024,
            fixed_font: true,
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the config file: `%APPDATA%\<app>\sysdep.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub fn config_path(app: &str) -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push(app);
    p.push(FILE_NAME);
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read and parse the config file at `path`.
pub fn load_from(path: &Path) -> Result<Config> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Load the config for `app`.
///
/// Returns `None` on any error: file missing, JSON parse failure, or an
/// unrecognised version number.  Callers fall back to `Config::default()`.
pub fn load(app: &str) -> Option<Config> {
    let path = config_path(app)?;
    let config = match load_from(&path) {
        Ok(c) => c,
        Err(e) => {
            log::debug!("config: not using {}: {e}", path.display());
            return None;
        }
    };
    if config.version != CONFIG_VERSION {
        log::warn!(
            "config: {} has version {}, expected {CONFIG_VERSION}",
            path.display(),
            config.version
        );
        return None;
    }
    Some(config)
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write `config` to `path` as pretty-printed JSON.
///
/// Creates the parent directory if it does not exist.
pub fn save_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("sysdep-config-{}-{name}", std::process::id()));
        p
    }

    #[test]
    fn defaults_match_dialog_constants() {
        let c = ErrorDialogConfig::default();
        assert_eq!(c.min_track_width, 407);
        assert_eq!(c.min_track_height, 159);
        assert_eq!(c.copy_buffer_chars, 131_072);
        assert!(c.fixed_font);
    }

    #[test]
    fn partial_dialog_section_fills_defaults() {
        let json = r#"{"version":1,"error_dialog":{"title":"Oops"}}"#;
        let c: Config = serde_json::from_str(json).expect("deserialize");
        assert_eq!(c.error_dialog.title, "Oops");
        assert_eq!(c.error_dialog.min_track_width, 407);
        assert!(c.error_dialog.fixed_font);
    }

    #[test]
    fn missing_dialog_section_is_default() {
        let c: Config = serde_json::from_str(r#"{"version":1}"#).expect("deserialize");
        assert_eq!(c.error_dialog, ErrorDialogConfig::default());
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join(FILE_NAME);
        let mut config = Config::default();
        config.error_dialog.title = "Crash".to_owned();
        config.error_dialog.fixed_font = false;

        save_to(&path, &config).expect("save");
        let loaded = load_from(&path).expect("load");
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let path = scratch_dir("missing").join(FILE_NAME);
        let err = load_from(&path).expect_err("missing file");
        assert!(matches!(err, crate::SysError::Io(_)));
    }

    #[test]
    fn load_from_garbage_is_config_error() {
        let dir = scratch_dir("garbage");
        fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join(FILE_NAME);
        fs::write(&path, b"{ not json").expect("write");

        let err = load_from(&path).expect_err("bad json");
        assert!(matches!(err, crate::SysError::Config(_)));

        let _ = fs::remove_dir_all(&dir);
    }

    // The only test that touches APPDATA.
    #[test]
    fn load_reads_app_config_under_appdata() {
        let _ = env_logger::builder().is_test(true).try_init();
        let root = scratch_dir("appdata");
        let saved = std::env::var_os("APPDATA");
        std::env::set_var("APPDATA", &root);

        assert_eq!(load("demo"), None);

        let path = config_path("demo").expect("APPDATA is set");
        assert_eq!(path, root.join("demo").join(FILE_NAME));
        let mut config = Config::default();
        config.error_dialog.title = "Demo failure".to_owned();
        save_to(&path, &config).expect("save");
        assert_eq!(load("demo"), Some(config.clone()));

        config.version = CONFIG_VERSION + 1;
        save_to(&path, &config).expect("save");
        assert_eq!(load("demo"), None);

        match saved {
            Some(v) => std::env::set_var("APPDATA", v),
            None => std::env::remove_var("APPDATA"),
        }
        let _ = fs::remove_dir_all(&root);
    }
}
