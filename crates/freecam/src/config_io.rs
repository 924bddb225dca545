//! Config persistence: a JSON file written with the write-rename pattern.
//!
//! A missing file yields defaults silently; a malformed file is logged and
//! also yields defaults. Loading never fails the caller.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use bevy::prelude::*;

use crate::config::CameraConfig;

/// Default config file name, resolved against the working directory.
pub const CONFIG_PATH: &str = "freecam.json";

/// Where the camera config is persisted. Hosts override this before startup
/// to point at their own settings directory.
#[derive(Resource, Clone)]
pub struct ConfigPath(pub String);

impl Default for ConfigPath {
    fn default() -> Self {
        Self(CONFIG_PATH.to_string())
    }
}

/// Load a config from `path`, substituting defaults on any failure.
pub fn load_config(path: &str) -> CameraConfig {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return CameraConfig::default(),
    };
    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            warn!("camera config at {path} is malformed ({e}); using defaults");
            CameraConfig::default()
        }
    }
}

/// Write `config` to `path` atomically:
///
/// 1. Write to `{path}.tmp`
/// 2. `sync_all()` to flush to disk
/// 3. `rename` temp to final path
///
/// A crash during step 1 or 2 leaves the previous file untouched.
pub fn save_config(path: &str, config: &CameraConfig) -> std::io::Result<()> {
    let data = serde_json::to_vec_pretty(config).map_err(std::io::Error::other)?;
    let tmp_path = format!("{path}.tmp");

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(&tmp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Startup system: replace the default config with whatever is on disk.
pub fn load_config_at_startup(path: Res<ConfigPath>, mut config: ResMut<CameraConfig>) {
    *config = load_config(&path.0);
}

/// System: persist the config whenever something mutates it (settings
/// surface, reset command). The startup load itself is skipped.
pub fn persist_config_on_change(
    path: Res<ConfigPath>,
    config: Res<CameraConfig>,
    mut seen_startup_load: Local<bool>,
) {
    if !config.is_changed() {
        return;
    }
    if !*seen_startup_load {
        *seen_startup_load = true;
        return;
    }
    if let Err(e) = save_config(&path.0, &config) {
        warn!("failed to save camera config to {}: {e}", path.0);
    }
}
