//! Persisted application settings.

use crate::canvas::CanvasConfig;
use crate::error::HgisError;
use hgis_types::Crs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Name of the settings file in the configuration directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Application settings stored between sessions as a JSON file.
///
/// Missing fields in the file get their default values, so settings written by an older version
/// can still be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory with user data files.
    pub data_path: PathBuf,
    /// Directory searched for plugins.
    pub plugin_path: PathBuf,
    /// Directory with configuration files.
    pub config_path: PathBuf,
    /// Saved main window geometry as given by the host window system.
    pub window_geometry: Vec<u8>,
    /// Saved layout of docked panels as given by the host window system.
    pub dock_state: Vec<u8>,
    /// CRS used for new projects.
    pub project_crs: Crs,
    /// Map canvas navigation configuration.
    pub canvas: CanvasConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data"),
            plugin_path: PathBuf::from("plugins"),
            config_path: PathBuf::from("config"),
            window_geometry: Vec::new(),
            dock_state: Vec::new(),
            project_crs: Crs::wgs84(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl AppSettings {
    /// Default settings with data, plugin and configuration directories inside `base`.
    pub fn with_base_path(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            data_path: base.join("data"),
            plugin_path: base.join("plugins"),
            config_path: base.join("config"),
            ..Default::default()
        }
    }

    /// Path of the settings file inside the configuration directory.
    pub fn settings_file(&self) -> PathBuf {
        self.config_path.join(SETTINGS_FILE_NAME)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HgisError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let settings = serde_json::from_reader(reader)?;
        debug!("Loaded settings from {}", path.display());

        Ok(settings)
    }

    /// Reads settings from a JSON file, or returns default settings if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HgisError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Writes settings to a JSON file, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HgisError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Saved settings to {}", path.display());

        Ok(())
    }
}
