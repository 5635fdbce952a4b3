use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use map_surface::MapView;
use tracing::warn;

pub const SETTINGS_FILE: &str = "panel.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSettings {
    pub server_url: Option<String>,
    pub request_timeout_secs: u64,
    pub map_center_lon: f64,
    pub map_center_lat: f64,
    pub map_zoom: u8,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            request_timeout_secs: 30,
            map_center_lon: 0.0,
            map_center_lat: 0.0,
            map_zoom: 2,
        }
    }
}

impl PanelSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn map_view(&self) -> MapView {
        MapView {
            center_lon: self.map_center_lon,
            center_lat: self.map_center_lat,
            zoom: self.map_zoom,
        }
    }
}

/// Defaults, then `panel.toml` in the working directory, then environment.
pub fn load_settings() -> PanelSettings {
    let mut settings = PanelSettings::default();

    match read_settings_file(Path::new(SETTINGS_FILE)) {
        Ok(Some(table)) => apply_file_settings(&mut settings, &table),
        Ok(None) => {}
        Err(err) => warn!("ignoring settings file: {err:#}"),
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub fn read_settings_file(path: &Path) -> anyhow::Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let table = raw
        .parse::<toml::Table>()
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(Some(table))
}

fn apply_file_settings(settings: &mut PanelSettings, table: &toml::Table) {
    if let Some(v) = table.get("server_url").and_then(|v| v.as_str()) {
        settings.server_url = Some(v.to_string());
    }
    if let Some(v) = table.get("request_timeout_secs").and_then(|v| v.as_integer()) {
        match u64::try_from(v) {
            Ok(v) => settings.request_timeout_secs = v,
            Err(_) => warn!(value = v, "request_timeout_secs must not be negative"),
        }
    }
    if let Some(v) = table.get("map_center_lon").and_then(toml_float) {
        settings.map_center_lon = v;
    }
    if let Some(v) = table.get("map_center_lat").and_then(toml_float) {
        settings.map_center_lat = v;
    }
    if let Some(v) = table.get("map_zoom").and_then(|v| v.as_integer()) {
        match u8::try_from(v) {
            Ok(v) => settings.map_zoom = v,
            Err(_) => warn!(value = v, "map_zoom out of range"),
        }
    }
}

fn toml_float(value: &toml::Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|v| v as f64))
}

fn apply_env_overrides(settings: &mut PanelSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("WMS_SERVER_URL") {
        settings.server_url = Some(v);
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = Some(v);
    }
    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = var("APP__MAP_CENTER_LON") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.map_center_lon = parsed;
        }
    }
    if let Some(v) = var("APP__MAP_CENTER_LAT") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.map_center_lat = parsed;
        }
    }
    if let Some(v) = var("APP__MAP_ZOOM") {
        if let Ok(parsed) = v.parse::<u8>() {
            settings.map_zoom = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
