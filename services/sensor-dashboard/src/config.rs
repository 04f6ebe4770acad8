//! Configuration types for the sensor dashboard

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Backend API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Initial map viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_center_lng")]
    pub center_lng: f64,
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            center_lng: default_center_lng(),
            center_lat: default_center_lat(),
            zoom: default_zoom(),
        }
    }
}

/// Dashboard web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_toast_history_size")]
    pub toast_history_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_dashboard_port(),
            toast_history_size: default_toast_history_size(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_container() -> String {
    "map".to_string()
}

// Wuhan city center
fn default_center_lng() -> f64 {
    114.2857
}

fn default_center_lat() -> f64 {
    30.5866
}

fn default_zoom() -> u8 {
    12
}

fn default_dashboard_port() -> u16 {
    11116
}

fn default_toast_history_size() -> usize {
    20
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DashboardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
