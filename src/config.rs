use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{bail, Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub heat: HeatConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub data_csv: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Marker edge length in pixels, `[smallest, largest]`.
    #[serde(default = "default_size_range")]
    pub size_range: [f64; 2],
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HeatConfig {
    #[serde(default = "default_heat_radius")]
    pub radius: f64,
    #[serde(default = "default_heat_max_opacity")]
    pub max_opacity: f64,
    #[serde(default = "default_heat_blur")]
    pub blur: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_zoom() -> u8 { 8 }
fn default_size_range() -> [f64; 2] { [15.0, 35.0] }
fn default_opacity() -> f64 { 0.85 }
fn default_heat_radius() -> f64 { 0.05 }
fn default_heat_max_opacity() -> f64 { 0.65 }
fn default_heat_blur() -> f64 { 0.85 }
fn default_port() -> u16 { 3000 }

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            size_range: default_size_range(),
            opacity: default_opacity(),
        }
    }
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            radius: default_heat_radius(),
            max_opacity: default_heat_max_opacity(),
            blur: default_heat_blur(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let [lo, hi] = self.map.size_range;
        if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo > hi {
            bail!("map.size_range must be two positive sizes in ascending order, got [{}, {}]", lo, hi);
        }
        if !(0.0..=1.0).contains(&self.map.opacity) {
            bail!("map.opacity must lie in [0, 1], got {}", self.map.opacity);
        }
        if !(0.0..=1.0).contains(&self.heat.max_opacity) {
            bail!("heat.max_opacity must lie in [0, 1], got {}", self.heat.max_opacity);
        }
        if !(self.heat.radius > 0.0) {
            bail!("heat.radius must be positive, got {}", self.heat.radius);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [input]
        data_csv = "data/2022data.csv"

        [output]
        dir = "dist"
    "#;

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let config = AppConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.map, MapConfig::default());
        assert_eq!(config.map.zoom, 8);
        assert_eq!(config.map.size_range, [15.0, 35.0]);
        assert_eq!(config.map.opacity, 0.85);
        assert_eq!(config.heat, HeatConfig::default());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn partial_map_section_keeps_other_defaults() {
        let toml = format!("{}\n[map]\nzoom = 10\n", MINIMAL);
        let config = AppConfig::from_toml(&toml).unwrap();
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.map.size_range, [15.0, 35.0]);
    }

    #[test]
    fn inverted_size_range_is_rejected() {
        let toml = format!("{}\n[map]\nsize_range = [35.0, 15.0]\n", MINIMAL);
        let err = AppConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("map.size_range"));
    }

    #[test]
    fn opacity_out_of_range_is_rejected() {
        let toml = format!("{}\n[map]\nopacity = 1.5\n", MINIMAL);
        assert!(AppConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn missing_input_section_fails_to_parse() {
        assert!(AppConfig::from_toml("[output]\ndir = \"dist\"\n").is_err());
    }
}
