use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catchment::Extent;
use crate::route::DEFAULT_SEARCH_RADIUS;
use crate::xsp::LaneGuard;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inputs: InputsConfig,
    pub output: OutputConfig,
    /// Catchment extent. Derived from the network and depots when absent.
    #[serde(default)]
    pub extent: Option<Extent>,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputsConfig {
    pub defects: PathBuf,
    pub depots: PathBuf,
    pub network: PathBuf,
    #[serde(default)]
    pub inspections: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocatorConfig {
    #[serde(default = "default_search_radius")]
    pub search_radius: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub lane_guard: LaneGuard,
}

/// Source field names and display label prefixes
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FieldsConfig {
    pub section: String,
    pub lane_count: String,
    pub defect_label_prefix: String,
    pub inspection_label_prefix: String,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            section: "FEATURE_LA".to_string(),
            lane_count: "No_of_Lane".to_string(),
            defect_label_prefix: "de05".to_string(),
            inspection_label_prefix: "de02".to_string(),
        }
    }
}

fn default_search_radius() -> f64 {
    DEFAULT_SEARCH_RADIUS
}

impl Config {
    /// Load a config file. Relative paths inside it are taken relative to
    /// the file's directory.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        if !(config.locator.search_radius > 0.0) {
            anyhow::bail!(
                "search_radius must be positive, got {}",
                config.locator.search_radius
            );
        }
        if let Some(extent) = &config.extent {
            if !(extent.area() > 0.0) {
                anyhow::bail!("extent must enclose an area, got {:?}", extent);
            }
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.inputs.defects);
        resolve(&mut self.inputs.depots);
        resolve(&mut self.inputs.network);
        if let Some(p) = self.inputs.inspections.as_mut() {
            resolve(p);
        }
        resolve(&mut self.output.dir);
    }
}
