// Startup settings, read from a small JSON file.
// Missing file = defaults. A broken file also falls back to defaults (with a
// warning) so a typo never keeps the paint window from opening.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color::parse_color;
use crate::error::Error;

/// Env var that points at an explicit config file.
pub const CONFIG_ENV: &str = "PIXELPAD_CONFIG";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub width: usize,
    pub height: usize,
    /// Surface color painted once at startup.
    pub background: String,
    /// Initial ink.
    pub color: String,
    /// Side of the square dab stamped at every rasterized pixel.
    pub brush_size: u32,
    /// Swatches bound to keys 1..9.
    pub palette: Vec<String>,
    /// Backends to treat as missing: any of "open", "save", "copy", "paste", "share".
    pub disabled: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "pixelpad".into(),
            width: 800,
            height: 600,
            background: "white".into(),
            color: "black".into(),
            brush_size: 2,
            palette: [
                "black", "white", "red", "orange", "yellow", "green", "blue", "purple", "gray",
            ]
            .map(String::from)
            .to_vec(),
            disabled: Vec::new(),
        }
    }
}

impl Config {
    /// `$PIXELPAD_CONFIG`, else `<config dir>/pixelpad/config.json`.
    pub fn path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(p));
        }
        dirs::config_dir().map(|d| d.join("pixelpad").join("config.json"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))
            .and_then(|json| Self::from_json(&json));
        match parsed {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "surface size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.brush_size == 0 {
            return Err(Error::Config("brush_size must be at least 1".into()));
        }
        parse_color(&self.background)?;
        parse_color(&self.color)?;
        Ok(())
    }
}
