//! Configuration management for satscan
//!
//! Config stored at: ~/.config/satscan/config.json

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
///
/// Loaded once at startup, optionally overridden once by CLI flags, then
/// passed by reference into every pipeline call. Never mutated mid-batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the ONNX detection model
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Path to the class-names text file (one name per line)
    #[serde(default)]
    pub classes_path: Option<PathBuf>,

    /// Confidence threshold for rendering detections (0-1)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Area per pixel in m². Default assumes a 0.05 m ground sample
    /// distance per pixel edge, so 0.05 * 0.05 = 0.0025 m² per pixel.
    #[serde(default = "default_scale_factor")]
    pub scale_factor_m2: f64,

    /// Output folder for annotated images, log and CSV
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Model input edge length in pixels
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_scale_factor() -> f64 {
    0.05 * 0.05
}

fn default_input_size() -> u32 {
    640
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            classes_path: None,
            confidence_threshold: default_confidence_threshold(),
            scale_factor_m2: default_scale_factor(),
            output_dir: None,
            input_size: default_input_size(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("no config directory on this platform".to_string()))?
            .join("satscan");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Effective output folder
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }

    /// Path of the append-only run log
    pub fn log_path(&self) -> PathBuf {
        self.output_dir().join("log.txt")
    }

    /// Path of the overwrite-mode CSV report
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir().join("detection_results.csv")
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Check the value invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.scale_factor_m2 <= 0.0 {
            return Err(Error::Config(format!(
                "scale factor must be > 0 (got {})",
                self.scale_factor_m2
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence threshold must be within 0-1 (got {})",
                self.confidence_threshold
            )));
        }
        if self.input_size == 0 {
            return Err(Error::Config("input size must be > 0".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SatScan Configuration")?;
        writeln!(f, "=====================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Model:           {}",
            self.model_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string())
        )?;
        writeln!(
            f,
            "Classes:         {}",
            self.classes_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string())
        )?;
        writeln!(f, "Conf. threshold: {:.2}", self.confidence_threshold)?;
        writeln!(f, "Scale factor:    {} m²/px", self.scale_factor_m2)?;
        writeln!(f, "Output folder:   {}", self.output_dir().display())?;
        writeln!(f, "Input size:      {}", self.input_size)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}
