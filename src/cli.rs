//! CLI definition using clap

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser)]
#[command(name = "satscan")]
#[command(version)]
#[command(about = "Object detection and area reporting for satellite imagery")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the ONNX detection model (overrides config)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Path to the class-names file (overrides config)
    #[arg(long, global = true)]
    pub classes: Option<PathBuf>,

    /// Confidence threshold for rendering, 0-1 (overrides config)
    #[arg(long, short = 't', global = true)]
    pub threshold: Option<f32>,

    /// Output folder for annotated images, log and CSV (overrides config)
    #[arg(long, short = 'o', global = true)]
    pub output_dir: Option<PathBuf>,

    /// Output format (json, table). Uses config default if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run detection on a single image
    Detect {
        /// Path to image file (JPEG/PNG)
        image: PathBuf,
    },

    /// Run detection over every image in a folder, sequentially
    Batch {
        /// Path to folder containing images
        folder: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set model path
        #[arg(long)]
        set_model: Option<PathBuf>,

        /// Set class-names file path
        #[arg(long)]
        set_classes: Option<PathBuf>,

        /// Set confidence threshold (0-1)
        #[arg(long)]
        set_threshold: Option<f32>,

        /// Set scale factor (m² per pixel)
        #[arg(long)]
        set_scale_factor: Option<f64>,

        /// Set output folder
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
