//! Error types for satscan

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inference error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid box [{x1},{y1},{x2},{y2}]: corners must satisfy x1<x2 and y1<y2")]
    InvalidBox { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("Failed to write annotated image: {0}")]
    ImageWrite(String),

    #[error("Export failed: {0}")]
    ExportWrite(String),
}

pub type Result<T> = std::result::Result<T, Error>;
