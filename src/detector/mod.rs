//! Detector adapter over pretrained object-detection models
//!
//! The pipeline only sees the [`ObjectDetector`] trait and typed
//! [`Detection`](crate::types::Detection) values; raw model output never
//! leaves this module.

mod yolo;

pub use yolo::YoloDetector;

use crate::error::Result;
use crate::types::Detection;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Seam between the pipeline and a concrete detection model.
pub trait ObjectDetector {
    /// Run the model over one image.
    ///
    /// Returns every detection that survives model-level decoding, in the
    /// model's deterministic output order. The application confidence
    /// threshold is not consulted here; filtering for display is the
    /// annotator's concern.
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>>;

    /// Class-id to class-name table of the loaded model.
    fn names(&self) -> &[String];
}

/// Model-level decoding parameters.
///
/// `candidate_floor` is the model's own decode floor for candidate rows, not
/// the application confidence threshold used for rendering.
#[derive(Debug, Clone)]
pub struct DetectorParams {
    pub candidate_floor: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            candidate_floor: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }
}

/// Reads a file with the class names into a vector so that the numeric ids
/// coming out of the inference session can be given meaning.
pub fn read_classes_file(path: &Path) -> io::Result<Vec<String>> {
    BufReader::new(File::open(path)?).lines().collect()
}
