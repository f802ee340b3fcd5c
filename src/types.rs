//! Core types for detection runs and area reporting

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Axis-aligned bounding box in source-image pixel coordinates.
///
/// Corners follow the usual image convention: the left edge of the image is
/// x=0 and the top is y=0. Corners are integers produced by truncating the
/// model's float coordinates toward zero at the detector boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels. Negative if the corners are malformed.
    pub fn width(&self) -> i64 {
        self.x2 as i64 - self.x1 as i64
    }

    /// Height in pixels. Negative if the corners are malformed.
    pub fn height(&self) -> i64 {
        self.y2 as i64 - self.y1 as i64
    }

    /// True when x1<x2 and y1<y2.
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }
}

/// One object instance found in an image.
///
/// Constructed exactly once, at the detector boundary; downstream components
/// never re-parse raw model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Numeric class id as reported by the model
    pub class_id: u32,
    /// Human-readable class name from the model's names table
    pub class_name: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Box corners in source-image pixels
    pub bbox: BoundingBox,
}

/// A detection augmented with a per-run sequence id and computed areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// 1-based id, unique within one image's results, in detection order
    pub sequence_id: u32,
    /// The underlying detection
    pub detection: Detection,
    /// Box area in pixels: (x2-x1) * (y2-y1)
    pub pixel_area: i64,
    /// Real-world area in m²: pixel_area * scale factor
    pub real_area_m2: f64,
}

/// All enriched records for one source image, in detection order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRun {
    /// Source image path
    pub image_path: PathBuf,
    /// Records ordered by sequence_id ascending
    pub records: Vec<EnrichedRecord>,
    /// Where the annotated copy was written, if annotation ran
    pub annotated_path: Option<PathBuf>,
    /// When the run happened
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DetectionRun {
    /// Base filename of the source image, as used in CSV rows.
    pub fn image_name(&self) -> String {
        self.image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.image_path.display().to_string())
    }

    /// Sum of real-world areas over all records.
    pub fn total_area_m2(&self) -> f64 {
        self.records.iter().map(|r| r.real_area_m2).sum()
    }
}

/// Result of a sequential batch over several images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// One run per processed image, in processing order
    pub runs: Vec<DetectionRun>,
    /// Number of images in the batch
    pub total_images: usize,
    /// Where the CSV report was written
    pub csv_path: PathBuf,
    /// Batch start time
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Batch end time
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl BatchReport {
    /// Total number of detections across the batch.
    pub fn total_detections(&self) -> usize {
        self.runs.iter().map(|r| r.records.len()).sum()
    }
}
