//! Detection pipeline orchestration
//!
//! Each user action, whether it comes from the CLI or the GUI, maps onto one
//! of these calls: detect one image, or run a sequential batch and rewrite
//! the CSV report. The pipeline itself is synchronous and single-threaded.

use crate::annotate::annotate;
use crate::config::Config;
use crate::detector::ObjectDetector;
use crate::error::Result;
use crate::export::{append_log, write_csv};
use crate::report::enrich;
use crate::types::{BatchReport, DetectionRun};
use std::path::{Path, PathBuf};

/// Process one image: detect, enrich, annotate, append to the run log.
///
/// Does not touch the CSV report; the caller decides the batch scope for
/// that (see [`run_batch`]).
pub fn run_image(
    detector: &dyn ObjectDetector,
    image_path: &Path,
    config: &Config,
) -> Result<DetectionRun> {
    let detections = detector.detect(image_path)?;
    let records = enrich(&detections, config.scale_factor_m2)?;
    let annotated_path = annotate(
        image_path,
        &records,
        config.confidence_threshold,
        &config.output_dir(),
    )?;
    append_log(&config.log_path(), image_path, &records)?;

    Ok(DetectionRun {
        image_path: image_path.to_path_buf(),
        records,
        annotated_path: Some(annotated_path),
        timestamp: chrono::Utc::now(),
    })
}

/// Process a batch of images strictly sequentially, then rewrite the CSV.
///
/// The first per-image failure aborts the remaining batch and is returned to
/// the caller; nothing written so far (annotated images, log blocks) is
/// rolled back. `on_image` is invoked before each image, for progress
/// reporting.
pub fn run_batch(
    detector: &dyn ObjectDetector,
    images: &[PathBuf],
    config: &Config,
    mut on_image: impl FnMut(usize, &Path),
) -> Result<BatchReport> {
    let started_at = chrono::Utc::now();
    let mut runs = Vec::with_capacity(images.len());

    for (index, image_path) in images.iter().enumerate() {
        on_image(index, image_path);
        runs.push(run_image(detector, image_path, config)?);
    }

    let csv_path = config.csv_path();
    write_csv(&csv_path, &runs)?;

    Ok(BatchReport {
        total_images: images.len(),
        runs,
        csv_path,
        started_at,
        completed_at: chrono::Utc::now(),
    })
}
