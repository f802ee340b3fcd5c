//! Integration tests for the satscan detection pipeline
//!
//! A stub detector stands in for the ONNX model so the geometry, annotation
//! and export behavior can be exercised end-to-end on temp directories.

use image::{Rgb, RgbImage};
use satscan::config::Config;
use satscan::detector::ObjectDetector;
use satscan::error::{Error, Result};
use satscan::pipeline::{run_batch, run_image};
use satscan::types::{BoundingBox, Detection};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Detector stub returning a fixed detection list per call.
struct StubDetector {
    detections: Vec<Detection>,
    names: Vec<String>,
}

impl StubDetector {
    fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            names: vec!["car".to_string()],
        }
    }
}

impl ObjectDetector for StubDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        if !image_path.exists() {
            return Err(Error::ImageNotFound(image_path.display().to_string()));
        }
        Ok(self.detections.clone())
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

fn detection(x1: i32, y1: i32, x2: i32, y2: i32, conf: f32) -> Detection {
    Detection {
        class_id: 0,
        class_name: "car".to_string(),
        confidence: conf,
        bbox: BoundingBox::new(x1, y1, x2, y2),
    }
}

fn write_test_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

fn test_config(output_dir: &Path) -> Config {
    Config {
        output_dir: Some(output_dir.to_path_buf()),
        ..Config::default()
    }
}

#[test]
fn test_single_image_end_to_end() {
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "img.jpg");
    let config = test_config(&dir.path().join("out"));

    let detector = StubDetector::new(vec![detection(10, 10, 50, 50, 0.9)]);
    let run = run_image(&detector, &image, &config).unwrap();

    assert_eq!(run.records.len(), 1);
    let record = &run.records[0];
    assert_eq!(record.sequence_id, 1);
    assert_eq!(record.pixel_area, 1600);
    assert!((record.real_area_m2 - 4.0).abs() < 1e-9);

    // Annotated copy exists under the output folder, same raster format
    let annotated = run.annotated_path.as_ref().unwrap();
    assert_eq!(annotated, &dir.path().join("out").join("detected_with_id.jpg"));
    assert!(annotated.exists());

    // Log carries the run block
    let log = std::fs::read_to_string(config.log_path()).unwrap();
    assert!(log.contains(&format!("--- Detection run: {} ---", image.display())));
    assert!(log.contains("ID:1, Class:car, Conf:0.90, BBox:[10,10,50,50], P.Alan:4.00 m2"));
}

#[test]
fn test_batch_writes_expected_csv_row() {
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "img.jpg");
    let config = test_config(&dir.path().join("out"));

    let detector = StubDetector::new(vec![detection(10, 10, 50, 50, 0.9)]);
    let report = run_batch(&detector, std::slice::from_ref(&image), &config, |_, _| {}).unwrap();

    assert_eq!(report.total_images, 1);
    assert_eq!(report.total_detections(), 1);

    let csv = std::fs::read_to_string(&report.csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Image,ID,Class,Confidence,x1,y1,x2,y2,P.Alan (m²)"
    );
    assert_eq!(lines.next().unwrap(), "img.jpg,1,car,0.90,10,10,50,50,4.00");
}

#[test]
fn test_below_threshold_record_exported_but_not_drawn() {
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "img.png");
    let config = test_config(&dir.path().join("out"));

    // conf 0.3 < threshold 0.5: must reach enrich output and CSV, but the
    // annotator skips it
    let detector = StubDetector::new(vec![detection(60, 60, 90, 90, 0.3)]);
    let report = run_batch(&detector, std::slice::from_ref(&image), &config, |_, _| {}).unwrap();

    assert_eq!(report.runs[0].records.len(), 1);
    let csv = std::fs::read_to_string(&report.csv_path).unwrap();
    assert!(csv.contains("img.png,1,car,0.30,60,60,90,90,2.25"));

    let annotated = report.runs[0].annotated_path.as_ref().unwrap();
    let img = image::open(annotated).unwrap().into_rgb8();
    assert_eq!(img.get_pixel(60, 60), &Rgb([255, 255, 255]));
}

#[test]
fn test_invalid_box_aborts_run() {
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "img.jpg");
    let config = test_config(&dir.path().join("out"));

    let detector = StubDetector::new(vec![detection(5, 5, 5, 20, 0.9)]);
    let err = run_image(&detector, &image, &config).unwrap_err();
    assert!(matches!(err, Error::InvalidBox { .. }));
}

#[test]
fn test_batch_aborts_on_first_failure() {
    let dir = tempdir().unwrap();
    let good = write_test_image(dir.path(), "a.jpg");
    let missing = dir.path().join("b.jpg");
    let also_good = write_test_image(dir.path(), "c.jpg");
    let config = test_config(&dir.path().join("out"));

    let detector = StubDetector::new(vec![detection(10, 10, 50, 50, 0.9)]);
    let images = vec![good.clone(), missing.clone(), also_good.clone()];
    let mut visited = Vec::new();
    let err = run_batch(&detector, &images, &config, |_, p| {
        visited.push(p.to_path_buf());
    })
    .unwrap_err();

    assert!(matches!(err, Error::ImageNotFound(_)));
    // The failing image stopped the batch before the third was attempted
    assert_eq!(visited, vec![good, missing]);
    // No CSV is written for an aborted batch
    assert!(!config.csv_path().exists());
}

#[test]
fn test_repeated_runs_grow_log_only() {
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "img.jpg");
    let config = test_config(&dir.path().join("out"));

    let detector = StubDetector::new(vec![detection(10, 10, 50, 50, 0.9)]);
    run_batch(&detector, std::slice::from_ref(&image), &config, |_, _| {}).unwrap();
    let csv_first = std::fs::read(config.csv_path()).unwrap();
    run_batch(&detector, std::slice::from_ref(&image), &config, |_, _| {}).unwrap();
    let csv_second = std::fs::read(config.csv_path()).unwrap();

    // CSV reflects only the latest batch; the log accumulates both runs
    assert_eq!(csv_first, csv_second);
    let log = std::fs::read_to_string(config.log_path()).unwrap();
    assert_eq!(log.matches("--- Detection run:").count(), 2);
}

#[test]
fn test_sequence_ids_follow_detector_order() {
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "img.jpg");
    let config = test_config(&dir.path().join("out"));

    // Deliberately not confidence- or position-sorted
    let detector = StubDetector::new(vec![
        detection(80, 80, 99, 99, 0.2),
        detection(0, 0, 10, 10, 0.95),
        detection(40, 40, 60, 60, 0.7),
    ]);
    let run = run_image(&detector, &image, &config).unwrap();

    let ids: Vec<u32> = run.records.iter().map(|r| r.sequence_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(run.records[0].detection.bbox, BoundingBox::new(80, 80, 99, 99));
    assert_eq!(run.records[1].detection.bbox, BoundingBox::new(0, 0, 10, 10));
}
