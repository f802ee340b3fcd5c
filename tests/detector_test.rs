//! Detector adapter tests
//!
//! The model-dependent test needs a YOLO ONNX export on disk and is ignored
//! by default. Run with: cargo test -- --ignored

use satscan::config::Config;
use satscan::detector::{DetectorParams, ObjectDetector, YoloDetector};
use satscan::error::Error;
use std::path::{Path, PathBuf};

fn model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("models")
        .join("yolo11n.onnx")
}

fn classes_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("models")
        .join("classes.txt")
}

fn sample_image() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("images")
        .join("sample.jpg")
}

#[test]
fn test_missing_model_is_unavailable() {
    let err = YoloDetector::new(
        Path::new("/nonexistent/model.onnx"),
        Vec::new(),
        640,
        DetectorParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(_)));
}

#[test]
fn test_unconfigured_model_is_unavailable() {
    let config = Config::default();
    let err = YoloDetector::from_config(&config).unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(_)));
}

/// Smoke test against a real model export
#[test]
#[ignore] // Run with: cargo test -- --ignored
fn test_detect_on_sample_image() {
    let model = model_path();
    assert!(model.exists(), "Model not found: {:?}", model);

    let classes = satscan::detector::read_classes_file(&classes_path()).unwrap_or_default();
    let detector = YoloDetector::new(&model, classes, 640, DetectorParams::default()).unwrap();

    let detections = detector.detect(&sample_image()).unwrap();
    println!("=== Detections ===");
    for detection in &detections {
        println!(
            "{} ({:.2}) at [{},{},{},{}]",
            detection.class_name,
            detection.confidence,
            detection.bbox.x1,
            detection.bbox.y1,
            detection.bbox.x2,
            detection.bbox.y2
        );
    }

    for detection in &detections {
        assert!(detection.confidence >= 0.0 && detection.confidence <= 1.0);
        assert!(detection.bbox.is_valid());
    }
}

#[test]
#[ignore]
fn test_detect_missing_image() {
    let model = model_path();
    assert!(model.exists(), "Model not found: {:?}", model);

    let detector = YoloDetector::new(&model, Vec::new(), 640, DetectorParams::default()).unwrap();
    let err = detector.detect(Path::new("/nonexistent/img.jpg")).unwrap_err();
    assert!(matches!(err, Error::ImageNotFound(_)));
}
