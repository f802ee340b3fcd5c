//! YOLO-family ONNX detector backed by onnxruntime

use crate::config::Config;
use crate::detector::{read_classes_file, DetectorParams, ObjectDetector};
use crate::error::{Error, Result};
use crate::types::{BoundingBox, Detection};
use ndarray::{Array, Array4, Axis};
use ort::inputs;
use ort::session::{Session, SessionOutputs};
use std::path::Path;

/// Decoded candidate in source-image float coordinates, pre-NMS.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: usize,
    confidence: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    fn intersection_over_union(&self, other: &Self) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}

/// Non maximum suppression removes duplicate detections of one object.
///
/// Candidates are sorted by descending confidence (stable, so equal scores
/// keep decode order) and lower-scoring boxes of the same class that overlap
/// a kept box beyond the IoU threshold are dropped.
fn non_maximum_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut to_remove: Vec<bool> = vec![false; candidates.len()];
    for (current_index, current) in candidates.iter().enumerate() {
        if to_remove[current_index] {
            continue;
        }
        for (offset, other) in candidates[current_index + 1..].iter().enumerate() {
            let other_index = current_index + offset + 1;
            if to_remove[other_index] {
                continue;
            }
            if current.class_id != other.class_id {
                continue;
            }
            if current.intersection_over_union(other) > iou_threshold {
                to_remove[other_index] = true;
            }
        }
    }
    let mut drop_iter = to_remove.iter();
    candidates.retain(|_| !drop_iter.next().copied().unwrap_or(false));
    candidates
}

/// Build the typed detection for a surviving candidate.
///
/// Corners are truncated toward zero. A candidate that collapses to zero
/// width or height under truncation is discarded so that every `Detection`
/// leaving the adapter satisfies x1<x2 and y1<y2.
fn finalize(candidate: &Candidate, class_names: &[String]) -> Option<Detection> {
    let bbox = BoundingBox::new(
        candidate.x1 as i32,
        candidate.y1 as i32,
        candidate.x2 as i32,
        candidate.y2 as i32,
    );
    if !bbox.is_valid() {
        return None;
    }
    let class_name = class_names
        .get(candidate.class_id)
        .cloned()
        .unwrap_or_else(|| candidate.class_id.to_string());
    Some(Detection {
        class_id: candidate.class_id as u32,
        class_name,
        confidence: candidate.confidence,
        bbox,
    })
}

/// Pretrained YOLO detector loaded from an ONNX file.
#[derive(Debug)]
pub struct YoloDetector {
    session: Session,
    class_names: Vec<String>,
    input_size: u32,
    params: DetectorParams,
}

impl YoloDetector {
    pub fn new(
        model_path: &Path,
        class_names: Vec<String>,
        input_size: u32,
        params: DetectorParams,
    ) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "model file does not exist: {}",
                model_path.display()
            )));
        }
        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(model_path))
            .map_err(|e| Error::ModelUnavailable(format!("{}: {}", model_path.display(), e)))?;

        Ok(Self {
            session,
            class_names,
            input_size,
            params,
        })
    }

    /// Build a detector from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model_path = config
            .model_path
            .as_deref()
            .ok_or_else(|| Error::ModelUnavailable("no model path configured".to_string()))?;
        let class_names = match &config.classes_path {
            Some(path) => read_classes_file(path)?,
            None => Vec::new(),
        };
        Self::new(
            model_path,
            class_names,
            config.input_size,
            DetectorParams::default(),
        )
    }

    /// Decode, resize and normalize the image into an NCHW tensor, returning
    /// the factors that map model coordinates back to source pixels.
    fn preprocess(&self, image_path: &Path) -> Result<(Array4<f32>, f32, f32)> {
        if !image_path.exists() {
            return Err(Error::ImageNotFound(image_path.display().to_string()));
        }
        let img = image::open(image_path)?.into_rgb8();
        let (orig_w, orig_h) = img.dimensions();

        let size = self.input_size;
        let resized = image::imageops::resize(&img, size, size, image::imageops::FilterType::Triangle);

        let mut array = Array::zeros((1, 3, size as usize, size as usize));
        for pixel in resized.enumerate_pixels() {
            let x = pixel.0 as usize;
            let y = pixel.1 as usize;
            let [r, g, b] = pixel.2 .0;
            array[[0, 0, y, x]] = r as f32 / 255.;
            array[[0, 1, y, x]] = g as f32 / 255.;
            array[[0, 2, y, x]] = b as f32 / 255.;
        }

        let x_scale = orig_w as f32 / size as f32;
        let y_scale = orig_h as f32 / size as f32;
        Ok((array, x_scale, y_scale))
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let (input, x_scale, y_scale) = self.preprocess(image_path)?;

        let outputs: SessionOutputs = self
            .session
            .run(inputs!["images" => input.view()]?)?;
        // Output shape is (1, 4+nc, candidates); transpose to iterate rows.
        let output = outputs["output0"].try_extract_tensor::<f32>()?;
        let output = output.t();

        let mut candidates: Vec<Candidate> = Vec::new();
        for row in output.axis_iter(Axis(0)) {
            let row: Vec<f32> = row.iter().copied().collect();
            let Some((class_id, confidence)) = row
                .iter()
                .skip(4) // skips bounding box coords
                .enumerate()
                .map(|(index, value)| (index, *value))
                .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
            else {
                continue;
            };
            if confidence < self.params.candidate_floor {
                continue;
            }
            let cx = row[0];
            let cy = row[1];
            let w = row[2];
            let h = row[3];
            candidates.push(Candidate {
                x1: (cx - w / 2.0) * x_scale,
                y1: (cy - h / 2.0) * y_scale,
                x2: (cx + w / 2.0) * x_scale,
                y2: (cy + h / 2.0) * y_scale,
                class_id,
                confidence,
            });
        }

        let mut kept = non_maximum_suppression(candidates, self.params.iou_threshold);
        kept.truncate(self.params.max_detections);

        Ok(kept
            .iter()
            .filter_map(|candidate| finalize(candidate, &self.class_names))
            .collect())
    }

    fn names(&self) -> &[String] {
        &self.class_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x1: f32, y1: f32, x2: f32, y2: f32, class_id: usize, conf: f32) -> Candidate {
        Candidate {
            x1,
            y1,
            x2,
            y2,
            class_id,
            confidence: conf,
        }
    }

    #[test]
    fn test_iou_disjoint() {
        let a = candidate(0.0, 0.0, 1.0, 1.0, 0, 0.9);
        let b = candidate(2.0, 2.0, 3.0, 3.0, 0, 0.9);
        assert_eq!(a.intersection_over_union(&b), 0.0);
    }

    #[test]
    fn test_iou_identical() {
        let a = candidate(0.0, 0.0, 4.0, 4.0, 0, 0.9);
        assert!((a.intersection_over_union(&a.clone()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nms_no_overlap() {
        let candidates = vec![
            candidate(0.0, 0.0, 1.0, 1.0, 0, 0.6),
            candidate(2.0, 2.0, 3.0, 3.0, 0, 0.6),
        ];
        let result = non_maximum_suppression(candidates.clone(), 0.5);
        assert_eq!(result, candidates);
    }

    #[test]
    fn nms_standard_usage() {
        let candidates = vec![
            candidate(0.0, 0.0, 4.0, 4.0, 0, 0.6),
            candidate(0.0, 0.0, 5.0, 5.0, 0, 0.55),
            candidate(6.0, 6.0, 10.0, 10.0, 0, 0.75),
        ];
        let result = non_maximum_suppression(candidates, 0.5);
        assert_eq!(
            result,
            vec![
                candidate(6.0, 6.0, 10.0, 10.0, 0, 0.75),
                candidate(0.0, 0.0, 4.0, 4.0, 0, 0.6),
            ]
        );
    }

    #[test]
    fn nms_overlap_but_different_classes() {
        let candidates = vec![
            candidate(0.0, 0.0, 4.5, 4.5, 0, 0.6),
            candidate(0.0, 0.0, 5.0, 5.0, 1, 0.55),
            candidate(0.5, 0.5, 4.0, 4.0, 0, 0.8),
            candidate(6.0, 6.0, 10.0, 10.0, 0, 0.75),
        ];
        let result = non_maximum_suppression(candidates, 0.5);
        assert_eq!(
            result,
            vec![
                candidate(0.5, 0.5, 4.0, 4.0, 0, 0.8),
                candidate(6.0, 6.0, 10.0, 10.0, 0, 0.75),
                candidate(0.0, 0.0, 5.0, 5.0, 1, 0.55),
            ]
        );
    }

    #[test]
    fn test_finalize_truncates_toward_zero() {
        let names = vec!["car".to_string()];
        let detection = finalize(&candidate(10.9, 10.1, 50.7, 50.9, 0, 0.9), &names).unwrap();
        assert_eq!(detection.bbox, BoundingBox::new(10, 10, 50, 50));
        assert_eq!(detection.class_name, "car");
    }

    #[test]
    fn test_finalize_drops_collapsed_box() {
        let names = vec!["car".to_string()];
        assert!(finalize(&candidate(5.2, 5.0, 5.8, 20.0, 0, 0.9), &names).is_none());
    }

    #[test]
    fn test_finalize_unknown_class_falls_back_to_id() {
        let detection = finalize(&candidate(0.0, 0.0, 10.0, 10.0, 7, 0.9), &[]).unwrap();
        assert_eq!(detection.class_name, "7");
        assert_eq!(detection.class_id, 7);
    }
}
