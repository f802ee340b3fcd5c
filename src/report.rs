//! Geometry and area reporting
//!
//! Turns raw detections into enriched records: a 1-based sequence id in
//! detection order, the box area in pixels, and the real-world area derived
//! from the configured scale factor.

use crate::error::{Error, Result};
use crate::types::{Detection, EnrichedRecord};

/// Enrich detections with sequence ids and areas.
///
/// Input order is preserved: sequence ids are assigned 1, 2, 3, ... in the
/// order the detector returned the detections. No reordering, no
/// deduplication, no clipping against image bounds; a box lying outside the
/// image produces whatever area its coordinates imply.
///
/// Returns `Error::InvalidBox` for any box with x2<=x1 or y2<=y1; zero or
/// negative areas are rejected rather than silently reported.
pub fn enrich(detections: &[Detection], scale_factor: f64) -> Result<Vec<EnrichedRecord>> {
    let mut records = Vec::with_capacity(detections.len());

    for (idx, detection) in detections.iter().enumerate() {
        let bbox = detection.bbox;
        if !bbox.is_valid() {
            return Err(Error::InvalidBox {
                x1: bbox.x1,
                y1: bbox.y1,
                x2: bbox.x2,
                y2: bbox.y2,
            });
        }

        let pixel_area = bbox.width() * bbox.height();
        records.push(EnrichedRecord {
            sequence_id: idx as u32 + 1,
            detection: detection.clone(),
            pixel_area,
            real_area_m2: pixel_area as f64 * scale_factor,
        });
    }

    Ok(records)
}
