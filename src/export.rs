//! Export sinks: append-only run log and overwrite-mode CSV report

use crate::error::{Error, Result};
use crate::types::{DetectionRun, EnrichedRecord};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// CSV header, fixed by the report format.
pub const CSV_HEADER: [&str; 9] = [
    "Image",
    "ID",
    "Class",
    "Confidence",
    "x1",
    "y1",
    "x2",
    "y2",
    "P.Alan (m²)",
];

/// Append one run block to the text log.
///
/// The log is append-only: a run header naming the source image, one line per
/// record, then a blank line. Prior runs are never truncated; calling this N
/// times with the same input produces N blocks.
pub fn append_log(log_path: &Path, image_path: &Path, records: &[EnrichedRecord]) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::ExportWrite(format!("{}: {}", log_path.display(), e)))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| Error::ExportWrite(format!("{}: {}", log_path.display(), e)))?;

    let mut block = String::new();
    block.push_str(&format!("--- Detection run: {} ---\n", image_path.display()));
    for record in records {
        let bbox = record.detection.bbox;
        block.push_str(&format!(
            "ID:{}, Class:{}, Conf:{:.2}, BBox:[{},{},{},{}], P.Alan:{:.2} m2\n",
            record.sequence_id,
            record.detection.class_name,
            record.detection.confidence,
            bbox.x1,
            bbox.y1,
            bbox.x2,
            bbox.y2,
            record.real_area_m2,
        ));
    }
    block.push('\n');

    file.write_all(block.as_bytes())
        .map_err(|e| Error::ExportWrite(format!("{}: {}", log_path.display(), e)))?;
    file.flush()
        .map_err(|e| Error::ExportWrite(format!("{}: {}", log_path.display(), e)))?;
    Ok(())
}

/// Rewrite the CSV report from the given runs.
///
/// Overwrite semantics: each call replaces the whole file, so the report
/// reflects only the most recent batch. The file is written to a temporary
/// sibling path and renamed into place on success, so a failure mid-write
/// never leaves a truncated report behind.
pub fn write_csv(csv_path: &Path, runs: &[DetectionRun]) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::ExportWrite(format!("{}: {}", csv_path.display(), e)))?;
    }

    let tmp_path = csv_path.with_extension("csv.tmp");
    let mut writer = csv::Writer::from_path(&tmp_path)
        .map_err(|e| Error::ExportWrite(format!("{}: {}", tmp_path.display(), e)))?;

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::ExportWrite(e.to_string()))?;

    for run in runs {
        let image_name = run.image_name();
        for record in &run.records {
            let bbox = record.detection.bbox;
            writer
                .write_record([
                    image_name.clone(),
                    record.sequence_id.to_string(),
                    record.detection.class_name.clone(),
                    format!("{:.2}", record.detection.confidence),
                    bbox.x1.to_string(),
                    bbox.y1.to_string(),
                    bbox.x2.to_string(),
                    bbox.y2.to_string(),
                    format!("{:.2}", record.real_area_m2),
                ])
                .map_err(|e| Error::ExportWrite(e.to_string()))?;
        }
    }

    writer
        .flush()
        .map_err(|e| Error::ExportWrite(e.to_string()))?;
    drop(writer);

    std::fs::rename(&tmp_path, csv_path)
        .map_err(|e| Error::ExportWrite(format!("{}: {}", csv_path.display(), e)))?;
    Ok(())
}
