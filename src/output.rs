//! Output formatting module

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::types::{BatchReport, DetectionRun};

pub fn output_run(output_format: OutputFormat, run: &DetectionRun) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(run)?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nDetections: {}", run.image_name());
    println!("===========");

    if run.records.is_empty() {
        println!("(no objects detected)");
    } else {
        println!(
            "{:>4}  {:<16} {:>6}  {:>6} {:>6} {:>6} {:>6}  {:>12}",
            "ID", "Class", "Conf", "x1", "y1", "x2", "y2", "P.Alan (m²)"
        );
        for record in &run.records {
            let bbox = record.detection.bbox;
            println!(
                "{:>4}  {:<16} {:>6.2}  {:>6} {:>6} {:>6} {:>6}  {:>12.2}",
                record.sequence_id,
                record.detection.class_name,
                record.detection.confidence,
                bbox.x1,
                bbox.y1,
                bbox.x2,
                bbox.y2,
                record.real_area_m2,
            );
        }
        println!();
        println!("Total area:      {:.2} m²", run.total_area_m2());
    }

    if let Some(ref path) = run.annotated_path {
        println!("Annotated image: {}", path.display());
    }

    Ok(())
}

pub fn output_batch(output_format: OutputFormat, report: &BatchReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(report)?;
        println!("{}", content);
        return Ok(());
    }

    for run in &report.runs {
        output_run(output_format, run)?;
    }

    println!("\nBatch Summary");
    println!("=============");
    println!("Images:          {}", report.total_images);
    println!("Detections:      {}", report.total_detections());
    println!("CSV report:      {}", report.csv_path.display());

    Ok(())
}
