//! Bounding-box annotation
//!
//! Renders boxes and labels onto a copy of the source image and writes the
//! result under the output folder, overwriting the previous annotated image.

use crate::error::{Error, Result};
use crate::types::EnrichedRecord;
use ab_glyph::{FontVec, PxScale};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const LABEL_SCALE: f32 = 14.0;

/// Fallback label strip geometry when no system font is available.
const FALLBACK_STRIP_HEIGHT: u32 = 10;
const FALLBACK_CHAR_WIDTH: u32 = 7;

/// Name of the annotated output file, keeping the source raster format.
fn output_file_name(image_path: &Path) -> String {
    let ext = image_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    format!("detected_with_id.{ext}")
}

/// Try to load a system font for label text.
///
/// Label rendering degrades gracefully: when none of the known font paths
/// exists, boxes and label strips are still drawn and the text is omitted.
fn load_label_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:/Windows/Fonts/arial.ttf",
        "C:/Windows/Fonts/segoeui.ttf",
    ];

    for path in &font_paths {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                return Some(font);
            }
        }
    }
    None
}

/// Draw boxes and id/class/confidence labels, write the annotated copy.
///
/// Records with confidence strictly below `confidence_threshold` are skipped
/// entirely: not drawn and not renumbered, so visible sequence ids may be
/// non-contiguous. A record exactly at the threshold is drawn.
///
/// The output path is fixed per output folder (last-run-wins, no versioning).
/// Returns the output path.
pub fn annotate(
    image_path: &Path,
    records: &[EnrichedRecord],
    confidence_threshold: f32,
    output_dir: &Path,
) -> Result<PathBuf> {
    if !image_path.exists() {
        return Err(Error::ImageNotFound(image_path.display().to_string()));
    }
    let mut img = image::open(image_path)?.into_rgb8();

    let font = load_label_font();

    for record in records {
        if record.detection.confidence < confidence_threshold {
            continue;
        }
        let bbox = record.detection.bbox;
        if !bbox.is_valid() {
            continue;
        }

        let width = bbox.width() as u32;
        let height = bbox.height() as u32;

        // 2 px border: outer rectangle plus a 1 px inset
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(bbox.x1, bbox.y1).of_size(width, height),
            BOX_COLOR,
        );
        if width > 2 && height > 2 {
            draw_hollow_rect_mut(
                &mut img,
                Rect::at(bbox.x1 + 1, bbox.y1 + 1).of_size(width - 2, height - 2),
                BOX_COLOR,
            );
        }

        let label = format!(
            "{}: {} ({:.2})",
            record.sequence_id, record.detection.class_name, record.detection.confidence
        );
        draw_label(&mut img, font.as_ref(), &label, bbox.x1, bbox.y1);
    }

    std::fs::create_dir_all(output_dir)
        .map_err(|e| Error::ImageWrite(format!("{}: {}", output_dir.display(), e)))?;
    let output_path = output_dir.join(output_file_name(image_path));
    img.save(&output_path)
        .map_err(|e| Error::ImageWrite(format!("{}: {}", output_path.display(), e)))?;

    Ok(output_path)
}

/// Filled strip above the box corner, label text on top when a font exists.
fn draw_label(img: &mut image::RgbImage, font: Option<&FontVec>, label: &str, x: i32, y: i32) {
    let scale = PxScale::from(LABEL_SCALE);

    let (text_w, text_h) = match font {
        Some(font) => text_size(scale, font, label),
        None => (
            label.len() as u32 * FALLBACK_CHAR_WIDTH,
            FALLBACK_STRIP_HEIGHT,
        ),
    };
    let strip_h = text_h + 4;

    draw_filled_rect_mut(
        img,
        Rect::at(x, y - strip_h as i32).of_size(text_w + 2, strip_h),
        BOX_COLOR,
    );
    if let Some(font) = font {
        draw_text_mut(
            img,
            TEXT_COLOR,
            x + 1,
            y - text_h as i32 - 2,
            scale,
            font,
            label,
        );
    }
}
