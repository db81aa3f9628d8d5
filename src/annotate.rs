// src/annotate.rs
//
// Diagnostics overlay drawn straight onto the RGB frame buffer: a banner
// with the decision status at the legacy anchor point, the line centroid
// marker, and the zone rectangles the feature extractor counted in.
// Rendering of the result belongs to the display collaborator; this module
// only produces the annotated raster.

use crate::features::{left_boundary_rect, right_boundary_rect, stop_zone_rect};
use crate::types::{Centroid, Frame};

const TEXT_ANCHOR: (usize, usize) = (20, 40);
const TEXT_SCALE: usize = 2;

const BANNER: (usize, usize, usize, usize) = (5, 5, 550, 70);
const BANNER_RGB: [u8; 3] = [40, 40, 40];
const STATUS_RGB: [u8; 3] = [0, 255, 0];
const CENTROID_RGB: [u8; 3] = [255, 255, 0];
const BOUNDARY_RGB: [u8; 3] = [255, 255, 255];
const STOP_RGB: [u8; 3] = [255, 0, 0];

/// Annotate a copy of the frame with the decision status and geometry.
pub fn annotate_frame(frame: &Frame, centroid: &Centroid, status: &str) -> Frame {
    let mut out = frame.clone();

    let (lx, ly, lw, lh) = left_boundary_rect(out.width, out.height);
    stroke_rect(&mut out, lx, ly, lw, lh, BOUNDARY_RGB);
    let (rx, ry, rw, rh) = right_boundary_rect(out.width, out.height);
    stroke_rect(&mut out, rx, ry, rw, rh, BOUNDARY_RGB);
    let (sx, sy, sw, sh) = stop_zone_rect(out.width, out.height);
    stroke_rect(&mut out, sx, sy, sw, sh, STOP_RGB);

    if centroid.valid {
        draw_cross(
            &mut out,
            centroid.x.round() as isize,
            centroid.y.round() as isize,
            8,
            CENTROID_RGB,
        );
    }

    let (bx, by, bw, bh) = BANNER;
    fill_rect(&mut out, bx, by, bw, bh, BANNER_RGB);
    draw_text(&mut out, status, TEXT_ANCHOR.0, TEXT_ANCHOR.1, TEXT_SCALE, STATUS_RGB);

    out
}

#[inline]
fn put_pixel(frame: &mut Frame, x: usize, y: usize, rgb: [u8; 3]) {
    if x < frame.width && y < frame.height {
        let idx = (y * frame.width + x) * 3;
        frame.data[idx..idx + 3].copy_from_slice(&rgb);
    }
}

fn fill_rect(frame: &mut Frame, x0: usize, y0: usize, w: usize, h: usize, rgb: [u8; 3]) {
    for y in y0..(y0 + h).min(frame.height) {
        for x in x0..(x0 + w).min(frame.width) {
            put_pixel(frame, x, y, rgb);
        }
    }
}

fn stroke_rect(frame: &mut Frame, x0: usize, y0: usize, w: usize, h: usize, rgb: [u8; 3]) {
    if w == 0 || h == 0 {
        return;
    }
    for x in x0..(x0 + w).min(frame.width) {
        put_pixel(frame, x, y0, rgb);
        put_pixel(frame, x, y0 + h - 1, rgb);
    }
    for y in y0..(y0 + h).min(frame.height) {
        put_pixel(frame, x0, y, rgb);
        put_pixel(frame, x0 + w - 1, y, rgb);
    }
}

fn draw_cross(frame: &mut Frame, cx: isize, cy: isize, arm: isize, rgb: [u8; 3]) {
    for d in -arm..=arm {
        let (hx, hy) = (cx + d, cy);
        let (vx, vy) = (cx, cy + d);
        if hx >= 0 && hy >= 0 {
            put_pixel(frame, hx as usize, hy as usize, rgb);
        }
        if vx >= 0 && vy >= 0 {
            put_pixel(frame, vx as usize, vy as usize, rgb);
        }
    }
}

/// Blit a string with the built-in 5x7 glyphs, `(x, baseline_y)` anchored
/// like the original overlay. Characters without a glyph advance the cursor
/// but draw nothing.
fn draw_text(frame: &mut Frame, text: &str, x: usize, baseline_y: usize, scale: usize, rgb: [u8; 3]) {
    let glyph_h = 7 * scale;
    let top = baseline_y.saturating_sub(glyph_h);
    let mut cursor = x;

    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (gy, row) in rows.iter().enumerate() {
                for gx in 0..5 {
                    if row & (0x10 >> gx) != 0 {
                        fill_rect(
                            frame,
                            cursor + gx * scale,
                            top + gy * scale,
                            scale,
                            scale,
                            rgb,
                        );
                    }
                }
            }
        }
        cursor += 6 * scale;
    }
}

/// 5x7 bitmap glyphs for the characters that appear in status lines.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_frame(width: usize, height: usize) -> Frame {
        Frame {
            data: vec![0u8; width * height * 3],
            width,
            height,
            timestamp_ms: 0.0,
        }
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * frame.width + x) * 3;
        [frame.data[idx], frame.data[idx + 1], frame.data[idx + 2]]
    }

    #[test]
    fn test_annotation_preserves_dimensions() {
        let frame = blank_frame(640, 480);
        let out = annotate_frame(&frame, &Centroid::invalid(), "STOP");
        assert_eq!(out.width, 640);
        assert_eq!(out.height, 480);
        assert_eq!(out.data.len(), frame.data.len());
    }

    #[test]
    fn test_banner_painted_at_anchor_area() {
        let frame = blank_frame(640, 480);
        let out = annotate_frame(&frame, &Centroid::invalid(), "");
        assert_eq!(pixel(&out, 10, 10), BANNER_RGB);
    }

    #[test]
    fn test_status_text_changes_pixels() {
        let frame = blank_frame(640, 480);
        let plain = annotate_frame(&frame, &Centroid::invalid(), "");
        let texted = annotate_frame(&frame, &Centroid::invalid(), "STOP");
        assert_ne!(plain.data, texted.data);
    }

    #[test]
    fn test_centroid_marker_drawn_only_when_valid() {
        let frame = blank_frame(640, 480);
        let c = Centroid {
            x: 320.0,
            y: 240.0,
            valid: true,
        };
        let with = annotate_frame(&frame, &c, "");
        assert_eq!(pixel(&with, 320, 240), CENTROID_RGB);

        let without = annotate_frame(&frame, &Centroid::invalid(), "");
        assert_eq!(pixel(&without, 320, 240), [0, 0, 0]);
    }

    #[test]
    fn test_small_frames_do_not_panic() {
        let frame = blank_frame(16, 12);
        let c = Centroid {
            x: 15.0,
            y: 11.0,
            valid: true,
        };
        let out = annotate_frame(&frame, &c, "SHARP RIGHT");
        assert_eq!(out.data.len(), 16 * 12 * 3);
    }
}
