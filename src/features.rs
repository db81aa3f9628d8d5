// src/features.rs
//
// Geometric features over the segmented masks: line centroid via image
// moments, boundary-zone occupancy in the lower-corner columns, and
// stop-zone occupancy in a bottom strip. All zone geometry is derived from
// the mask dimensions so the pipeline is resolution independent.

use crate::segmentation::SegmentedMasks;
use crate::types::{Centroid, Mask, ZoneCounts};

// Zone geometry, as fractions of the mask dimensions:
//   boundary columns are the outer fifths over the lower half,
//   the stop strip spans the full width, h/12 tall, anchored h/8 above
//   the bottom edge (60px offset / 40px tall at 480p).
const BOUNDARY_COLUMN_DIV: usize = 5;
const STOP_STRIP_OFFSET_DIV: usize = 8;
const STOP_STRIP_HEIGHT_DIV: usize = 12;

#[derive(Debug, Clone, Copy)]
pub struct FrameFeatures {
    pub centroid: Centroid,
    pub counts: ZoneCounts,
}

/// Compute all features for one cycle. Total over any well-formed mask set;
/// a degenerate (all-background) line mask yields an invalid centroid.
pub fn extract_features(masks: &SegmentedMasks, centroid_epsilon: f64) -> FrameFeatures {
    FrameFeatures {
        centroid: line_centroid(&masks.line, centroid_epsilon),
        counts: ZoneCounts {
            left_boundary: left_boundary_count(&masks.boundary),
            right_boundary: right_boundary_count(&masks.boundary),
            stop_zone: stop_zone_count(&masks.stop),
        },
    }
}

/// First spatial moment over zeroth moment of the foreground. Marked invalid
/// when the zeroth moment falls below `epsilon` so callers never divide by a
/// vanishing pixel count.
pub fn line_centroid(mask: &Mask, epsilon: f64) -> Centroid {
    let mut m00: f64 = 0.0;
    let mut m10: f64 = 0.0;
    let mut m01: f64 = 0.0;

    for y in 0..mask.height {
        let row = y * mask.width;
        for x in 0..mask.width {
            if mask.data[row + x] != 0 {
                m00 += 1.0;
                m10 += x as f64;
                m01 += y as f64;
            }
        }
    }

    if m00 < epsilon {
        return Centroid::invalid();
    }

    Centroid {
        x: m10 / m00,
        y: m01 / m00,
        valid: true,
    }
}

/// Left one-fifth-width column over the lower half, as (x, y, w, h).
pub fn left_boundary_rect(width: usize, height: usize) -> (usize, usize, usize, usize) {
    (
        0,
        height / 2,
        width / BOUNDARY_COLUMN_DIV,
        height - height / 2,
    )
}

/// Right one-fifth-width column over the lower half, as (x, y, w, h).
pub fn right_boundary_rect(width: usize, height: usize) -> (usize, usize, usize, usize) {
    let column = width / BOUNDARY_COLUMN_DIV;
    (width - column, height / 2, column, height - height / 2)
}

/// Bottom stop strip spanning the full width, as (x, y, w, h).
pub fn stop_zone_rect(width: usize, height: usize) -> (usize, usize, usize, usize) {
    let offset = height / STOP_STRIP_OFFSET_DIV;
    let strip = height / STOP_STRIP_HEIGHT_DIV;
    let top = height.saturating_sub(offset);
    (0, top, width, strip.min(height - top))
}

/// Foreground count in the left boundary zone.
pub fn left_boundary_count(mask: &Mask) -> u32 {
    let (x, y, w, h) = left_boundary_rect(mask.width, mask.height);
    count_in_rect(mask, x, y, w, h)
}

/// Foreground count in the right boundary zone.
pub fn right_boundary_count(mask: &Mask) -> u32 {
    let (x, y, w, h) = right_boundary_rect(mask.width, mask.height);
    count_in_rect(mask, x, y, w, h)
}

/// Foreground count in the stop strip.
pub fn stop_zone_count(mask: &Mask) -> u32 {
    let (x, y, w, h) = stop_zone_rect(mask.width, mask.height);
    count_in_rect(mask, x, y, w, h)
}

fn count_in_rect(mask: &Mask, x0: usize, y0: usize, w: usize, h: usize) -> u32 {
    let x1 = (x0 + w).min(mask.width);
    let y1 = (y0 + h).min(mask.height);

    let mut count = 0u32;
    for y in y0..y1 {
        let row = y * mask.width;
        for x in x0..x1 {
            if mask.data[row + x] != 0 {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-5;

    fn mask_with(width: usize, height: usize, foreground: &[(usize, usize)]) -> Mask {
        let mut mask = Mask::new(width, height);
        for &(x, y) in foreground {
            mask.data[y * width + x] = 255;
        }
        mask
    }

    #[test]
    fn test_centroid_of_known_pixels() {
        // Foreground at x=10 and x=20 on one row: mean x is 15.
        let mask = mask_with(100, 50, &[(10, 30), (20, 30)]);
        let c = line_centroid(&mask, EPSILON);

        assert!(c.valid);
        assert!((c.x - 15.0).abs() < 1e-9);
        assert!((c.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_invalid_on_empty_mask() {
        let mask = Mask::new(100, 50);
        let c = line_centroid(&mask, EPSILON);
        assert!(!c.valid);
    }

    #[test]
    fn test_left_boundary_zone_extent() {
        // 100x50: left zone is x in [0, 20), y in [25, 50).
        let inside = mask_with(100, 50, &[(0, 25), (19, 49), (10, 30)]);
        let outside = mask_with(100, 50, &[(20, 30), (10, 24), (99, 49)]);

        assert_eq!(left_boundary_count(&inside), 3);
        assert_eq!(left_boundary_count(&outside), 0);
    }

    #[test]
    fn test_right_boundary_zone_extent() {
        // 100x50: right zone is x in [80, 100), y in [25, 50).
        let inside = mask_with(100, 50, &[(80, 25), (99, 49)]);
        let outside = mask_with(100, 50, &[(79, 30), (80, 24)]);

        assert_eq!(right_boundary_count(&inside), 2);
        assert_eq!(right_boundary_count(&outside), 0);
    }

    #[test]
    fn test_stop_zone_matches_legacy_480p_rect() {
        // At 640x480 the strip must be y in [420, 460), full width.
        let inside = mask_with(640, 480, &[(0, 420), (639, 459)]);
        let outside = mask_with(640, 480, &[(0, 419), (0, 460), (0, 479)]);

        assert_eq!(stop_zone_count(&inside), 2);
        assert_eq!(stop_zone_count(&outside), 0);
    }

    #[test]
    fn test_zones_scale_with_resolution() {
        // Same relative pixel, double the resolution: still inside its zone.
        let small = mask_with(100, 50, &[(5, 40)]);
        let large = mask_with(200, 100, &[(10, 80)]);

        assert_eq!(left_boundary_count(&small), 1);
        assert_eq!(left_boundary_count(&large), 1);
    }

    #[test]
    fn test_extract_features_composes_all_counts() {
        let line = mask_with(100, 50, &[(50, 10)]);
        let boundary = mask_with(100, 50, &[(5, 40), (95, 40)]);
        let stop = mask_with(100, 50, &[(50, 45)]);
        let masks = SegmentedMasks {
            line,
            boundary,
            stop,
        };

        let features = extract_features(&masks, EPSILON);
        assert!(features.centroid.valid);
        assert!((features.centroid.x - 50.0).abs() < 1e-9);
        assert_eq!(features.counts.left_boundary, 1);
        assert_eq!(features.counts.right_boundary, 1);
        assert_eq!(features.counts.stop_zone, 1);
    }
}
