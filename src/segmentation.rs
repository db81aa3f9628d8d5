// src/segmentation.rs
//
// HSV color segmentation of one RGB frame into the three semantic masks the
// decision logic runs on: guide line, track-edge boundary, stop marker.
// The stop mask is the union of two hue bands because red straddles the
// hue wrap-around point.

use crate::types::{ColorConfig, Frame, Mask};

/// Convert RGB to HSV.
/// Returns (H: 0-360, S: 0-100, V: 0-255).
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let r_n = r / 255.0;
    let g_n = g / 255.0;
    let b_n = b / 255.0;

    let max = r_n.max(g_n).max(b_n);
    let min = r_n.min(g_n).min(b_n);
    let delta = max - min;

    let h = if delta < 1e-6 {
        0.0
    } else if (max - r_n).abs() < 1e-6 {
        60.0 * (((g_n - b_n) / delta) % 6.0)
    } else if (max - g_n).abs() < 1e-6 {
        60.0 * (((b_n - r_n) / delta) + 2.0)
    } else {
        60.0 * (((r_n - g_n) / delta) + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max < 1e-6 {
        0.0
    } else {
        (delta / max) * 100.0
    };

    let v = max * 255.0;

    (h, s, v)
}

/// The three masks produced from one frame. All share the frame's
/// width and height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedMasks {
    pub line: Mask,
    pub boundary: Mask,
    pub stop: Mask,
}

/// Segment a frame into the line, boundary and stop masks.
///
/// A pixel is foreground in a mask iff its HSV value falls inside the
/// configured inclusive range on all three channels. This is a total
/// function; an all-background mask is a normal output, not an error.
pub fn segment_frame(frame: &Frame, colors: &ColorConfig) -> SegmentedMasks {
    let mut line = Mask::new(frame.width, frame.height);
    let mut boundary = Mask::new(frame.width, frame.height);
    let mut stop = Mask::new(frame.width, frame.height);

    let pixels = frame.width * frame.height;
    for i in 0..pixels {
        let idx = i * 3;
        let r = frame.data[idx] as f32;
        let g = frame.data[idx + 1] as f32;
        let b = frame.data[idx + 2] as f32;

        let (h, s, v) = rgb_to_hsv(r, g, b);

        if colors.line.contains(h, s, v) {
            line.data[i] = 255;
        }
        if colors.boundary.contains(h, s, v) {
            boundary.data[i] = 255;
        }
        if colors.stop_low.contains(h, s, v) || colors.stop_high.contains(h, s, v) {
            stop.data[i] = 255;
        }
    }

    SegmentedMasks {
        line,
        boundary,
        stop,
    }
}
