// src/decision.rs
//
// Steering decision logic. A pure, stateless, total mapping from frame
// features to a command and a status line. Rules run in strict priority
// order; the first match wins:
//
//   1. stop marker in the stop zone        -> STOP
//   2. line lost (invalid centroid)        -> STOP
//   3. left boundary gone, line right-side -> recover right
//   4. right boundary gone, line left-side -> recover left
//   5. five-band bucketing of centroid x   -> sharp-left .. sharp-right

use crate::features::FrameFeatures;
use crate::types::{CommandMap, DecisionConfig, SteerCommand};

pub const STATUS_STOP_LINE: &str = "STOP LINE DETECTED";
pub const STATUS_LINE_LOST: &str = "LINE NOT FOUND - STOP";
pub const STATUS_OUT_LEFT: &str = "OUT LEFT - TURN RIGHT TO RETURN";
pub const STATUS_OUT_RIGHT: &str = "OUT RIGHT - TURN LEFT TO RETURN";

const BAND_STATUS: [&str; 5] = ["SHARP LEFT", "LEFT", "STRAIGHT", "RIGHT", "SHARP RIGHT"];
const BAND_COMMAND: [SteerCommand; 5] = [
    SteerCommand::SharpLeft,
    SteerCommand::Left,
    SteerCommand::Straight,
    SteerCommand::Right,
    SteerCommand::SharpRight,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub command: SteerCommand,
    pub status: &'static str,
}

/// Map features to a steering decision for a frame of the given width.
pub fn decide(features: &FrameFeatures, frame_width: usize, config: &DecisionConfig) -> Decision {
    if features.counts.stop_zone > config.stop_zone_threshold {
        return Decision {
            command: SteerCommand::Stop,
            status: STATUS_STOP_LINE,
        };
    }

    if !features.centroid.valid {
        return Decision {
            command: SteerCommand::Stop,
            status: STATUS_LINE_LOST,
        };
    }

    let x = features.centroid.x;
    let midpoint = frame_width as f64 / 2.0;

    if features.counts.left_boundary < config.boundary_threshold && x > midpoint {
        return Decision {
            command: SteerCommand::RecoverRight,
            status: STATUS_OUT_LEFT,
        };
    }

    if features.counts.right_boundary < config.boundary_threshold && x < midpoint {
        return Decision {
            command: SteerCommand::RecoverLeft,
            status: STATUS_OUT_RIGHT,
        };
    }

    let band = steering_band(x, frame_width);
    Decision {
        command: BAND_COMMAND[band],
        status: BAND_STATUS[band],
    }
}

/// Band index for a centroid x: floor(5 * x / width) clamped to [0, 4].
/// A centroid exactly on a band boundary resolves to the right-hand band.
pub fn steering_band(x: f64, frame_width: usize) -> usize {
    let band = (5.0 * x / frame_width as f64).floor();
    (band.max(0.0) as usize).min(4)
}

/// Wire byte for a decision under the configured intent-to-byte mapping.
pub fn command_code(decision: &Decision, map: &CommandMap) -> u8 {
    map.code_for(decision.command)
}
