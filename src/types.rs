use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub serial: SerialConfig,
    pub colors: ColorConfig,
    pub decision: DecisionConfig,
    pub commands: CommandMapConfig,
    pub diagnostics: DiagnosticsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub target_fps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub enabled: bool,
    pub port: String,
    pub baud_rate: u32,
}

/// Inclusive HSV bounds for one color class.
/// Hue 0-360 degrees, saturation 0-100, value 0-255.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColorRange {
    pub hue: [f32; 2],
    pub sat: [f32; 2],
    pub val: [f32; 2],
}

impl ColorRange {
    #[inline]
    pub fn contains(&self, h: f32, s: f32, v: f32) -> bool {
        h >= self.hue[0]
            && h <= self.hue[1]
            && s >= self.sat[0]
            && s <= self.sat[1]
            && v >= self.val[0]
            && v <= self.val[1]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    pub line: ColorRange,
    pub boundary: ColorRange,
    /// Stop-marker hue band near 0 degrees.
    pub stop_low: ColorRange,
    /// Stop-marker hue band near 360 degrees (hue wrap-around).
    pub stop_high: ColorRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub stop_zone_threshold: u32,
    pub boundary_threshold: u32,
    pub centroid_epsilon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    pub write_jsonl: bool,
    pub save_masks: bool,
    pub save_annotated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Intent-to-byte mapping as written in config.yaml. Each entry must be a
/// single ASCII character; `resolve` in config.rs converts to the wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMapConfig {
    pub stop: String,
    pub sharp_left: String,
    pub left: String,
    pub straight: String,
    pub right: String,
    pub sharp_right: String,
    pub recover_left: String,
    pub recover_right: String,
}

#[derive(Debug, Clone, Copy)]
pub struct CommandMap {
    pub stop: u8,
    pub sharp_left: u8,
    pub left: u8,
    pub straight: u8,
    pub right: u8,
    pub sharp_right: u8,
    pub recover_left: u8,
    pub recover_right: u8,
}

impl CommandMap {
    pub fn code_for(&self, command: SteerCommand) -> u8 {
        match command {
            SteerCommand::Stop => self.stop,
            SteerCommand::SharpLeft => self.sharp_left,
            SteerCommand::Left => self.left,
            SteerCommand::Straight => self.straight,
            SteerCommand::Right => self.right,
            SteerCommand::SharpRight => self.sharp_right,
            SteerCommand::RecoverLeft => self.recover_left,
            SteerCommand::RecoverRight => self.recover_right,
        }
    }
}

/// One RGB frame (HWC byte layout), owned by a single processing cycle.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub timestamp_ms: f64,
}

/// Single-channel binary raster; foreground pixels are 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0u8; width * height],
            width,
            height,
        }
    }
}

/// Mean foreground coordinate of the line mask. `x` and `y` are undefined
/// when `valid` is false; check before use.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
    pub valid: bool,
}

impl Centroid {
    pub fn invalid() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            valid: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ZoneCounts {
    pub left_boundary: u32,
    pub right_boundary: u32,
    pub stop_zone: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SteerCommand {
    Stop,
    SharpLeft,
    Left,
    Straight,
    Right,
    SharpRight,
    RecoverLeft,
    RecoverRight,
}

impl SteerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SteerCommand::Stop => "STOP",
            SteerCommand::SharpLeft => "SHARP_LEFT",
            SteerCommand::Left => "LEFT",
            SteerCommand::Straight => "STRAIGHT",
            SteerCommand::Right => "RIGHT",
            SteerCommand::SharpRight => "SHARP_RIGHT",
            SteerCommand::RecoverLeft => "RECOVER_LEFT",
            SteerCommand::RecoverRight => "RECOVER_RIGHT",
        }
    }
}

/// Output of one pipeline cycle. Handed to the diagnostics sink and then
/// discarded; nothing is carried over into the next cycle.
#[derive(Debug, Clone)]
pub struct DecisionResult {
    pub frame_id: u64,
    pub timestamp_ms: f64,
    pub command: SteerCommand,
    pub code: u8,
    pub status: String,
    pub centroid: Centroid,
    pub counts: ZoneCounts,
    pub line_mask: Mask,
    pub boundary_mask: Mask,
    pub stop_mask: Mask,
    pub annotated: Frame,
}
