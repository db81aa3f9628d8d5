// src/config.rs
//
// Configuration loading and fail-fast validation. A bad color range or
// command code is rejected here, never discovered mid-stream on a frame.

use crate::types::{ColorRange, CommandMap, CommandMapConfig, Config};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_range("colors.line", &self.colors.line)?;
        validate_range("colors.boundary", &self.colors.boundary)?;
        validate_range("colors.stop_low", &self.colors.stop_low)?;
        validate_range("colors.stop_high", &self.colors.stop_high)?;

        if self.decision.centroid_epsilon <= 0.0 {
            bail!(
                "decision.centroid_epsilon must be positive, got {}",
                self.decision.centroid_epsilon
            );
        }
        if self.video.target_fps == 0 {
            bail!("video.target_fps must be at least 1");
        }

        // Surfaces bad command codes now rather than at first dispatch.
        self.commands.resolve()?;

        Ok(())
    }
}

fn validate_range(name: &str, range: &ColorRange) -> Result<()> {
    let channels = [
        ("hue", range.hue, 0.0f32, 360.0f32),
        ("sat", range.sat, 0.0, 100.0),
        ("val", range.val, 0.0, 255.0),
    ];
    for (channel, [lo, hi], min, max) in channels {
        if lo > hi {
            bail!("{name}.{channel}: lower bound {lo} exceeds upper bound {hi}");
        }
        if lo < min || hi > max {
            bail!("{name}.{channel}: bounds [{lo}, {hi}] outside valid domain [{min}, {max}]");
        }
    }
    Ok(())
}

impl CommandMapConfig {
    pub fn resolve(&self) -> Result<CommandMap> {
        Ok(CommandMap {
            stop: code_byte("commands.stop", &self.stop)?,
            sharp_left: code_byte("commands.sharp_left", &self.sharp_left)?,
            left: code_byte("commands.left", &self.left)?,
            straight: code_byte("commands.straight", &self.straight)?,
            right: code_byte("commands.right", &self.right)?,
            sharp_right: code_byte("commands.sharp_right", &self.sharp_right)?,
            recover_left: code_byte("commands.recover_left", &self.recover_left)?,
            recover_right: code_byte("commands.recover_right", &self.recover_right)?,
        })
    }
}

fn code_byte(name: &str, code: &str) -> Result<u8> {
    let bytes = code.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        bail!("{name}: command code {code:?} must be exactly one ASCII character");
    }
    Ok(bytes[0])
}
