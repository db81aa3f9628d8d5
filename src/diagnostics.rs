// src/diagnostics.rs
//
// Per-cycle diagnostics output: one JSON line per decision, and optionally
// the raw masks (PGM) and the annotated frame (PPM) for external viewing.
// Write failures are boundary I/O, logged and swallowed.

use crate::types::{DecisionResult, DiagnosticsConfig, Frame, Mask};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub trait DiagnosticsSink: Send {
    fn publish(&mut self, result: &DecisionResult);
}

pub struct FileDiagnostics {
    jsonl: Option<BufWriter<File>>,
    save_masks: bool,
    save_annotated: bool,
    output_dir: PathBuf,
}

impl FileDiagnostics {
    pub fn new(config: &DiagnosticsConfig, output_dir: &str) -> Result<Self> {
        let output_dir = PathBuf::from(output_dir);
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;

        let jsonl = if config.write_jsonl {
            let path = output_dir.join("decisions.jsonl");
            info!("Decisions will be written to {}", path.display());
            Some(BufWriter::new(
                File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ))
        } else {
            None
        };

        Ok(Self {
            jsonl,
            save_masks: config.save_masks,
            save_annotated: config.save_annotated,
            output_dir,
        })
    }

    fn write_record(&mut self, result: &DecisionResult) -> Result<()> {
        if let Some(ref mut file) = self.jsonl {
            let record = serde_json::json!({
                "frame_id": result.frame_id,
                "timestamp_ms": result.timestamp_ms,
                "command": result.command.as_str(),
                "code": (result.code as char).to_string(),
                "status": result.status,
                "centroid": result.centroid,
                "counts": result.counts,
            });
            writeln!(file, "{}", serde_json::to_string(&record)?)?;
            file.flush()?;
        }

        if self.save_masks {
            let id = result.frame_id;
            write_pgm(&self.output_dir.join(format!("{id:06}_line.pgm")), &result.line_mask)?;
            write_pgm(
                &self.output_dir.join(format!("{id:06}_boundary.pgm")),
                &result.boundary_mask,
            )?;
            write_pgm(&self.output_dir.join(format!("{id:06}_stop.pgm")), &result.stop_mask)?;
        }

        if self.save_annotated {
            write_ppm(
                &self.output_dir.join(format!("{:06}_annotated.ppm", result.frame_id)),
                &result.annotated,
            )?;
        }

        Ok(())
    }
}

impl DiagnosticsSink for FileDiagnostics {
    fn publish(&mut self, result: &DecisionResult) {
        if let Err(e) = self.write_record(result) {
            warn!("diagnostics write for frame {} failed: {}", result.frame_id, e);
        }
    }
}

pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn publish(&mut self, _result: &DecisionResult) {}
}

fn write_pgm(path: &Path, mask: &Mask) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write!(file, "P5\n{} {}\n255\n", mask.width, mask.height)?;
    file.write_all(&mask.data)?;
    Ok(())
}

fn write_ppm(path: &Path, frame: &Frame) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write!(file, "P6\n{} {}\n255\n", frame.width, frame.height)?;
    file.write_all(&frame.data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Centroid, SteerCommand, ZoneCounts};

    fn sample_result() -> DecisionResult {
        DecisionResult {
            frame_id: 7,
            timestamp_ms: 233.3,
            command: SteerCommand::Straight,
            code: b's',
            status: "STRAIGHT".to_string(),
            centroid: Centroid {
                x: 250.0,
                y: 100.0,
                valid: true,
            },
            counts: ZoneCounts {
                left_boundary: 400,
                right_boundary: 380,
                stop_zone: 0,
            },
            line_mask: Mask::new(4, 4),
            boundary_mask: Mask::new(4, 4),
            stop_mask: Mask::new(4, 4),
            annotated: Frame {
                data: vec![0u8; 4 * 4 * 3],
                width: 4,
                height: 4,
                timestamp_ms: 233.3,
            },
        }
    }

    #[test]
    fn test_jsonl_record_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagnosticsConfig {
            write_jsonl: true,
            save_masks: false,
            save_annotated: false,
        };
        let mut sink = FileDiagnostics::new(&config, dir.path().to_str().unwrap()).unwrap();
        sink.publish(&sample_result());

        let contents = fs::read_to_string(dir.path().join("decisions.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("\"command\":\"STRAIGHT\""));
        assert!(contents.contains("\"code\":\"s\""));
    }

    #[test]
    fn test_masks_and_annotated_saved_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagnosticsConfig {
            write_jsonl: false,
            save_masks: true,
            save_annotated: true,
        };
        let mut sink = FileDiagnostics::new(&config, dir.path().to_str().unwrap()).unwrap();
        sink.publish(&sample_result());

        assert!(dir.path().join("000007_line.pgm").exists());
        assert!(dir.path().join("000007_boundary.pgm").exists());
        assert!(dir.path().join("000007_stop.pgm").exists());
        assert!(dir.path().join("000007_annotated.ppm").exists());

        let pgm = fs::read(dir.path().join("000007_line.pgm")).unwrap();
        assert!(pgm.starts_with(b"P5\n4 4\n255\n"));
        assert_eq!(pgm.len(), "P5\n4 4\n255\n".len() + 16);
    }
}
