// src/source.rs
//
// Frame acquisition collaborator shipped with the binary: numbered binary
// PPM (P6) frames read from the input directory and offered to the pipeline
// at the configured rate. The mailbox decides admission; a frame arriving
// while a cycle runs is simply dropped, which is the same contract a live
// camera callback would get.

use crate::pipeline::PipelineController;
use crate::types::{Frame, VideoConfig};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct FrameDirectorySource {
    files: Vec<PathBuf>,
    interval: Duration,
    fps: f64,
}

impl FrameDirectorySource {
    pub fn new(config: &VideoConfig) -> Result<Self> {
        let files = find_frame_files(&config.input_dir)?;
        info!("Found {} frame file(s) in {}", files.len(), config.input_dir);

        Ok(Self {
            files,
            interval: Duration::from_secs_f64(1.0 / config.target_fps as f64),
            fps: config.target_fps as f64,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Push every frame into the pipeline at the configured rate. Unreadable
    /// files are logged and skipped; they never reach the pipeline.
    pub async fn run(&self, controller: &PipelineController) -> Result<()> {
        for (index, path) in self.files.iter().enumerate() {
            let timestamp_ms = index as f64 / self.fps * 1000.0;
            match read_ppm(path, timestamp_ms) {
                Ok(frame) => {
                    if !controller.submit(frame) {
                        debug!("frame {} not admitted", path.display());
                    }
                }
                Err(e) => debug!("skipping {}: {}", path.display(), e),
            }
            tokio::time::sleep(self.interval).await;
        }
        Ok(())
    }
}

fn find_frame_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("ppm"))
            .unwrap_or(false)
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse a binary PPM (P6, maxval 255) into an RGB frame.
pub fn read_ppm(path: &Path, timestamp_ms: f64) -> Result<Frame> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_ppm(&bytes, timestamp_ms)
}

fn parse_ppm(bytes: &[u8], timestamp_ms: f64) -> Result<Frame> {
    let mut pos = 0usize;

    let magic = next_token(bytes, &mut pos).context("missing PPM magic")?;
    if magic != b"P6" {
        bail!("unsupported PPM magic {:?}", String::from_utf8_lossy(magic));
    }

    let width: usize = parse_number(bytes, &mut pos).context("missing width")?;
    let height: usize = parse_number(bytes, &mut pos).context("missing height")?;
    let maxval: usize = parse_number(bytes, &mut pos).context("missing maxval")?;
    if maxval != 255 {
        bail!("unsupported PPM maxval {maxval}");
    }

    // Exactly one whitespace byte separates the header from the raster.
    pos += 1;

    let expected = width * height * 3;
    let data = bytes
        .get(pos..pos + expected)
        .with_context(|| format!("truncated raster, expected {expected} bytes"))?
        .to_vec();

    Ok(Frame {
        data,
        width,
        height,
        timestamp_ms,
    })
}

/// Advance past whitespace and `#` comments, returning the next token.
fn next_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    loop {
        while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < bytes.len() && bytes[*pos] == b'#' {
            while *pos < bytes.len() && bytes[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }

    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (*pos > start).then(|| &bytes[start..*pos])
}

fn parse_number(bytes: &[u8], pos: &mut usize) -> Result<usize> {
    let token = next_token(bytes, pos).context("unexpected end of header")?;
    std::str::from_utf8(token)?
        .parse()
        .context("invalid header number")
}
