// src/main.rs

mod actuator;
mod annotate;
mod config;
mod decision;
mod diagnostics;
mod features;
mod pipeline;
mod segmentation;
mod source;
mod types;

use actuator::{CommandSink, NullActuator, SerialActuator};
use anyhow::Result;
use diagnostics::{DiagnosticsSink, FileDiagnostics, NullDiagnostics};
use pipeline::{FramePipeline, PipelineController};
use source::FrameDirectorySource;
use tracing::{error, info, warn};
use types::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("line_tracker={}", config.logging.level))
        .init();

    info!("Line tracker starting (config: {})", config_path);
    info!(
        "Decision thresholds: stop_zone={}, boundary={}, epsilon={:e}",
        config.decision.stop_zone_threshold,
        config.decision.boundary_threshold,
        config.decision.centroid_epsilon
    );

    let commands = config.commands.resolve()?;

    // A dead actuator link downgrades to diagnostics-only operation; the
    // decision pipeline itself never depends on the link being up.
    let actuator: Box<dyn CommandSink> = if config.serial.enabled {
        match SerialActuator::open(&config.serial) {
            Ok(link) => Box::new(link),
            Err(e) => {
                warn!("Serial port unavailable ({e}), commands will be discarded");
                Box::new(NullActuator)
            }
        }
    } else {
        info!("Serial output disabled in config");
        Box::new(NullActuator)
    };

    let d = &config.diagnostics;
    let diagnostics: Box<dyn DiagnosticsSink> = if d.write_jsonl || d.save_masks || d.save_annotated
    {
        Box::new(FileDiagnostics::new(d, &config.video.output_dir)?)
    } else {
        Box::new(NullDiagnostics)
    };

    let source = FrameDirectorySource::new(&config.video)?;
    if source.is_empty() {
        error!("No frame files found in {}", config.video.input_dir);
        return Ok(());
    }

    let pipeline = FramePipeline::new(&config, commands, actuator, diagnostics);
    let controller = PipelineController::start(pipeline);

    source.run(&controller).await?;

    controller.shutdown().await;
    info!(
        "Done: {} frame(s) admitted, {} dropped",
        controller.frames_admitted(),
        controller.frames_dropped()
    );

    Ok(())
}
