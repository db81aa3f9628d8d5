// src/pipeline.rs
//
// Frame pipeline controller. Frames arrive through a one-slot mailbox
// (bounded channel, capacity 1, try_send): while a cycle is running any
// newer frame is dropped, never queued behind it or processed concurrently.
// Each admitted frame goes through segmentation, feature extraction,
// decision and annotation exactly once, then the command byte is dispatched
// to the actuator and the full result to the diagnostics sink.

use crate::actuator::CommandSink;
use crate::annotate::annotate_frame;
use crate::decision::{command_code, decide};
use crate::diagnostics::DiagnosticsSink;
use crate::features::extract_features;
use crate::segmentation::segment_frame;
use crate::types::{
    ColorConfig, CommandMap, Config, DecisionConfig, DecisionResult, Frame,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const PROGRESS_LOG_INTERVAL: u64 = 50;

/// The per-frame decision pipeline plus its two output collaborators.
/// Owns no state that survives a cycle beyond the frame counter.
pub struct FramePipeline {
    colors: ColorConfig,
    decision: DecisionConfig,
    commands: CommandMap,
    actuator: Box<dyn CommandSink>,
    diagnostics: Box<dyn DiagnosticsSink>,
    next_frame_id: u64,
}

impl FramePipeline {
    pub fn new(
        config: &Config,
        commands: CommandMap,
        actuator: Box<dyn CommandSink>,
        diagnostics: Box<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            colors: config.colors.clone(),
            decision: config.decision.clone(),
            commands,
            actuator,
            diagnostics,
            next_frame_id: 0,
        }
    }

    /// Run one full cycle on an admitted frame. Masks, features and the
    /// decision are freshly computed; nothing is shared with other cycles.
    pub fn process_frame(&mut self, frame: Frame) -> DecisionResult {
        self.next_frame_id += 1;
        let frame_id = self.next_frame_id;

        let masks = segment_frame(&frame, &self.colors);
        let features = extract_features(&masks, self.decision.centroid_epsilon);
        let decision = decide(&features, frame.width, &self.decision);
        let annotated = annotate_frame(&frame, &features.centroid, decision.status);

        DecisionResult {
            frame_id,
            timestamp_ms: frame.timestamp_ms,
            command: decision.command,
            code: command_code(&decision, &self.commands),
            status: decision.status.to_string(),
            centroid: features.centroid,
            counts: features.counts,
            line_mask: masks.line,
            boundary_mask: masks.boundary,
            stop_mask: masks.stop,
            annotated,
        }
    }

    fn dispatch(&mut self, result: &DecisionResult) {
        self.actuator.send(result.code);
        self.diagnostics.publish(result);
    }
}

/// Handle for feeding frames into the running pipeline and stopping it.
pub struct PipelineController {
    tx: Mutex<Option<mpsc::Sender<Frame>>>,
    running: Arc<AtomicBool>,
    admitted: AtomicU64,
    dropped: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PipelineController {
    /// Spawn the worker task and begin admitting frames.
    pub fn start(mut pipeline: FramePipeline) -> Self {
        let (tx, mut rx) = mpsc::channel::<Frame>(1);
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);

        let worker = tokio::spawn(async move {
            let mut processed: u64 = 0;
            while let Some(frame) = rx.recv().await {
                if !worker_running.load(Ordering::SeqCst) {
                    break;
                }

                let result = pipeline.process_frame(frame);

                // A stop that lands mid-cycle lets the cycle finish but
                // discards its output.
                if worker_running.load(Ordering::SeqCst) {
                    pipeline.dispatch(&result);
                }

                processed += 1;
                if processed % PROGRESS_LOG_INTERVAL == 0 {
                    info!(
                        "Processed {} frames | last: {} ({:?})",
                        processed, result.status, result.code as char
                    );
                }
            }
            debug!("pipeline worker exited after {} frames", processed);
        });

        Self {
            tx: Mutex::new(Some(tx)),
            running,
            admitted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Offer a frame to the pipeline. Returns true if admitted; a frame
    /// arriving while the mailbox is occupied is dropped, not queued.
    pub fn submit(&self, frame: Frame) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }
        let guard = self.tx.lock().expect("mailbox lock poisoned");
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => {
                self.admitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!("pipeline busy, dropped frame ({} dropped so far)", dropped);
                false
            }
        }
    }

    /// Stop admitting frames. Idempotent and callable from any task; an
    /// in-flight cycle finishes but its output is discarded.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            *self.tx.lock().expect("mailbox lock poisoned") = None;
            info!(
                "Pipeline stopped: {} admitted, {} dropped",
                self.admitted.load(Ordering::Relaxed),
                self.dropped.load(Ordering::Relaxed)
            );
        }
    }

    /// Wait for the worker to drain and exit. Implies `stop`.
    pub async fn shutdown(&self) {
        self.stop();
        let worker = self.worker.lock().expect("worker lock poisoned").take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
    }

    pub fn frames_admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
