// src/actuator.rs
//
// Command dispatch to the vehicle. One byte per cycle, best effort: a
// failed or busy send is logged and swallowed so the next cycle is never
// stalled, and no acknowledgement is awaited.

use crate::types::SerialConfig;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

const WRITE_TIMEOUT: Duration = Duration::from_millis(20);

pub trait CommandSink: Send {
    fn send(&mut self, code: u8);
}

/// Serial actuator link. The port handle is owned here for the pipeline's
/// running lifetime; nothing else touches it.
pub struct SerialActuator {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialActuator {
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .with_context(|| format!("failed to open serial port {}", config.port))?;
        info!(
            "Serial actuator ready on {} @ {} baud",
            config.port, config.baud_rate
        );
        Ok(Self { port })
    }
}

impl CommandSink for SerialActuator {
    fn send(&mut self, code: u8) {
        if let Err(e) = self.port.write_all(&[code]) {
            debug!("actuator send of {:?} failed: {}", code as char, e);
        }
    }
}

/// Sink used when no serial link is configured or the port failed to open;
/// the pipeline keeps running and only diagnostics are produced.
pub struct NullActuator;

impl CommandSink for NullActuator {
    fn send(&mut self, _code: u8) {}
}
