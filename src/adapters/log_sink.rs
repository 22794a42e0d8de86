//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! logger: `esp_idf_logger` (UART / USB-CDC) on the device, the
//! `tracing-subscriber` formatter on the host.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ServerListening { port } => {
                info!("SERVER | ready on port {}", port);
            }
            AppEvent::ConnectionServed {
                peer,
                request,
                status,
                led_on,
            } => {
                info!(
                    "SERVER | {} {:?} -> {} | led={}",
                    peer,
                    request,
                    status,
                    if *led_on { "ON" } else { "off" }
                );
            }
            AppEvent::ConnectionFaulted { peer, phase, error } => {
                warn!("SERVER | {} faulted in {:?}: {}", peer, phase, error);
            }
            AppEvent::LedChanged { on } => {
                info!("LED | {}", if *on { "ON" } else { "off" });
            }
            AppEvent::ClientStarted => {
                info!("CLIENT | sampling started");
            }
            AppEvent::CommandCommitted(cmd) => {
                info!("CLIENT | commit {}", cmd.selector());
            }
            AppEvent::SendFailed { cmd, failure } => {
                warn!("SEND | {} dropped: {}", cmd.selector(), failure);
            }
        }
    }
}
