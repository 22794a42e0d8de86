//! Gesture pipeline: the client-side hexagonal core.
//!
//! [`GesturePipeline`] owns the classifier and the debounce policy. Each
//! sampling tick flows through it once:
//!
//! ```text
//!  LandmarkSource ──▶ ┌──────────────────────────────┐ ──▶ CommandTransport
//!                     │        GesturePipeline        │
//!                     │  Classifier · DebouncePolicy  │ ──▶ EventSink
//!                     └──────────────────────────────┘
//! ```
//!
//! Transport failures are reported to the sink and otherwise ignored; they
//! never feed back into debounce state.

use core::fmt;

use log::{debug, warn};

use crate::app::commands::Command;
use crate::config::ClientConfig;
use crate::gesture::classifier::{GestureClassifier, GestureLabel};
use crate::gesture::debounce::{DebouncePolicy, Debouncer};
use crate::gesture::landmarks::LandmarkFrame;

use super::events::AppEvent;
use super::ports::{CommandTransport, EventSink};

/// Operator-facing status line for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// The perception source saw no hand.
    NoHand,
    /// A hand is visible but nothing is happening yet.
    Waiting,
    /// The hand is in a gesture bucket.
    Gesture(GestureLabel),
    /// This tick committed a command.
    Committed(Command),
}

impl fmt::Display for TickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHand => write!(f, "No hands detected"),
            Self::Waiting => write!(f, "Hand detected - waiting for gesture..."),
            Self::Gesture(label) => write!(f, "Gesture : {:?}", label),
            Self::Committed(cmd) => write!(f, "Gesture : {}", cmd.selector().to_uppercase()),
        }
    }
}

/// Outcome of one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub label: GestureLabel,
    /// Measured landmark distance, when a hand with both landmarks was seen.
    pub distance_px: Option<f32>,
    /// Command committed on this tick, if any.
    pub committed: Option<Command>,
    pub status: TickStatus,
}

/// Classifier + debouncer, driven once per tick.
pub struct GesturePipeline {
    classifier: GestureClassifier,
    debouncer: Debouncer,
    ticks: u64,
    committed: u64,
}

impl GesturePipeline {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_debouncer(config, Debouncer::from_config(&config.debounce))
    }

    /// Build with an explicit debouncer (tests seed the LED belief this way).
    pub fn with_debouncer(config: &ClientConfig, debouncer: Debouncer) -> Self {
        Self {
            classifier: GestureClassifier::new(config.classifier),
            debouncer,
            ticks: 0,
            committed: 0,
        }
    }

    /// Run one tick: classify, debounce, and hand any command to `transport`.
    pub fn tick(
        &mut self,
        frame: Option<&LandmarkFrame>,
        now_ms: u32,
        transport: &mut impl CommandTransport,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.ticks += 1;

        let distance_px = frame.and_then(|f| self.classifier.measure(f));
        let label = self.classifier.classify(frame);

        if frame.is_none() {
            self.debouncer.reset();
        }

        let committed = self.debouncer.consume(label, now_ms);

        if let Some(cmd) = committed {
            self.committed += 1;
            sink.emit(&AppEvent::CommandCommitted(cmd));
            if let Err(failure) = transport.send(cmd) {
                warn!("CLIENT | send {:?} failed: {}", cmd, failure);
                sink.emit(&AppEvent::SendFailed { cmd, failure });
            }
        }

        let status = match (frame, committed, label) {
            (None, _, _) => TickStatus::NoHand,
            (Some(_), Some(cmd), _) => TickStatus::Committed(cmd),
            (Some(_), None, GestureLabel::None) => TickStatus::Waiting,
            (Some(_), None, l) if matches!(self.debouncer, Debouncer::DoublePulse(_)) => {
                // The pulse policy only cares about pinches; everything else is idle.
                if l == GestureLabel::Close {
                    TickStatus::Gesture(l)
                } else {
                    TickStatus::Waiting
                }
            }
            (Some(_), None, l) => TickStatus::Gesture(l),
        };

        debug!(
            "CLIENT | tick {} label={:?} d={:?} -> {}",
            self.ticks, label, distance_px, status
        );

        TickReport {
            label,
            distance_px,
            committed,
            status,
        }
    }

    /// Most recent command handed to the transport.
    pub fn last_emitted(&self) -> Option<Command> {
        self.debouncer.last_emitted()
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Ticks processed since construction.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Commands committed since construction.
    pub fn committed_count(&self) -> u64 {
        self.committed
    }
}
