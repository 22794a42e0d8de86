//! Outbound application events.
//!
//! Both halves of the system emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them: log to serial, render in a UI, count in tests.

use crate::app::commands::Command;
use crate::app::ports::Peer;
use crate::error::{SendFailure, TransportError};
use crate::server::Phase;
use crate::server::request::Request;

/// Structured events emitted by the client pipeline and the server.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The command server is bound and listening.
    ServerListening { port: u16 },

    /// A connection completed its cycle and was answered.
    ConnectionServed {
        peer: Peer,
        request: Request,
        status: u16,
        led_on: bool,
    },

    /// A connection failed and was dropped; the server keeps listening.
    ConnectionFaulted {
        peer: Peer,
        phase: Phase,
        error: TransportError,
    },

    /// The actuator changed state.
    LedChanged { on: bool },

    /// The client's sampling loop started.
    ClientStarted,

    /// The debouncer committed a command and handed it to the transport.
    CommandCommitted(Command),

    /// The transport could not take a committed command.
    SendFailed { cmd: Command, failure: SendFailure },
}
