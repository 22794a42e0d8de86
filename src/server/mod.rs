//! Fault-isolating command server.
//!
//! One connection at a time, strictly in sequence:
//!
//! ```text
//!  Listening ─▶ Accept ─▶ Read ─▶ Parse ─▶ Dispatch ─▶ Respond ─▶ Close ─┐
//!      ▲                                                                 │
//!      └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each cycle ends in a [`ConnectionOutcome`]. Transport errors in any phase
//! drop that connection only; the loop always returns to `Listening`.

pub mod device;
pub mod listener;
pub mod request;
pub mod response;

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{Acceptor, Connection, EventSink, LedPort, Peer, TemperaturePort};
use crate::config::{AckStyle, FallbackStyle, MAX_REQUEST_BYTES, ServerConfig};
use crate::error::TransportError;

use device::DeviceState;
use request::Request;
use response::Reply;

/// Where in the cycle a connection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Accept,
    Read,
    Respond,
}

/// Result of one accept→close cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionOutcome {
    /// The request was parsed, dispatched and answered.
    Served {
        peer: Peer,
        request: Request,
        status: u16,
    },
    /// The connection was dropped. Dispatch may already have run if the
    /// failure happened while responding.
    Faulted {
        peer: Peer,
        phase: Phase,
        error: TransportError,
    },
}

impl ConnectionOutcome {
    pub fn is_served(&self) -> bool {
        matches!(self, Self::Served { .. })
    }
}

/// Running totals, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub served: u32,
    pub faulted: u32,
}

pub struct CommandServer<A, L, T> {
    acceptor: A,
    device: DeviceState<L, T>,
    config: ServerConfig,
    stats: ServerStats,
}

impl<A, L, T> CommandServer<A, L, T>
where
    A: Acceptor,
    L: LedPort,
    T: TemperaturePort,
{
    pub fn new(acceptor: A, device: DeviceState<L, T>, config: ServerConfig) -> Self {
        Self {
            acceptor,
            device,
            config,
            stats: ServerStats::default(),
        }
    }

    /// Serve connections until the process is stopped.
    pub fn run(&mut self, sink: &mut impl EventSink) -> ! {
        sink.emit(&AppEvent::ServerListening {
            port: self.config.port,
        });
        loop {
            self.serve_one(sink);
        }
    }

    /// Run exactly one accept→close cycle.
    pub fn serve_one(&mut self, sink: &mut impl EventSink) -> ConnectionOutcome {
        let outcome = match self.acceptor.accept() {
            Ok(mut conn) => {
                let outcome = self.handle(&mut conn, sink);
                conn.close();
                outcome
            }
            Err(error) => ConnectionOutcome::Faulted {
                peer: Peer::Unknown,
                phase: Phase::Accept,
                error,
            },
        };

        match outcome {
            ConnectionOutcome::Served {
                peer,
                request,
                status,
            } => {
                self.stats.served += 1;
                sink.emit(&AppEvent::ConnectionServed {
                    peer,
                    request,
                    status,
                    led_on: self.device.led_on(),
                });
            }
            ConnectionOutcome::Faulted { peer, phase, error } => {
                self.stats.faulted += 1;
                sink.emit(&AppEvent::ConnectionFaulted { peer, phase, error });
            }
        }
        outcome
    }

    fn handle(&mut self, conn: &mut A::Conn, sink: &mut impl EventSink) -> ConnectionOutcome {
        let peer = conn.peer();
        let limit = self.config.max_request_bytes.min(MAX_REQUEST_BYTES);

        let mut buf: heapless::Vec<u8, MAX_REQUEST_BYTES> = heapless::Vec::new();
        if let Err(error) = read_request(conn, &mut buf, limit) {
            return ConnectionOutcome::Faulted {
                peer,
                phase: Phase::Read,
                error,
            };
        }
        debug!("SERVER | {} sent {} bytes", peer, buf.len());

        let request = request::parse(&buf, self.device.blink_enabled());

        if let Request::Command(cmd) = request {
            if self.device.apply(cmd) {
                sink.emit(&AppEvent::LedChanged {
                    on: self.device.led_on(),
                });
            }
        }

        let reply = self.reply_for(request);
        let response = match response::render(&reply) {
            Ok(r) => r,
            Err(_) => {
                return ConnectionOutcome::Faulted {
                    peer,
                    phase: Phase::Respond,
                    error: TransportError::WriteFailed,
                };
            }
        };

        if let Err(error) = conn.write_all(response.as_bytes()) {
            return ConnectionOutcome::Faulted {
                peer,
                phase: Phase::Respond,
                error,
            };
        }

        ConnectionOutcome::Served {
            peer,
            request,
            status: response.status(),
        }
    }

    fn reply_for(&mut self, request: Request) -> Reply {
        match request {
            Request::Command(cmd) => match self.config.ack {
                AckStyle::PlainText => Reply::Ack(cmd),
                AckStyle::StatusPage => Reply::StatusPage(self.device.snapshot()),
            },
            Request::Status => Reply::StatusPage(self.device.snapshot()),
            Request::Unrecognized(miss) => {
                info!("SERVER | unrecognised request ({})", miss);
                match self.config.fallback {
                    FallbackStyle::StatusPage => Reply::StatusPage(self.device.snapshot()),
                    FallbackStyle::NotFound => Reply::NotFound,
                }
            }
        }
    }

    pub fn device(&self) -> &DeviceState<L, T> {
        &self.device
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Read until the end of the request line, EOF, or `limit` bytes.
fn read_request<C: Connection>(
    conn: &mut C,
    buf: &mut heapless::Vec<u8, MAX_REQUEST_BYTES>,
    limit: usize,
) -> Result<(), TransportError> {
    let mut chunk = [0u8; 256];
    while buf.len() < limit {
        let want = (limit - buf.len()).min(chunk.len());
        let n = conn.read(&mut chunk[..want])?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n])
            .map_err(|_| TransportError::ReadFailed)?;
        if chunk[..n].contains(&b'\n') {
            break;
        }
    }
    Ok(())
}
