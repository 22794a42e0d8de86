//! Fire-and-forget command transport.
//!
//! The tick loop never waits on the network. Committed commands go into a
//! bounded `embassy-sync` channel; a dedicated sender thread drains it on an
//! `edge-executor` and issues one short HTTP request per command.
//!
//! ```text
//!  tick loop ──try_send──▶ [ SendQueue (8) ] ──receive().await──▶ sender thread
//!                                                                   │
//!                                        GET /led?cmd=<sel> ◀───────┘
//! ```
//!
//! The reply is read only as far as the status line, for the log. Nothing is
//! retried and the tick loop never learns how a delivery went.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::commands::Command;
use crate::app::ports::CommandTransport;
use crate::error::SendFailure;

/// Commands that may be queued before new ones are dropped.
pub const QUEUE_DEPTH: usize = 8;

/// Most of the reply the sender will look at.
const STATUS_LINE_MAX: usize = 128;

enum SendMsg {
    Command(Command),
    Shutdown,
}

type SendQueue = Channel<CriticalSectionRawMutex, SendMsg, QUEUE_DEPTH>;

/// Delivery counters shared with the sender thread.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    delivered: AtomicU32,
    failed: AtomicU32,
}

impl DeliveryStats {
    pub fn delivered(&self) -> u32 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u32 {
        self.failed.load(Ordering::Relaxed)
    }
}

pub struct FireAndForget {
    queue: Arc<SendQueue>,
    stats: Arc<DeliveryStats>,
    worker: Option<JoinHandle<()>>,
}

impl FireAndForget {
    /// Resolve `endpoint` (`host:port`) and start the sender thread.
    pub fn spawn(endpoint: &str, timeout_ms: u32) -> std::io::Result<Self> {
        let addr = endpoint.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "endpoint did not resolve")
        })?;
        let timeout = Duration::from_millis(u64::from(timeout_ms.max(1)));

        let queue: Arc<SendQueue> = Arc::new(Channel::new());
        let stats = Arc::new(DeliveryStats::default());

        let worker = std::thread::Builder::new()
            .name("pinchlink-send".into())
            .spawn({
                let queue = queue.clone();
                let stats = stats.clone();
                move || run_sender(&queue, &stats, addr, timeout)
            })?;

        info!("SEND | sender started for {} (timeout {:?})", addr, timeout);
        Ok(Self {
            queue,
            stats,
            worker: Some(worker),
        })
    }

    pub fn stats(&self) -> &DeliveryStats {
        &self.stats
    }

    /// Let queued commands drain, then stop the sender thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        futures_lite::future::block_on(self.queue.send(SendMsg::Shutdown));
        if worker.join().is_err() {
            warn!("SEND | sender thread panicked");
        }
    }
}

impl Drop for FireAndForget {
    fn drop(&mut self) {
        self.stop();
    }
}

impl CommandTransport for FireAndForget {
    fn send(&mut self, cmd: Command) -> Result<(), SendFailure> {
        if self.worker.is_none() {
            return Err(SendFailure::Disconnected);
        }
        self.queue
            .try_send(SendMsg::Command(cmd))
            .map_err(|_| SendFailure::QueueFull)
    }
}

// ── Sender thread ───────────────────────────────────────────

fn run_sender(queue: &SendQueue, stats: &DeliveryStats, addr: SocketAddr, timeout: Duration) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let task = executor.spawn(send_loop(queue, stats, addr, timeout));
    futures_lite::future::block_on(executor.run(task));
    debug!("SEND | sender stopped");
}

async fn send_loop(queue: &SendQueue, stats: &DeliveryStats, addr: SocketAddr, timeout: Duration) {
    loop {
        match queue.receive().await {
            SendMsg::Command(cmd) => match deliver(addr, cmd, timeout) {
                Ok(status) => {
                    stats.delivered.fetch_add(1, Ordering::Relaxed);
                    info!("SEND | {} -> {}", cmd.selector(), status.trim_end());
                }
                Err(failure) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!("SEND | {} to {} failed: {}", cmd.selector(), addr, failure);
                }
            },
            SendMsg::Shutdown => break,
        }
    }
}

/// One request, one status line, close.
fn deliver(addr: SocketAddr, cmd: Command, timeout: Duration) -> Result<String, SendFailure> {
    let mut stream =
        TcpStream::connect_timeout(&addr, timeout).map_err(|_| SendFailure::ConnectFailed)?;
    stream
        .set_write_timeout(Some(timeout))
        .and_then(|()| stream.set_read_timeout(Some(timeout)))
        .map_err(|_| SendFailure::ConnectFailed)?;

    let request = request_for(cmd, addr);
    stream
        .write_all(request.as_bytes())
        .map_err(|_| SendFailure::WriteFailed)?;

    // The reply is informational only; a missing one is still a delivery.
    let mut buf = [0u8; STATUS_LINE_MAX];
    let mut len = 0;
    while len < buf.len() {
        match stream.read(&mut buf[len..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                len += n;
                if buf[..len].contains(&b'\n') {
                    break;
                }
            }
        }
    }
    let line = buf[..len].split(|&b| b == b'\n').next().unwrap_or(&[]);
    Ok(String::from_utf8_lossy(line).into_owned())
}

/// The exact request line the server's parser expects.
pub fn request_for(cmd: Command, addr: SocketAddr) -> String {
    format!(
        "GET /led?cmd={} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        cmd.selector(),
        addr
    )
}
