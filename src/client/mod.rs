//! Gesture client: sampling loop, landmark sources, command sender.
//!
//! The loop is a plain async function paced by an `async-io-mini` timer. It
//! owns no threads itself; delivery happens on the sender's thread.

pub mod sender;
pub mod source;

use core::time::Duration;

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, CommandTransport, EventSink, LandmarkSource};
use crate::app::service::{GesturePipeline, TickStatus};

/// What a finished loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientSummary {
    pub ticks: u64,
    pub committed: u64,
}

/// Tick until the source finishes. Live sources never finish.
pub async fn run_loop<S, T, E, C>(
    pipeline: &mut GesturePipeline,
    source: &mut S,
    transport: &mut T,
    sink: &mut E,
    clock: &C,
    interval: Duration,
) -> ClientSummary
where
    S: LandmarkSource,
    T: CommandTransport,
    E: EventSink,
    C: Clock,
{
    sink.emit(&AppEvent::ClientStarted);
    let mut last_status: Option<TickStatus> = None;

    loop {
        let frame = source.next_frame();
        if frame.is_none() && source.is_finished() {
            break;
        }

        let report = pipeline.tick(frame.as_ref(), clock.now_ms(), transport, sink);

        // The operator view only changes occasionally; don't flood the log.
        if last_status != Some(report.status) {
            info!("CLIENT | {}", report.status);
            last_status = Some(report.status);
        } else {
            debug!("CLIENT | {}", report.status);
        }

        async_io_mini::Timer::after(interval).await;
    }

    let summary = ClientSummary {
        ticks: pipeline.tick_count(),
        committed: pipeline.committed_count(),
    };
    info!(
        "CLIENT | source finished after {} ticks, {} commands",
        summary.ticks, summary.committed
    );
    summary
}
