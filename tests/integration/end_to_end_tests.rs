//! Client and server over real loopback sockets.
//!
//! The server runs `serve_one` on its own thread with a simulated LED; the
//! client side is the production pipeline plus the fire-and-forget sender.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use pinchlink::adapters::sim_led::{SimDelay, SimPin};
use pinchlink::app::commands::Command;
use pinchlink::app::events::AppEvent;
use pinchlink::app::service::GesturePipeline;
use pinchlink::client::sender::{FireAndForget, QUEUE_DEPTH};
use pinchlink::config::{ClientConfig, ServerConfig};
use pinchlink::error::SendFailure;
use pinchlink::drivers::status_led::StatusLed;
use pinchlink::server::device::DeviceState;
use pinchlink::server::listener::TcpAcceptor;
use pinchlink::server::request::Request;
use pinchlink::server::{CommandServer, ConnectionOutcome};

use crate::mock_hw::{RecordingSink, hand};

/// Serve `n` connections on an ephemeral port and return the outcomes with
/// the LED level after each.
fn spawn_server(n: usize) -> (SocketAddr, std::thread::JoinHandle<Vec<(ConnectionOutcome, bool)>>) {
    let config = ServerConfig::default();
    let acceptor =
        TcpAcceptor::bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)), 1000).unwrap();
    let addr = acceptor.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let led = StatusLed::new(SimPin::new(), SimDelay::instant());
        let device = DeviceState::new(led, config.blink);
        let mut server = CommandServer::new(acceptor, device, config);
        let mut sink = RecordingSink::default();
        (0..n)
            .map(|_| {
                let o = server.serve_one(&mut sink);
                (o, server.device().led_on())
            })
            .collect()
    });
    (addr, handle)
}

#[test]
fn gestures_drive_the_server_led() {
    let (addr, server) = spawn_server(2);

    let mut tx = FireAndForget::spawn(&addr.to_string(), 1000).unwrap();
    let mut p = GesturePipeline::new(&ClientConfig::default());
    let mut sink = RecordingSink::default();
    let mut t = 0;
    // Default map: far → on, close → off.
    for d in [150.0, 150.0, 150.0, 10.0, 10.0, 10.0] {
        p.tick(Some(&hand(d)), t, &mut tx, &mut sink);
        t += 300;
    }

    let results = server.join().unwrap();
    tx.shutdown();

    let served: Vec<_> = results
        .iter()
        .map(|(o, led)| match o {
            ConnectionOutcome::Served { request, status, .. } => (*request, *status, *led),
            ConnectionOutcome::Faulted { .. } => panic!("unexpected fault: {o:?}"),
        })
        .collect();
    assert_eq!(
        served,
        vec![
            (Request::Command(Command::LedOn), 200, true),
            (Request::Command(Command::LedOff), 200, false),
        ]
    );
}

#[test]
fn client_that_hangs_up_does_not_stop_the_server() {
    let (addr, server) = spawn_server(2);

    // Connect and leave without sending anything.
    drop(TcpStream::connect(addr).unwrap());

    let mut s = TcpStream::connect(addr).unwrap();
    s.write_all(b"GET /led?cmd=on HTTP/1.1\r\n\r\n").unwrap();
    let mut reply = String::new();
    s.read_to_string(&mut reply).unwrap();
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(reply.ends_with("LED ON"));

    let results = server.join().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[1].0.is_served());
    assert!(results[1].1);
}

#[test]
fn stalled_server_never_slows_the_tick_loop() {
    // Accept and hold every connection without answering.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let held: Vec<_> = listener.incoming().map_while(Result::ok).collect();
        drop(held);
    });

    let mut tx = FireAndForget::spawn(&addr.to_string(), 300).unwrap();
    let mut p = GesturePipeline::new(&ClientConfig::default());
    let mut sink = RecordingSink::default();
    let mut t = 0;
    let mut expected = Vec::new();
    for round in 0..QUEUE_DEPTH + 4 {
        let (d, cmd) = if round % 2 == 0 {
            (150.0, Command::LedOn)
        } else {
            (10.0, Command::LedOff)
        };
        for _ in 0..3 {
            let start = Instant::now();
            p.tick(Some(&hand(d)), t, &mut tx, &mut sink);
            assert!(start.elapsed() < Duration::from_millis(50));
            t += 300;
        }
        expected.push(cmd);
        assert_eq!(p.last_emitted(), Some(cmd));
    }

    assert_eq!(p.committed_count(), expected.len() as u64);
    let dropped = sink.count(|e| {
        matches!(
            e,
            AppEvent::SendFailed {
                failure: SendFailure::QueueFull,
                ..
            }
        )
    });
    assert!(dropped >= 3);
    tx.shutdown();
}
