//! Command server integration tests.
//!
//! Drives `CommandServer` over scripted connections (including injected
//! read / write / accept faults) and checks LED transitions and responses.

use pinchlink::app::commands::Command;
use pinchlink::app::events::AppEvent;
use pinchlink::app::ports::{NoSensor, Peer};
use pinchlink::config::{AckStyle, BlinkConfig, FallbackStyle, ServerConfig};
use pinchlink::error::TransportError;
use pinchlink::server::device::DeviceState;
use pinchlink::server::request::{ParseMiss, Request};
use pinchlink::server::{CommandServer, ConnectionOutcome, Phase};

use crate::mock_hw::{Fault, LedCall, MockLed, RecordingSink, ScriptedAcceptor};

fn server(
    acceptor: ScriptedAcceptor,
    config: ServerConfig,
) -> CommandServer<ScriptedAcceptor, MockLed, NoSensor> {
    let device = DeviceState::new(MockLed::new(), config.blink);
    CommandServer::new(acceptor, device, config)
}

fn responses(acceptor_log: &std::rc::Rc<std::cell::RefCell<Vec<(Vec<u8>, bool)>>>) -> Vec<String> {
    acceptor_log
        .borrow()
        .iter()
        .map(|(bytes, _)| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

#[test]
fn socket_error_mid_response_spares_later_connections() {
    let acceptor = ScriptedAcceptor::new()
        .request("GET /led?cmd=on HTTP/1.1\r\n\r\n")
        .request("GET /led?cmd=off HTTP/1.1\r\n\r\n")
        .faulty(
            "GET /led?cmd=on HTTP/1.1\r\n\r\n",
            Fault::Write(TransportError::Closed),
        )
        .request("GET /led?cmd=off HTTP/1.1\r\n\r\n")
        .request("GET /led?cmd=on HTTP/1.1\r\n\r\n");
    let log = acceptor.log.clone();
    let mut s = server(acceptor, ServerConfig::default());
    let mut sink = RecordingSink::default();

    let mut levels = Vec::new();
    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(s.serve_one(&mut sink));
        levels.push(s.device().led_on());
    }

    assert!(outcomes[0].is_served());
    assert!(outcomes[1].is_served());
    assert_eq!(
        outcomes[2],
        ConnectionOutcome::Faulted {
            peer: Peer::Unknown,
            phase: Phase::Respond,
            error: TransportError::Closed,
        }
    );
    assert!(outcomes[3].is_served());
    assert!(outcomes[4].is_served());
    assert_eq!(levels, vec![true, false, true, false, true]);

    let resp = responses(&log);
    assert_eq!(resp.len(), 5);
    assert!(resp[0].ends_with("LED ON"));
    assert!(resp[1].ends_with("LED OFF"));
    assert!(resp[3].ends_with("LED OFF"));
    assert!(resp[4].ends_with("LED ON"));
    // Every accepted connection was closed, faulted or not.
    assert!(log.borrow().iter().all(|(_, closed)| *closed));

    assert_eq!(s.stats().served, 4);
    assert_eq!(s.stats().faulted, 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ConnectionFaulted { phase: Phase::Respond, .. })),
        1
    );
}

#[test]
fn read_fault_leaves_led_untouched() {
    let acceptor = ScriptedAcceptor::new()
        .request("GET /led?cmd=on HTTP/1.1\r\n")
        .faulty(
            "GET /led?cmd=off HTTP/1.1\r\n",
            Fault::Read(TransportError::Timeout),
        )
        .request("GET /led?cmd=off HTTP/1.1\r\n");
    let mut s = server(acceptor, ServerConfig::default());
    let mut sink = RecordingSink::default();

    s.serve_one(&mut sink);
    assert!(s.device().led_on());
    let faulted = s.serve_one(&mut sink);
    assert!(matches!(
        faulted,
        ConnectionOutcome::Faulted {
            phase: Phase::Read,
            ..
        }
    ));
    assert!(s.device().led_on(), "faulted read must not change the LED");
    assert!(s.serve_one(&mut sink).is_served());
    assert!(!s.device().led_on());
}

#[test]
fn accept_failures_do_not_stop_the_loop() {
    let acceptor = ScriptedAcceptor::new()
        .accept_error(TransportError::AcceptFailed)
        .accept_error(TransportError::AcceptFailed)
        .request("GET /led?cmd=on HTTP/1.1\r\n");
    let mut s = server(acceptor, ServerConfig::default());
    let mut sink = RecordingSink::default();
    let outcomes: Vec<_> = (0..3).map(|_| s.serve_one(&mut sink)).collect();
    assert!(!outcomes[0].is_served());
    assert!(!outcomes[1].is_served());
    assert!(outcomes[2].is_served());
    assert!(s.device().led_on());
}

#[test]
fn unrecognised_selectors_never_touch_the_led() {
    let junk = [
        "GET /led?cmd=dim HTTP/1.1\r\n",
        "GET /led?cmd= HTTP/1.1\r\n",
        "GET /led?command=on HTTP/1.1\r\n",
        "POST /led?cmd=on HTTP/1.1\r\n",
        "\r\n",
        "",
        "garbage",
    ];
    let mut acceptor = ScriptedAcceptor::new();
    for j in junk {
        acceptor = acceptor.request(j);
    }
    let log = acceptor.log.clone();
    let mut s = server(acceptor, ServerConfig::default());
    let mut sink = RecordingSink::default();

    for _ in junk {
        let o = s.serve_one(&mut sink);
        assert!(matches!(
            o,
            ConnectionOutcome::Served {
                request: Request::Unrecognized(_),
                status: 200,
                ..
            }
        ));
    }
    // Only the power-on "off" write.
    assert_eq!(s.device().led().calls, vec![LedCall::Set(false)]);
    let resp = responses(&log);
    assert_eq!(resp.len(), junk.len());
    assert!(resp.iter().all(|r| r.contains("<strong>OFF</strong>")));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LedChanged { .. })), 0);
}

#[test]
fn not_found_fallback() {
    let acceptor = ScriptedAcceptor::new()
        .request("GET /favicon.ico HTTP/1.1\r\n")
        .request("GET / HTTP/1.1\r\n");
    let log = acceptor.log.clone();
    let mut s = server(
        acceptor,
        ServerConfig {
            fallback: FallbackStyle::NotFound,
            ..ServerConfig::default()
        },
    );
    let mut sink = RecordingSink::default();
    let o = s.serve_one(&mut sink);
    assert!(matches!(o, ConnectionOutcome::Served { status: 404, .. }));
    // The status page itself is still reachable.
    let o = s.serve_one(&mut sink);
    assert!(matches!(
        o,
        ConnectionOutcome::Served {
            request: Request::Status,
            status: 200,
            ..
        }
    ));
    let resp = responses(&log);
    assert!(resp[0].starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[test]
fn blink_on_server_without_blink_falls_back() {
    let acceptor = ScriptedAcceptor::new()
        .request("GET /led?cmd=on HTTP/1.1\r\n")
        .request("GET /led?cmd=blink HTTP/1.1\r\n");
    let log = acceptor.log.clone();
    let config = ServerConfig {
        blink: BlinkConfig {
            enabled: false,
            ..BlinkConfig::default()
        },
        fallback: FallbackStyle::NotFound,
        ..ServerConfig::default()
    };
    let mut s = server(acceptor, config);
    let mut sink = RecordingSink::default();
    s.serve_one(&mut sink);
    let o = s.serve_one(&mut sink);
    assert_eq!(
        o,
        ConnectionOutcome::Served {
            peer: Peer::Unknown,
            request: Request::Unrecognized(ParseMiss::Unsupported(Command::LedBlink)),
            status: 404,
        }
    );
    assert!(s.device().led_on(), "LED unchanged by unsupported blink");
    assert_eq!(s.device().led().blinks(), 0);
    assert!(responses(&log)[1].starts_with("HTTP/1.1 404"));
}

#[test]
fn blink_runs_full_sequence_and_ends_off() {
    let acceptor = ScriptedAcceptor::new()
        .request("GET /led?cmd=on HTTP/1.1\r\n")
        .request("GET /led?cmd=blink HTTP/1.1\r\n");
    let log = acceptor.log.clone();
    let mut s = server(acceptor, ServerConfig::default());
    let mut sink = RecordingSink::default();
    s.serve_one(&mut sink);
    s.serve_one(&mut sink);
    assert_eq!(
        s.device().led().calls.last(),
        Some(&LedCall::Blink {
            toggles: 3,
            delay_ms: 300
        })
    );
    assert!(!s.device().led_on());
    assert!(responses(&log)[1].ends_with("LED BLINK"));
}

#[test]
fn status_page_acknowledgement_reflects_new_state() {
    let acceptor = ScriptedAcceptor::new().request("GET /?led=on HTTP/1.1\r\n");
    let log = acceptor.log.clone();
    let mut s = server(
        acceptor,
        ServerConfig {
            ack: AckStyle::StatusPage,
            ..ServerConfig::default()
        },
    );
    let mut sink = RecordingSink::default();
    s.serve_one(&mut sink);
    let resp = responses(&log);
    assert!(resp[0].contains("text/html"));
    assert!(resp[0].contains("<strong>ON</strong>"));
}

#[test]
fn status_page_reports_temperature() {
    use pinchlink::adapters::sim_led::SimTemperature;

    let acceptor = ScriptedAcceptor::new().request("GET / HTTP/1.1\r\n");
    let log = acceptor.log.clone();
    let config = ServerConfig::default();
    let device = DeviceState::with_sensor(MockLed::new(), SimTemperature(27.25), config.blink);
    let mut s = CommandServer::new(acceptor, device, config);
    s.serve_one(&mut RecordingSink::default());
    assert!(responses(&log)[0].contains("Temperature: 27."));
}

#[test]
fn served_events_carry_led_level() {
    let acceptor = ScriptedAcceptor::new()
        .request("GET /led?cmd=on HTTP/1.1\r\n")
        .request("GET /led?cmd=on HTTP/1.1\r\n");
    let mut s = server(acceptor, ServerConfig::default());
    let mut sink = RecordingSink::default();
    s.serve_one(&mut sink);
    s.serve_one(&mut sink);
    // Repeated "on" is served but only changes the LED once.
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LedChanged { on: true })), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ConnectionServed { led_on: true, status: 200, .. })),
        2
    );
}
