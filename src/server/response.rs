//! Response rendering.
//!
//! Every accepted connection gets exactly one of these, written in one go
//! and followed by a close. Bodies are small and fixed-shape, so they are
//! built in `heapless` buffers.

use core::fmt::{self, Write};

use crate::app::commands::Command;

use super::device::Snapshot;

/// Largest rendered response (head + body).
pub const RESPONSE_CAPACITY: usize = 1024;
const BODY_CAPACITY: usize = 768;

/// What to send back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// Short `text/plain` acknowledgement (`LED ON`).
    Ack(Command),
    /// HTML control page showing the given state.
    StatusPage(Snapshot),
    /// `404 Not Found`, empty body.
    NotFound,
}

/// A fully rendered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    bytes: heapless::Vec<u8, RESPONSE_CAPACITY>,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Render `reply`. Fails only if the output would not fit the buffer.
pub fn render(reply: &Reply) -> Result<Response, fmt::Error> {
    let mut body: heapless::String<BODY_CAPACITY> = heapless::String::new();
    let (status, reason, content_type) = match reply {
        Reply::Ack(cmd) => {
            body.push_str(cmd.ack_text()).map_err(|_| fmt::Error)?;
            (200, "OK", "text/plain")
        }
        Reply::StatusPage(snap) => {
            write_status_page(&mut body, snap)?;
            (200, "OK", "text/html")
        }
        Reply::NotFound => (404, "Not Found", "text/plain"),
    };

    let mut head: heapless::String<160> = heapless::String::new();
    write!(
        head,
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    )?;

    let mut bytes = heapless::Vec::new();
    bytes
        .extend_from_slice(head.as_bytes())
        .map_err(|_| fmt::Error)?;
    bytes
        .extend_from_slice(body.as_bytes())
        .map_err(|_| fmt::Error)?;
    Ok(Response { status, bytes })
}

fn write_status_page(out: &mut impl Write, snap: &Snapshot) -> fmt::Result {
    let state = if snap.led_on { "ON" } else { "OFF" };
    write!(
        out,
        "<!DOCTYPE html><html><head><title>PinchLink</title></head><body>\
         <h1>LED control</h1>\
         <p>LED state: <strong>{state}</strong></p>"
    )?;
    if let Some(t) = snap.temperature_c {
        write!(out, "<p>Temperature: {t:.1} &deg;C</p>")?;
    }
    write!(
        out,
        "<form><button name=\"led\" value=\"on\">ON</button>\
         <button name=\"led\" value=\"off\">OFF</button></form>\
         </body></html>"
    )
}
