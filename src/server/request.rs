//! Request-line parser.
//!
//! Only the first line of the request matters:
//!
//! ```text
//! request-line = method SP target SP version
//! target       = path [ "?" query ] [ "#" fragment ]
//! query        = pair *( "&" pair )
//! pair         = key [ "=" value ]
//! ```
//!
//! The first pair whose key is a command key (`cmd`, or `led` for the
//! status-page form) and whose value is exactly a known selector wins.
//! Headers and body are never inspected.

use core::fmt;

use crate::app::commands::Command;

/// Query keys that carry a command selector.
pub const COMMAND_KEYS: [&str; 2] = ["cmd", "led"];

/// Parsed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Command(Command),
    /// Bare `GET /` with no selector: show the status page.
    Status,
    Unrecognized(ParseMiss),
}

/// Why a request did not select a command. Not an error: every miss is
/// answered with the fallback response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMiss {
    /// No bytes, or no request line.
    Empty,
    /// The request line is not `METHOD SP TARGET SP VERSION`, or not UTF-8.
    Malformed,
    /// A method other than `GET`.
    Method,
    /// No query pair carried a known selector.
    NoSelector,
    /// The selector is known, but this deployment does not support it.
    Unsupported(Command),
}

impl fmt::Display for ParseMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty request"),
            Self::Malformed => write!(f, "malformed request line"),
            Self::Method => write!(f, "unsupported method"),
            Self::NoSelector => write!(f, "no command selector"),
            Self::Unsupported(c) => write!(f, "'{}' not supported here", c.selector()),
        }
    }
}

/// The pieces of a well-formed request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub version: &'a str,
}

impl<'a> RequestLine<'a> {
    /// Split the first line of `raw` into its grammar parts.
    pub fn split(raw: &'a [u8]) -> Result<Self, ParseMiss> {
        let end = raw
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(raw.len());
        let line = &raw[..end];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseMiss::Empty);
        }
        let line = core::str::from_utf8(line).map_err(|_| ParseMiss::Malformed)?;

        let mut parts = line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseMiss::Malformed);
        };
        if method.is_empty() || !target.starts_with('/') || !version.starts_with("HTTP/") {
            return Err(ParseMiss::Malformed);
        }

        let target = target.split('#').next().unwrap_or(target);
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };

        Ok(Self {
            method,
            path,
            query,
            version,
        })
    }

    /// `key=value` pairs of the query string, in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.query
            .unwrap_or("")
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| p.split_once('=').unwrap_or((p, "")))
    }

    /// The first recognised selector in the query.
    pub fn selector(&self) -> Option<Command> {
        self.pairs()
            .filter(|(k, _)| COMMAND_KEYS.contains(k))
            .find_map(|(_, v)| Command::from_selector(v))
    }
}

/// Parse raw request bytes into a typed [`Request`].
///
/// `blink_enabled` decides whether `blink` is part of the vocabulary; when it
/// is not, a `blink` request is [`ParseMiss::Unsupported`].
pub fn parse(raw: &[u8], blink_enabled: bool) -> Request {
    let line = match RequestLine::split(raw) {
        Ok(line) => line,
        Err(miss) => return Request::Unrecognized(miss),
    };
    if line.method != "GET" {
        return Request::Unrecognized(ParseMiss::Method);
    }
    match line.selector() {
        Some(Command::LedBlink) if !blink_enabled => {
            Request::Unrecognized(ParseMiss::Unsupported(Command::LedBlink))
        }
        Some(cmd) => Request::Command(cmd),
        None if line.path == "/" => Request::Status,
        None => Request::Unrecognized(ParseMiss::NoSelector),
    }
}
