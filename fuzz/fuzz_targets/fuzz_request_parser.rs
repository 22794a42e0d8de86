//! Fuzz target: `server::request::parse`
//!
//! Drives arbitrary bytes through the request-line parser and checks that a
//! recognised command always has its exact selector in the query string.
//!
//! cargo fuzz run fuzz_request_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinchlink::server::request::{RequestLine, Request, parse};

fuzz_target!(|data: &[u8]| {
    for blink in [true, false] {
        if let Request::Command(cmd) = parse(data, blink) {
            let line = RequestLine::split(data).expect("command implies a well-formed line");
            assert_eq!(line.method, "GET");
            assert!(
                line.pairs().any(|(_, v)| v == cmd.selector()),
                "selector must appear verbatim"
            );
        }
    }
});
