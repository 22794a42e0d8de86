//! Fuzz target: `client::source::parse_frame`
//!
//! Arbitrary text from the perception pipeline must never panic and never
//! produce a frame with more points than the hand model has.
//!
//! cargo fuzz run fuzz_landmark_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinchlink::client::source::parse_frame;
use pinchlink::gesture::landmarks::HAND_LANDMARKS;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(Some(frame)) = parse_frame(text) {
        assert!(frame.len() <= HAND_LANDMARKS);
    }
});
