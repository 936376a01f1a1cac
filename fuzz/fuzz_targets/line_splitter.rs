//! Fuzz target for outbound message splitting
//!
//! Every chunk must fit the limit and contain no line breaks.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::split::split_message;
use std::str;

fuzz_target!(|data: &[u8]| {
    let Some((&limit, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = str::from_utf8(rest) else {
        return;
    };
    let limit = usize::from(limit).max(1);

    for chunk in split_message(text, limit) {
        assert!(chunk.chars().count() <= limit);
        assert!(!chunk.contains(['\r', '\n']));
    }
});
