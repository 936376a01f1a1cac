//! Fuzz target for IRC line parsing
//!
//! Feeds arbitrary lines to the parser, with and without colour stripping,
//! and through the sans-IO dispatcher.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::client::ClientState;
use slirc_client::{ClientOptions, Message};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.is_empty() || input.len() > 512 {
        return;
    }

    let _ = Message::parse(input, true);
    if let Ok(msg) = input.parse::<Message>() {
        let mut state = ClientState::new(ClientOptions::new("irc.example.net", "fuzz"));
        let _ = state.handle(&msg);
    }
});
