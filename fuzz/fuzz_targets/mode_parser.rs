//! Fuzz target for channel MODE parsing and state updates

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::mode::parse_channel_modes;
use slirc_client::{ChannelState, ServerCapabilities};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    let mut caps = ServerCapabilities::default();
    caps.apply_token("CHANMODES", "beI,k,l,imnpst");
    caps.apply_token("PREFIX", "(qaohv)~&@%+");

    let pieces: Vec<&str> = input.split(' ').collect();
    let mut channel = ChannelState::new("#fuzz");
    channel.users.insert("alice".to_owned(), String::new());
    for change in parse_channel_modes(&caps, &pieces) {
        channel.apply_mode(&change, &caps);
    }
});
