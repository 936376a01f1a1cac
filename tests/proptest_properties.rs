//! Property-based tests for line parsing and message splitting.
//!
//! Uses proptest to generate random IRC components and verify that:
//! 1. Parsing never panics on arbitrary input
//! 2. Encoded outbound commands parse back to the same arguments
//! 3. Split chunks respect the length limit and lose only whitespace

use proptest::prelude::*;
use slirc_client::split::{split_long_line, split_message};
use slirc_client::{Message, OutboundCommand};

// =============================================================================
// STRATEGIES
// =============================================================================

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("~?[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Message text without CR, LF or NUL.
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{1,400}").expect("valid regex")
}

fn non_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

// =============================================================================
// PARSER
// =============================================================================

proptest! {
    #[test]
    fn parse_never_panics(line in "[^\r\n]{0,600}") {
        let _ = line.parse::<Message>();
        let _ = Message::parse(&line, true);
    }

    #[test]
    fn user_prefix_is_split(
        nick in nickname_strategy(),
        user in username_strategy(),
        host in hostname_strategy(),
        channel in channel_strategy(),
        text in message_text_strategy(),
    ) {
        let line = format!(":{}!{}@{} PRIVMSG {} :{}", nick, user, host, channel, text);
        let msg: Message = line.parse().unwrap();
        prop_assert_eq!(msg.nick.as_deref(), Some(nick.as_str()));
        prop_assert_eq!(msg.user.as_deref(), Some(user.as_str()));
        prop_assert_eq!(msg.host.as_deref(), Some(host.as_str()));
        prop_assert_eq!(msg.server, None);
        prop_assert_eq!(msg.args, vec![channel, text]);
    }

    #[test]
    fn encoded_command_parses_back(
        channel in channel_strategy(),
        text in message_text_strategy(),
    ) {
        let line = OutboundCommand::new("PRIVMSG", [channel.as_str(), text.as_str()]).to_line();
        let msg: Message = line.parse().unwrap();
        prop_assert_eq!(msg.command, "PRIVMSG");
        prop_assert_eq!(msg.args, vec![channel, text]);
    }

    #[test]
    fn numerics_keep_raw_command(code in 1u16..1000) {
        let line = format!(":srv {:03} bot :text", code);
        let msg: Message = line.parse().unwrap();
        prop_assert_eq!(msg.raw_command, format!("{:03}", code));
    }
}

// =============================================================================
// SPLITTER
// =============================================================================

proptest! {
    #[test]
    fn chunks_fit_limit(text in message_text_strategy(), limit in 1usize..120) {
        for chunk in split_long_line(&text, limit) {
            prop_assert!(chunk.chars().count() <= limit);
        }
    }

    #[test]
    fn chunks_lose_only_whitespace(text in message_text_strategy(), limit in 1usize..120) {
        let chunks = split_long_line(&text, limit);
        let joined: String = chunks.concat();
        prop_assert_eq!(non_whitespace(&joined), non_whitespace(&text));
    }

    #[test]
    fn short_lines_are_untouched(text in message_text_strategy()) {
        let limit = text.chars().count();
        prop_assert_eq!(split_long_line(&text, limit), vec![text]);
    }

    #[test]
    fn split_message_never_yields_newlines(
        lines in prop::collection::vec("[a-z ]{0,50}", 0..6),
        limit in 1usize..40,
    ) {
        let text = lines.join("\r\n");
        for chunk in split_message(&text, limit) {
            prop_assert!(!chunk.contains('\n') && !chunk.contains('\r'));
            prop_assert!(!chunk.is_empty());
        }
    }
}
