//! Parsed IRC messages.
//!
//! A [`Message`] is produced once per framed line and is immutable after
//! parsing. Numeric commands are normalized through the
//! [`response`](crate::response) table: `001` becomes `rpl_welcome` with
//! [`CommandType::Reply`], while named and unknown commands are kept as-is
//! with [`CommandType::Normal`].
//!
//! ```
//! use slirc_client::{CommandType, Message};
//!
//! let msg: Message = ":nick!user@host PRIVMSG #rust :hello there".parse().unwrap();
//! assert_eq!(msg.nick.as_deref(), Some("nick"));
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.command_type, CommandType::Normal);
//! assert_eq!(msg.args, vec!["#rust", "hello there"]);
//! ```

mod parse;

use std::str::FromStr;

use crate::colors::FormattedStringExt;
use crate::error::MessageParseError;
use crate::response::{self, CommandType, Response};

/// A single parsed IRC line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// The full prefix without the leading `:`.
    pub prefix: Option<String>,
    /// Nickname, when the prefix is a user mask.
    pub nick: Option<String>,
    /// Username, when the prefix is a full `nick!user@host` mask.
    pub user: Option<String>,
    /// Hostname, when the prefix is a full `nick!user@host` mask.
    pub host: Option<String>,
    /// Server name, when the prefix is not a user mask.
    pub server: Option<String>,
    /// Symbolic command name (`rpl_welcome`) or the raw command (`PRIVMSG`).
    pub command: String,
    /// The command token as it appeared on the wire.
    pub raw_command: String,
    /// Classification from the numeric table.
    pub command_type: CommandType,
    /// Middle parameters followed by the trailing parameter, if any.
    pub args: Vec<String>,
}

impl Message {
    /// Parse a raw line, optionally stripping colour and style codes first.
    pub fn parse(line: &str, strip_colors: bool) -> Result<Message, MessageParseError> {
        if strip_colors {
            let stripped = line.strip_formatting();
            Self::parse_plain(&stripped)
        } else {
            Self::parse_plain(line)
        }
    }

    fn parse_plain(line: &str) -> Result<Message, MessageParseError> {
        let parts = parse::split_line(line)?;

        let mut msg = Message {
            prefix: parts.prefix.map(str::to_owned),
            nick: None,
            user: None,
            host: None,
            server: None,
            command: parts.command.to_owned(),
            raw_command: parts.command.to_owned(),
            command_type: CommandType::Normal,
            args: parts.params.into_iter().map(str::to_owned).collect(),
        };

        if let Some(prefix) = parts.prefix {
            match parse::split_user_prefix(prefix) {
                Some((nick, mask)) => {
                    msg.nick = Some(nick.to_owned());
                    if let Some((user, host)) = mask {
                        msg.user = Some(user.to_owned());
                        msg.host = Some(host.to_owned());
                    }
                }
                None => msg.server = Some(prefix.to_owned()),
            }
        }

        if let Some((response, command_type)) = response::lookup(parts.command) {
            msg.command = response.name().to_owned();
            msg.command_type = command_type;
        }

        Ok(msg)
    }

    /// The numeric response, if this message carries a known one.
    pub fn response(&self) -> Option<Response> {
        self.raw_command.parse().ok()
    }

    /// The source of the message: the nick if present, otherwise the server.
    pub fn source(&self) -> Option<&str> {
        self.nick.as_deref().or(self.server.as_deref())
    }

    /// Argument at `index`, or the empty string.
    pub fn arg(&self, index: usize) -> &str {
        self.args.get(index).map(String::as_str).unwrap_or("")
    }

    /// The last argument, conventionally the trailing text.
    pub fn trailing(&self) -> &str {
        self.args.last().map(String::as_str).unwrap_or("")
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s, false)
    }
}
