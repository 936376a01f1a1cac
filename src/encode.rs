//! Outbound command encoding.
//!
//! Every line the client sends goes through [`OutboundCommand`]. The final
//! argument is colon-prefixed when it contains whitespace, starts with `:`,
//! or is empty; arguments are joined with single spaces and the line ends
//! with CRLF.
//!
//! # Example
//!
//! ```
//! use slirc_client::encode::{IrcEncode, OutboundCommand};
//!
//! let cmd = OutboundCommand::new("PRIVMSG", ["#channel", "Hello there!"]);
//! assert_eq!(cmd.to_bytes(), b"PRIVMSG #channel :Hello there!\r\n");
//! assert_eq!(cmd.to_string(), "PRIVMSG #channel :Hello there!");
//! ```

use std::fmt;
use std::io::{self, Write};

/// A trait for encoding IRC protocol elements directly to a byte stream.
pub trait IrcEncode {
    /// Encode this value to the given writer, CRLF included.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize>;

    /// Encode this value to a new `Vec<u8>`.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512); // IRC max line length
        let _ = self.encode(&mut buf);
        buf
    }
}

/// Check if a string needs colon-prefixing as a trailing IRC argument.
#[inline]
pub(crate) fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.starts_with(':') || s.chars().any(char::is_whitespace)
}

/// A command queued for transmission: a verb and its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundCommand {
    /// Command verb, e.g. `PRIVMSG`.
    pub command: String,
    /// Arguments in wire order; the last one may become the trailing argument.
    pub args: Vec<String>,
}

impl OutboundCommand {
    /// Build a command from a verb and any iterable of arguments.
    pub fn new<C, I, S>(command: C, args: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OutboundCommand {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The wire line without the CRLF terminator.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        if let Some((last, middle)) = self.args.split_last() {
            for arg in middle {
                write!(f, " {}", arg)?;
            }
            if needs_colon_prefix(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }
        Ok(())
    }
}

impl IrcEncode for OutboundCommand {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let line = self.to_string();
        w.write_all(line.as_bytes())?;
        w.write_all(b"\r\n")?;
        Ok(line.len() + 2)
    }
}
