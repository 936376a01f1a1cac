//! Client-To-Client Protocol framing.
//!
//! CTCP payloads ride inside PRIVMSG/NOTICE text, delimited by `\x01`.

/// CTCP delimiter byte.
pub const DELIMITER: char = '\x01';

/// Whether a CTCP payload arrived in a PRIVMSG or a NOTICE.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CtcpType {
    /// Request, carried by PRIVMSG.
    Privmsg,
    /// Reply, carried by NOTICE.
    Notice,
}

impl CtcpType {
    /// The IRC command carrying this kind of CTCP.
    pub fn command(self) -> &'static str {
        match self {
            CtcpType::Privmsg => "PRIVMSG",
            CtcpType::Notice => "NOTICE",
        }
    }
}

/// Extract the inner text of a CTCP-framed message.
///
/// The text must start with the delimiter and contain a second one; the
/// payload runs up to that second delimiter.
pub fn extract(text: &str) -> Option<&str> {
    let inner = text.strip_prefix(DELIMITER)?;
    let end = inner.find(DELIMITER)?;
    Some(&inner[..end])
}

/// Frame `text` as a CTCP payload.
pub fn frame(text: &str) -> String {
    format!("{DELIMITER}{text}{DELIMITER}")
}

/// Split a CTCP payload into its verb and the remaining argument text.
pub fn split_verb(payload: &str) -> (&str, &str) {
    match payload.split_once(' ') {
        Some((verb, rest)) => (verb, rest),
        None => (payload, ""),
    }
}
