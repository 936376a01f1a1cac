//! Numeric conversion and classification for [`Response`].

use std::fmt;
use std::str::FromStr;

use super::{CommandType, Response};

impl Response {
    /// The numeric code.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether the server reports a failure with this numeric.
    ///
    /// Covers the 4xx/5xx block plus the SASL failure numerics above 900.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.code(), 400..=599 | 902 | 904..=907)
    }

    /// Classification stored on [`Message::command_type`](crate::Message::command_type).
    #[inline]
    pub fn command_type(&self) -> CommandType {
        if self.is_error() {
            CommandType::Error
        } else {
            CommandType::Reply
        }
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    /// Parse a three-digit numeric token such as `"001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseResponseError::InvalidFormat);
        }
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// A token that is not a known three-digit numeric.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseResponseError {
    #[error("invalid response code format")]
    InvalidFormat,
    #[error("unknown response code: {0}")]
    UnknownCode(u16),
}
