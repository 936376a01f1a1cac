//! Client configuration.
//!
//! [`ClientOptions`] is a plain snapshot handed to the client at
//! construction. With the `serde` feature it can be loaded from TOML; every
//! field is optional there and falls back to [`Default`].
//!
//! ```toml
//! server = "irc.libera.chat"
//! port = 6697
//! secure = true
//! nick = "slircbot"
//! channels = ["#rust", "#secret hunter2"]
//! retry_count = 5
//! flood_protection = true
//! ```

use std::time::Duration;

use crate::error::ClientError;

/// WEBIRC gateway credentials. Sent only when all three are set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WebIrc {
    pub pass: Option<String>,
    pub ip: Option<String>,
    pub host: Option<String>,
}

impl WebIrc {
    /// `(pass, ip, host)` when every field is present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }
        Some((
            non_empty(&self.pass)?,
            non_empty(&self.ip)?,
            non_empty(&self.host)?,
        ))
    }
}

/// Everything a client needs to connect and behave.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientOptions {
    pub server: String,
    pub port: u16,
    pub nick: String,
    /// Server password (PASS), or the SASL password when `sasl` is set.
    pub password: Option<String>,
    pub user_name: String,
    pub real_name: String,

    /// Connect over TLS.
    pub secure: bool,
    /// Accept certificates that fail only because their issuer is unknown.
    pub self_signed: bool,
    /// Accept certificates that fail only because they expired.
    pub cert_expired: bool,

    /// Connect as soon as the client is built.
    pub auto_connect: bool,
    /// Rejoin a channel right after being kicked from it.
    pub auto_rejoin: bool,
    /// Channels joined after the MOTD, each optionally followed by a key.
    pub channels: Vec<String>,
    /// Reconnect attempts before giving up; `None` retries forever.
    pub retry_count: Option<u32>,
    pub retry_delay_ms: u64,

    /// Pace outbound lines through a queue.
    pub flood_protection: bool,
    pub flood_protection_delay_ms: u64,

    /// Channel type characters assumed until the server sends CHANTYPES.
    pub channel_prefixes: String,
    /// Upper bound on the text of one outbound PRIVMSG/NOTICE chunk.
    pub message_split: usize,
    /// Strip colour and style codes from inbound lines before parsing.
    pub strip_colors: bool,
    /// Text encoding label for the wire (`utf-8`, `iso-8859-1`, ...).
    pub encoding: String,

    /// Authenticate with SASL PLAIN using `nick`, `user_name` and `password`.
    pub sasl: bool,
    pub webirc: WebIrc,

    /// Silence before a keep-alive PING is sent.
    pub ping_idle_ms: u64,
    /// Wait for any reply to that PING before the connection is dropped.
    pub ping_timeout_ms: u64,

    /// Log raw traffic and unhandled commands at debug level.
    pub debug: bool,
    /// Log server error replies at warn level.
    pub show_errors: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            server: String::new(),
            port: 6667,
            nick: String::new(),
            password: None,
            user_name: "slircbot".to_owned(),
            real_name: "slirc IRC client".to_owned(),
            secure: false,
            self_signed: false,
            cert_expired: false,
            auto_connect: false,
            auto_rejoin: false,
            channels: Vec::new(),
            retry_count: None,
            retry_delay_ms: 2000,
            flood_protection: false,
            flood_protection_delay_ms: 1000,
            channel_prefixes: "&#".to_owned(),
            message_split: 512,
            strip_colors: false,
            encoding: "utf-8".to_owned(),
            sasl: false,
            webirc: WebIrc::default(),
            ping_idle_ms: 15_000,
            ping_timeout_ms: 8_000,
            debug: false,
            show_errors: false,
        }
    }
}

impl ClientOptions {
    /// Defaults for `server` and `nick`.
    pub fn new(server: impl Into<String>, nick: impl Into<String>) -> Self {
        ClientOptions {
            server: server.into(),
            nick: nick.into(),
            ..Default::default()
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn flood_protection_delay(&self) -> Duration {
        Duration::from_millis(self.flood_protection_delay_ms)
    }

    pub fn ping_idle(&self) -> Duration {
        Duration::from_millis(self.ping_idle_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    /// Check the fields a connection cannot work without.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.server.is_empty() {
            return Err(ClientError::Config("server must not be empty".into()));
        }
        if self.nick.is_empty() || self.nick.contains(char::is_whitespace) {
            return Err(ClientError::Config(format!("invalid nick {:?}", self.nick)));
        }
        if self.message_split == 0 {
            return Err(ClientError::Config("message_split must be positive".into()));
        }
        #[cfg(feature = "tokio")]
        {
            if encoding::Encoding::for_label(self.encoding.as_bytes()).is_none() {
                return Err(ClientError::Config(format!(
                    "unknown encoding {:?}",
                    self.encoding
                )));
            }
        }
        Ok(())
    }

    /// Parse options from a TOML document.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ClientError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml_str(&content)
    }
}
