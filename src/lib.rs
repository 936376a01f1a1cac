//! # slirc-client
//!
//! A client-side IRC protocol engine: it frames and parses the wire
//! protocol, tracks server capabilities and channel state, and turns server
//! traffic into typed events while handling registration, keep-alive,
//! reconnects and outbound pacing.
//!
//! ## Features
//!
//! - Line parsing with numeric normalization (`001` → `rpl_welcome`)
//! - ISUPPORT-driven channel mode tracking and case-insensitive channel state
//! - WHOIS/WHO, LIST, NAMES and MOTD accumulation
//! - CTCP framing, SASL PLAIN and WEBIRC
//! - Protocol-safe splitting of long messages, optional flood protection
//! - Optional Tokio client with TLS (rustls) and automatic reconnects
//!
//! ## Parsing
//!
//! ```rust
//! use slirc_client::{CommandType, Message, Response};
//!
//! let msg: Message = ":irc.example.net 001 bot :Welcome bot!u@h".parse().unwrap();
//! assert_eq!(msg.command, "rpl_welcome");
//! assert_eq!(msg.command_type, CommandType::Reply);
//! assert_eq!(msg.response(), Some(Response::RPL_WELCOME));
//! ```
//!
//! ## Driving the protocol without I/O
//!
//! [`client::ClientState`] is sans-IO: feed it messages, execute the
//! returned [`client::Action`]s. The Tokio [`Client`] does exactly that over
//! a socket.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod casemap;
pub mod colors;
pub mod config;
pub mod ctcp;
pub mod encode;
pub mod error;
pub mod event;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod queue;
pub mod response;
pub mod sasl;
pub mod split;
pub mod state;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
pub mod line;
#[cfg(feature = "tokio")]
pub mod ping;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping};
pub use self::colors::FormattedStringExt;
pub use self::config::{ClientOptions, WebIrc};
pub use self::ctcp::CtcpType;
pub use self::encode::{IrcEncode, OutboundCommand};
pub use self::error::{ClientError, MessageParseError, ProtocolError};
pub use self::event::{Event, EventBus, EventKind, SubscriptionId};
pub use self::isupport::ServerCapabilities;
pub use self::message::Message;
pub use self::response::{CommandType, Response};
pub use self::state::{ChannelListEntry, ChannelState, WhoisRecord};

#[cfg(feature = "tokio")]
pub use self::client::{Action, Client, ClientState};
#[cfg(feature = "tokio")]
pub use self::error::TransportError;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
#[cfg(feature = "tokio")]
pub use self::transport::{Transport, TrustPolicy};
