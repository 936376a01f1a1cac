//! Session state tracked by the dispatcher.
//!
//! - [`ChannelRegistry`] / [`ChannelState`]: joined channels, keyed
//!   case-insensitively, dropped at every (re)connect.
//! - [`WhoisBuffer`] / [`WhoisRecord`]: WHOIS replies accumulated until
//!   their terminator.
//! - [`ChannelListEntry`]: one line of a LIST reply.

mod channel;
mod whois;

pub use self::channel::{ChannelId, ChannelRegistry, ChannelState};
pub use self::whois::{WhoisBuffer, WhoisRecord};

/// One `RPL_LIST` entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelListEntry {
    pub name: String,
    pub users: String,
    pub topic: String,
}
