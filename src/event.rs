//! Semantic events and the subscriber table.
//!
//! The dispatcher is the only publisher. Subscribers register for an
//! [`EventKind`], optionally narrowed to one channel name; channel-scoped
//! events are delivered to generic subscribers, to subscribers of the exact
//! channel name, and to subscribers of the lower-cased name when it differs.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use slirc_client::event::{Event, EventBus, EventKind};
//!
//! let bus = EventBus::new();
//! let joins = Arc::new(AtomicUsize::new(0));
//! let seen = joins.clone();
//! bus.on_channel(EventKind::Join, "#rust", move |_| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.emit(&Event::Join { channel: "#Rust".into(), nick: "alice".into() });
//! assert_eq!(joins.load(Ordering::SeqCst), 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ctcp::CtcpType;
use crate::message::Message;
use crate::state::{ChannelListEntry, WhoisRecord};

/// Everything the client reports to its caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// The socket is open and registration was sent.
    Connect,
    /// The server accepted registration (`RPL_WELCOME`).
    Registered { message: Message },
    /// Every parsed inbound line, before dispatch.
    Raw(Message),
    /// Server PING; the PONG has already been queued.
    Ping { server: String },
    /// Server PONG.
    Pong { server: String },
    /// Complete message of the day.
    Motd(String),
    /// Channel names list is complete.
    Names {
        channel: String,
        users: HashMap<String, String>,
    },
    /// Topic changed or reported.
    Topic {
        channel: String,
        topic: String,
        nick: String,
    },
    Join { channel: String, nick: String },
    Part {
        channel: String,
        nick: String,
        reason: Option<String>,
    },
    Kick {
        channel: String,
        nick: String,
        by: Option<String>,
        reason: Option<String>,
    },
    Quit {
        nick: String,
        reason: Option<String>,
        channels: Vec<String>,
    },
    Kill {
        nick: String,
        reason: Option<String>,
        channels: Vec<String>,
    },
    Nick {
        old: String,
        new: String,
        channels: Vec<String>,
    },
    /// Any non-CTCP PRIVMSG.
    Message {
        from: Option<String>,
        to: String,
        text: String,
    },
    /// A PRIVMSG to a channel.
    ChannelMessage {
        from: Option<String>,
        channel: String,
        text: String,
    },
    /// A PRIVMSG addressed to our nick.
    Pm { from: Option<String>, text: String },
    /// Any non-CTCP NOTICE.
    Notice {
        from: Option<String>,
        to: String,
        text: String,
    },
    /// Any CTCP payload.
    Ctcp {
        from: Option<String>,
        to: String,
        text: String,
        kind: CtcpType,
    },
    /// A CTCP carried by PRIVMSG.
    CtcpPrivmsg {
        from: Option<String>,
        to: String,
        text: String,
    },
    /// A CTCP carried by NOTICE.
    CtcpNotice {
        from: Option<String>,
        to: String,
        text: String,
    },
    /// A CTCP VERSION request.
    CtcpVersion { from: Option<String>, to: String },
    /// A CTCP ACTION (`/me`).
    Action {
        from: Option<String>,
        to: String,
        text: String,
    },
    Invite { channel: String, from: Option<String> },
    /// One `+` letter of a channel MODE.
    ModeAdded {
        channel: String,
        by: Option<String>,
        mode: char,
        arg: Option<String>,
    },
    /// One `-` letter of a channel MODE.
    ModeRemoved {
        channel: String,
        by: Option<String>,
        mode: char,
        arg: Option<String>,
    },
    Whois(WhoisRecord),
    ChannelListStart,
    ChannelListItem(ChannelListEntry),
    ChannelList(Vec<ChannelListEntry>),
    /// `RPL_YOUREOPER`.
    Opered,
    /// Local echo of a PRIVMSG chunk we sent.
    SelfMessage { to: String, text: String },
    /// A server error reply.
    Error(Message),
    /// A transport failure; reconnect policy applies.
    NetError(String),
    /// Reconnect attempts reached the configured cap.
    Abort { retry_count: u32 },
}

/// Fieldless tag of an [`Event`], used as the subscription key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    Connect,
    Registered,
    Raw,
    Ping,
    Pong,
    Motd,
    Names,
    Topic,
    Join,
    Part,
    Kick,
    Quit,
    Kill,
    Nick,
    Message,
    ChannelMessage,
    Pm,
    Notice,
    Ctcp,
    CtcpPrivmsg,
    CtcpNotice,
    CtcpVersion,
    Action,
    Invite,
    ModeAdded,
    ModeRemoved,
    Whois,
    ChannelListStart,
    ChannelListItem,
    ChannelList,
    Opered,
    SelfMessage,
    Error,
    NetError,
    Abort,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connect => EventKind::Connect,
            Event::Registered { .. } => EventKind::Registered,
            Event::Raw(_) => EventKind::Raw,
            Event::Ping { .. } => EventKind::Ping,
            Event::Pong { .. } => EventKind::Pong,
            Event::Motd(_) => EventKind::Motd,
            Event::Names { .. } => EventKind::Names,
            Event::Topic { .. } => EventKind::Topic,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Kick { .. } => EventKind::Kick,
            Event::Quit { .. } => EventKind::Quit,
            Event::Kill { .. } => EventKind::Kill,
            Event::Nick { .. } => EventKind::Nick,
            Event::Message { .. } => EventKind::Message,
            Event::ChannelMessage { .. } => EventKind::ChannelMessage,
            Event::Pm { .. } => EventKind::Pm,
            Event::Notice { .. } => EventKind::Notice,
            Event::Ctcp { .. } => EventKind::Ctcp,
            Event::CtcpPrivmsg { .. } => EventKind::CtcpPrivmsg,
            Event::CtcpNotice { .. } => EventKind::CtcpNotice,
            Event::CtcpVersion { .. } => EventKind::CtcpVersion,
            Event::Action { .. } => EventKind::Action,
            Event::Invite { .. } => EventKind::Invite,
            Event::ModeAdded { .. } => EventKind::ModeAdded,
            Event::ModeRemoved { .. } => EventKind::ModeRemoved,
            Event::Whois(_) => EventKind::Whois,
            Event::ChannelListStart => EventKind::ChannelListStart,
            Event::ChannelListItem(_) => EventKind::ChannelListItem,
            Event::ChannelList(_) => EventKind::ChannelList,
            Event::Opered => EventKind::Opered,
            Event::SelfMessage { .. } => EventKind::SelfMessage,
            Event::Error(_) => EventKind::Error,
            Event::NetError(_) => EventKind::NetError,
            Event::Abort { .. } => EventKind::Abort,
        }
    }

    /// The channel a channel-scoped event belongs to.
    ///
    /// Only join, part, kick, channel message and names events are scoped.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Event::Join { channel, .. }
            | Event::Part { channel, .. }
            | Event::Kick { channel, .. }
            | Event::ChannelMessage { channel, .. }
            | Event::Names { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

/// Shared subscriber callback.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

type Filter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Handle returned by every subscription, accepted by [`EventBus::off`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    handler: Handler,
    filter: Option<Filter>,
    once: bool,
}

type Key = (EventKind, Option<String>);

#[derive(Default)]
struct BusInner {
    next_id: u64,
    table: HashMap<Key, Vec<Subscription>>,
}

/// Typed dispatch table from `(kind, channel)` to subscribers.
///
/// Handlers run after the table lock is released, so they may subscribe,
/// unsubscribe, or call back into the client.
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EventBus")
            .field("keys", &inner.table.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, key: Key, handler: Handler, filter: Option<Filter>, once: bool) -> SubscriptionId {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.table.entry(key).or_default().push(Subscription {
            id,
            handler,
            filter,
            once,
        });
        id
    }

    /// Subscribe to every event of `kind`.
    pub fn on<F>(&self, kind: EventKind, f: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert((kind, None), Arc::new(f), None, false)
    }

    /// Subscribe to events of `kind` for one channel name, matched exactly.
    pub fn on_channel<F>(&self, kind: EventKind, channel: &str, f: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert((kind, Some(channel.to_owned())), Arc::new(f), None, false)
    }

    /// Subscribe for the first matching delivery only.
    pub fn once<F>(&self, kind: EventKind, channel: Option<&str>, f: F) -> SubscriptionId
    where
        F: FnOnce(&Event) + Send + 'static,
    {
        self.once_where(kind, channel, |_| true, f)
    }

    /// Subscribe for the first delivery that passes `filter`.
    pub fn once_where<P, F>(&self, kind: EventKind, channel: Option<&str>, filter: P, f: F) -> SubscriptionId
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
        F: FnOnce(&Event) + Send + 'static,
    {
        let slot = Mutex::new(Some(f));
        let handler: Handler = Arc::new(move |event: &Event| {
            if let Some(f) = slot.lock().take() {
                f(event);
            }
        });
        self.insert(
            (kind, channel.map(str::to_owned)),
            handler,
            Some(Arc::new(filter)),
            true,
        )
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let mut removed = false;
        inner.table.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|s| s.id != id);
            removed |= subs.len() != before;
            !subs.is_empty()
        });
        removed
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.inner.lock().table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every matching subscriber, in subscription order
    /// within each key: generic first, then exact channel, then lower-cased.
    pub fn emit(&self, event: &Event) {
        let kind = event.kind();
        let mut keys: Vec<Key> = vec![(kind, None)];
        if let Some(channel) = event.channel() {
            keys.push((kind, Some(channel.to_owned())));
            let lower = channel.to_ascii_lowercase();
            if lower != channel {
                keys.push((kind, Some(lower)));
            }
        }

        let handlers: Vec<Handler> = {
            let mut inner = self.inner.lock();
            let mut handlers = Vec::new();
            for key in &keys {
                let Some(subs) = inner.table.get_mut(key) else {
                    continue;
                };
                subs.retain(|sub| {
                    let matched = sub.filter.as_ref().map_or(true, |f| f(event));
                    if matched {
                        handlers.push(sub.handler.clone());
                    }
                    !(matched && sub.once)
                });
                if subs.is_empty() {
                    inner.table.remove(key);
                }
            }
            handlers
        };

        for handler in handlers {
            handler(event);
        }
    }
}
