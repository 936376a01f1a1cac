//! The caller-facing client handle.
//!
//! [`Client`] is cheap to clone. Commands are computed against the shared
//! protocol state and handed to the connection task over a control channel;
//! events come back through the [`EventBus`].
//!
//! ```no_run
//! use slirc_client::{Client, ClientOptions, Event, EventKind};
//!
//! # async fn demo() -> Result<(), slirc_client::ClientError> {
//! let mut options = ClientOptions::new("irc.libera.chat", "slircbot");
//! options.channels = vec!["#slirc".into()];
//!
//! let client = Client::new(options)?;
//! let replier = client.clone();
//! client.on(EventKind::ChannelMessage, move |event| {
//!     if let Event::ChannelMessage { channel, text, .. } = event {
//!         if text == "!ping" {
//!             replier.say(channel, "pong");
//!         }
//!     }
//! });
//!
//! let task = client.connect()?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

mod connection;
mod dispatch;

pub use self::dispatch::{Action, ClientState};

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ClientOptions;
use crate::ctcp::CtcpType;
use crate::encode::OutboundCommand;
use crate::error::ClientError;
use crate::event::{Event, EventBus, EventKind, SubscriptionId};
use crate::isupport::ServerCapabilities;
use crate::state::{ChannelState, WhoisRecord};

use self::connection::Control;

pub(crate) struct Shared {
    pub(crate) state: Mutex<ClientState>,
    pub(crate) bus: EventBus,
    pub(crate) generation: AtomicU64,
    control: Mutex<Option<mpsc::UnboundedSender<Control>>>,
}

/// Handle to one IRC client.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("nick", &self.nick())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Client {
    /// Build a client. With `auto_connect` set the connection task is
    /// spawned right away, which requires a running tokio runtime.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        options.validate()?;
        let auto_connect = options.auto_connect;
        let client = Client {
            shared: Arc::new(Shared {
                state: Mutex::new(ClientState::new(options)),
                bus: EventBus::new(),
                generation: AtomicU64::new(0),
                control: Mutex::new(None),
            }),
        };
        if auto_connect {
            client.connect()?;
        }
        Ok(client)
    }

    /// Spawn the connection task.
    ///
    /// The task reconnects on its own until [`disconnect`](Self::disconnect)
    /// is called or the retry cap is reached; its result reports parse
    /// failures and untrusted certificates.
    pub fn connect(&self) -> Result<JoinHandle<Result<(), ClientError>>, ClientError> {
        let mut control = self.shared.control.lock();
        if control.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(ClientError::AlreadyConnected);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *control = Some(tx);
        Ok(tokio::spawn(connection::run(self.shared.clone(), rx)))
    }

    /// Whether a connection task is alive.
    pub fn is_running(&self) -> bool {
        self.shared
            .control
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    fn control(&self, cmd: Control) -> Result<(), Control> {
        match self.shared.control.lock().as_ref() {
            Some(tx) => tx.send(cmd).map_err(|e| e.0),
            None => Err(cmd),
        }
    }

    fn run(&self, actions: Vec<Action>) {
        if actions.is_empty() {
            return;
        }
        if let Err(cmd) = self.control(Control::Actions(actions)) {
            debug!(?cmd, "not connected, dropping outbound lines");
        }
    }

    /// Send QUIT with `message` and stop reconnecting.
    ///
    /// The receiver resolves once the socket is closed, or right away when
    /// nothing is running.
    pub fn disconnect(&self, message: &str) -> oneshot::Receiver<()> {
        let (done, rx) = oneshot::channel();
        let cmd = Control::Disconnect {
            message: message.to_owned(),
            done,
        };
        if let Err(Control::Disconnect { done, .. }) = self.control(cmd) {
            let _ = done.send(());
        }
        rx
    }

    /// Drop the socket without QUIT. The reconnect policy applies.
    pub fn end(&self) {
        let _ = self.control(Control::End);
    }

    /// Send a raw command.
    pub fn send<C, I, S>(&self, command: C, args: I)
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(vec![Action::Send(OutboundCommand::new(command, args))]);
    }

    /// JOIN `channel` (`"#chan"` or `"#chan key"`).
    pub fn join(&self, channel: &str) {
        self.join_with(channel, |_| {});
    }

    /// JOIN `channel` and call `f` on our first join event for it.
    ///
    /// The channel is added to the auto-join list once joined.
    pub fn join_with<F>(&self, channel: &str, f: F)
    where
        F: FnOnce(&Event) + Send + 'static,
    {
        let args: Vec<String> = channel.split_whitespace().map(str::to_owned).collect();
        let Some(name) = args.first().cloned() else {
            return;
        };
        let entry = args.join(" ");
        let weak = Arc::downgrade(&self.shared);
        let filter = self.channel_filter(&name);
        self.shared
            .bus
            .once_where(EventKind::Join, None, filter, move |event| {
                if let Some(shared) = Weak::upgrade(&weak) {
                    shared.state.lock().remember_channel(&entry);
                }
                f(event);
            });
        self.run(vec![Action::Send(OutboundCommand::new("JOIN", args))]);
    }

    /// PART `channel`.
    pub fn part(&self, channel: &str, message: Option<&str>) {
        self.part_with(channel, message, |_| {});
    }

    /// PART `channel` and call `f` on the first part event for it.
    pub fn part_with<F>(&self, channel: &str, message: Option<&str>, f: F)
    where
        F: FnOnce(&Event) + Send + 'static,
    {
        self.shared.state.lock().forget_channel(channel);
        let filter = self.channel_filter(channel);
        self.shared.bus.once_where(EventKind::Part, None, filter, f);

        let mut args = vec![channel.to_owned()];
        args.extend(message.map(str::to_owned));
        self.run(vec![Action::Send(OutboundCommand::new("PART", args))]);
    }

    fn channel_filter(&self, name: &str) -> impl Fn(&Event) -> bool + Send + Sync + 'static {
        let name = name.to_owned();
        let weak = Arc::downgrade(&self.shared);
        move |event: &Event| {
            let casemap = Weak::upgrade(&weak)
                .map(|shared| shared.state.lock().capabilities().casemapping)
                .unwrap_or_default();
            event
                .channel()
                .is_some_and(|c| casemap.eq_ignore_case(c, &name))
        }
    }

    /// PRIVMSG `text` to `target`, split as needed.
    pub fn say(&self, target: &str, text: &str) {
        let actions = self.shared.state.lock().speak(CtcpType::Privmsg, target, text);
        self.run(actions);
    }

    /// NOTICE `text` to `target`, split as needed.
    pub fn notice(&self, target: &str, text: &str) {
        let actions = self.shared.state.lock().speak(CtcpType::Notice, target, text);
        self.run(actions);
    }

    /// CTCP ACTION (`/me`).
    pub fn action(&self, target: &str, text: &str) {
        let actions = self.shared.state.lock().action(target, text);
        self.run(actions);
    }

    /// CTCP request (`Privmsg`) or reply (`Notice`).
    pub fn ctcp(&self, target: &str, kind: CtcpType, text: &str) {
        let actions = self.shared.state.lock().ctcp(target, kind, text);
        self.run(actions);
    }

    /// WHOIS `nick`.
    pub fn whois(&self, nick: &str) {
        self.run(vec![Action::Send(OutboundCommand::new("WHOIS", [nick]))]);
    }

    /// WHOIS `nick` and call `f` with the completed record.
    pub fn whois_with<F>(&self, nick: &str, f: F)
    where
        F: FnOnce(&WhoisRecord) + Send + 'static,
    {
        let wanted = nick.to_owned();
        let weak = Arc::downgrade(&self.shared);
        self.shared.bus.once_where(
            EventKind::Whois,
            None,
            move |event| {
                let casemap = Weak::upgrade(&weak)
                    .map(|shared| shared.state.lock().capabilities().casemapping)
                    .unwrap_or_default();
                matches!(event, Event::Whois(record) if casemap.eq_ignore_case(&record.nick, &wanted))
            },
            move |event| {
                if let Event::Whois(record) = event {
                    f(record);
                }
            },
        );
        self.whois(nick);
    }

    /// LIST, optionally narrowed by arguments.
    pub fn list(&self, args: &[&str]) {
        self.run(vec![Action::Send(OutboundCommand::new(
            "LIST",
            args.iter().copied(),
        ))]);
    }

    /// The nick currently in use.
    pub fn nick(&self) -> String {
        self.shared.state.lock().nick().to_owned()
    }

    /// Our `user@host`, once the server reported it.
    pub fn host_mask(&self) -> String {
        self.shared.state.lock().host_mask().to_owned()
    }

    /// Snapshot of a joined channel.
    pub fn channel(&self, name: &str) -> Option<ChannelState> {
        self.shared.state.lock().channel(name).cloned()
    }

    /// Snapshot of the server's advertised capabilities.
    pub fn capabilities(&self) -> ServerCapabilities {
        self.shared.state.lock().capabilities().clone()
    }

    /// The subscriber table.
    pub fn events(&self) -> &EventBus {
        &self.shared.bus
    }

    /// Subscribe to every event of `kind`.
    pub fn on<F>(&self, kind: EventKind, f: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared.bus.on(kind, f)
    }
}
