//! Sans-IO protocol dispatcher.
//!
//! [`ClientState`] consumes parsed messages and produces [`Action`]s: lines
//! to send and events to publish, in the order they must happen. It performs
//! no I/O, so the connection task (or a test) decides when actions run.
//!
//! ```
//! use slirc_client::client::{Action, ClientState};
//! use slirc_client::{ClientOptions, Event, Message};
//!
//! let mut state = ClientState::new(ClientOptions::new("irc.example.net", "bot"));
//! let ping: Message = "PING :irc.example.net".parse().unwrap();
//! let actions = state.handle(&ping);
//!
//! assert!(matches!(&actions[0], Action::Send(cmd) if cmd.to_line() == "PONG irc.example.net"));
//! assert!(matches!(&actions[1], Action::Emit(Event::Ping { .. })));
//! ```

use tracing::{debug, warn};

use crate::casemap::CaseMapping;
use crate::config::ClientOptions;
use crate::ctcp::{self, CtcpType};
use crate::encode::OutboundCommand;
use crate::event::Event;
use crate::isupport::ServerCapabilities;
use crate::message::Message;
use crate::mode::parse_channel_modes;
use crate::response::{CommandType, Response};
use crate::sasl;
use crate::split;
use crate::state::{ChannelListEntry, ChannelRegistry, ChannelState, WhoisBuffer, WhoisRecord};

/// Something the connection must do after a message was dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Write a line to the server.
    Send(OutboundCommand),
    /// Publish an event to subscribers.
    Emit(Event),
}

fn send<C, I, S>(command: C, args: I) -> Action
where
    C: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Action::Send(OutboundCommand::new(command, args))
}

/// Split a configured channel entry (`"#chan key"`) into JOIN arguments.
fn join_args(entry: &str) -> Vec<String> {
    entry.split_whitespace().map(str::to_owned).collect()
}

/// Client-side protocol state for one client, across reconnects.
#[derive(Debug)]
pub struct ClientState {
    options: ClientOptions,
    nick: String,
    host_mask: String,
    max_line_length: usize,
    nick_mod: u32,
    capabilities: ServerCapabilities,
    channels: ChannelRegistry,
    whois: WhoisBuffer,
    channel_list: Vec<ChannelListEntry>,
    motd: String,
    /// Case-mapped nick of the WHOIS sent after welcome.
    self_whois: Option<String>,
}

impl ClientState {
    pub fn new(options: ClientOptions) -> Self {
        let capabilities = ServerCapabilities::new(&options.channel_prefixes);
        let nick = options.nick.clone();
        let mut state = ClientState {
            options,
            nick,
            host_mask: String::new(),
            max_line_length: 0,
            nick_mod: 0,
            capabilities,
            channels: ChannelRegistry::new(),
            whois: WhoisBuffer::default(),
            channel_list: Vec::new(),
            motd: String::new(),
            self_whois: None,
        };
        state.update_max_line_length();
        state
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The nick currently in use.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// `user@host` as the server sees us, once known.
    pub fn host_mask(&self) -> &str {
        &self.host_mask
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// State of a joined channel, looked up case-insensitively.
    pub fn channel(&self, name: &str) -> Option<&ChannelState> {
        self.channels.get(name)
    }

    /// Channels joined automatically after the MOTD.
    pub fn auto_join(&self) -> &[String] {
        &self.options.channels
    }

    fn casemapping(&self) -> CaseMapping {
        self.capabilities.casemapping
    }

    fn is_self(&self, nick: &str) -> bool {
        self.casemapping().eq_ignore_case(nick, &self.nick)
    }

    fn update_max_line_length(&mut self) {
        self.max_line_length = split::max_line_length(&self.nick, &self.host_mask);
    }

    /// Drop everything tied to the previous connection.
    pub fn reset(&mut self) {
        self.channels.clear();
        self.whois.clear();
        self.channel_list.clear();
        self.motd.clear();
        self.self_whois = None;
        self.nick_mod = 0;
    }

    /// Lines sent right after the socket opens.
    pub fn registration(&mut self) -> Vec<OutboundCommand> {
        let mut out = Vec::new();
        if let Some((pass, ip, host)) = self.options.webirc.credentials() {
            out.push(OutboundCommand::new(
                "WEBIRC",
                [pass, self.options.user_name.as_str(), host, ip],
            ));
        }
        if self.options.sasl {
            out.push(OutboundCommand::new("CAP", ["REQ", "sasl"]));
        } else if let Some(password) = self.options.password.as_deref() {
            out.push(OutboundCommand::new("PASS", [password]));
        }

        self.nick = self.options.nick.clone();
        self.update_max_line_length();
        out.push(OutboundCommand::new("NICK", [self.nick.as_str()]));
        out.push(OutboundCommand::new(
            "USER",
            [
                self.options.user_name.as_str(),
                "8",
                "*",
                self.options.real_name.as_str(),
            ],
        ));
        out
    }

    /// Add `entry` (`"#chan"` or `"#chan key"`) to the auto-join list.
    pub fn remember_channel(&mut self, entry: &str) {
        let Some(name) = entry.split_whitespace().next() else {
            return;
        };
        let casemap = self.casemapping();
        let known = self.options.channels.iter().any(|c| {
            c.split_whitespace()
                .next()
                .is_some_and(|n| casemap.eq_ignore_case(n, name))
        });
        if !known {
            self.options.channels.push(entry.trim().to_owned());
        }
    }

    /// Remove `channel` from the auto-join list.
    pub fn forget_channel(&mut self, channel: &str) {
        let casemap = self.casemapping();
        self.options.channels.retain(|c| {
            !c.split_whitespace()
                .next()
                .is_some_and(|n| casemap.eq_ignore_case(n, channel))
        });
    }

    /// PRIVMSG or NOTICE `text` to `target`, split into safe chunks.
    ///
    /// Every PRIVMSG chunk is echoed as [`Event::SelfMessage`].
    pub fn speak(&self, kind: CtcpType, target: &str, text: &str) -> Vec<Action> {
        let limit = split::chunk_limit(self.max_line_length, target, self.options.message_split);
        let mut out = Vec::new();
        for chunk in split::split_message(text, limit) {
            out.push(send(kind.command(), [target, chunk.as_str()]));
            if kind == CtcpType::Privmsg {
                out.push(Action::Emit(Event::SelfMessage {
                    to: target.to_owned(),
                    text: chunk,
                }));
            }
        }
        out
    }

    /// Send `text` as CTCP ACTION chunks.
    pub fn action(&self, target: &str, text: &str) -> Vec<Action> {
        let limit = self
            .max_line_length
            .saturating_sub(target.chars().count() + split::ACTION_OVERHEAD)
            .max(1);
        split::split_message(text, limit)
            .into_iter()
            .flat_map(|chunk| {
                let framed = ctcp::frame(&format!("ACTION {}", chunk));
                self.speak(CtcpType::Privmsg, target, &framed)
            })
            .collect()
    }

    /// Send a CTCP request (PRIVMSG) or reply (NOTICE).
    pub fn ctcp(&self, target: &str, kind: CtcpType, text: &str) -> Vec<Action> {
        self.speak(kind, target, &ctcp::frame(text))
    }

    /// Dispatch one inbound message.
    pub fn handle(&mut self, msg: &Message) -> Vec<Action> {
        let mut out = Vec::new();
        match msg.response() {
            Some(response) => self.handle_reply(response, msg, &mut out),
            None => self.handle_command(msg, &mut out),
        }
        out
    }

    fn handle_reply(&mut self, response: Response, msg: &Message, out: &mut Vec<Action>) {
        match response {
            Response::RPL_WELCOME => self.on_welcome(msg, out),
            Response::RPL_MYINFO => self.capabilities.apply_myinfo(&msg.args),
            Response::RPL_ISUPPORT => {
                self.capabilities.apply_isupport(&msg.args);
                self.channels.set_casemapping(self.capabilities.casemapping);
            }
            Response::RPL_YOURHOST
            | Response::RPL_CREATED
            | Response::RPL_LUSERCLIENT
            | Response::RPL_LUSEROP
            | Response::RPL_LUSERUNKNOWN
            | Response::RPL_LUSERCHANNELS
            | Response::RPL_LUSERME
            | Response::RPL_LOCALUSERS
            | Response::RPL_GLOBALUSERS
            | Response::RPL_STATSCONN
            | Response::RPL_ENDOFWHO => {}
            Response::ERR_NICKNAMEINUSE => {
                self.nick_mod += 1;
                self.nick = format!("{}{}", self.options.nick, self.nick_mod);
                self.update_max_line_length();
                out.push(send("NICK", [self.nick.as_str()]));
            }
            Response::RPL_MOTDSTART => {
                self.motd = format!("{}\n", msg.arg(1));
            }
            Response::RPL_MOTD => {
                self.motd.push_str(msg.arg(1));
                self.motd.push('\n');
            }
            Response::RPL_ENDOFMOTD | Response::ERR_NOMOTD => {
                self.motd.push_str(msg.arg(1));
                self.motd.push('\n');
                out.push(Action::Emit(Event::Motd(self.motd.clone())));
                for entry in &self.options.channels {
                    out.push(send("JOIN", join_args(entry)));
                }
            }
            Response::RPL_NAMREPLY => self.on_names(msg),
            Response::RPL_ENDOFNAMES => {
                let name = msg.arg(1);
                if let Some(channel) = self.channels.get(name) {
                    out.push(Action::Emit(Event::Names {
                        channel: name.to_owned(),
                        users: channel.users.clone(),
                    }));
                    out.push(send("MODE", [name]));
                }
            }
            Response::RPL_TOPIC => {
                if let Some(channel) = self.channels.get_mut(msg.arg(1)) {
                    channel.topic = Some(msg.arg(2).to_owned());
                }
            }
            Response::RPL_TOPICWHOTIME => {
                let name = msg.arg(1);
                if let Some(channel) = self.channels.get_mut(name) {
                    channel.topic_by = Some(msg.arg(2).to_owned());
                    out.push(Action::Emit(Event::Topic {
                        channel: name.to_owned(),
                        topic: channel.topic.clone().unwrap_or_default(),
                        nick: msg.arg(2).to_owned(),
                    }));
                }
            }
            Response::RPL_CHANNELMODEIS => {
                if let Some(channel) = self.channels.get_mut(msg.arg(1)) {
                    channel.set_mode_string(msg.arg(2));
                }
            }
            Response::RPL_CREATIONTIME => {
                if let Some(channel) = self.channels.get_mut(msg.arg(1)) {
                    channel.created = Some(msg.arg(2).to_owned());
                }
            }
            Response::RPL_AWAY => {
                let casemap = self.casemapping();
                let away = msg.arg(2).to_owned();
                self.whois
                    .update_existing(casemap, msg.arg(1), |r| r.away = Some(away));
            }
            Response::RPL_WHOISUSER => {
                let (user, host, realname) = (msg.arg(2), msg.arg(3), msg.arg(5));
                self.whois_update(msg.arg(1), |r| {
                    r.user = Some(user.to_owned());
                    r.host = Some(host.to_owned());
                    r.realname = Some(realname.to_owned());
                });
            }
            Response::RPL_WHOISSERVER => {
                let (server, info) = (msg.arg(2), msg.arg(3));
                self.whois_update(msg.arg(1), |r| {
                    r.server = Some(server.to_owned());
                    r.server_info = Some(info.to_owned());
                });
            }
            Response::RPL_WHOISOPERATOR => {
                let text = msg.arg(2);
                self.whois_update(msg.arg(1), |r| r.operator = Some(text.to_owned()));
            }
            Response::RPL_WHOISIDLE => {
                let idle = msg.arg(2);
                self.whois_update(msg.arg(1), |r| r.idle = Some(idle.to_owned()));
            }
            Response::RPL_WHOISCHANNELS => {
                let channels = msg.arg(2).split_whitespace().map(str::to_owned);
                self.whois_update(msg.arg(1), |r| r.channels.extend(channels));
            }
            Response::RPL_WHOISACCOUNT => {
                let (account, info) = (msg.arg(2), msg.arg(3));
                self.whois_update(msg.arg(1), |r| {
                    r.account = Some(account.to_owned());
                    r.account_info = Some(info.to_owned());
                });
            }
            Response::RPL_ENDOFWHOIS => {
                let record = self.whois.take(self.casemapping(), msg.arg(1));
                self.finish_whois(record, out);
            }
            Response::RPL_WHOREPLY => {
                // #chan user host server nick flags :hopcount realname
                let nick = msg.arg(5);
                let realname = msg
                    .arg(7)
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .map(|(_, rest)| rest.trim_start())
                    .unwrap_or("");
                let (user, host, server) = (msg.arg(2), msg.arg(3), msg.arg(4));
                self.whois_update(nick, |r| {
                    r.user = Some(user.to_owned());
                    r.host = Some(host.to_owned());
                    r.server = Some(server.to_owned());
                    r.realname = Some(realname.to_owned());
                });
                let record = self.whois.take(self.casemapping(), nick);
                self.finish_whois(record, out);
            }
            Response::RPL_LISTSTART => {
                self.channel_list.clear();
                out.push(Action::Emit(Event::ChannelListStart));
            }
            Response::RPL_LIST => {
                let entry = ChannelListEntry {
                    name: msg.arg(1).to_owned(),
                    users: msg.arg(2).to_owned(),
                    topic: msg.arg(3).to_owned(),
                };
                self.channel_list.push(entry.clone());
                out.push(Action::Emit(Event::ChannelListItem(entry)));
            }
            Response::RPL_LISTEND => {
                out.push(Action::Emit(Event::ChannelList(self.channel_list.clone())));
            }
            Response::RPL_YOUREOPER => out.push(Action::Emit(Event::Opered)),
            Response::RPL_SASLSUCCESS => out.push(send("CAP", ["END"])),
            Response::ERR_SASLFAIL => {
                out.push(send("CAP", ["END"]));
                self.report_error(msg, out);
            }
            _ => self.unhandled(msg, out),
        }
    }

    fn handle_command(&mut self, msg: &Message, out: &mut Vec<Action>) {
        match msg.command.as_str() {
            "PING" => {
                let server = msg.arg(0).to_owned();
                out.push(send("PONG", [server.as_str()]));
                out.push(Action::Emit(Event::Ping { server }));
            }
            "PONG" => out.push(Action::Emit(Event::Pong {
                server: msg.arg(0).to_owned(),
            })),
            "NICK" => self.on_nick(msg, out),
            "JOIN" => self.on_join(msg, out),
            "PART" => self.on_part(msg, out),
            "KICK" => self.on_kick(msg, out),
            "QUIT" => self.on_quit(msg, out),
            "KILL" => self.on_kill(msg, out),
            "MODE" => self.on_mode(msg, out),
            "TOPIC" => {
                let name = msg.arg(0);
                let topic = msg.arg(1).to_owned();
                let nick = msg.nick.clone().unwrap_or_default();
                if let Some(channel) = self.channels.get_mut(name) {
                    channel.topic = Some(topic.clone());
                    channel.topic_by = Some(nick.clone());
                }
                out.push(Action::Emit(Event::Topic {
                    channel: name.to_owned(),
                    topic,
                    nick,
                }));
            }
            "PRIVMSG" => self.on_text(CtcpType::Privmsg, msg, out),
            "NOTICE" => self.on_text(CtcpType::Notice, msg, out),
            "INVITE" => out.push(Action::Emit(Event::Invite {
                channel: msg.arg(1).to_owned(),
                from: msg.nick.clone(),
            })),
            "CAP" => self.on_cap(msg, out),
            "AUTHENTICATE" => {
                if msg.arg(0) == "+" {
                    let encoded = sasl::encode_plain(
                        &self.options.nick,
                        &self.options.user_name,
                        self.options.password.as_deref().unwrap_or(""),
                    );
                    for payload in sasl::authenticate_payloads(&encoded) {
                        out.push(send("AUTHENTICATE", [payload]));
                    }
                }
            }
            _ => self.unhandled(msg, out),
        }
    }

    fn unhandled(&self, msg: &Message, out: &mut Vec<Action>) {
        if msg.command_type == CommandType::Error {
            self.report_error(msg, out);
        } else if self.options.debug {
            debug!(command = %msg.raw_command, args = ?msg.args, "unhandled message");
        }
    }

    fn report_error(&self, msg: &Message, out: &mut Vec<Action>) {
        if self.options.show_errors {
            warn!(command = %msg.command, args = ?msg.args, "server error reply");
        }
        out.push(Action::Emit(Event::Error(msg.clone())));
    }

    fn on_welcome(&mut self, msg: &Message, out: &mut Vec<Action>) {
        self.nick = msg.arg(0).to_owned();
        self.host_mask = msg
            .arg(1)
            .split_whitespace()
            .last()
            .unwrap_or("")
            .to_owned();
        self.capabilities = ServerCapabilities::new(&self.options.channel_prefixes);
        self.channels.set_casemapping(self.capabilities.casemapping);
        self.update_max_line_length();

        out.push(Action::Emit(Event::Registered {
            message: msg.clone(),
        }));
        self.self_whois = Some(self.casemapping().to_lower(&self.nick));
        out.push(send("WHOIS", [self.nick.as_str()]));
    }

    fn whois_update<F>(&mut self, nick: &str, f: F)
    where
        F: FnOnce(&mut WhoisRecord),
    {
        let casemap = self.casemapping();
        self.whois.update(casemap, nick, f);
    }

    fn finish_whois(&mut self, record: WhoisRecord, out: &mut Vec<Action>) {
        let lowered = self.casemapping().to_lower(&record.nick);
        if self.self_whois.as_deref() == Some(lowered.as_str()) {
            self.self_whois = None;
            self.nick = record.nick.clone();
            if let (Some(user), Some(host)) = (&record.user, &record.host) {
                self.host_mask = format!("{}@{}", user, host);
            }
            self.update_max_line_length();
        }
        out.push(Action::Emit(Event::Whois(record)));
    }

    fn on_names(&mut self, msg: &Message) {
        // 353: me = #chan :@alice +bob carol
        let name = msg.arg(2);
        let caps = &self.capabilities;
        let Some(channel) = self.channels.get_mut(name) else {
            return;
        };
        for entry in msg.arg(3).split_whitespace() {
            let nick = entry.trim_start_matches(|c| caps.is_status_prefix(c));
            if nick.is_empty() {
                continue;
            }
            let prefix = &entry[..entry.len() - nick.len()];
            channel.users.insert(nick.to_owned(), prefix.to_owned());
        }
    }

    fn on_nick(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let Some(old) = msg.nick.as_deref() else {
            return;
        };
        let new = msg.arg(0);
        if self.is_self(old) {
            self.nick = new.to_owned();
            self.update_max_line_length();
        }

        let channels: Vec<String> = self
            .channels
            .iter_mut()
            .filter_map(|c| c.rename_user(old, new).then(|| c.name.clone()))
            .collect();

        out.push(Action::Emit(Event::Nick {
            old: old.to_owned(),
            new: new.to_owned(),
            channels,
        }));
    }

    fn on_join(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let name = msg.arg(0);
        let nick = msg.nick.clone().unwrap_or_default();
        if self.is_self(&nick) {
            self.channels.get_or_create(name);
        } else if let Some(channel) = self.channels.get_mut(name) {
            channel.users.insert(nick.clone(), String::new());
        }
        out.push(Action::Emit(Event::Join {
            channel: name.to_owned(),
            nick,
        }));
    }

    fn on_part(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let name = msg.arg(0);
        let nick = msg.nick.clone().unwrap_or_default();
        let reason = msg.args.get(1).cloned();
        out.push(Action::Emit(Event::Part {
            channel: name.to_owned(),
            nick: nick.clone(),
            reason,
        }));

        if self.is_self(&nick) {
            self.channels.remove(name);
        } else if let Some(channel) = self.channels.get_mut(name) {
            channel.users.remove(&nick);
        }
    }

    fn on_kick(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let name = msg.arg(0);
        let who = msg.arg(1).to_owned();
        out.push(Action::Emit(Event::Kick {
            channel: name.to_owned(),
            nick: who.clone(),
            by: msg.nick.clone(),
            reason: msg.args.get(2).cloned(),
        }));

        if self.is_self(&who) {
            self.channels.remove(name);
            if self.options.auto_rejoin {
                out.push(send("JOIN", join_args(name)));
            }
        } else if let Some(channel) = self.channels.get_mut(name) {
            channel.users.remove(&who);
        }
    }

    /// Remove `nick` from every channel, returning the channels it was in.
    fn remove_everywhere(&mut self, nick: &str) -> Vec<String> {
        self.channels
            .iter_mut()
            .filter_map(|c| c.users.remove(nick).map(|_| c.name.clone()))
            .collect()
    }

    fn on_quit(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let Some(nick) = msg.nick.clone() else {
            return;
        };
        if self.is_self(&nick) {
            return;
        }
        let channels = self.remove_everywhere(&nick);
        out.push(Action::Emit(Event::Quit {
            nick,
            reason: msg.args.first().cloned(),
            channels,
        }));
    }

    fn on_kill(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let nick = msg.arg(0).to_owned();
        let channels = self.remove_everywhere(&nick);
        out.push(Action::Emit(Event::Kill {
            nick,
            reason: msg.args.get(1).cloned(),
            channels,
        }));
    }

    fn on_mode(&mut self, msg: &Message, out: &mut Vec<Action>) {
        let Some((target, pieces)) = msg.args.split_first() else {
            return;
        };
        let caps = &self.capabilities;
        let Some(channel) = self.channels.get_mut(target) else {
            return;
        };

        for change in parse_channel_modes(caps, pieces) {
            channel.apply_mode(&change, caps);
            let (channel, by, mode, arg) = (
                target.clone(),
                msg.nick.clone(),
                change.mode,
                change.param,
            );
            out.push(Action::Emit(if change.adding {
                Event::ModeAdded {
                    channel,
                    by,
                    mode,
                    arg,
                }
            } else {
                Event::ModeRemoved {
                    channel,
                    by,
                    mode,
                    arg,
                }
            }));
        }
    }

    fn on_text(&mut self, kind: CtcpType, msg: &Message, out: &mut Vec<Action>) {
        let from = msg.nick.clone();
        let to = msg.arg(0).to_owned();
        let text = msg.arg(1);

        if let Some(payload) = ctcp::extract(text) {
            self.on_ctcp(kind, from, to, payload, out);
            return;
        }

        match kind {
            CtcpType::Notice => out.push(Action::Emit(Event::Notice {
                from,
                to,
                text: text.to_owned(),
            })),
            CtcpType::Privmsg => {
                out.push(Action::Emit(Event::Message {
                    from: from.clone(),
                    to: to.clone(),
                    text: text.to_owned(),
                }));
                if self.capabilities.is_channel(&to) {
                    out.push(Action::Emit(Event::ChannelMessage {
                        from: from.clone(),
                        channel: to.clone(),
                        text: text.to_owned(),
                    }));
                }
                if self.is_self(&to) {
                    out.push(Action::Emit(Event::Pm {
                        from,
                        text: text.to_owned(),
                    }));
                }
            }
        }
    }

    fn on_ctcp(
        &mut self,
        kind: CtcpType,
        from: Option<String>,
        to: String,
        payload: &str,
        out: &mut Vec<Action>,
    ) {
        out.push(Action::Emit(Event::Ctcp {
            from: from.clone(),
            to: to.clone(),
            text: payload.to_owned(),
            kind,
        }));
        out.push(Action::Emit(match kind {
            CtcpType::Privmsg => Event::CtcpPrivmsg {
                from: from.clone(),
                to: to.clone(),
                text: payload.to_owned(),
            },
            CtcpType::Notice => Event::CtcpNotice {
                from: from.clone(),
                to: to.clone(),
                text: payload.to_owned(),
            },
        }));

        let (verb, rest) = ctcp::split_verb(payload);
        if kind == CtcpType::Privmsg && payload == "VERSION" {
            out.push(Action::Emit(Event::CtcpVersion {
                from: from.clone(),
                to: to.clone(),
            }));
        }
        // a bare "ACTION" has no separator and carries no action text
        if verb == "ACTION" && payload.len() > verb.len() {
            out.push(Action::Emit(Event::Action {
                from: from.clone(),
                to,
                text: rest.to_owned(),
            }));
        }
        if verb == "PING" && kind == CtcpType::Privmsg && !rest.is_empty() {
            if let Some(from) = from.as_deref() {
                out.extend(self.ctcp(from, CtcpType::Notice, payload));
            }
        }
    }

    fn on_cap(&mut self, msg: &Message, out: &mut Vec<Action>) {
        // CAP <target> ACK :sasl
        let has_sasl = msg.arg(2).split_whitespace().any(|c| c == "sasl");
        match msg.arg(1) {
            "ACK" if has_sasl => {
                out.push(send("AUTHENTICATE", [sasl::MECHANISM_PLAIN]));
            }
            "NAK" => out.push(send("CAP", ["END"])),
            _ => self.unhandled(msg, out),
        }
    }
}
