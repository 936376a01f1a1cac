//! Server capabilities advertised through `RPL_MYINFO` (004) and
//! `RPL_ISUPPORT` (005).
//!
//! Tokens are merged into [`ServerCapabilities`] one key at a time as the
//! 005 lines arrive; unknown keys are ignored. The record is rebuilt from
//! defaults on every fresh registration.

use std::collections::BTreeMap;

use crate::casemap::CaseMapping;

/// The four CHANMODES categories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanModes {
    /// List modes: always take a parameter, stored as a set (`b`, `e`, `I`).
    pub a: String,
    /// Always take a parameter, single value (`k`). Status letters are folded in.
    pub b: String,
    /// Take a parameter only when set (`l`).
    pub c: String,
    /// Never take a parameter (`n`, `t`).
    pub d: String,
}

impl ChanModes {
    /// Parse a `CHANMODES=a,b,c,d` value. Missing trailing groups are empty.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(4, ',');
        let mut next = || parts.next().unwrap_or("").to_owned();
        ChanModes {
            a: next(),
            b: next(),
            c: next(),
            d: next(),
        }
    }
}

/// A parsed `PREFIX=(modes)prefixes` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    /// Mode letters, most powerful first.
    pub modes: &'a str,
    /// Matching prefix characters.
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    /// Parse a PREFIX value. Returns `None` when it is not of the `(modes)prefixes` form.
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix('(')?;
        let close = rest.find(')')?;
        Some(PrefixSpec {
            modes: &rest[..close],
            prefixes: &rest[close + 1..],
        })
    }

    /// Iterate `(mode, prefix)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + 'a {
        self.modes.chars().zip(self.prefixes.chars())
    }
}

/// Parse a `X:n,Y:m` list keyed by every character of each key part.
///
/// Entries with a non-numeric limit are skipped.
fn parse_char_limits(s: &str) -> BTreeMap<char, usize> {
    let mut out = BTreeMap::new();
    for part in s.split(',').filter(|p| !p.is_empty()) {
        let Some((keys, limit)) = part.split_once(':') else {
            continue;
        };
        let Ok(limit) = limit.parse::<usize>() else {
            continue;
        };
        for ch in keys.chars() {
            out.insert(ch, limit);
        }
    }
    out
}

/// Parse a `TARGMAX=CMD:n,...` value. Commands without a number are unlimited and skipped.
fn parse_targmax(s: &str) -> BTreeMap<String, usize> {
    s.split(',')
        .filter_map(|part| part.split_once(':'))
        .filter(|(cmd, _)| !cmd.is_empty())
        .filter_map(|(cmd, n)| Some((cmd.to_ascii_uppercase(), n.parse().ok()?)))
        .collect()
}

/// Channel-related limits.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelCapabilities {
    /// `IDCHAN`: id length per channel type.
    pub id_length: BTreeMap<char, usize>,
    /// `CHANNELLEN`.
    pub length: usize,
    /// `CHANLIMIT`: maximum joined channels per channel type.
    pub limit: BTreeMap<char, usize>,
    /// `CHANMODES`, with status letters folded into `b`.
    pub modes: ChanModes,
    /// `CHANTYPES`.
    pub types: String,
}

/// Limits and mode tables advertised by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerCapabilities {
    /// Channel-scoped limits.
    pub channel: ChannelCapabilities,
    /// `KICKLEN`.
    pub kick_length: usize,
    /// `MAXLIST`: maximum entries per list mode.
    pub max_list: BTreeMap<char, usize>,
    /// `TARGMAX`: maximum targets per command.
    pub max_targets: BTreeMap<String, usize>,
    /// `MODES`: maximum parameterized modes per MODE command.
    pub modes: usize,
    /// `NICKLEN`.
    pub nick_length: usize,
    /// `TOPICLEN`.
    pub topic_length: usize,
    /// User modes from `RPL_MYINFO`.
    pub user_modes: String,
    /// Status mode letter → prefix character (`o` → `@`).
    pub prefix_for_mode: BTreeMap<char, char>,
    /// Prefix character → status mode letter (`@` → `o`).
    pub mode_for_prefix: BTreeMap<char, char>,
    /// `CASEMAPPING`.
    pub casemapping: CaseMapping,
    chanmodes_b: String,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self::new("&#")
    }
}

impl ServerCapabilities {
    /// Defaults before any 005 arrives, with the configured channel types.
    pub fn new(channel_types: &str) -> Self {
        let mut caps = ServerCapabilities {
            channel: ChannelCapabilities {
                id_length: BTreeMap::new(),
                length: 200,
                limit: BTreeMap::new(),
                modes: ChanModes::default(),
                types: channel_types.to_owned(),
            },
            kick_length: 0,
            max_list: BTreeMap::new(),
            max_targets: BTreeMap::new(),
            modes: 3,
            nick_length: 9,
            topic_length: 0,
            user_modes: String::new(),
            prefix_for_mode: BTreeMap::new(),
            mode_for_prefix: BTreeMap::new(),
            casemapping: CaseMapping::default(),
            chanmodes_b: String::new(),
        };
        caps.set_prefix("(ov)@+");
        caps
    }

    /// Whether `target` names a channel under the advertised channel types.
    pub fn is_channel(&self, target: &str) -> bool {
        target
            .chars()
            .next()
            .is_some_and(|c| self.channel.types.contains(c))
    }

    /// Whether `c` is a status prefix character (`@`, `+`, ...).
    pub fn is_status_prefix(&self, c: char) -> bool {
        self.mode_for_prefix.contains_key(&c)
    }

    /// Apply an `RPL_MYINFO` argument list.
    pub fn apply_myinfo(&mut self, args: &[String]) {
        if let Some(user_modes) = args.get(3) {
            self.user_modes = user_modes.clone();
        }
    }

    /// Apply the tokens of one `RPL_ISUPPORT` argument list.
    ///
    /// The first argument (our nick) and any token without `=` are skipped.
    pub fn apply_isupport(&mut self, args: &[String]) {
        for arg in args.iter().skip(1) {
            if let Some((key, value)) = arg.split_once('=') {
                self.apply_token(key, value);
            }
        }
    }

    /// Merge one `KEY=VALUE` token.
    pub fn apply_token(&mut self, key: &str, value: &str) {
        let number = || value.parse::<usize>().ok();
        match key {
            "CHANLIMIT" => self.channel.limit = parse_char_limits(value),
            "CHANMODES" => {
                let parsed = ChanModes::parse(value);
                self.chanmodes_b = parsed.b.clone();
                self.channel.modes = parsed;
                self.fold_status_modes();
            }
            "CHANTYPES" => self.channel.types = value.to_owned(),
            "CHANNELLEN" => {
                if let Some(n) = number() {
                    self.channel.length = n;
                }
            }
            "IDCHAN" => self.channel.id_length = parse_char_limits(value),
            "KICKLEN" => {
                if let Some(n) = number() {
                    self.kick_length = n;
                }
            }
            "MAXLIST" => self.max_list = parse_char_limits(value),
            "MODES" => {
                if let Some(n) = number() {
                    self.modes = n;
                }
            }
            "NICKLEN" => {
                if let Some(n) = number() {
                    self.nick_length = n;
                }
            }
            "PREFIX" => self.set_prefix(value),
            "TARGMAX" => self.max_targets = parse_targmax(value),
            "TOPICLEN" => {
                if let Some(n) = number() {
                    self.topic_length = n;
                }
            }
            "CASEMAPPING" => {
                if let Some(mapping) = CaseMapping::from_token(value) {
                    self.casemapping = mapping;
                }
            }
            // STATUSMSG and everything else
            _ => {}
        }
    }

    fn set_prefix(&mut self, value: &str) {
        let Some(spec) = PrefixSpec::parse(value) else {
            return;
        };
        self.prefix_for_mode.clear();
        self.mode_for_prefix.clear();
        for (mode, prefix) in spec.pairs() {
            self.prefix_for_mode.insert(mode, prefix);
            self.mode_for_prefix.insert(prefix, mode);
        }
        self.fold_status_modes();
    }

    fn fold_status_modes(&mut self) {
        let mut b = self.chanmodes_b.clone();
        for mode in self.prefix_for_mode.keys() {
            if !b.contains(*mode) {
                b.push(*mode);
            }
        }
        self.channel.modes.b = b;
    }
}
