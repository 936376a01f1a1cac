//! Per-channel state and the case-insensitive channel arena.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::casemap::CaseMapping;
use crate::isupport::ServerCapabilities;
use crate::mode::{ModeChange, ModeKind};

/// State of one joined channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelState {
    /// Channel name as the server spells it.
    pub name: String,
    /// Current topic.
    pub topic: Option<String>,
    /// Who set the topic.
    pub topic_by: Option<String>,
    /// Creation time as sent in `RPL_CREATIONTIME`.
    pub created: Option<String>,
    /// Mode letters currently set, without parameters.
    pub mode: String,
    /// Parameters per mode letter, in insertion order.
    pub mode_params: BTreeMap<char, Vec<String>>,
    /// Nick → status prefix string (`"@"`, `"@+"`, `""`).
    pub users: HashMap<String, String>,
}

impl ChannelState {
    /// Empty state for a freshly joined channel.
    pub fn new(name: &str) -> Self {
        ChannelState {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Creation time parsed from the unix timestamp in [`created`](Self::created).
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.created.as_deref()?.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Apply one processed MODE letter.
    pub fn apply_mode(&mut self, change: &ModeChange, caps: &ServerCapabilities) {
        match change.kind {
            ModeKind::Status => {
                let (Some(nick), Some(prefix)) = (
                    change.param.as_deref(),
                    caps.prefix_for_mode.get(&change.mode).copied(),
                ) else {
                    return;
                };
                let Some(current) = self.users.get_mut(nick) else {
                    return;
                };
                if change.adding {
                    if !current.contains(prefix) {
                        current.push(prefix);
                    }
                } else {
                    *current = current.replacen(prefix, "", 1);
                }
            }
            ModeKind::List => {
                let Some(param) = change.param.as_deref() else {
                    return;
                };
                if change.adding {
                    self.set_flag(change.mode);
                    let list = self.mode_params.entry(change.mode).or_default();
                    if !list.iter().any(|v| v == param) {
                        list.push(param.to_owned());
                    }
                } else {
                    let emptied = match self.mode_params.get_mut(&change.mode) {
                        Some(list) => {
                            list.retain(|v| v != param);
                            list.is_empty()
                        }
                        None => true,
                    };
                    if emptied {
                        self.clear_flag(change.mode);
                    }
                }
            }
            ModeKind::Setting | ModeKind::SetOnly | ModeKind::Flag => {
                if change.adding {
                    self.set_flag(change.mode);
                    if let Some(param) = &change.param {
                        self.mode_params.insert(change.mode, vec![param.clone()]);
                    }
                } else {
                    self.clear_flag(change.mode);
                }
            }
        }
    }

    fn set_flag(&mut self, mode: char) {
        if !self.mode.contains(mode) {
            self.mode.push(mode);
        }
    }

    fn clear_flag(&mut self, mode: char) {
        self.mode = self.mode.replacen(mode, "", 1);
        self.mode_params.remove(&mode);
    }

    /// Replace the mode string from `RPL_CHANNELMODEIS`.
    pub fn set_mode_string(&mut self, modes: &str) {
        self.mode = modes.trim_start_matches('+').to_owned();
    }

    /// Move `old` to `new`, keeping its prefix. Returns whether `old` was present.
    pub fn rename_user(&mut self, old: &str, new: &str) -> bool {
        match self.users.remove(old) {
            Some(prefix) => {
                self.users.insert(new.to_owned(), prefix);
                true
            }
            None => false,
        }
    }
}

/// Stable id of a channel entry in a [`ChannelRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

/// Arena of joined channels with a case-mapped name index.
///
/// Every lookup and insert normalizes the name through the active
/// [`CaseMapping`], so `#Foo` and `#foo` always resolve to the same entry.
#[derive(Clone, Debug, Default)]
pub struct ChannelRegistry {
    casemapping: CaseMapping,
    next_id: u64,
    channels: BTreeMap<ChannelId, ChannelState>,
    index: HashMap<String, ChannelId>,
}

impl ChannelRegistry {
    /// Empty registry using the default `rfc1459` mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the case mapping, re-indexing existing entries.
    pub fn set_casemapping(&mut self, casemapping: CaseMapping) {
        if casemapping == self.casemapping {
            return;
        }
        self.casemapping = casemapping;
        self.index = self
            .channels
            .iter()
            .map(|(id, chan)| (casemapping.to_lower(&chan.name), *id))
            .collect();
    }

    /// Normalized lookup key for `name`.
    pub fn key(&self, name: &str) -> String {
        self.casemapping.to_lower(name)
    }

    /// Id of the entry for `name`.
    pub fn id(&self, name: &str) -> Option<ChannelId> {
        self.index.get(&self.key(name)).copied()
    }

    /// Look up a channel by name.
    pub fn get(&self, name: &str) -> Option<&ChannelState> {
        self.id(name).and_then(|id| self.channels.get(&id))
    }

    /// Look up a channel by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ChannelState> {
        let id = self.id(name)?;
        self.channels.get_mut(&id)
    }

    /// Return the entry for `name`, creating it if needed.
    pub fn get_or_create(&mut self, name: &str) -> &mut ChannelState {
        let key = self.key(name);
        let id = match self.index.get(&key) {
            Some(id) => *id,
            None => {
                let id = ChannelId(self.next_id);
                self.next_id += 1;
                self.index.insert(key, id);
                self.channels.insert(id, ChannelState::new(name));
                id
            }
        };
        self.channels
            .entry(id)
            .or_insert_with(|| ChannelState::new(name))
    }

    /// Remove the entry for `name`.
    pub fn remove(&mut self, name: &str) -> Option<ChannelState> {
        let id = self.index.remove(&self.key(name))?;
        self.channels.remove(&id)
    }

    /// Drop every channel.
    pub fn clear(&mut self) {
        self.channels.clear();
        self.index.clear();
    }

    /// Number of joined channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is joined.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Iterate all channels in join order.
    pub fn iter(&self) -> impl Iterator<Item = &ChannelState> {
        self.channels.values()
    }

    /// Iterate all channels mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChannelState> {
        self.channels.values_mut()
    }
}
