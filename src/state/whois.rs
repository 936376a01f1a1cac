//! WHOIS / WHO reply accumulation.

use std::collections::HashMap;

use crate::casemap::CaseMapping;

/// Everything learned about one nick from a WHOIS or WHO exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhoisRecord {
    pub nick: String,
    pub user: Option<String>,
    pub host: Option<String>,
    pub realname: Option<String>,
    pub server: Option<String>,
    pub server_info: Option<String>,
    /// Seconds idle, as sent.
    pub idle: Option<String>,
    /// Channel names, each possibly carrying a status prefix.
    pub channels: Vec<String>,
    pub operator: Option<String>,
    pub away: Option<String>,
    pub account: Option<String>,
    pub account_info: Option<String>,
}

impl WhoisRecord {
    pub fn new(nick: &str) -> Self {
        WhoisRecord {
            nick: nick.to_owned(),
            ..Default::default()
        }
    }
}

/// Pending records, keyed by case-mapped nick.
#[derive(Clone, Debug, Default)]
pub struct WhoisBuffer {
    pending: HashMap<String, WhoisRecord>,
}

impl WhoisBuffer {
    /// Update the pending record for `nick`, creating it first.
    pub fn update<F>(&mut self, casemapping: CaseMapping, nick: &str, f: F)
    where
        F: FnOnce(&mut WhoisRecord),
    {
        let record = self
            .pending
            .entry(casemapping.to_lower(nick))
            .or_insert_with(|| WhoisRecord::new(nick));
        f(record);
    }

    /// Update the pending record for `nick` only if one is already open.
    ///
    /// Returns whether a record was updated.
    pub fn update_existing<F>(&mut self, casemapping: CaseMapping, nick: &str, f: F) -> bool
    where
        F: FnOnce(&mut WhoisRecord),
    {
        match self.pending.get_mut(&casemapping.to_lower(nick)) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Remove and return the record for `nick`.
    ///
    /// A nick with nothing pending still yields a record holding the nick.
    pub fn take(&mut self, casemapping: CaseMapping, nick: &str) -> WhoisRecord {
        self.pending
            .remove(&casemapping.to_lower(nick))
            .unwrap_or_else(|| WhoisRecord::new(nick))
    }

    /// Whether a record is open for `nick`.
    pub fn contains(&self, casemapping: CaseMapping, nick: &str) -> bool {
        self.pending.contains_key(&casemapping.to_lower(nick))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
