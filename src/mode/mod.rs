//! Channel mode classification and parsing.
//!
//! Every channel mode letter falls into one of the CHANMODES categories or
//! is a status mode from PREFIX:
//!
//! | Kind | Category | Parameter |
//! |------|----------|-----------|
//! | [`ModeKind::List`] | a | always, stored as a set |
//! | [`ModeKind::Setting`] | b | always, single value |
//! | [`ModeKind::SetOnly`] | c | only when adding |
//! | [`ModeKind::Flag`] | d | never |
//! | [`ModeKind::Status`] | PREFIX | always, a nick |

mod parse;

pub use self::parse::parse_channel_modes;

use crate::isupport::ServerCapabilities;

/// How a channel mode letter behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeKind {
    /// Grants a status prefix to a nick.
    Status,
    /// Category a.
    List,
    /// Category b.
    Setting,
    /// Category c.
    SetOnly,
    /// Category d.
    Flag,
}

impl ModeKind {
    /// Classify `mode` against the server's advertised modes.
    ///
    /// Status modes win over the category tables, since PREFIX letters are
    /// also folded into category b.
    pub fn classify(caps: &ServerCapabilities, mode: char) -> Option<ModeKind> {
        let modes = &caps.channel.modes;
        if caps.prefix_for_mode.contains_key(&mode) {
            Some(ModeKind::Status)
        } else if modes.a.contains(mode) {
            Some(ModeKind::List)
        } else if modes.b.contains(mode) {
            Some(ModeKind::Setting)
        } else if modes.c.contains(mode) {
            Some(ModeKind::SetOnly)
        } else if modes.d.contains(mode) {
            Some(ModeKind::Flag)
        } else {
            None
        }
    }

    /// Whether this kind consumes a parameter in the given direction.
    pub fn takes_param(self, adding: bool) -> bool {
        match self {
            ModeKind::Status | ModeKind::List | ModeKind::Setting => true,
            ModeKind::SetOnly => adding,
            ModeKind::Flag => false,
        }
    }
}

/// One processed letter of a MODE command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChange {
    /// `+` or `-`.
    pub adding: bool,
    /// The mode letter.
    pub mode: char,
    /// The consumed parameter, if the letter takes one.
    pub param: Option<String>,
    /// Classification of the letter.
    pub kind: ModeKind,
}
