//! Channel mode string parsing.

use crate::isupport::ServerCapabilities;

use super::{ModeChange, ModeKind};

enum PlusMinus {
    Plus,
    Minus,
}

/// Parse a channel MODE argument list (`["+ov-k", "alice", "bob", "key"]`).
///
/// Letters are classified against the server's advertised modes. Parameters
/// are consumed left to right by the letters that take one; letters the
/// server never advertised are skipped without consuming a parameter.
pub fn parse_channel_modes<S: AsRef<str>>(caps: &ServerCapabilities, pieces: &[S]) -> Vec<ModeChange> {
    use self::PlusMinus::*;

    let mut res = vec![];

    let Some((first, rest)) = pieces.split_first() else {
        return res;
    };
    let mut args = rest.iter().map(|a| a.as_ref().to_owned());
    let mut cur_mod = Plus;

    for c in first.as_ref().chars() {
        match c {
            '+' => cur_mod = Plus,
            '-' => cur_mod = Minus,
            _ => {
                let Some(kind) = ModeKind::classify(caps, c) else {
                    tracing::debug!(mode = %c, "skipping unknown channel mode");
                    continue;
                };
                let adding = matches!(cur_mod, Plus);
                let param = if kind.takes_param(adding) {
                    args.next()
                } else {
                    None
                };
                res.push(ModeChange {
                    adding,
                    mode: c,
                    param,
                    kind,
                });
            }
        }
    }

    res
}
