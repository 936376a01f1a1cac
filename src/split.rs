//! Protocol-safe splitting of outgoing message text.
//!
//! Outgoing PRIVMSG/NOTICE text is split first on newlines, then each line
//! is cut into chunks that fit the safe payload length. Lengths are counted
//! in characters.

/// Length of the fixed framing overhead budget: 510 minus `:nick!user@host CMD target :`.
pub const MAX_LINE_BASE: usize = 497;

/// Overhead of an `\x01ACTION \x01` wrapper.
pub const ACTION_OVERHEAD: usize = "\x01ACTION \x01".len();

/// Maximum payload length for the current identity.
///
/// Recomputed after every nick or host mask change.
pub fn max_line_length(nick: &str, host_mask: &str) -> usize {
    MAX_LINE_BASE.saturating_sub(nick.chars().count() + host_mask.chars().count())
}

/// Safe chunk length for a message to `target`.
pub fn chunk_limit(max_line_length: usize, target: &str, split_limit: usize) -> usize {
    max_line_length
        .saturating_sub(target.chars().count())
        .min(split_limit)
        .max(1)
}

/// Split text on `\r\n`, `\r` or `\n`, dropping blank lines.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n']).filter(|line| !line.is_empty())
}

/// Split one line into chunks of at most `limit` characters.
///
/// A chunk ends at the boundary character when it is whitespace, otherwise
/// at the nearest earlier whitespace; the whitespace at a cut is dropped.
/// Without any whitespace the line is hard-cut at the boundary.
pub fn split_long_line(line: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut rest: Vec<char> = line.chars().collect();
    let mut chunks = Vec::new();

    while rest.len() > limit {
        let (cut, skip) = if rest[limit].is_whitespace() {
            (limit, 1)
        } else {
            match (1..limit).rev().find(|&i| rest[i].is_whitespace()) {
                Some(i) => (i, 1),
                None => (limit, 0),
            }
        };

        chunks.push(rest[..cut].iter().collect());
        rest.drain(..cut + skip);
    }

    // a cut on the final whitespace leaves nothing behind
    if chunks.is_empty() || !rest.is_empty() {
        chunks.push(rest.into_iter().collect());
    }
    chunks
}

/// Split message text into wire-safe chunks: newline split first, then length split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    lines(text)
        .flat_map(|line| split_long_line(line, limit))
        .collect()
}
