//! mIRC colour and style control-code handling.
//!
//! Servers and clients embed formatting in message text with single control
//! bytes (bold, italic, underline, ...) and with colour sequences of the form
//! `\x03FG[,BG]` (one or two digits each) or `\x04RRGGBB[,RRGGBB]`.

use std::borrow::Cow;

const BOLD: char = '\x02';
const COLOR: char = '\x03';
const HEX_COLOR: char = '\x04';
const RESET: char = '\x0F';
const MONOSPACE: char = '\x11';
const REVERSE: char = '\x16';
const ITALIC: char = '\x1D';
const STRIKETHROUGH: char = '\x1E';
const UNDERLINE: char = '\x1F';

fn is_style_char(c: char) -> bool {
    matches!(
        c,
        BOLD | RESET | MONOSPACE | REVERSE | ITALIC | STRIKETHROUGH | UNDERLINE
    )
}

/// Extension trait for stripping IRC formatting from text.
pub trait FormattedStringExt<'a> {
    /// Whether the text carries any colour or style control code.
    fn is_formatted(&self) -> bool;

    /// Remove every colour and style control code.
    fn strip_formatting(self) -> Cow<'a, str>;
}

impl<'a> FormattedStringExt<'a> for &'a str {
    fn is_formatted(&self) -> bool {
        self.chars()
            .any(|c| c == COLOR || c == HEX_COLOR || is_style_char(c))
    }

    fn strip_formatting(self) -> Cow<'a, str> {
        if !self.is_formatted() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(strip(self))
    }
}

impl FormattedStringExt<'static> for String {
    fn is_formatted(&self) -> bool {
        self.as_str().is_formatted()
    }

    fn strip_formatting(self) -> Cow<'static, str> {
        if !self.is_formatted() {
            return Cow::Owned(self);
        }
        Cow::Owned(strip(&self))
    }
}

fn strip(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            COLOR => {
                if skip_digits(&mut chars, 2) > 0 && chars.peek() == Some(&',') {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if lookahead.peek().is_some_and(|d| d.is_ascii_digit()) {
                        chars.next();
                        skip_digits(&mut chars, 2);
                    }
                }
            }
            HEX_COLOR => {
                if skip_hex(&mut chars) && chars.peek() == Some(&',') {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if skip_hex(&mut lookahead) {
                        chars = lookahead;
                    }
                }
            }
            c if is_style_char(c) => {}
            c => out.push(c),
        }
    }

    out
}

fn skip_digits<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>, max: usize) -> usize {
    let mut taken = 0;
    while taken < max && chars.peek().is_some_and(|c| c.is_ascii_digit()) {
        chars.next();
        taken += 1;
    }
    taken
}

fn skip_hex<I: Iterator<Item = char> + Clone>(chars: &mut std::iter::Peekable<I>) -> bool {
    let mut lookahead = chars.clone();
    for _ in 0..6 {
        match lookahead.next() {
            Some(c) if c.is_ascii_hexdigit() => {}
            _ => return false,
        }
    }
    *chars = lookahead;
    true
}

#[cfg(test)]
mod tests {
    use super::FormattedStringExt;

    #[test]
    fn test_plain_text_borrowed() {
        let text = "hello world";
        assert!(!text.is_formatted());
        assert!(matches!(
            text.strip_formatting(),
            std::borrow::Cow::Borrowed("hello world")
        ));
    }

    #[test]
    fn test_strip_styles() {
        assert_eq!("\x02bold\x02 \x1Ditalic\x0F".strip_formatting(), "bold italic");
        assert_eq!("\x1Funder\x1F\x16rev".strip_formatting(), "underrev");
    }

    #[test]
    fn test_strip_colors() {
        assert_eq!("\x0304red".strip_formatting(), "red");
        assert_eq!("\x0304,12red on blue".strip_formatting(), "red on blue");
        assert_eq!("\x03reset".strip_formatting(), "reset");
        assert_eq!("\x03123".strip_formatting(), "3");
    }

    #[test]
    fn test_comma_after_color_kept() {
        assert_eq!("\x0304,text".strip_formatting(), ",text");
    }

    #[test]
    fn test_strip_hex_colors() {
        assert_eq!("\x04FF0000red".strip_formatting(), "red");
        assert_eq!("\x04FF0000,00FF00x".strip_formatting(), "x");
    }

    #[test]
    fn test_owned_string() {
        let s = String::from("\x02hi");
        assert_eq!(s.strip_formatting(), "hi");
    }
}
