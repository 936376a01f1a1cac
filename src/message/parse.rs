//! Nom-based IRC line parser.
//!
//! Splits a raw line into prefix, command and parameter list using the
//! client-side rules: the prefix ends at the first run of spaces, the
//! trailing parameter starts at the first `:` that opens a token.

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, space0, space1},
    error::{context, VerboseError},
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse the message prefix (the part after `:` up to the following spaces).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        terminated(preceded(char(':'), take_till1(|c| c == ' ')), space1),
    )(input)
}

/// Parse the command token.
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        take_till1(|c: char| c.is_whitespace()),
    )(input)
}

/// Parse `[:prefix] <command>`, leaving the parameter text.
fn parse_head(input: &str) -> ParseResult<&str, (Option<&str>, &str)> {
    let (input, prefix) = if input.starts_with(':') {
        let (input, prefix) = parse_prefix(input)?;
        (input, Some(prefix))
    } else {
        (input, None)
    };
    let (input, _) = space0(input)?;
    let (input, command) = context("parsing required command", parse_command)(input)?;
    Ok((input, (prefix, command)))
}

/// Borrowed pieces of a line, before numeric lookup and prefix splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawParts<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

pub(crate) fn split_line(input: &str) -> Result<RawParts<'_>, MessageParseError> {
    if input.trim().is_empty() {
        return Err(MessageParseError::EmptyMessage);
    }

    let (rest, (prefix, command)) =
        parse_head(input).map_err(|_| MessageParseError::InvalidCommand)?;

    Ok(RawParts {
        prefix,
        command,
        params: split_params(rest),
    })
}

/// Split the text after the command into middle params and one trailing param.
fn split_params(rest: &str) -> Vec<&str> {
    let trailing_at = rest.char_indices().find_map(|(i, c)| {
        let opens_token = i == 0 || rest[..i].ends_with(char::is_whitespace);
        (c == ':' && opens_token).then_some(i)
    });

    match trailing_at {
        Some(i) => {
            let mut params = split_middle(&rest[..i]);
            params.push(&rest[i + 1..]);
            params
        }
        None => split_middle(rest),
    }
}

fn split_middle(middle: &str) -> Vec<&str> {
    middle
        .trim()
        .split(' ')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a `nick!user@host` prefix. Returns `None` when the prefix is a server name.
pub(crate) fn split_user_prefix(prefix: &str) -> Option<(&str, Option<(&str, &str)>)> {
    let (nick, rest) = match prefix.find('!') {
        Some(bang) => (&prefix[..bang], Some(&prefix[bang + 1..])),
        None => (prefix, None),
    };

    if nick.is_empty() || !nick.chars().all(is_nick_char) {
        return None;
    }

    match rest {
        None => Some((nick, None)),
        Some(rest) => {
            let at = rest.find('@')?;
            let (user, host) = (&rest[..at], &rest[at + 1..]);
            if user.is_empty() {
                return None;
            }
            Some((nick, Some((user, host))))
        }
    }
}

fn is_nick_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-[]\\`^{}|~".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let parts = split_line(":nick!user@host PRIVMSG #chan :hello there").unwrap();
        assert_eq!(parts.prefix, Some("nick!user@host"));
        assert_eq!(parts.command, "PRIVMSG");
        assert_eq!(parts.params, vec!["#chan", "hello there"]);
    }

    #[test]
    fn test_prefix_followed_by_space_run() {
        let parts = split_line(":server   NOTICE  *  :hi").unwrap();
        assert_eq!(parts.prefix, Some("server"));
        assert_eq!(parts.command, "NOTICE");
        assert_eq!(parts.params, vec!["*", "hi"]);
    }

    #[test]
    fn test_colon_inside_middle_param_is_not_trailing() {
        let parts = split_line("MODE #chan +k pass:word").unwrap();
        assert_eq!(parts.params, vec!["#chan", "+k", "pass:word"]);
    }

    #[test]
    fn test_trailing_kept_verbatim() {
        let parts = split_line("PRIVMSG #c ::) two  spaces ").unwrap();
        assert_eq!(parts.params, vec!["#c", ":) two  spaces "]);
    }

    #[test]
    fn test_empty_trailing() {
        let parts = split_line("TOPIC #c :").unwrap();
        assert_eq!(parts.params, vec!["#c", ""]);
    }

    #[test]
    fn test_no_params() {
        let parts = split_line("QUIT").unwrap();
        assert!(parts.params.is_empty());
    }

    #[test]
    fn test_missing_command() {
        assert_eq!(
            split_line(":only.a.prefix"),
            Err(MessageParseError::InvalidCommand)
        );
        assert_eq!(split_line(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(split_line("   "), Err(MessageParseError::EmptyMessage));
    }

    #[test]
    fn test_split_user_prefix() {
        assert_eq!(
            split_user_prefix("nick!user@host.example"),
            Some(("nick", Some(("user", "host.example"))))
        );
        assert_eq!(split_user_prefix("Nick[m]"), Some(("Nick[m]", None)));
        assert_eq!(split_user_prefix("irc.example.net"), None);
        assert_eq!(split_user_prefix("nick!@host"), None);
        assert_eq!(split_user_prefix("nick!user"), None);
    }
}
