//! Message parsing.
//!
//! Parses one decoded line into an optional sender prefix, a command token,
//! and a raw parameter tail. The tail is deliberately left undecomposed:
//! callers interpret the leading-colon trailing-argument convention
//! themselves.

use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::{opt, recognize},
    error::ErrorKind,
    sequence::preceded,
    IResult,
};

use crate::error::{MessageParseError, ProtocolError};

/// A parsed protocol message.
///
/// `prefix` retains its leading `:` sentinel; `params` is the raw tail after
/// the command token with one separator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Sender prefix including the leading `:`, if present.
    pub prefix: Option<String>,
    /// Command token - an alphabetic verb or a three-digit reply code.
    pub command: String,
    /// Raw parameter tail, not further decomposed.
    pub params: String,
}

impl ParsedMessage {
    /// The trailing free-text argument: everything after the first `:` in
    /// the parameter tail, if any.
    pub fn trailing(&self) -> Option<&str> {
        self.params.split_once(':').map(|(_, rest)| rest)
    }
}

/// Parse the prefix (the `:`-led token up to the next whitespace run),
/// keeping the sentinel.
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char(':'), take_while1(|c| c != ' ')))(input)
}

/// Parse the command token (1*letter or 3digit).
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_alphanumeric())(input)?;

    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_all_letters || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

fn parse_line(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    Ok((input, (prefix, command)))
}

impl FromStr for ParsedMessage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<ParsedMessage, Self::Err> {
        let trimmed = s.trim_end_matches(&['\r', '\n'][..]);
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        let (rest, (prefix, command)) =
            parse_line(trimmed).map_err(|_| ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::InvalidCommand,
            })?;

        // Exactly one separator is stripped; the rest is the raw tail.
        let params = rest.strip_prefix(' ').unwrap_or(rest);

        Ok(ParsedMessage {
            prefix: prefix.map(str::to_owned),
            command: command.to_owned(),
            params: params.to_owned(),
        })
    }
}
