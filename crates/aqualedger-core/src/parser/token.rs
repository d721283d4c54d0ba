//! Tokenizer for catch utterances

use std::sync::OnceLock;

use regex::Regex;

/// Kind of a lexical token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Decimal quantity such as `20` or `20.5`
    Number(f64),
    /// Run of letters (apostrophes and hyphens allowed inside)
    Word,
    /// Anything else that is not whitespace
    Symbol,
}

/// A token borrowed from the input text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Whitespace separated this token from the previous one
    pub spaced: bool,
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"(?P<number>[0-9]+(?:\.[0-9]+)?)|(?P<word>[\p{L}\p{M}][\p{L}\p{M}'\-]*)|(?P<symbol>[^\s\p{L}\p{M}0-9]+)",
        )
        .expect("Invalid token regex")
    })
}

/// Split text into numbers, words and symbols.
///
/// Digits glued to letters are split (`20kg` is a number then a word).
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut previous_end = 0;

    for captures in token_regex().captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let kind = if captures.name("number").is_some() {
            // Absurdly long digit runs overflow to infinity; keep them as text
            match whole.as_str().parse::<f64>() {
                Ok(value) if value.is_finite() => TokenKind::Number(value),
                _ => TokenKind::Symbol,
            }
        } else if captures.name("word").is_some() {
            TokenKind::Word
        } else {
            TokenKind::Symbol
        };

        tokens.push(Token {
            kind,
            text: whole.as_str(),
            spaced: whole.start() > previous_end,
        });
        previous_end = whole.end();
    }

    tokens
}
