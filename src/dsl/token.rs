//! Token types shared by the lexer, parser and tooling
//!
//!     Tokens come in two layers. Core tokens (brackets, operators, words, literals and raw
//!     characters) are produced by the logos lexer from each line's content. Structural
//!     tokens (Indent, Dedent) are synthesized from leading whitespace before the line is
//!     lexed; they carry no text.
//!
//!     The four bracket pairs name the nesting levels, outermost first: alpha `< >`, beta
//!     `[ ]`, gamma `{ }`, delta `( )`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Words that lex as [TokenKind::Keyword] rather than [TokenKind::Identifier].
pub const KEYWORDS: &[&str] = &[
    "hunt", "Track", "GATHER", "GET", "INIT", "param", "val", "EXEC", "tag", "pluck", "trap",
    "boil", "scent", "snare", "Relate",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    AlphaOpen,
    AlphaClose,
    BetaOpen,
    BetaClose,
    GammaOpen,
    GammaClose,
    DeltaOpen,
    DeltaClose,
    Assign,
    Bridge,
    Chain,
    Comma,
    Keyword,
    Identifier,
    Number,
    StringLiteral,
    Char,
    Indent,
    Dedent,
}

impl TokenKind {
    /// Source text of fixed-spelling tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::AlphaOpen => "<",
            TokenKind::AlphaClose => ">",
            TokenKind::BetaOpen => "[",
            TokenKind::BetaClose => "]",
            TokenKind::GammaOpen => "{",
            TokenKind::GammaClose => "}",
            TokenKind::DeltaOpen => "(",
            TokenKind::DeltaClose => ")",
            TokenKind::Assign => "=",
            TokenKind::Bridge => ":",
            TokenKind::Chain => "@@",
            TokenKind::Comma => ",",
            _ => return None,
        };
        Some(symbol)
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, TokenKind::Indent | TokenKind::Dedent)
    }

    pub fn is_word(&self) -> bool {
        matches!(self, TokenKind::Keyword | TokenKind::Identifier)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral | TokenKind::Number | TokenKind::Keyword | TokenKind::Identifier
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(symbol) => write!(f, "{:?} '{}'", self, symbol),
            None => write!(f, "{:?}", self),
        }
    }
}

/// A token with its text (for words, literals and raw characters) and 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: Option<String>, line: usize) -> Self {
        Self {
            kind,
            literal,
            line,
        }
    }

    pub fn symbol(kind: TokenKind, line: usize) -> Self {
        Self::new(kind, None, line)
    }

    pub fn text(&self) -> &str {
        self.literal.as_deref().or(self.kind.symbol()).unwrap_or("")
    }

    /// Short human description used in parse errors.
    pub fn describe(&self) -> String {
        match &self.literal {
            Some(text) => format!("{:?} `{}`", self.kind, text),
            None => self.kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert!(is_keyword("hunt"));
        assert!(is_keyword("Relate"));
        assert!(!is_keyword("HUNT"));
        assert!(!is_keyword("button"));
    }

    #[test]
    fn test_display_and_describe() {
        assert_eq!(TokenKind::AlphaClose.to_string(), "AlphaClose '>'");
        assert_eq!(TokenKind::Identifier.to_string(), "Identifier");

        let word = Token::new(TokenKind::Keyword, Some("hunt".into()), 3);
        assert_eq!(word.describe(), "Keyword `hunt`");
        assert_eq!(word.text(), "hunt");
        assert_eq!(Token::symbol(TokenKind::Chain, 1).text(), "@@");
    }
}
