//! Lexer
//!
//!     Tokenization is line oriented and happens in two steps per line:
//!
//!     1. Leading whitespace is measured in indent units (one tab, or `indent_width` spaces,
//!        partial units rounded down) and compared to the previous non-blank line. The
//!        difference is emitted as that many Indent or Dedent tokens.
//!     2. The remainder of the line goes through the logos lexer in [raw].
//!
//!     Blank lines never change the level. Every level still open at end of input is closed
//!     with a Dedent, so Indent and Dedent counts always balance.
//!
//!     Lexing never fails: unknown characters become Char tokens.

mod detokenizer;
mod indentation;
pub(crate) mod raw;

pub use detokenizer::detokenize;
pub use indentation::indent_units;

use crate::dsl::token::{Token, TokenKind};

pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Tokenize with the default indent width.
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_with_width(source, DEFAULT_INDENT_WIDTH)
}

pub fn tokenize_with_width(source: &str, indent_width: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut level = 0usize;
    let mut last_line = 0usize;

    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        last_line = number;
        if line.trim().is_empty() {
            continue;
        }

        let (units, consumed) = indent_units(line, indent_width);
        if units > level {
            tokens.extend((level..units).map(|_| Token::symbol(TokenKind::Indent, number)));
        } else {
            tokens.extend((units..level).map(|_| Token::symbol(TokenKind::Dedent, number)));
        }
        level = units;

        raw::lex_line(&line[consumed..], number, &mut tokens);
    }

    tokens.extend((0..level).map(|_| Token::symbol(TokenKind::Dedent, last_line.max(1))));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_nested_source_emits_layout() {
        let source = "<hunt Track:box\n    [GATHER\n        {tag:frame = (val \"+\")}\n    ]\n>";
        let tokens = tokenize(source);

        let indents: Vec<usize> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Indent)
            .map(|t| t.line)
            .collect();
        let dedents: Vec<usize> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Dedent)
            .map(|t| t.line)
            .collect();
        assert_eq!(indents, vec![2, 3]);
        assert_eq!(dedents, vec![4, 5]);
    }

    #[test]
    fn test_blank_lines_keep_level() {
        assert_eq!(
            kinds("<a\n    [b\n\n    ]>"),
            vec![
                TokenKind::AlphaOpen,
                TokenKind::Identifier,
                TokenKind::Indent,
                TokenKind::BetaOpen,
                TokenKind::Identifier,
                TokenKind::BetaClose,
                TokenKind::AlphaClose,
                TokenKind::Dedent,
            ]
        );
    }

    #[test]
    fn test_tabs_and_custom_width() {
        assert_eq!(kinds("\tx"), vec![TokenKind::Indent, TokenKind::Identifier, TokenKind::Dedent]);
        let two = tokenize_with_width("  x\n    y", 2);
        let layout: Vec<TokenKind> = two.iter().map(|t| t.kind).filter(|k| k.is_layout()).collect();
        assert_eq!(
            layout,
            vec![TokenKind::Indent, TokenKind::Indent, TokenKind::Dedent, TokenKind::Dedent]
        );
    }

    #[test]
    fn test_empty_source() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n\n   \n").is_empty());
    }
}
