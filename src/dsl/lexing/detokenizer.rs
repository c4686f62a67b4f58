//! Detokenizer
//!
//! Converts a token stream back into source text. Tokens on the same source line are
//! joined by single spaces, each line starts with four spaces per open Indent, and
//! string literals are re-quoted. The output re-lexes to the same kinds and literals.

use super::raw::escape;
use crate::dsl::token::{Token, TokenKind};

const INDENT: &str = "    ";

pub fn detokenize(tokens: &[Token]) -> String {
    let mut result = String::new();
    let mut level = 0usize;
    let mut current_line: Option<usize> = None;

    for token in tokens {
        match token.kind {
            TokenKind::Indent => level += 1,
            TokenKind::Dedent => level = level.saturating_sub(1),
            _ => {
                match current_line {
                    Some(line) if line == token.line => result.push(' '),
                    Some(_) => {
                        result.push('\n');
                        result.push_str(&INDENT.repeat(level));
                    }
                    None => result.push_str(&INDENT.repeat(level)),
                }
                current_line = Some(token.line);

                match token.kind {
                    TokenKind::StringLiteral => result.push_str(&escape(token.text())),
                    _ => result.push_str(token.text()),
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::lexing::tokenize;

    fn kinds_and_texts(tokens: &[Token]) -> Vec<(TokenKind, String)> {
        tokens.iter().map(|t| (t.kind, t.text().to_string())).collect()
    }

    #[test]
    fn test_single_line() {
        let tokens = tokenize("<hunt Track:x [GATHER]>");
        assert_eq!(detokenize(&tokens), "< hunt Track : x [ GATHER ] >");
    }

    #[test]
    fn test_layout_survives() {
        let source = "<hunt\n    [INIT x = \"a b\"\n        {val}\n    ]\n>";
        let tokens = tokenize(source);
        let text = detokenize(&tokens);
        assert_eq!(
            text,
            "< hunt\n    [ INIT x = \"a b\"\n        { val }\n    ]\n>"
        );
        assert_eq!(kinds_and_texts(&tokenize(&text)), kinds_and_texts(&tokens));
    }
}
