//! Core tokens for a single line of DSL source
//!
//! Produced by logos. Anything the lexer cannot match is emitted as a one-character
//! [TokenKind::Char] token and lexing resumes right after it, so this stage never fails.

use logos::Logos;

use crate::dsl::token::{is_keyword, Token, TokenKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub(crate) enum RawToken {
    #[token("<")]
    AlphaOpen,
    #[token(">")]
    AlphaClose,
    #[token("[")]
    BetaOpen,
    #[token("]")]
    BetaClose,
    #[token("{")]
    GammaOpen,
    #[token("}")]
    GammaClose,
    #[token("(")]
    DeltaOpen,
    #[token(")")]
    DeltaClose,
    #[token("=")]
    Assign,
    #[token(":")]
    Bridge,
    #[token("@@")]
    Chain,
    #[token(",")]
    Comma,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
    Word,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,
}

impl RawToken {
    fn into_token(self, slice: &str, line: usize) -> Token {
        let kind = match self {
            RawToken::AlphaOpen => TokenKind::AlphaOpen,
            RawToken::AlphaClose => TokenKind::AlphaClose,
            RawToken::BetaOpen => TokenKind::BetaOpen,
            RawToken::BetaClose => TokenKind::BetaClose,
            RawToken::GammaOpen => TokenKind::GammaOpen,
            RawToken::GammaClose => TokenKind::GammaClose,
            RawToken::DeltaOpen => TokenKind::DeltaOpen,
            RawToken::DeltaClose => TokenKind::DeltaClose,
            RawToken::Assign => TokenKind::Assign,
            RawToken::Bridge => TokenKind::Bridge,
            RawToken::Chain => TokenKind::Chain,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Str => {
                return Token::new(TokenKind::StringLiteral, Some(unescape(slice)), line)
            }
            RawToken::Word if is_keyword(slice) => {
                return Token::new(TokenKind::Keyword, Some(slice.to_string()), line)
            }
            RawToken::Word => {
                return Token::new(TokenKind::Identifier, Some(slice.to_string()), line)
            }
            RawToken::Number => {
                return Token::new(TokenKind::Number, Some(slice.to_string()), line)
            }
        };
        Token::symbol(kind, line)
    }
}

/// Lex one line's content (indentation already removed) into `out`.
pub(crate) fn lex_line(text: &str, line: usize, out: &mut Vec<Token>) {
    let mut offset = 0;
    'restart: while offset < text.len() {
        let mut lexer = RawToken::lexer(&text[offset..]);
        while let Some(result) = lexer.next() {
            match result {
                Ok(raw) => out.push(raw.into_token(lexer.slice(), line)),
                Err(()) => {
                    let start = offset + lexer.span().start;
                    let Some(ch) = text[start..].chars().next() else {
                        break 'restart;
                    };
                    out.push(Token::new(TokenKind::Char, Some(ch.to_string()), line));
                    offset = start + ch.len_utf8();
                    continue 'restart;
                }
            }
        }
        break;
    }
}

/// Strip the quotes of a string token and resolve backslash escapes.
fn unescape(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Inverse of [unescape], including the surrounding quotes.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        let mut out = Vec::new();
        lex_line(text, 1, &mut out);
        out.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_brackets_and_operators() {
        assert_eq!(
            kinds("< [ { ( ) } ] > = : , @@"),
            vec![
                TokenKind::AlphaOpen,
                TokenKind::BetaOpen,
                TokenKind::GammaOpen,
                TokenKind::DeltaOpen,
                TokenKind::DeltaClose,
                TokenKind::GammaClose,
                TokenKind::BetaClose,
                TokenKind::AlphaClose,
                TokenKind::Assign,
                TokenKind::Bridge,
                TokenKind::Comma,
                TokenKind::Chain,
            ]
        );
    }

    #[test]
    fn test_words_numbers_strings() {
        let mut out = Vec::new();
        lex_line(r#"param tag:button -1.5 "a \"b\"""#, 7, &mut out);
        let texts: Vec<&str> = out.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["param", "tag", ":", "button", "-1.5", "a \"b\""]);
        assert_eq!(out[0].kind, TokenKind::Keyword);
        assert_eq!(out[3].kind, TokenKind::Identifier);
        assert_eq!(out[4].kind, TokenKind::Number);
        assert_eq!(out[5].kind, TokenKind::StringLiteral);
        assert!(out.iter().all(|t| t.line == 7));
    }

    #[test]
    fn test_unknown_characters_become_chars() {
        let mut out = Vec::new();
        lex_line("a # @ é b", 1, &mut out);
        let texts: Vec<&str> = out.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["a", "#", "@", "é", "b"]);
        assert_eq!(out[1].kind, TokenKind::Char);
        assert_eq!(out[3].kind, TokenKind::Char);
    }

    #[test]
    fn test_unterminated_quote_is_a_char() {
        let mut out = Vec::new();
        lex_line("\"abc", 1, &mut out);
        assert_eq!(out[0], Token::new(TokenKind::Char, Some("\"".into()), 1));
        assert_eq!(out[1].text(), "abc");
    }

    #[test]
    fn test_escape_roundtrip() {
        let text = "say \"hi\"\\\n";
        let mut out = Vec::new();
        lex_line(&escape(text), 1, &mut out);
        assert_eq!(out[0].text(), text);
    }
}
