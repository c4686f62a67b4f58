//! Parser
//!
//!     Strict recursive descent over the four bracket levels, one method per level:
//!
//!         program := alpha*
//!         alpha   := '<' WORD [WORD] [':' WORD] beta* '>' exec?
//!         exec    := ['@@'] '<' 'EXEC' [literal (',' literal)* | delta*] '>'
//!         beta    := '[' WORD [WORD] [':' WORD] ['=' [literal]] gamma* ']'
//!         gamma   := '{' WORD [WORD] [':' WORD] ['=' [literal]] delta* '}'
//!         delta   := '(' WORD [literal (',' literal)*] ')'
//!         literal := STRING | NUMBER | WORD
//!
//!     WORD is a keyword or an identifier. Indent and Dedent tokens are skipped wherever
//!     they appear, so layout is free-form. The first grammar violation is returned as a
//!     [ParseError]; there is no recovery and no partial tree.

use crate::dsl::ast::{
    AlphaBracket, BetaBracket, DeltaBracket, ExecParams, GammaBracket, Literal, Program,
};
use crate::dsl::lexing::tokenize_with_width;
use crate::dsl::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("line {line}: expected {expected}, found end of input")]
    UnexpectedEof { expected: String, line: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. } | ParseError::UnexpectedEof { line, .. } => {
                *line
            }
        }
    }
}

/// Parse a token stream.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    Parser::new(tokens).program()
}

/// Tokenize and parse `source`.
pub fn parse_source(source: &str, indent_width: usize) -> Result<Program, ParseError> {
    let tokens = tokenize_with_width(source, indent_width);
    parse(&tokens)
}

struct Parser<'t> {
    tokens: Vec<&'t Token>,
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens: tokens.iter().filter(|t| !t.kind.is_layout()).collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n).copied()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, expected: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                expected: expected.into(),
                found: token.describe(),
                line: token.line,
            },
            None => ParseError::UnexpectedEof {
                expected: expected.into(),
                line: self.last_line(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token, ParseError> {
        if self.at(kind) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.error(kind.to_string()))
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if token.kind.is_word() => {
                self.pos += 1;
                Ok(token.text().to_string())
            }
            _ => Err(self.error("word")),
        }
    }

    fn optional_word(&mut self) -> Option<String> {
        match self.peek() {
            Some(token) if token.kind.is_word() => {
                self.pos += 1;
                Some(token.text().to_string())
            }
            _ => None,
        }
    }

    fn optional_literal(&mut self) -> Option<Literal> {
        let token = self.peek()?;
        let literal = match token.kind {
            TokenKind::StringLiteral => Literal::Str(token.text().to_string()),
            TokenKind::Number => Literal::Number(token.text().to_string()),
            TokenKind::Keyword | TokenKind::Identifier => Literal::Word(token.text().to_string()),
            _ => return None,
        };
        self.pos += 1;
        Some(literal)
    }

    fn expect_literal(&mut self) -> Result<Literal, ParseError> {
        self.optional_literal().ok_or_else(|| self.error("literal"))
    }

    fn literal_list(&mut self) -> Result<Vec<Literal>, ParseError> {
        let mut values = Vec::new();
        if let Some(first) = self.optional_literal() {
            values.push(first);
            while self.accept(TokenKind::Comma) {
                values.push(self.expect_literal()?);
            }
        }
        Ok(values)
    }

    fn bridge(&mut self) -> Result<Option<String>, ParseError> {
        if self.accept(TokenKind::Bridge) {
            Ok(Some(self.expect_word()?))
        } else {
            Ok(None)
        }
    }

    fn assignment(&mut self) -> Option<Literal> {
        if self.accept(TokenKind::Assign) {
            self.optional_literal()
        } else {
            None
        }
    }

    fn program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            items.push(self.alpha()?);
        }
        Ok(Program { items })
    }

    fn alpha(&mut self) -> Result<AlphaBracket, ParseError> {
        let line = self.expect(TokenKind::AlphaOpen)?.line;
        let command = self.expect_word()?;
        let directive = self.optional_word();
        let bridge_target = self.bridge()?;

        let mut children = Vec::new();
        while self.at(TokenKind::BetaOpen) {
            children.push(self.beta()?);
        }
        self.expect(TokenKind::AlphaClose)?;

        let trailing_params = if self.at_exec() {
            Some(self.exec()?)
        } else {
            None
        };

        Ok(AlphaBracket {
            command,
            directive,
            bridge_target,
            children,
            trailing_params,
            line,
        })
    }

    fn at_exec(&self) -> bool {
        if self.at(TokenKind::Chain) {
            return true;
        }
        self.at(TokenKind::AlphaOpen)
            && self
                .peek_nth(1)
                .is_some_and(|t| t.kind == TokenKind::Keyword && t.text() == "EXEC")
    }

    fn exec(&mut self) -> Result<ExecParams, ParseError> {
        let chained = self.accept(TokenKind::Chain);
        let line = self.expect(TokenKind::AlphaOpen)?.line;
        match self.peek() {
            Some(token) if token.kind == TokenKind::Keyword && token.text() == "EXEC" => {
                self.pos += 1;
            }
            _ => return Err(self.error("Keyword `EXEC`")),
        }

        let mut params = ExecParams {
            chained,
            line,
            ..ExecParams::default()
        };
        if self.at(TokenKind::DeltaOpen) {
            while self.at(TokenKind::DeltaOpen) {
                params.deltas.push(self.delta()?);
            }
        } else {
            params.values = self.literal_list()?;
        }
        self.expect(TokenKind::AlphaClose)?;
        Ok(params)
    }

    fn beta(&mut self) -> Result<BetaBracket, ParseError> {
        let line = self.expect(TokenKind::BetaOpen)?.line;
        let command = self.expect_word()?;
        let qualifier = self.optional_word();
        let bridge_target = self.bridge()?;
        let assign_value = self.assignment();

        let mut children = Vec::new();
        while self.at(TokenKind::GammaOpen) {
            children.push(self.gamma()?);
        }
        self.expect(TokenKind::BetaClose)?;

        Ok(BetaBracket {
            command,
            qualifier,
            bridge_target,
            assign_value,
            children,
            line,
        })
    }

    fn gamma(&mut self) -> Result<GammaBracket, ParseError> {
        let line = self.expect(TokenKind::GammaOpen)?.line;
        let command = self.expect_word()?;
        let qualifier = self.optional_word();
        let bridge_target = self.bridge()?;
        let assign_value = self.assignment();

        let mut children = Vec::new();
        while self.at(TokenKind::DeltaOpen) {
            children.push(self.delta()?);
        }
        self.expect(TokenKind::GammaClose)?;

        Ok(GammaBracket {
            command,
            qualifier,
            bridge_target,
            assign_value,
            children,
            line,
        })
    }

    fn delta(&mut self) -> Result<DeltaBracket, ParseError> {
        let line = self.expect(TokenKind::DeltaOpen)?.line;
        let command = self.expect_word()?;
        let values = self.literal_list()?;
        self.expect(TokenKind::DeltaClose)?;
        Ok(DeltaBracket {
            command,
            values,
            line,
        })
    }
}
