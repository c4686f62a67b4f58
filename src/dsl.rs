//! The pattern language
//!
//!     A small, line-oriented, bracket-nested language for declaring recognition patterns:
//!
//!         < hunt Track:button
//!             [INIT GATHER =
//!                 {param tag:button = (val "[", "]")}
//!             ]
//!         > @@ <EXEC ui>
//!
//!     Source flows through four stages:
//!
//!         source --lexing--> tokens --parsing--> ast --interpreter--> PatternRegistry
//!
//!     - [lexing]: logos-based, never fails, emits Indent/Dedent for leading whitespace.
//!     - [parsing]: strict recursive descent over the four bracket levels.
//!     - [ast]: one struct per level plus the [ast::AstNode] view.
//!     - [interpreter]: static command table, scoped variables, soft warnings.
//!
//!     [load_patterns] runs the whole chain and reports what was registered.

pub mod ast;
pub mod interpreter;
pub mod lexing;
pub mod parsing;
pub mod token;

pub use ast::{AstNode, Level, Literal, Program};
pub use interpreter::{
    load_patterns, DslError, Interpreter, InterpreterOptions, LoadReport, Value,
};
pub use lexing::{detokenize, tokenize, tokenize_with_width};
pub use parsing::{parse, parse_source, ParseError};
pub use token::{Token, TokenKind, KEYWORDS};
