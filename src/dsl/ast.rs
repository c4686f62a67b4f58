//! Syntax tree for the pattern language
//!
//!     The grammar has exactly four nesting levels and each level may only contain the next
//!     one down, so every level is its own struct with a typed child vector:
//!
//!         <alpha [beta {gamma (delta)}]>
//!
//!     A bracket header is `COMMAND [WORD] [: TARGET] [= VALUE]`. The optional second word is
//!     kept as `directive` on alpha brackets (`hunt Track`) and `qualifier` on the inner
//!     levels (`INIT GATHER`, `param tag`). The bridge target always binds to the last header
//!     word. Alpha brackets take no assignment.
//!
//!     [AstNode] is a borrowed view over any level, used where code has to handle all four
//!     uniformly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value in a header assignment or a delta list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    Str(String),
    Word(String),
    Number(String),
}

impl Literal {
    pub fn text(&self) -> &str {
        match self {
            Literal::Str(s) | Literal::Word(s) | Literal::Number(s) => s,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Word(s) | Literal::Number(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<AlphaBracket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaBracket {
    pub command: String,
    pub directive: Option<String>,
    pub bridge_target: Option<String>,
    pub children: Vec<BetaBracket>,
    pub trailing_params: Option<ExecParams>,
    pub line: usize,
}

/// The `<EXEC ...>` block that may follow an alpha bracket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecParams {
    /// Whether the block was introduced with `@@`.
    pub chained: bool,
    pub values: Vec<Literal>,
    pub deltas: Vec<DeltaBracket>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaBracket {
    pub command: String,
    pub qualifier: Option<String>,
    pub bridge_target: Option<String>,
    pub assign_value: Option<Literal>,
    pub children: Vec<GammaBracket>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaBracket {
    pub command: String,
    pub qualifier: Option<String>,
    pub bridge_target: Option<String>,
    pub assign_value: Option<Literal>,
    pub children: Vec<DeltaBracket>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaBracket {
    pub command: String,
    pub values: Vec<Literal>,
    pub line: usize,
}

/// Nesting level of a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Alpha,
    Beta,
    Gamma,
    Delta,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Alpha => "alpha",
            Level::Beta => "beta",
            Level::Gamma => "gamma",
            Level::Delta => "delta",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AstNode<'a> {
    Alpha(&'a AlphaBracket),
    Beta(&'a BetaBracket),
    Gamma(&'a GammaBracket),
    Delta(&'a DeltaBracket),
}

impl<'a> AstNode<'a> {
    pub fn level(&self) -> Level {
        match self {
            AstNode::Alpha(_) => Level::Alpha,
            AstNode::Beta(_) => Level::Beta,
            AstNode::Gamma(_) => Level::Gamma,
            AstNode::Delta(_) => Level::Delta,
        }
    }

    pub fn command(&self) -> &'a str {
        match self {
            AstNode::Alpha(n) => &n.command,
            AstNode::Beta(n) => &n.command,
            AstNode::Gamma(n) => &n.command,
            AstNode::Delta(n) => &n.command,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            AstNode::Alpha(n) => n.line,
            AstNode::Beta(n) => n.line,
            AstNode::Gamma(n) => n.line,
            AstNode::Delta(n) => n.line,
        }
    }

    /// Direct children, in source order. EXEC deltas count as children of their alpha.
    pub fn children(&self) -> Vec<AstNode<'a>> {
        match self {
            AstNode::Alpha(n) => n
                .children
                .iter()
                .map(AstNode::Beta)
                .chain(
                    n.trailing_params
                        .iter()
                        .flat_map(|p| p.deltas.iter().map(AstNode::Delta)),
                )
                .collect(),
            AstNode::Beta(n) => n.children.iter().map(AstNode::Gamma).collect(),
            AstNode::Gamma(n) => n.children.iter().map(AstNode::Delta).collect(),
            AstNode::Delta(_) => Vec::new(),
        }
    }
}

impl Program {
    /// Every node in depth-first pre-order.
    pub fn walk(&self) -> Vec<AstNode<'_>> {
        let mut order = Vec::new();
        let mut stack: Vec<AstNode<'_>> = self.items.iter().rev().map(AstNode::Alpha).collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(values: &[&str]) -> DeltaBracket {
        DeltaBracket {
            command: "val".into(),
            values: values.iter().map(|v| Literal::Str(v.to_string())).collect(),
            line: 1,
        }
    }

    #[test]
    fn test_walk_is_preorder() {
        let program = Program {
            items: vec![AlphaBracket {
                command: "hunt".into(),
                directive: None,
                bridge_target: None,
                children: vec![BetaBracket {
                    command: "GATHER".into(),
                    qualifier: None,
                    bridge_target: None,
                    assign_value: None,
                    children: vec![GammaBracket {
                        command: "tag".into(),
                        qualifier: None,
                        bridge_target: Some("button".into()),
                        assign_value: None,
                        children: vec![delta(&["["])],
                        line: 1,
                    }],
                    line: 1,
                }],
                trailing_params: Some(ExecParams {
                    deltas: vec![delta(&["x"])],
                    ..ExecParams::default()
                }),
                line: 1,
            }],
        };

        let levels: Vec<Level> = program.walk().iter().map(AstNode::level).collect();
        assert_eq!(
            levels,
            vec![Level::Alpha, Level::Beta, Level::Gamma, Level::Delta, Level::Delta]
        );
        assert_eq!(program.walk()[2].command(), "tag");
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(Literal::Str("a b".into()).to_string(), "\"a b\"");
        assert_eq!(Literal::Number("3".into()).text(), "3");
    }
}
