//! Interpreter
//!
//!     Evaluates a parsed program bottom-up. Dispatch goes through a static command table
//!     (see [commands]) keyed by bracket level and command word: each handler receives the
//!     interpreter and its own bracket, evaluates whatever children it cares about and
//!     returns a [Value]. A command missing from the table at that level is an
//!     [DslError::UnknownCommand].
//!
//!     Interpretation writes into a caller-owned [PatternRegistry]; nothing is global, so
//!     every recognition run can bring its own registry.
//!
//!     Scopes are a stack of variable maps. `INIT` pushes one for the duration of its beta
//!     bracket; word literals that name a bound variable resolve to its value.
//!
//!     `scent` and non-fatal `trap` failures become [Warning]s. They are collected on the
//!     interpreter and also logged through `tracing`. `snare` (and `trap` when traps are
//!     configured fatal) aborts with [DslError::Fatal].

pub mod commands;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::dsl::ast::{AstNode, Level, Literal, Program};
use crate::dsl::lexing::DEFAULT_INDENT_WIDTH;
use crate::dsl::parsing::{parse_source, ParseError};
use crate::error::Warning;
use crate::patterns::{PatternDefinition, PatternKind, PatternRegistry, RegistrationError, Rule};

use self::commands::{standard_table, Handler};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DslError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("line {line}: unknown {level} command `{command}`")]
    UnknownCommand {
        level: Level,
        command: String,
        line: usize,
    },
    #[error("line {line}: unknown directive `{directive}` for `{command}`")]
    UnknownDirective {
        command: String,
        directive: String,
        line: usize,
    },
    #[error("line {line}: `{command}` needs a target name")]
    MissingTarget { command: String, line: usize },
    #[error("line {line}: {source}")]
    Registration {
        source: RegistrationError,
        line: usize,
    },
    #[error("line {line}: {message}")]
    Fatal { message: String, line: usize },
}

impl DslError {
    /// Whether the error stops the rest of the source from being interpreted.
    pub fn halts(&self) -> bool {
        matches!(self, DslError::Fatal { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterOptions {
    pub indent_width: usize,
    /// Turn failed `trap` assertions into fatal errors instead of warnings.
    pub fatal_traps: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            fatal_traps: false,
        }
    }
}

/// A named parameter collected by `param` or `boil`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub values: Vec<String>,
}

/// Rules, parameters and registrations gathered from a bracket's children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collected {
    pub rules: Vec<Rule>,
    pub params: Vec<Param>,
    pub registered: Vec<String>,
    /// Line of the first GATHER/GET without its own id whose rules still need a pattern.
    pub unclaimed_gather: Option<usize>,
}

impl Collected {
    pub fn absorb(&mut self, value: Value) {
        match value {
            Value::Nothing | Value::Literals(_) => {}
            Value::Rule(rule) => self.rules.push(rule),
            Value::Param(param) => self.params.push(param),
            Value::Collected(other) => {
                self.rules.extend(other.rules);
                self.params.extend(other.params);
                self.registered.extend(other.registered);
                self.unclaimed_gather = self.unclaimed_gather.or(other.unclaimed_gather);
            }
            Value::Outcome(outcome) => {
                self.rules.extend(outcome.rules);
                self.params.extend(outcome.params);
                self.registered.extend(outcome.registered);
            }
        }
    }
}

/// Result of an alpha bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HuntOutcome {
    pub command: String,
    /// Id of the pattern this bracket registered, if any.
    pub pattern_id: Option<String>,
    pub rules: Vec<Rule>,
    pub params: Vec<Param>,
    /// Resolved EXEC parameters.
    pub exec: Vec<String>,
    /// Every id registered while evaluating the bracket, inner ones first.
    pub registered: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "value", content = "data", rename_all = "lowercase")]
pub enum Value {
    Nothing,
    Literals(Vec<Literal>),
    Rule(Rule),
    Param(Param),
    Collected(Collected),
    Outcome(HuntOutcome),
}

pub struct Interpreter<'r> {
    registry: &'r mut PatternRegistry,
    options: InterpreterOptions,
    scopes: Vec<BTreeMap<String, Literal>>,
    warnings: Vec<Warning>,
    registered: Vec<String>,
}

impl<'r> Interpreter<'r> {
    pub fn new(registry: &'r mut PatternRegistry, options: InterpreterOptions) -> Self {
        Self {
            registry,
            options,
            scopes: vec![BTreeMap::new()],
            warnings: Vec::new(),
            registered: Vec::new(),
        }
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    /// Evaluate every alpha bracket, stopping at the first error.
    pub fn run(&mut self, program: &Program) -> Result<Vec<Value>, DslError> {
        program
            .items
            .iter()
            .map(|alpha| self.eval(AstNode::Alpha(alpha)))
            .collect()
    }

    pub fn eval(&mut self, node: AstNode<'_>) -> Result<Value, DslError> {
        let unknown = || DslError::UnknownCommand {
            level: node.level(),
            command: node.command().to_string(),
            line: node.line(),
        };
        let handler = standard_table()
            .get(node.level(), node.command())
            .ok_or_else(unknown)?;

        match (node, handler) {
            (AstNode::Alpha(bracket), Handler::Alpha(f)) => f(self, bracket),
            (AstNode::Beta(bracket), Handler::Beta(f)) => f(self, bracket),
            (AstNode::Gamma(bracket), Handler::Gamma(f)) => f(self, bracket),
            (AstNode::Delta(bracket), Handler::Delta(f)) => f(self, bracket),
            _ => Err(unknown()),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Ids registered so far, in registration order.
    pub fn registered(&self) -> &[String] {
        &self.registered
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>, line: usize) {
        let warning = Warning::at_line(message, line);
        tracing::warn!(line, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub(crate) fn with_scope<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(BTreeMap::new());
        let result = body(self);
        self.scopes.pop();
        result
    }

    pub(crate) fn bind(&mut self, name: impl Into<String>, value: Literal) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Literal> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Substitute a bound variable for a word literal.
    pub(crate) fn resolve(&self, literal: &Literal) -> Literal {
        match literal {
            Literal::Word(word) => self.lookup(word).cloned().unwrap_or_else(|| literal.clone()),
            other => other.clone(),
        }
    }

    pub(crate) fn register(
        &mut self,
        definition: PatternDefinition,
        line: usize,
    ) -> Result<String, DslError> {
        let id = definition.id.clone();
        self.registry
            .register(definition)
            .map_err(|source| DslError::Registration { source, line })?;
        self.registered.push(id.clone());
        Ok(id)
    }

    /// First `<kind>_<n>` (n from 1) not yet in the registry.
    pub(crate) fn default_id(&self, kind: PatternKind) -> String {
        (1..)
            .map(|n| format!("{}_{}", kind.as_str(), n))
            .find(|id| !self.registry.contains(id))
            .unwrap_or_else(|| kind.as_str().to_string())
    }
}

/// Outcome of [load_patterns].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    pub registered: Vec<String>,
    pub errors: Vec<DslError>,
    pub warnings: Vec<Warning>,
    /// A fatal error stopped interpretation before the end of the source.
    pub halted: bool,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse `source` and interpret it into `registry`.
///
/// A parse error registers nothing. Otherwise each alpha bracket is interpreted in turn: a
/// failing bracket is reported and skipped, except for fatal errors, which stop the run.
/// Patterns registered before a failure stay registered.
pub fn load_patterns(
    source: &str,
    registry: &mut PatternRegistry,
    options: &InterpreterOptions,
) -> LoadReport {
    let mut report = LoadReport::default();
    let program = match parse_source(source, options.indent_width) {
        Ok(program) => program,
        Err(err) => {
            tracing::error!(error = %err, "pattern source does not parse");
            report.errors.push(err.into());
            return report;
        }
    };

    let mut interpreter = Interpreter::new(registry, options.clone());
    for alpha in &program.items {
        match interpreter.eval(AstNode::Alpha(alpha)) {
            Ok(_) => {}
            Err(err) if err.halts() => {
                tracing::error!(error = %err, "pattern interpretation halted");
                report.errors.push(err);
                report.halted = true;
                break;
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping pattern bracket");
                report.errors.push(err);
            }
        }
    }

    report.registered = interpreter.registered().to_vec();
    report.warnings = interpreter.take_warnings();
    tracing::info!(
        registered = report.registered.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "patterns loaded"
    );
    report
}
