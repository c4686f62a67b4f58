//! Command table and handlers
//!
//!     The table maps `(level, command)` to a plain function pointer. It is built once, on
//!     first use, from [CommandTable::standard]; registering the same command twice at one
//!     level is a [RegistrationError], so a broken table is caught the first time anything
//!     is interpreted.
//!
//!     | level | commands                                               |
//!     |-------|--------------------------------------------------------|
//!     | alpha | hunt, Track, GATHER, GET, Relate                       |
//!     | beta  | INIT, GATHER, GET, param, scent, snare, trap           |
//!     | gamma | param, tag, pluck, boil, scent, snare, trap            |
//!     | delta | val                                                    |

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{Collected, DslError, HuntOutcome, Interpreter, Param, Value};
use crate::dsl::ast::{
    AlphaBracket, AstNode, BetaBracket, DeltaBracket, GammaBracket, Level, Literal,
};
use crate::patterns::{PatternDefinition, PatternKind, RegistrationError, Rule, RuleCommand};

pub type AlphaFn = fn(&mut Interpreter<'_>, &AlphaBracket) -> Result<Value, DslError>;
pub type BetaFn = fn(&mut Interpreter<'_>, &BetaBracket) -> Result<Value, DslError>;
pub type GammaFn = fn(&mut Interpreter<'_>, &GammaBracket) -> Result<Value, DslError>;
pub type DeltaFn = fn(&mut Interpreter<'_>, &DeltaBracket) -> Result<Value, DslError>;

#[derive(Clone, Copy)]
pub enum Handler {
    Alpha(AlphaFn),
    Beta(BetaFn),
    Gamma(GammaFn),
    Delta(DeltaFn),
}

impl Handler {
    pub fn level(&self) -> Level {
        match self {
            Handler::Alpha(_) => Level::Alpha,
            Handler::Beta(_) => Level::Beta,
            Handler::Gamma(_) => Level::Gamma,
            Handler::Delta(_) => Level::Delta,
        }
    }
}

#[derive(Default)]
pub struct CommandTable {
    levels: BTreeMap<Level, HashMap<&'static str, Handler>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        command: &'static str,
        handler: Handler,
    ) -> Result<(), RegistrationError> {
        let level = handler.level();
        let commands = self.levels.entry(level).or_default();
        if commands.contains_key(command) {
            return Err(RegistrationError::DuplicateCommand {
                level,
                command: command.to_string(),
            });
        }
        commands.insert(command, handler);
        Ok(())
    }

    pub fn get(&self, level: Level, command: &str) -> Option<Handler> {
        self.levels.get(&level)?.get(command).copied()
    }

    /// Command words known at `level`, sorted.
    pub fn commands(&self, level: Level) -> Vec<&'static str> {
        let mut commands: Vec<&'static str> = self
            .levels
            .get(&level)
            .map(|c| c.keys().copied().collect())
            .unwrap_or_default();
        commands.sort_unstable();
        commands
    }

    pub fn standard() -> Result<Self, RegistrationError> {
        let mut table = Self::new();

        table.register("hunt", Handler::Alpha(alpha_hunt))?;
        table.register("Track", Handler::Alpha(alpha_track))?;
        table.register("GATHER", Handler::Alpha(alpha_gather))?;
        table.register("GET", Handler::Alpha(alpha_gather))?;
        table.register("Relate", Handler::Alpha(alpha_relate))?;

        table.register("INIT", Handler::Beta(beta_init))?;
        table.register("GATHER", Handler::Beta(beta_gather))?;
        table.register("GET", Handler::Beta(beta_gather))?;
        table.register("param", Handler::Beta(beta_param))?;
        table.register("scent", Handler::Beta(beta_scent))?;
        table.register("snare", Handler::Beta(beta_snare))?;
        table.register("trap", Handler::Beta(beta_trap))?;

        table.register("param", Handler::Gamma(gamma_param))?;
        table.register("tag", Handler::Gamma(gamma_tag))?;
        table.register("pluck", Handler::Gamma(gamma_pluck))?;
        table.register("boil", Handler::Gamma(gamma_boil))?;
        table.register("scent", Handler::Gamma(gamma_scent))?;
        table.register("snare", Handler::Gamma(gamma_snare))?;
        table.register("trap", Handler::Gamma(gamma_trap))?;

        table.register("val", Handler::Delta(delta_val))?;

        Ok(table)
    }
}

static STANDARD: Lazy<CommandTable> = Lazy::new(|| {
    CommandTable::standard().expect("standard command table has a duplicate entry")
});

pub fn standard_table() -> &'static CommandTable {
    &STANDARD
}

fn is_gather_word(word: &str) -> bool {
    matches!(word, "GATHER" | "GET")
}

fn kind_for_directive(word: &str) -> Option<PatternKind> {
    match word {
        "Track" => Some(PatternKind::Track),
        "Relate" => Some(PatternKind::Relate),
        w if is_gather_word(w) => Some(PatternKind::Gather),
        _ => None,
    }
}

fn tags_for(rules: &[Rule], extra: &[String]) -> BTreeSet<String> {
    extra
        .iter()
        .cloned()
        .chain(
            rules
                .iter()
                .filter(|r| r.command == RuleCommand::Tag)
                .map(|r| r.target.clone()),
        )
        .collect()
}

// alpha

fn alpha_hunt(interp: &mut Interpreter<'_>, alpha: &AlphaBracket) -> Result<Value, DslError> {
    let kind = match alpha.directive.as_deref() {
        None => None,
        Some(directive) => Some(kind_for_directive(directive).ok_or_else(|| {
            DslError::UnknownDirective {
                command: alpha.command.clone(),
                directive: directive.to_string(),
                line: alpha.line,
            }
        })?),
    };
    hunt(interp, alpha, kind)
}

fn alpha_track(interp: &mut Interpreter<'_>, alpha: &AlphaBracket) -> Result<Value, DslError> {
    hunt(interp, alpha, Some(PatternKind::Track))
}

fn alpha_gather(interp: &mut Interpreter<'_>, alpha: &AlphaBracket) -> Result<Value, DslError> {
    hunt(interp, alpha, Some(PatternKind::Gather))
}

fn alpha_relate(interp: &mut Interpreter<'_>, alpha: &AlphaBracket) -> Result<Value, DslError> {
    hunt(interp, alpha, Some(PatternKind::Relate))
}

fn hunt(
    interp: &mut Interpreter<'_>,
    alpha: &AlphaBracket,
    kind: Option<PatternKind>,
) -> Result<Value, DslError> {
    let mut collected = Collected::default();
    for beta in &alpha.children {
        collected.absorb(interp.eval(AstNode::Beta(beta))?);
    }

    let mut exec = Vec::new();
    if let Some(params) = &alpha.trailing_params {
        exec.extend(params.values.iter().map(|v| interp.resolve(v).text().to_string()));
        for delta in &params.deltas {
            exec.extend(literal_texts(interp.eval(AstNode::Delta(delta))?));
        }
    }

    let kind = match (kind, collected.unclaimed_gather) {
        (Some(kind), _) => Some(kind),
        (None, Some(_)) if collected.registered.is_empty() => Some(PatternKind::Gather),
        (None, Some(line)) => {
            interp.warn(
                format!(
                    "GATHER/GET rules without an id were not registered (bracket already registered `{}`)",
                    collected.registered.join("`, `")
                ),
                line,
            );
            None
        }
        (None, None) => None,
    };

    let mut pattern_id = None;
    if let Some(kind) = kind {
        let id = alpha
            .bridge_target
            .clone()
            .unwrap_or_else(|| interp.default_id(kind));
        let definition = PatternDefinition {
            id,
            kind,
            tags: tags_for(&collected.rules, &exec),
            rules: collected.rules.clone(),
        };
        let id = interp.register(definition, alpha.line)?;
        collected.registered.push(id.clone());
        pattern_id = Some(id);
    }

    Ok(Value::Outcome(HuntOutcome {
        command: alpha.command.clone(),
        pattern_id,
        rules: collected.rules,
        params: collected.params,
        exec,
        registered: collected.registered,
    }))
}

// beta

fn collect_gammas(
    interp: &mut Interpreter<'_>,
    beta: &BetaBracket,
) -> Result<Collected, DslError> {
    let mut collected = Collected::default();
    for gamma in &beta.children {
        collected.absorb(interp.eval(AstNode::Gamma(gamma))?);
    }
    Ok(collected)
}

fn gather(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    let mut collected = collect_gammas(interp, beta)?;
    if let Some(id) = &beta.bridge_target {
        let definition = PatternDefinition {
            id: id.clone(),
            kind: PatternKind::Gather,
            tags: tags_for(&collected.rules, &[]),
            rules: collected.rules.clone(),
        };
        let id = interp.register(definition, beta.line)?;
        collected.registered.push(id);
    } else if !collected.rules.is_empty() {
        collected.unclaimed_gather.get_or_insert(beta.line);
    }
    Ok(Value::Collected(collected))
}

fn beta_init(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    let gathers = beta.qualifier.as_deref().is_some_and(is_gather_word);
    let binding = if gathers {
        None
    } else {
        beta.qualifier.clone().or_else(|| beta.bridge_target.clone())
    };

    interp.with_scope(|interp| {
        if let (Some(name), Some(value)) = (binding, &beta.assign_value) {
            let value = interp.resolve(value);
            interp.bind(name, value);
        }
        if gathers {
            gather(interp, beta)
        } else {
            collect_gammas(interp, beta).map(Value::Collected)
        }
    })
}

fn beta_gather(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    gather(interp, beta)
}

fn beta_param(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    let mut collected = collect_gammas(interp, beta)?;
    if let Some(value) = &beta.assign_value {
        let name = beta
            .bridge_target
            .clone()
            .or_else(|| beta.qualifier.clone())
            .unwrap_or_else(|| beta.command.clone());
        collected.params.push(Param {
            name,
            values: vec![interp.resolve(value).text().to_string()],
        });
    }
    Ok(Value::Collected(collected))
}

fn beta_values(interp: &Interpreter<'_>, beta: &BetaBracket) -> Vec<String> {
    beta.assign_value
        .iter()
        .map(|v| interp.resolve(v).text().to_string())
        .collect()
}

fn beta_scent(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    let values = beta_values(interp, beta);
    scent(interp, beta.bridge_target.as_deref(), &values, beta.line)
}

fn beta_snare(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    let values = beta_values(interp, beta);
    snare(beta.bridge_target.as_deref(), &values, beta.line)
}

fn beta_trap(interp: &mut Interpreter<'_>, beta: &BetaBracket) -> Result<Value, DslError> {
    let values = beta_values(interp, beta);
    let target = beta.bridge_target.as_deref().or(beta.qualifier.as_deref());
    trap(interp, &beta.command, target, &values, beta.line)
}

// gamma

fn gamma_values(
    interp: &mut Interpreter<'_>,
    gamma: &GammaBracket,
) -> Result<Vec<String>, DslError> {
    let mut values: Vec<String> = gamma
        .assign_value
        .iter()
        .map(|v| interp.resolve(v).text().to_string())
        .collect();
    for delta in &gamma.children {
        values.extend(literal_texts(interp.eval(AstNode::Delta(delta))?));
    }
    Ok(values)
}

fn gamma_target(gamma: &GammaBracket) -> Result<String, DslError> {
    gamma
        .bridge_target
        .clone()
        .or_else(|| gamma.qualifier.clone())
        .ok_or_else(|| DslError::MissingTarget {
            command: gamma.command.clone(),
            line: gamma.line,
        })
}

fn gamma_param(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    let values = gamma_values(interp, gamma)?;
    if let Some(command) = gamma.qualifier.as_deref().and_then(RuleCommand::from_word) {
        let target = gamma.bridge_target.clone().ok_or_else(|| DslError::MissingTarget {
            command: format!("{} {}", gamma.command, command.as_str()),
            line: gamma.line,
        })?;
        return Ok(Value::Rule(Rule::new(command, target, values)));
    }

    let name = gamma
        .bridge_target
        .clone()
        .or_else(|| gamma.qualifier.clone())
        .unwrap_or_else(|| gamma.command.clone());
    Ok(Value::Param(Param { name, values }))
}

fn gamma_rule(
    interp: &mut Interpreter<'_>,
    gamma: &GammaBracket,
    command: RuleCommand,
) -> Result<Value, DslError> {
    let target = gamma_target(gamma)?;
    let values = gamma_values(interp, gamma)?;
    Ok(Value::Rule(Rule::new(command, target, values)))
}

fn gamma_tag(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    gamma_rule(interp, gamma, RuleCommand::Tag)
}

fn gamma_pluck(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    gamma_rule(interp, gamma, RuleCommand::Pluck)
}

fn gamma_boil(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    let values = gamma_values(interp, gamma)?;
    let name = gamma
        .bridge_target
        .clone()
        .or_else(|| gamma.qualifier.clone())
        .unwrap_or_else(|| gamma.command.clone());
    Ok(Value::Param(Param {
        name,
        values: vec![values.concat()],
    }))
}

fn gamma_scent(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    let values = gamma_values(interp, gamma)?;
    scent(interp, gamma.bridge_target.as_deref(), &values, gamma.line)
}

fn gamma_snare(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    let values = gamma_values(interp, gamma)?;
    snare(gamma.bridge_target.as_deref(), &values, gamma.line)
}

fn gamma_trap(interp: &mut Interpreter<'_>, gamma: &GammaBracket) -> Result<Value, DslError> {
    let values = gamma_values(interp, gamma)?;
    let target = gamma.bridge_target.as_deref().or(gamma.qualifier.as_deref());
    trap(interp, &gamma.command, target, &values, gamma.line)
}

// delta

fn delta_val(interp: &mut Interpreter<'_>, delta: &DeltaBracket) -> Result<Value, DslError> {
    Ok(Value::Literals(
        delta.values.iter().map(|v| interp.resolve(v)).collect(),
    ))
}

fn literal_texts(value: Value) -> Vec<String> {
    match value {
        Value::Literals(literals) => literals.iter().map(|l| l.text().to_string()).collect(),
        _ => Vec::new(),
    }
}

// side effects

fn message(target: Option<&str>, values: &[String], fallback: &str) -> String {
    if !values.is_empty() {
        values.join(" ")
    } else {
        target.unwrap_or(fallback).to_string()
    }
}

fn scent(
    interp: &mut Interpreter<'_>,
    target: Option<&str>,
    values: &[String],
    line: usize,
) -> Result<Value, DslError> {
    interp.warn(message(target, values, "scent"), line);
    Ok(Value::Nothing)
}

fn snare(target: Option<&str>, values: &[String], line: usize) -> Result<Value, DslError> {
    Err(DslError::Fatal {
        message: message(target, values, "snare triggered"),
        line,
    })
}

fn trap(
    interp: &mut Interpreter<'_>,
    command: &str,
    target: Option<&str>,
    expected: &[String],
    line: usize,
) -> Result<Value, DslError> {
    let name = target.ok_or_else(|| DslError::MissingTarget {
        command: command.to_string(),
        line,
    })?;

    let failure = match interp.lookup(name).map(Literal::text) {
        None => Some(format!("trap `{name}`: variable is not bound")),
        Some(bound) if !expected.is_empty() && !expected.iter().any(|e| e == bound) => Some(
            format!("trap `{name}`: `{bound}` is not one of {}", expected.join(", ")),
        ),
        Some(_) => None,
    };

    match failure {
        None => Ok(Value::Nothing),
        Some(message) if interp.options().fatal_traps => Err(DslError::Fatal { message, line }),
        Some(message) => {
            interp.warn(message, line);
            Ok(Value::Nothing)
        }
    }
}
