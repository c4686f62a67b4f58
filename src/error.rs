//! Crate-level error and warning types
//!
//! Module errors stay close to the code that raises them. [Error] wraps them so the
//! pipeline can use `?` across stage boundaries, and its `Display` passes the inner
//! message through untouched so callers can show it verbatim.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::classify::FitError;
use crate::codegen::CodegenError;
use crate::dsl::{DslError, ParseError};
use crate::grid::GridError;
use crate::model::ModelError;
use crate::patterns::{LookupError, RegistrationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Dsl(#[from] DslError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// A soft diagnostic. Warnings are collected and handed back as a list, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    /// Source line for warnings raised while interpreting DSL text.
    pub line: Option<usize>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
