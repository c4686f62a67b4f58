//! Shared configuration loader for the glyphic toolchain.
//!
//! `defaults/glyphic.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`GlyphicConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use glyphic::codegen::GenerationOptions;
use glyphic::dsl::InterpreterOptions;
use glyphic::pipeline::RecognizerOptions;
use glyphic::recognition::{Connectivity, DiscoveryOptions};

const DEFAULT_TOML: &str = include_str!("../defaults/glyphic.default.toml");

/// Top-level configuration consumed by glyphic applications.
#[derive(Debug, Clone, Deserialize)]
pub struct GlyphicConfig {
    pub recognition: RecognitionConfig,
    pub classifier: ClassifierConfig,
    pub dsl: DslConfig,
    pub codegen: CodegenConfig,
}

/// Mirrors the knobs exposed by the recognizer.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    pub border_chars: String,
    pub connectivity: u8,
    pub bridge_single_spaces: bool,
    pub min_cells: usize,
    pub adjacency_gap: usize,
    pub match_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DslConfig {
    pub indent_width: usize,
    pub fatal_traps: bool,
}

/// Template selection and generation knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct CodegenConfig {
    pub template_set: String,
    pub indent: String,
    pub root_var: String,
    /// Extra values for `{opt:NAME}` placeholders.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl GlyphicConfig {
    pub fn recognizer_options(&self) -> RecognizerOptions {
        let r = &self.recognition;
        RecognizerOptions {
            discovery: DiscoveryOptions {
                border_chars: r.border_chars.clone(),
                connectivity: if r.connectivity == 8 {
                    Connectivity::Eight
                } else {
                    Connectivity::Four
                },
                bridge_single_spaces: r.bridge_single_spaces,
                min_cells: r.min_cells,
            },
            adjacency_gap: r.adjacency_gap,
            match_threshold: r.match_threshold,
        }
    }

    pub fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions {
            indent_width: self.dsl.indent_width,
            fatal_traps: self.dsl.fatal_traps,
        }
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            indent: self.codegen.indent.clone(),
            root_var: self.codegen.root_var.clone(),
            values: self.codegen.values.clone(),
        }
    }
}

/// Builds a [GlyphicConfig] from `glyphic.default.toml` plus any `glyphic.toml` layers.
///
/// Later layers win key by key, so a project file only needs the keys it changes.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Only the compiled-in `glyphic.default.toml`; no file is read yet.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Adds a TOML file that must exist, as passed with `--config`.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Adds a TOML file that may be absent, such as `glyphic.toml` in the working directory.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Sets one dotted key, e.g. `codegen.template_set`, above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merges the layers and deserializes the result into [GlyphicConfig].
    pub fn build(self) -> Result<GlyphicConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The compiled-in settings with no user layers, as used by tests and library callers.
pub fn load_defaults() -> Result<GlyphicConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.recognition.border_chars, "+-|=");
        assert_eq!(config.classifier.max_depth, 16);
        assert_eq!(config.dsl.indent_width, 4);
        assert_eq!(config.codegen.template_set, "html");
        assert!(config.codegen.values.is_empty());
    }

    #[test]
    fn defaults_match_core_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.recognizer_options(), RecognizerOptions::default());
        assert_eq!(config.generation_options(), GenerationOptions::default());
        let dsl = config.interpreter_options();
        assert_eq!(dsl.indent_width, InterpreterOptions::default().indent_width);
        assert!(!dsl.fatal_traps);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("recognition.connectivity", 8i64)
            .expect("override to apply")
            .set_override("codegen.template_set", "tkinter")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(
            config.recognizer_options().discovery.connectivity,
            Connectivity::Eight
        );
        assert_eq!(config.codegen.template_set, "tkinter");
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/definitely/not/here/glyphic.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn optional_file_may_be_absent() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/glyphic.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.recognition.adjacency_gap, 2);
    }
}
