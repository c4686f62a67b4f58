//! Subcommand implementations
//!
//! Every command returns the text to print on stdout, or the message to print on stderr
//! before exiting with status 1. Soft warnings go to stderr as they are found.

use std::fs;
use std::path::Path;

use glyphic::classify::Classifier;
use glyphic::codegen::TemplateRegistry;
use glyphic::dsl::{parse_source, tokenize_with_width};
use glyphic::grid::{normalize_lines, Grid};
use glyphic::patterns::PatternRegistry;
use glyphic::{Recognition, Recognizer, Warning};
use glyphic_config::GlyphicConfig;

/// Output formats for `recognize`.
pub const RECOGNIZE_FORMATS: &[&str] = &["json", "yaml", "tree"];

fn read(path: &str) -> Result<String, String> {
    fs::read_to_string(Path::new(path)).map_err(|e| format!("{}: {}", path, e))
}

fn report_warnings<'a>(origin: &str, warnings: impl IntoIterator<Item = &'a Warning>) {
    for warning in warnings {
        eprintln!("warning: {}: {}", origin, warning);
    }
}

pub fn read_grid(path: &str) -> Result<Grid, String> {
    let text = read(path)?;
    Grid::new(&normalize_lines(&text)).map_err(|e| format!("{}: {}", path, e))
}

/// A recognizer configured from `config` with every pattern file loaded.
pub fn build_recognizer(config: &GlyphicConfig, patterns: &[String]) -> Result<Recognizer, String> {
    let classifier =
        Classifier::with_defaults(config.classifier.max_depth).map_err(|e| e.to_string())?;
    let mut recognizer = Recognizer::new(
        PatternRegistry::new(),
        classifier,
        config.recognizer_options(),
    )
    .with_generation_options(config.generation_options());

    let options = config.interpreter_options();
    for path in patterns {
        let source = read(path)?;
        let report = recognizer.load_patterns(&source, &options);
        report_warnings(path, &report.warnings);
        if let Some(error) = report.errors.first() {
            return Err(format!("{}: {}", path, error));
        }
        tracing::info!(path = %path, registered = report.registered.len(), "patterns loaded");
    }
    Ok(recognizer)
}

fn run(
    config: &GlyphicConfig,
    grid_path: &str,
    patterns: &[String],
) -> Result<(Recognizer, Recognition), String> {
    let recognizer = build_recognizer(config, patterns)?;
    let grid = read_grid(grid_path)?;
    let recognition = recognizer.recognize(&grid).map_err(|e| e.to_string())?;
    report_warnings(grid_path, &recognition.warnings);
    Ok((recognizer, recognition))
}

pub fn recognize(
    config: &GlyphicConfig,
    grid_path: &str,
    patterns: &[String],
    format: &str,
) -> Result<String, String> {
    if !RECOGNIZE_FORMATS.contains(&format) {
        return Err(format!(
            "Unknown format '{}'. Available formats: {}",
            format,
            RECOGNIZE_FORMATS.join(", ")
        ));
    }
    let (_, recognition) = run(config, grid_path, patterns)?;
    match format {
        "json" => serde_json::to_string_pretty(&recognition)
            .map(|s| s + "\n")
            .map_err(|e| format!("JSON serialization failed: {}", e)),
        "yaml" => serde_yaml::to_string(&recognition)
            .map_err(|e| format!("YAML serialization failed: {}", e)),
        _ => Ok(recognition.model.to_tree_string()),
    }
}

pub fn generate(
    config: &GlyphicConfig,
    grid_path: &str,
    patterns: &[String],
    template_set: Option<&str>,
) -> Result<String, String> {
    let (recognizer, recognition) = run(config, grid_path, patterns)?;
    let set = template_set.unwrap_or(&config.codegen.template_set);
    recognizer
        .generate(&recognition.model, set)
        .map_err(|e| e.to_string())
}

pub fn tokens(config: &GlyphicConfig, path: &str) -> Result<String, String> {
    let source = read(path)?;
    let tokens = tokenize_with_width(&source, config.dsl.indent_width);
    serde_json::to_string_pretty(&tokens)
        .map(|s| s + "\n")
        .map_err(|e| format!("JSON serialization failed: {}", e))
}

pub fn ast(config: &GlyphicConfig, path: &str) -> Result<String, String> {
    let source = read(path)?;
    let program =
        parse_source(&source, config.dsl.indent_width).map_err(|e| format!("{}: {}", path, e))?;
    serde_json::to_string_pretty(&program)
        .map(|s| s + "\n")
        .map_err(|e| format!("JSON serialization failed: {}", e))
}

/// One line per registered pattern: id, kind and tags.
pub fn patterns(config: &GlyphicConfig, paths: &[String]) -> Result<String, String> {
    let recognizer = build_recognizer(config, paths)?;
    let mut out = String::new();
    for definition in recognizer.registry().iter() {
        let tags: Vec<&str> = definition.tags.iter().map(String::as_str).collect();
        out.push_str(&format!(
            "{}\t{}\t{} rule(s)\ttags: {}\n",
            definition.id,
            definition.kind,
            definition.rules.len(),
            tags.join(", ")
        ));
    }
    Ok(out)
}

pub fn templates() -> String {
    let registry = TemplateRegistry::with_defaults();
    let mut out = String::from("Available template sets:\n\n");
    for name in registry.list_sets() {
        if let Ok(set) = registry.get(&name) {
            out.push_str(&format!("  {}\n    {}\n", name, set.description()));
            out.push_str(&format!("    roles: {}\n\n", set.roles().join(", ")));
        }
    }
    out
}
