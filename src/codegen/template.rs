//! Templates and template sets
//!
//!     A template turns one model node into a block of output lines. Any closure with the
//!     [TemplateFn] shape works; [LineTemplate] covers the common case of fixed lines with
//!     placeholders:
//!
//!         {id} {var} {parent_var} {role} {text} {label}
//!         {x} {y} {width} {height} {prop:NAME} {opt:NAME}
//!
//!     Unknown placeholders are left as written. A line holding only `{{children}}` marks where
//!     the node's children go; without one they are appended after the block.
//!
//!     Values taken from the diagram (`{text}`, `{label}`, `{role}`, `{prop:NAME}`) pass
//!     through the template's [Escape] before they are spliced in. `{opt:NAME}` values come
//!     from configuration and are inserted as given.

use std::collections::HashMap;
use std::fmt;

use super::GenerationOptions;
use crate::model::{AbstractComponent, ComponentId, ComponentModel};

pub const CHILDREN_PLACEHOLDER: &str = "{{children}}";

/// Renders one node: `(component, model, indent, options) -> lines`.
pub type TemplateFn = Box<
    dyn Fn(&AbstractComponent, &ComponentModel, &str, &GenerationOptions) -> Vec<String>
        + Send
        + Sync,
>;

/// Makes diagram text safe to splice into target source.
pub type Escape = fn(&str) -> String;

/// Inserts text unchanged.
pub fn verbatim(text: &str) -> String {
    text.to_string()
}

/// HTML character references for `&`, `<`, `>` and both quotes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Backslash escapes for the inside of a Python string literal.
pub fn escape_python_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// The output variable for a node.
pub fn variable_name(id: ComponentId) -> String {
    format!("w{}", id.0)
}

/// Fixed lines with placeholders, each prefixed with the node's indent.
#[derive(Debug, Clone)]
pub struct LineTemplate {
    lines: Vec<String>,
    escape: Escape,
}

impl LineTemplate {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
            escape: verbatim,
        }
    }

    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.escape = escape;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(
        &self,
        component: &AbstractComponent,
        model: &ComponentModel,
        indent: &str,
        options: &GenerationOptions,
    ) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| {
                if line.trim() == CHILDREN_PLACEHOLDER {
                    return CHILDREN_PLACEHOLDER.to_string();
                }
                let expanded = expand(line, component, model, options, self.escape);
                if expanded.is_empty() {
                    expanded
                } else {
                    format!("{}{}", indent, expanded)
                }
            })
            .collect()
    }

    pub fn into_fn(self) -> TemplateFn {
        Box::new(move |component, model, indent, options| {
            self.render(component, model, indent, options)
        })
    }
}

fn expand(
    line: &str,
    component: &AbstractComponent,
    model: &ComponentModel,
    options: &GenerationOptions,
    escape: Escape,
) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        match placeholder(&after[..end], component, model, options, escape) {
            Some(value) => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder(
    name: &str,
    component: &AbstractComponent,
    model: &ComponentModel,
    options: &GenerationOptions,
    escape: Escape,
) -> Option<String> {
    let bounds = component.bounds;
    let value = match name {
        "id" => component.id.0.to_string(),
        "var" => variable_name(component.id),
        "parent_var" => model
            .parent(component.id)
            .map(variable_name)
            .unwrap_or_else(|| options.root_var.clone()),
        "role" => escape(&component.ui_role),
        "text" => escape(&single_line_text(component)),
        "label" => escape(&label(component)),
        "x" => bounds.x_min.to_string(),
        "y" => bounds.y_min.to_string(),
        "width" => bounds.width().to_string(),
        "height" => bounds.height().to_string(),
        _ => {
            if let Some(prop) = name.strip_prefix("prop:") {
                component
                    .property(prop)
                    .map(|v| escape(&v.to_string()))
                    .unwrap_or_default()
            } else if let Some(key) = name.strip_prefix("opt:") {
                options.values.get(key).cloned().unwrap_or_default()
            } else {
                return None;
            }
        }
    };
    Some(value)
}

fn single_line_text(component: &AbstractComponent) -> String {
    component
        .text
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A plucked `label` property, else the text without its bracket decoration.
fn label(component: &AbstractComponent) -> String {
    if let Some(text) = component.property("label").and_then(|v| v.as_text()) {
        return text.to_string();
    }
    single_line_text(component)
        .trim_matches(|c| "[]<>()_".contains(c))
        .trim()
        .to_string()
}

/// Prologue, epilogue and per-role templates for one target toolkit.
pub struct TemplateSet {
    name: String,
    description: String,
    prologue: Vec<String>,
    epilogue: Vec<String>,
    templates: HashMap<String, TemplateFn>,
    default: Option<TemplateFn>,
    indent_children: bool,
    escape: Escape,
}

impl TemplateSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            prologue: Vec::new(),
            epilogue: Vec::new(),
            templates: HashMap::new(),
            default: None,
            indent_children: true,
            escape: verbatim,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_prologue<S: AsRef<str>>(mut self, lines: &[S]) -> Self {
        self.prologue = lines.iter().map(|l| l.as_ref().to_string()).collect();
        self
    }

    pub fn with_epilogue<S: AsRef<str>>(mut self, lines: &[S]) -> Self {
        self.epilogue = lines.iter().map(|l| l.as_ref().to_string()).collect();
        self
    }

    /// Children render at their parent's indent instead of one level deeper.
    pub fn flat(mut self) -> Self {
        self.indent_children = false;
        self
    }

    /// Escape used by line templates added after this call.
    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.escape = escape;
        self
    }

    pub fn with_template(mut self, role: impl Into<String>, template: TemplateFn) -> Self {
        self.templates.insert(role.into(), template);
        self
    }

    pub fn with_lines<S: AsRef<str>>(self, role: impl Into<String>, lines: &[S]) -> Self {
        let template = LineTemplate::new(lines).with_escape(self.escape);
        self.with_template(role, template.into_fn())
    }

    pub fn with_default(mut self, template: TemplateFn) -> Self {
        self.default = Some(template);
        self
    }

    pub fn with_default_lines<S: AsRef<str>>(self, lines: &[S]) -> Self {
        let template = LineTemplate::new(lines).with_escape(self.escape);
        self.with_default(template.into_fn())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn prologue(&self) -> &[String] {
        &self.prologue
    }

    pub fn epilogue(&self) -> &[String] {
        &self.epilogue
    }

    pub fn indents_children(&self) -> bool {
        self.indent_children
    }

    pub fn escape(&self) -> Escape {
        self.escape
    }

    /// Roles with their own template, sorted.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }

    /// The role's template, else the default.
    pub fn template_for(&self, role: &str) -> Option<&TemplateFn> {
        self.templates.get(role).or(self.default.as_ref())
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("name", &self.name)
            .field("roles", &self.roles())
            .field("default", &self.default.is_some())
            .field("indent_children", &self.indent_children)
            .finish()
    }
}
