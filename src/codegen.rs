//! Code generation
//!
//!     Walks a [ComponentModel] depth-first from its roots and renders every node through the
//!     active [TemplateSet]:
//!
//!     - the node's role template is used, else the set's default;
//!     - a node with neither is skipped, and its children render in its place at its indent;
//!     - children go where the block has a `{{children}}` line, else after the block.
//!
//!     The output is the prologue, the root blocks and the epilogue, one line each, with a
//!     trailing newline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{ComponentId, ComponentModel};

mod builtin;
pub mod registry;
pub mod template;

pub use builtin::{html, tkinter};
pub use registry::TemplateRegistry;
pub use template::{
    escape_html, escape_python_string, variable_name, verbatim, Escape, LineTemplate, TemplateFn,
    TemplateSet, CHILDREN_PLACEHOLDER,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("unknown template set `{name}` (available: {available})")]
    UnknownTemplateSet { name: String, available: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// One level of indentation.
    pub indent: String,
    /// `{parent_var}` for root nodes.
    pub root_var: String,
    /// Free values for `{opt:NAME}`.
    pub values: BTreeMap<String, String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            root_var: "root".to_string(),
            values: BTreeMap::new(),
        }
    }
}

pub struct CodeGenerator<'a> {
    set: &'a TemplateSet,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(set: &'a TemplateSet) -> Self {
        Self { set }
    }

    pub fn generate(&self, model: &ComponentModel, options: &GenerationOptions) -> String {
        let mut lines: Vec<String> = self.set.prologue().to_vec();
        for &root in model.roots() {
            lines.extend(self.render(model, root, "", options));
        }
        lines.extend(self.set.epilogue().iter().cloned());
        tracing::debug!(
            set = self.set.name(),
            nodes = model.len(),
            lines = lines.len(),
            "code generated"
        );

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// The block for `id` and its subtree.
    pub fn render(
        &self,
        model: &ComponentModel,
        id: ComponentId,
        indent: &str,
        options: &GenerationOptions,
    ) -> Vec<String> {
        let Some(node) = model.get(id) else {
            return Vec::new();
        };

        let Some(template) = self.set.template_for(&node.ui_role) else {
            tracing::debug!(node = %id, role = %node.ui_role, "no template, node skipped");
            return self.render_children(model, id, indent, options);
        };

        let block = template(node, model, indent, options);
        let child_indent = if self.set.indents_children() {
            format!("{}{}", indent, options.indent)
        } else {
            indent.to_string()
        };
        let children = self.render_children(model, id, &child_indent, options);

        let mut lines = Vec::with_capacity(block.len() + children.len());
        let mut children = Some(children);
        for line in block {
            if line.trim() == CHILDREN_PLACEHOLDER {
                if let Some(children) = children.take() {
                    lines.extend(children);
                }
            } else {
                lines.push(line);
            }
        }
        if let Some(children) = children {
            lines.extend(children);
        }
        lines
    }

    fn render_children(
        &self,
        model: &ComponentModel,
        id: ComponentId,
        indent: &str,
        options: &GenerationOptions,
    ) -> Vec<String> {
        model
            .children(id)
            .iter()
            .flat_map(|&child| self.render(model, child, indent, options))
            .collect()
    }
}
