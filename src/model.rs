//! Component model
//!
//!     The recognized UI as a tree. Nodes live in an arena and refer to each other by
//!     [ComponentId]: `children` is the owned, ordered list and `parent` a plain back index.
//!     [ComponentModel::attach] refuses anything that would give a node two parents or close
//!     a cycle, so the structure stays a forest.
//!
//!     Relationships are named, directed edges between arbitrary nodes (`contains`,
//!     `left_of`, relation patterns, ...). They do not affect the tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::grid::BoundingBox;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A property value set by the classifier, the matcher or the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(t) => write!(f, "{}", t),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        PropertyValue::Text(text.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: String,
    pub target: ComponentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractComponent {
    pub id: ComponentId,
    pub ui_role: String,
    pub bounds: BoundingBox,
    /// The component's own rendered lines.
    pub text: Vec<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: Vec<ComponentId>,
    pub parent: Option<ComponentId>,
    pub relationships: Vec<Relationship>,
}

impl AbstractComponent {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Rendered lines joined by newlines, trimmed.
    pub fn text_content(&self) -> String {
        self.text.join("\n").trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),
    #[error("component {child} already has parent {parent}")]
    AlreadyAttached {
        child: ComponentId,
        parent: ComponentId,
    },
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle {
        parent: ComponentId,
        child: ComponentId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentModel {
    nodes: Vec<AbstractComponent>,
    roots: Vec<ComponentId>,
}

impl ComponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node. It stays a root until attached.
    pub fn add(
        &mut self,
        ui_role: impl Into<String>,
        bounds: BoundingBox,
        text: Vec<String>,
    ) -> ComponentId {
        let id = ComponentId(self.nodes.len());
        self.nodes.push(AbstractComponent {
            id,
            ui_role: ui_role.into(),
            bounds,
            text,
            properties: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            relationships: Vec::new(),
        });
        self.roots.push(id);
        id
    }

    fn check(&self, id: ComponentId) -> Result<(), ModelError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownComponent(id))
        }
    }

    /// Make `child` the last child of `parent`.
    pub fn attach(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), ModelError> {
        self.check(parent)?;
        self.check(child)?;
        if let Some(existing) = self.nodes[child.0].parent {
            return Err(ModelError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.ancestors(parent).any(|a| a == child) || parent == child {
            return Err(ModelError::Cycle { parent, child });
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.roots.retain(|r| *r != child);
        Ok(())
    }

    /// `id`'s parent, grandparent, ... up to its root.
    pub fn ancestors(&self, id: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn get(&self, id: ComponentId) -> Option<&AbstractComponent> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut AbstractComponent> {
        self.nodes.get_mut(id.0)
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[ComponentId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbstractComponent> {
        self.nodes.iter()
    }

    /// Pre-order over the forest, roots and children in stored order.
    pub fn depth_first(&self) -> Vec<ComponentId> {
        self.depth_first_with_depth()
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    pub fn depth_first_with_depth(&self) -> Vec<(ComponentId, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(ComponentId, usize)> =
            self.roots.iter().rev().map(|r| (*r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            order.push((id, depth));
            stack.extend(self.children(id).iter().rev().map(|c| (*c, depth + 1)));
        }
        order
    }

    /// Order roots and every child list top-to-bottom, then left-to-right.
    pub fn sort_by_position(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_key(|id| position_key(&self.nodes, *id));
        self.roots = roots;
        for i in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by_key(|id| position_key(&self.nodes, *id));
            self.nodes[i].children = children;
        }
    }

    pub fn find_by_role(&self, role: &str) -> Vec<ComponentId> {
        self.nodes
            .iter()
            .filter(|n| n.ui_role == role)
            .map(|n| n.id)
            .collect()
    }

    /// Record `from --kind--> to`. Adding the same edge twice is a no-op.
    pub fn add_relationship(
        &mut self,
        from: ComponentId,
        kind: impl Into<String>,
        to: ComponentId,
    ) -> Result<(), ModelError> {
        self.check(from)?;
        self.check(to)?;
        let relationship = Relationship {
            kind: kind.into(),
            target: to,
        };
        let node = &mut self.nodes[from.0];
        if !node.relationships.contains(&relationship) {
            node.relationships.push(relationship);
        }
        Ok(())
    }

    pub fn relationships_of(&self, id: ComponentId) -> &[Relationship] {
        self.get(id)
            .map(|n| n.relationships.as_slice())
            .unwrap_or(&[])
    }

    /// Sibling groups: the roots, then every non-empty child list.
    pub fn sibling_groups(&self) -> Vec<Vec<ComponentId>> {
        std::iter::once(self.roots.clone())
            .chain(
                self.nodes
                    .iter()
                    .filter(|n| !n.children.is_empty())
                    .map(|n| n.children.clone()),
            )
            .collect()
    }

    /// Add `left_of`/`right_of` and `above`/`below` between siblings whose boxes share rows
    /// (or columns) and are at most `gap` blank cells apart. Returns the ordered pairs found
    /// (first member left of or above the second).
    pub fn analyze_adjacency(&mut self, gap: usize) -> Vec<(ComponentId, ComponentId)> {
        let mut found = Vec::new();
        for group in self.sibling_groups() {
            for &a in &group {
                for &b in &group {
                    if a == b {
                        continue;
                    }
                    let (ba, bb) = (self.nodes[a.0].bounds, self.nodes[b.0].bounds);
                    let horizontal = ba.rows_overlap(&bb)
                        && bb.x_min > ba.x_max
                        && bb.x_min - ba.x_max - 1 <= gap;
                    let vertical = ba.columns_overlap(&bb)
                        && bb.y_min > ba.y_max
                        && bb.y_min - ba.y_max - 1 <= gap;
                    if horizontal {
                        self.link(a, "left_of", b, "right_of");
                    }
                    if vertical {
                        self.link(a, "above", b, "below");
                    }
                    if horizontal || vertical {
                        found.push((a, b));
                    }
                }
            }
        }
        tracing::debug!(pairs = found.len(), gap, "adjacency analyzed");
        found
    }

    fn link(&mut self, a: ComponentId, forward: &str, b: ComponentId, backward: &str) {
        let forward = Relationship {
            kind: forward.to_string(),
            target: b,
        };
        if !self.nodes[a.0].relationships.contains(&forward) {
            self.nodes[a.0].relationships.push(forward);
        }
        let backward = Relationship {
            kind: backward.to_string(),
            target: a,
        };
        if !self.nodes[b.0].relationships.contains(&backward) {
            self.nodes[b.0].relationships.push(backward);
        }
    }

    /// Indented outline, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        for (id, depth) in self.depth_first_with_depth() {
            let node = &self.nodes[id.0];
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{} {} {}", node.ui_role, id, node.bounds));
            let text = node.text_content();
            if !text.is_empty() && !text.contains('\n') {
                out.push_str(&format!(" {:?}", text));
            }
            out.push('\n');
        }
        out
    }
}

fn position_key(nodes: &[AbstractComponent], id: ComponentId) -> (usize, usize, usize) {
    let b = nodes[id.0].bounds;
    (b.y_min, b.x_min, id.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> (ComponentModel, ComponentId, ComponentId, ComponentId) {
        let mut model = ComponentModel::new();
        let frame = model.add("container", BoundingBox::new(0, 0, 20, 4), vec![]);
        let name = model.add("label", BoundingBox::new(2, 1, 6, 1), vec!["Name:".into()]);
        let input = model.add("input", BoundingBox::new(8, 1, 15, 1), vec!["[______]".into()]);
        model.attach(frame, name).unwrap();
        model.attach(frame, input).unwrap();
        (model, frame, name, input)
    }

    #[test]
    fn test_attach_maintains_roots_and_parents() {
        let (model, frame, name, input) = model();
        assert_eq!(model.roots(), &[frame]);
        assert_eq!(model.children(frame), &[name, input]);
        assert_eq!(model.parent(input), Some(frame));
        assert_eq!(model.depth_first(), vec![frame, name, input]);
    }

    #[test]
    fn test_attach_rejects_bad_edges() {
        let (mut model, frame, name, input) = model();
        assert_eq!(
            model.attach(input, name),
            Err(ModelError::AlreadyAttached {
                child: name,
                parent: frame
            })
        );
        assert_eq!(
            model.attach(name, frame),
            Err(ModelError::Cycle {
                parent: name,
                child: frame
            })
        );
        assert_eq!(
            model.attach(frame, ComponentId(99)),
            Err(ModelError::UnknownComponent(ComponentId(99)))
        );
    }

    #[test]
    fn test_adjacency_between_siblings() {
        let (mut model, frame, name, input) = model();
        let pairs = model.analyze_adjacency(2);
        assert_eq!(pairs, vec![(name, input)]);
        assert_eq!(
            model.relationships_of(name),
            &[Relationship {
                kind: "left_of".into(),
                target: input
            }]
        );
        assert_eq!(model.relationships_of(input)[0].kind, "right_of");
        assert!(model.relationships_of(frame).is_empty());

        assert!(model.analyze_adjacency(0).is_empty());
    }

    #[test]
    fn test_vertical_adjacency() {
        let mut model = ComponentModel::new();
        let top = model.add("label", BoundingBox::new(0, 0, 4, 0), vec![]);
        let bottom = model.add("input", BoundingBox::new(2, 2, 9, 2), vec![]);
        assert_eq!(model.analyze_adjacency(1), vec![(top, bottom)]);
        assert_eq!(model.relationships_of(bottom)[0].kind, "below");
    }

    #[test]
    fn test_sort_by_position() {
        let mut model = ComponentModel::new();
        let right = model.add("label", BoundingBox::new(9, 0, 12, 0), vec![]);
        let below = model.add("label", BoundingBox::new(0, 3, 4, 3), vec![]);
        let left = model.add("label", BoundingBox::new(0, 0, 4, 0), vec![]);
        model.sort_by_position();
        assert_eq!(model.roots(), &[left, right, below]);
    }

    #[test]
    fn test_relationships_are_deduplicated() {
        let (mut model, frame, name, _) = model();
        model.add_relationship(frame, "contains", name).unwrap();
        model.add_relationship(frame, "contains", name).unwrap();
        assert_eq!(model.relationships_of(frame).len(), 1);
        assert_eq!(model.find_by_role("label"), vec![name]);
    }

    #[test]
    fn test_tree_string() {
        let (model, ..) = model();
        assert_eq!(
            model.to_tree_string(),
            "container #0 [0,0 .. 20,4]\n  label #1 [2,1 .. 6,1] \"Name:\"\n  input #2 [8,1 .. 15,1] \"[______]\"\n"
        );
    }

    #[test]
    fn test_serde_roundtrip_keeps_structure() {
        let (mut model, frame, ..) = model();
        model
            .get_mut(frame)
            .unwrap()
            .properties
            .insert("kind".into(), "frame".into());
        let json = serde_json::to_string(&model).unwrap();
        let back: ComponentModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
