//! Containment clustering
//!
//!     Box `i` contains box `j` when `i` strictly encloses `j` on all four sides. That relation
//!     is transitive, so the raw graph is already its own transitive closure and an edge
//!     `i -> j` is redundant exactly when some `k` sits between them (`i -> k` and `k -> j`).
//!     Dropping those edges leaves the transitive reduction: for nested A > B > C only A -> B
//!     and B -> C survive.
//!
//!     Roots are the nodes with no incoming reduced edge. Several roots are siblings under an
//!     implicit virtual root.
//!
//!     Overlapping boxes can give a node two reduced containers. All reduced edges are kept,
//!     but the forest picks the smallest-area container (lowest index on ties) as the tree
//!     parent so every node has at most one.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;

use crate::grid::BoundingBox;

/// A reduced containment edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainmentEdge {
    pub container: usize,
    pub contained: usize,
    /// Area of the contained box over area of the container.
    pub score: f64,
}

/// The reduced containment structure over a batch of boxes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainmentForest {
    /// Every edge of the transitive reduction, ordered by (container, contained).
    pub edges: Vec<ContainmentEdge>,
    /// Nodes without a container, top-to-bottom then left-to-right.
    pub roots: Vec<usize>,
    /// Tree parent per node.
    pub parent: Vec<Option<usize>>,
    /// Tree children per node, top-to-bottom then left-to-right.
    pub children: Vec<Vec<usize>>,
}

impl ContainmentForest {
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn has_edge(&self, container: usize, contained: usize) -> bool {
        self.edges
            .iter()
            .any(|e| e.container == container && e.contained == contained)
    }

    /// Node ids in depth-first pre-order following the tree.
    pub fn depth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children[node].iter().rev().copied());
        }
        order
    }
}

/// Builds containment forests from bounding boxes.
#[derive(Debug, Clone, Default)]
pub struct ContainmentClusterer;

impl ContainmentClusterer {
    pub fn new() -> Self {
        Self
    }

    /// The raw strict-containment graph. Node weights are indices into `boxes`.
    pub fn containment_graph(&self, boxes: &[BoundingBox]) -> DiGraph<usize, f64> {
        let mut graph = DiGraph::with_capacity(boxes.len(), 0);
        let nodes: Vec<NodeIndex> = (0..boxes.len()).map(|i| graph.add_node(i)).collect();

        for (i, outer) in boxes.iter().enumerate() {
            for (j, inner) in boxes.iter().enumerate() {
                if i != j && outer.strictly_contains(inner) {
                    let score = inner.area() as f64 / outer.area() as f64;
                    graph.add_edge(nodes[i], nodes[j], score);
                }
            }
        }
        graph
    }

    /// Drop every edge implied by a two-step path.
    pub fn transitive_reduction(&self, graph: &DiGraph<usize, f64>) -> DiGraph<usize, f64> {
        let mut reduced = graph.filter_map(|_, weight| Some(*weight), |_, _| None::<f64>);

        for edge in graph.edge_indices() {
            let Some((from, to)) = graph.edge_endpoints(edge) else {
                continue;
            };
            let implied = graph
                .neighbors_directed(from, Direction::Outgoing)
                .any(|mid| mid != to && graph.contains_edge(mid, to));
            if !implied {
                reduced.add_edge(from, to, graph[edge]);
            }
        }
        reduced
    }

    /// Build the reduced forest for `boxes`.
    pub fn cluster(&self, boxes: &[BoundingBox]) -> ContainmentForest {
        let raw = self.containment_graph(boxes);
        let reduced = self.transitive_reduction(&raw);

        let mut edges: Vec<ContainmentEdge> = reduced
            .edge_indices()
            .filter_map(|edge| {
                let (from, to) = reduced.edge_endpoints(edge)?;
                Some(ContainmentEdge {
                    container: reduced[from],
                    contained: reduced[to],
                    score: reduced[edge],
                })
            })
            .collect();
        edges.sort_by_key(|e| (e.container, e.contained));

        let mut parent: Vec<Option<usize>> = vec![None; boxes.len()];
        for edge in &edges {
            let better = match parent[edge.contained] {
                None => true,
                Some(current) => {
                    let new_area = boxes[edge.container].area();
                    let old_area = boxes[current].area();
                    new_area < old_area || (new_area == old_area && edge.container < current)
                }
            };
            if better {
                parent[edge.contained] = Some(edge.container);
            }
        }

        let reading_order = |a: &usize, b: &usize| {
            let (ba, bb) = (&boxes[*a], &boxes[*b]);
            (ba.y_min, ba.x_min, *a).cmp(&(bb.y_min, bb.x_min, *b))
        };

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); boxes.len()];
        let mut roots = Vec::new();
        for (node, p) in parent.iter().enumerate() {
            match p {
                Some(p) => children[*p].push(node),
                None => roots.push(node),
            }
        }
        roots.sort_by(reading_order);
        for list in &mut children {
            list.sort_by(reading_order);
        }

        tracing::debug!(
            raw_edges = raw.edge_count(),
            reduced_edges = edges.len(),
            roots = roots.len(),
            "containment reduced"
        );

        ContainmentForest {
            edges,
            roots,
            parent,
            children,
        }
    }
}
