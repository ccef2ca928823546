//! Weighted hierarchy over a [`TreeNode`] tree.
//!
//! Nodes live in an index arena; index 0 is the root. Traversal orders follow d3-hierarchy so
//! layouts and paint order stay comparable with the browser rendering.

use crate::model::TreeNode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

#[derive(Debug, Clone)]
pub struct HierNode<'a> {
    pub node: &'a TreeNode,
    /// Own weight plus the weight of every descendant.
    pub weight: f64,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Written by the rectangle layout.
    pub rect: Rect,
}

impl HierNode<'_> {
    /// A node without laid-out children. A branch whose `children` list is empty counts.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy<'a> {
    nodes: Vec<HierNode<'a>>,
}

/// Weight a node contributes on its own, before its children are summed in.
pub fn self_weight(node: &TreeNode) -> f64 {
    match node.value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ if node.is_leaf() => 1.0,
        _ => 0.0,
    }
}

impl<'a> Hierarchy<'a> {
    pub const ROOT: usize = 0;

    pub fn build(root: &'a TreeNode, sort_by_value: bool) -> Self {
        let mut nodes = Vec::new();
        push_node(&mut nodes, root, None, 0);
        let mut hierarchy = Self { nodes };
        hierarchy.compute_weight(Self::ROOT);
        if sort_by_value {
            hierarchy.sort_children_by_weight(Self::ROOT);
        }
        tracing::debug!(
            nodes = hierarchy.nodes.len(),
            weight = hierarchy.nodes[Self::ROOT].weight,
            sort_by_value,
            "built hierarchy"
        );
        hierarchy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &HierNode<'a> {
        &self.nodes[Self::ROOT]
    }

    pub fn get(&self, idx: usize) -> Option<&HierNode<'a>> {
        self.nodes.get(idx)
    }

    pub fn node(&self, idx: usize) -> &HierNode<'a> {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut HierNode<'a> {
        &mut self.nodes[idx]
    }

    pub fn nodes(&self) -> &[HierNode<'a>] {
        &self.nodes
    }

    fn compute_weight(&mut self, idx: usize) -> f64 {
        let mut sum = self_weight(self.nodes[idx].node);
        for c in self.nodes[idx].children.clone() {
            sum += self.compute_weight(c);
        }
        self.nodes[idx].weight = sum;
        sum
    }

    fn sort_children_by_weight(&mut self, idx: usize) {
        let nodes = &self.nodes;
        let mut children = nodes[idx].children.clone();
        // `sort_by` is stable, so equal weights keep document order.
        children.sort_by(|a, b| {
            nodes[*b]
                .weight
                .partial_cmp(&nodes[*a].weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.nodes[idx].children = children.clone();
        for c in children {
            self.sort_children_by_weight(c);
        }
    }

    /// Pre-order: every node is visited before its children.
    pub fn each_before(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            for &c in self.nodes[idx].children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Breadth-first, level by level.
    pub fn descendants(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut next = vec![Self::ROOT];
        while !next.is_empty() {
            let current = std::mem::take(&mut next);
            for idx in current {
                out.push(idx);
                next.extend_from_slice(&self.nodes[idx].children);
            }
        }
        out
    }

    pub fn leaves(&self) -> Vec<usize> {
        self.each_before()
            .into_iter()
            .filter(|&idx| self.nodes[idx].is_leaf())
            .collect()
    }
}

fn push_node<'a>(
    nodes: &mut Vec<HierNode<'a>>,
    node: &'a TreeNode,
    parent: Option<usize>,
    depth: usize,
) {
    let idx = nodes.len();
    nodes.push(HierNode {
        node,
        weight: 0.0,
        depth,
        parent,
        children: Vec::new(),
        rect: Rect::default(),
    });

    if let Some(parent_idx) = parent {
        nodes[parent_idx].children.push(idx);
    }

    for child in node.children() {
        push_node(nodes, child, Some(idx), depth + 1);
    }
}
