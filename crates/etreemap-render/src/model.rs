use etreemap_core::Hierarchy;
use serde::Serialize;

/// Serializable result of the rectangle layout, in paint (breadth-first) order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapLayout {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub nodes: Vec<LayoutNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub name: String,
    pub depth: usize,
    pub weight: f64,
    pub leaf: bool,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl TreemapLayout {
    pub fn from_hierarchy(hierarchy: &Hierarchy<'_>, width: f64, height: f64, scale: f64) -> Self {
        let nodes = hierarchy
            .descendants()
            .into_iter()
            .map(|idx| {
                let n = hierarchy.node(idx);
                LayoutNode {
                    name: n.node.name.clone(),
                    depth: n.depth,
                    weight: n.weight,
                    leaf: n.is_leaf(),
                    x0: n.rect.x0,
                    y0: n.rect.y0,
                    x1: n.rect.x1,
                    y1: n.rect.y1,
                }
            })
            .collect();
        Self {
            width,
            height,
            scale,
            nodes,
        }
    }

    pub fn find(&self, name: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

impl LayoutNode {
    pub fn area(&self) -> f64 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}
