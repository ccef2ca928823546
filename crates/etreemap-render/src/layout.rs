//! Rectangle layout: writes `rect` into every node of a [`Hierarchy`].
//!
//! [`SquarifiedLayout`] follows d3-hierarchy's `treemap()` with `treemapSquarify`, so cell
//! positions match the browser rendering for the same padding and size.

use etreemap_core::{Hierarchy, Rect};
use serde::Serialize;

/// Canvas size and paddings, already multiplied by the render scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutParams {
    pub width: f64,
    pub height: f64,
    /// Left, right and bottom padding inside every branch.
    pub outer: f64,
    /// Top padding inside every branch (room for the header).
    pub top: f64,
    /// Gap between siblings.
    pub inner: f64,
}

pub trait RectangleLayout {
    fn layout(&self, hierarchy: &mut Hierarchy<'_>, params: &LayoutParams);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquarifiedLayout {
    /// Target aspect ratio of the rows; 1.0 aims for squares.
    pub ratio: f64,
}

impl Default for SquarifiedLayout {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

impl RectangleLayout for SquarifiedLayout {
    fn layout(&self, hierarchy: &mut Hierarchy<'_>, params: &LayoutParams) {
        hierarchy.node_mut(Hierarchy::ROOT).rect = Rect::new(0.0, 0.0, params.width, params.height);

        let mut padding_stack = vec![0.0];
        for idx in hierarchy.each_before() {
            self.position_node(hierarchy, idx, &mut padding_stack, params);
        }
        tracing::debug!(
            nodes = hierarchy.len(),
            width = params.width,
            height = params.height,
            "squarified layout"
        );
    }
}

/// Shrinks a rect by the given insets, collapsing it to its midline when it would invert.
fn inset(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    let (x0, x1) = if x1 < x0 {
        let m = (x0 + x1) / 2.0;
        (m, m)
    } else {
        (x0, x1)
    };
    let (y0, y1) = if y1 < y0 {
        let m = (y0 + y1) / 2.0;
        (m, m)
    } else {
        (y0, y1)
    };
    Rect::new(x0, y0, x1, y1)
}

impl SquarifiedLayout {
    fn position_node(
        &self,
        hierarchy: &mut Hierarchy<'_>,
        idx: usize,
        padding_stack: &mut Vec<f64>,
        params: &LayoutParams,
    ) {
        let depth = hierarchy.node(idx).depth;
        if padding_stack.len() <= depth {
            padding_stack.resize(depth + 1, 0.0);
        }
        let p = padding_stack[depth];
        let r = hierarchy.node(idx).rect;
        let rect = inset(r.x0 + p, r.y0 + p, r.x1 - p, r.y1 - p);
        hierarchy.node_mut(idx).rect = rect;

        if hierarchy.node(idx).is_leaf() {
            return;
        }

        let p = params.inner / 2.0;
        if padding_stack.len() <= depth + 1 {
            padding_stack.resize(depth + 2, 0.0);
        }
        padding_stack[depth + 1] = p;

        let inner = inset(
            rect.x0 + params.outer - p,
            rect.y0 + params.top - p,
            rect.x1 - (params.outer - p),
            rect.y1 - (params.outer - p),
        );
        self.squarify(hierarchy, idx, inner);
    }

    fn squarify(&self, hierarchy: &mut Hierarchy<'_>, parent: usize, area: Rect) {
        let children = hierarchy.node(parent).children.clone();
        let n = children.len();
        let weight = |h: &Hierarchy<'_>, i: usize| h.node(children[i]).weight;

        let Rect {
            mut x0,
            mut y0,
            x1,
            y1,
        } = area;
        let mut value = hierarchy.node(parent).weight;
        let mut i0 = 0usize;
        let mut i1 = 0usize;

        while i0 < n {
            let dx = x1 - x0;
            let dy = y1 - y0;

            // Skip leading zero-weight nodes; they join the next row.
            let mut sum_value;
            loop {
                sum_value = weight(hierarchy, i1);
                i1 += 1;
                if sum_value != 0.0 || i1 >= n {
                    break;
                }
            }

            let mut min_value = sum_value;
            let mut max_value = sum_value;
            let alpha = (dy / dx).max(dx / dy) / (value * self.ratio);
            let mut beta = sum_value * sum_value * alpha;
            let mut min_ratio = (max_value / beta).max(beta / min_value);

            while i1 < n {
                let node_value = weight(hierarchy, i1);
                sum_value += node_value;
                min_value = min_value.min(node_value);
                max_value = max_value.max(node_value);
                beta = sum_value * sum_value * alpha;
                let new_ratio = (max_value / beta).max(beta / min_value);
                if new_ratio > min_ratio {
                    sum_value -= node_value;
                    break;
                }
                min_ratio = new_ratio;
                i1 += 1;
            }

            let row = &children[i0..i1];
            if dx < dy {
                let y2 = if value != 0.0 {
                    y0 + dy * sum_value / value
                } else {
                    y1
                };
                dice(hierarchy, row, sum_value, Rect::new(x0, y0, x1, y2));
                y0 = y2;
            } else {
                let x2 = if value != 0.0 {
                    x0 + dx * sum_value / value
                } else {
                    x1
                };
                slice(hierarchy, row, sum_value, Rect::new(x0, y0, x2, y1));
                x0 = x2;
            }

            value -= sum_value;
            i0 = i1;
        }
    }
}

/// Lays a row out left to right.
fn dice(hierarchy: &mut Hierarchy<'_>, row: &[usize], row_value: f64, area: Rect) {
    let k = if row_value != 0.0 {
        area.width() / row_value
    } else {
        0.0
    };
    let mut x = area.x0;
    for &child in row {
        let node = hierarchy.node_mut(child);
        let x_next = x + node.weight * k;
        node.rect = Rect::new(x, area.y0, x_next, area.y1);
        x = x_next;
    }
}

/// Lays a column out top to bottom.
fn slice(hierarchy: &mut Hierarchy<'_>, row: &[usize], row_value: f64, area: Rect) {
    let k = if row_value != 0.0 {
        area.height() / row_value
    } else {
        0.0
    };
    let mut y = area.y0;
    for &child in row {
        let node = hierarchy.node_mut(child);
        let y_next = y + node.weight * k;
        node.rect = Rect::new(area.x0, y, area.x1, y_next);
        y = y_next;
    }
}
