//! Three-tier style resolution: node data, then document settings, then plugin defaults.
//!
//! Scalars take the first tier that is set. Colors fall back channel by channel, so a node
//! that only sets a hue keeps the document's saturation, lightness and alpha.

use crate::color::{ColorOverride, Hsla, Paint, PartialHsla};
use crate::model::TreeNode;
use crate::settings::{HAlign, TreemapSettings, VAlign};
use std::str::FromStr;

/// First defined tier wins. Effective settings already merge the document tier, so node lookups
/// pass `None` for it.
pub fn cascade<T>(node: Option<T>, document: Option<T>, plugin: T) -> T {
    node.or(document).unwrap_or(plugin)
}

/// Channel-wise color fallback across all three tiers.
pub fn cascade_channels(
    node: Option<PartialHsla>,
    document: Option<PartialHsla>,
    plugin: Hsla,
) -> Hsla {
    let merged = node.unwrap_or_default().or(document.unwrap_or_default());
    plugin.with_channels(&merged)
}

/// Resolves a node color override against an effective setting.
///
/// A CSS string replaces the color outright; a channel object patches the setting.
pub fn resolve_color(node: Option<&ColorOverride>, setting: Hsla) -> Paint {
    match node {
        None => Paint::Hsla(setting),
        Some(ColorOverride::Channels(channels)) => {
            Paint::Hsla(cascade_channels(Some(*channels), None, setting))
        }
        Some(ColorOverride::Css(css)) => Paint::Css(css.clone()),
    }
}

/// Which family of settings applies to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A branch drawn with a header strip.
    Header,
    /// A leaf cell.
    Cell,
}

/// Answers per-node style questions against one render pass's effective settings.
///
/// Size-like values are multiplied by `scale`.
#[derive(Debug, Clone, Copy)]
pub struct StyleResolver<'s> {
    settings: &'s TreemapSettings,
    scale: f64,
}

impl<'s> StyleResolver<'s> {
    pub fn new(settings: &'s TreemapSettings, scale: f64) -> Self {
        Self { settings, scale }
    }

    pub fn settings(&self) -> &'s TreemapSettings {
        self.settings
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn fill(&self, node: &TreeNode, role: Role) -> Paint {
        let setting = match role {
            Role::Header => self.settings.h_fill,
            Role::Cell => self.settings.fill,
        };
        resolve_color(node.fill.as_ref(), setting)
    }

    pub fn border_color(&self, node: &TreeNode, role: Role) -> Paint {
        let setting = match role {
            Role::Header => self.settings.h_border_color,
            Role::Cell => self.settings.border_color,
        };
        resolve_color(node.border_color.as_ref(), setting)
    }

    pub fn text_color(&self, node: &TreeNode, role: Role) -> Paint {
        let setting = match role {
            Role::Header => self.settings.h_text_color,
            Role::Cell => self.settings.text_color,
        };
        resolve_color(node.text_color.as_ref(), setting)
    }

    pub fn shading(&self, node: &TreeNode, role: Role) -> bool {
        let setting = match role {
            Role::Header => self.settings.h_shading,
            Role::Cell => self.settings.shading,
        };
        cascade(node.shading, None, setting)
    }

    pub fn shadow(&self, node: &TreeNode, role: Role) -> bool {
        let setting = match role {
            Role::Header => self.settings.h_shadow,
            Role::Cell => self.settings.shadow,
        };
        cascade(node.shadow, None, setting)
    }

    pub fn text_size(&self, node: &TreeNode, role: Role) -> f64 {
        let setting = match role {
            Role::Header => self.settings.h_text_size,
            Role::Cell => self.settings.text_size,
        };
        cascade(node.text_size, None, setting) * self.scale
    }

    /// Header padding is a diagram-wide setting; only cells honor a node override.
    pub fn text_padding(&self, node: &TreeNode, role: Role) -> f64 {
        match role {
            Role::Header => self.settings.h_text_padding * self.scale,
            Role::Cell => {
                cascade(node.text_padding, None, self.settings.text_padding) * self.scale
            }
        }
    }

    pub fn halign(&self, node: &TreeNode, role: Role) -> HAlign {
        let setting = match role {
            Role::Header => self.settings.h_halign,
            Role::Cell => self.settings.halign,
        };
        cascade(node_alignment(node, "halign", node.halign.as_deref()), None, setting)
    }

    pub fn valign(&self, node: &TreeNode) -> VAlign {
        cascade(
            node_alignment(node, "valign", node.valign.as_deref()),
            None,
            self.settings.valign,
        )
    }
}

fn node_alignment<T: FromStr>(node: &TreeNode, attr: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(node = %node.name, attr, value = raw, "ignoring unknown alignment");
            None
        }
    }
}
