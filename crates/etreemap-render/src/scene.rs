//! Scene assembly: resolved styles and fitted labels as draw primitives.
//!
//! Primitives are emitted in layer passes over the hierarchy (breadth-first), each pass in its
//! own group:
//! 1. `cells`: one base rect per node (fill, border, optional drop shadow)
//! 2. `images`: image overlays for nodes that name one
//! 3. `shading`: radial-gradient (or transparent) overlays carrying the node name as title
//! 4. `labels`: wrapped leaf labels
//! 5. `headers`: elided branch headers, only when headers are shown

use crate::layout::LayoutParams;
use crate::text::{LabelBox, LabelLine, TextMeasurer, ellipsize, wrap_label};
use etreemap_core::{
    HAlign, Hierarchy, Hsla, Rect, Role, StyleResolver, TreeNode, TreemapSettings, VAlign,
};

/// Size of the host area the diagram is displayed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    /// Unknown heights follow the configured aspect ratio.
    pub height: Option<f64>,
}

/// Surface geometry for one render pass.
///
/// Layout runs in `width` x `height` units. Padding and text sizes are multiplied by `scale`.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'s> {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub settings: &'s TreemapSettings,
}

impl<'s> RenderContext<'s> {
    /// Fixed-width mode: `settings.width` wide, height from the aspect ratio, unscaled.
    pub fn fixed(settings: &'s TreemapSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.fixed_height(),
            scale: 1.0,
            settings,
        }
    }

    /// Adaptive mode: the layout space is the viewport magnified by the aspect ratio.
    pub fn adaptive(settings: &'s TreemapSettings, viewport: Viewport) -> Self {
        let scale = settings.aspect_ratio;
        let height = viewport
            .height
            .unwrap_or(viewport.width / settings.aspect_ratio);
        Self {
            width: viewport.width * scale,
            height: height * scale,
            scale,
            settings,
        }
    }

    /// Picks fixed or adaptive mode from `settings.fixed_width`.
    pub fn for_settings(settings: &'s TreemapSettings, viewport: Option<Viewport>) -> Self {
        match viewport {
            Some(viewport) if !settings.fixed_width => Self::adaptive(settings, viewport),
            _ => Self::fixed(settings),
        }
    }

    pub fn styles(&self) -> StyleResolver<'s> {
        StyleResolver::new(self.settings, self.scale)
    }

    pub fn layout_params(&self) -> LayoutParams {
        let s = self.settings;
        let outer = s.outer_padding * self.scale;
        let top = if s.show_headers {
            outer + (s.h_text_size + 2.0 * s.h_text_padding) * self.scale
        } else {
            outer
        };
        LayoutParams {
            width: self.width,
            height: self.height,
            outer,
            top,
            inner: outer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Paint(String),
    /// The shared radial shading gradient.
    Gradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowFilter {
    Header,
    Cell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectPrimitive {
    pub node: usize,
    pub rect: Rect,
    pub fill: Fill,
    pub stroke: Option<String>,
    pub filter: Option<ShadowFilter>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePrimitive {
    pub node: usize,
    pub rect: Rect,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Label,
    Header,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub node: usize,
    pub kind: TextKind,
    pub x: f64,
    pub y: f64,
    pub anchor: HAlign,
    pub font_size: f64,
    pub fill: String,
    pub opacity: f64,
    pub lines: Vec<LabelLine>,
    pub title: String,
}

impl TextPrimitive {
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Receives draw primitives in paint order.
pub trait DrawingSurface {
    fn begin_group(&mut self, name: &str);
    fn end_group(&mut self);
    fn rect(&mut self, rect: &RectPrimitive);
    fn image(&mut self, image: &ImagePrimitive);
    fn text(&mut self, text: &TextPrimitive);
}

/// Resolves node image paths that are not already URLs.
pub trait ImageResolver {
    fn resolve(&self, path: &str) -> String;
}

/// Joins relative paths onto an optional base (a directory or URL prefix).
#[derive(Debug, Clone, Default)]
pub struct BasePathResolver {
    pub base: Option<String>,
}

impl BasePathResolver {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl ImageResolver for BasePathResolver {
    fn resolve(&self, path: &str) -> String {
        match self.base.as_deref() {
            Some(base) if !base.is_empty() => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            _ => path.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    BeginGroup(String),
    EndGroup,
    Rect(RectPrimitive),
    Image(ImagePrimitive),
    Text(TextPrimitive),
}

/// A surface that records primitives; handy for inspection and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn rects(&self) -> impl Iterator<Item = &RectPrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Rect(r) => Some(r),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImagePrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Image(i) => Some(i),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn groups(&self) -> Vec<&str> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::BeginGroup(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for Scene {
    fn begin_group(&mut self, name: &str) {
        self.primitives.push(Primitive::BeginGroup(name.to_string()));
    }

    fn end_group(&mut self) {
        self.primitives.push(Primitive::EndGroup);
    }

    fn rect(&mut self, rect: &RectPrimitive) {
        self.primitives.push(Primitive::Rect(rect.clone()));
    }

    fn image(&mut self, image: &ImagePrimitive) {
        self.primitives.push(Primitive::Image(image.clone()));
    }

    fn text(&mut self, text: &TextPrimitive) {
        self.primitives.push(Primitive::Text(text.clone()));
    }
}

fn role_of(hierarchy: &Hierarchy<'_>, idx: usize) -> Role {
    if hierarchy.node(idx).is_leaf() {
        Role::Cell
    } else {
        Role::Header
    }
}

/// Leaf label content: the node name, prefixed by its value when values are shown.
pub fn label_text(node: &TreeNode, show_values: bool) -> String {
    if !show_values {
        return node.name.clone();
    }
    let value = node
        .value
        .filter(|v| *v != 0.0 && !v.is_nan())
        .unwrap_or(1.0);
    format!("{value} {}", node.name)
}

/// Walks a laid-out hierarchy and emits its primitives.
pub struct SceneAssembler<'a> {
    pub ctx: RenderContext<'a>,
    pub measurer: &'a dyn TextMeasurer,
    pub images: &'a dyn ImageResolver,
}

impl SceneAssembler<'_> {
    pub fn draw(&self, hierarchy: &Hierarchy<'_>, surface: &mut dyn DrawingSurface) {
        let order = hierarchy.descendants();
        let styles = self.ctx.styles();

        surface.begin_group("cells");
        for &idx in &order {
            let hn = hierarchy.node(idx);
            let role = role_of(hierarchy, idx);
            let filter = styles.shadow(hn.node, role).then_some(match role {
                Role::Header => ShadowFilter::Header,
                Role::Cell => ShadowFilter::Cell,
            });
            surface.rect(&RectPrimitive {
                node: idx,
                rect: hn.rect,
                fill: Fill::Paint(styles.fill(hn.node, role).to_css()),
                stroke: Some(styles.border_color(hn.node, role).to_css()),
                filter,
                title: None,
            });
        }
        surface.end_group();

        surface.begin_group("images");
        for &idx in &order {
            let hn = hierarchy.node(idx);
            let Some(path) = hn.node.image.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            let href = if path.contains("://") {
                path.to_string()
            } else {
                self.images.resolve(path)
            };
            surface.image(&ImagePrimitive {
                node: idx,
                rect: hn.rect,
                href,
            });
        }
        surface.end_group();

        surface.begin_group("shading");
        for &idx in &order {
            let hn = hierarchy.node(idx);
            let fill = if styles.shading(hn.node, role_of(hierarchy, idx)) {
                Fill::Gradient
            } else {
                Fill::Paint(Hsla::TRANSPARENT.to_css())
            };
            surface.rect(&RectPrimitive {
                node: idx,
                rect: hn.rect,
                fill,
                stroke: None,
                filter: None,
                title: Some(hn.node.name.clone()),
            });
        }
        surface.end_group();

        surface.begin_group("labels");
        for idx in hierarchy.leaves() {
            surface.text(&self.leaf_label(hierarchy, idx, &styles));
        }
        surface.end_group();

        if self.ctx.settings.show_headers {
            surface.begin_group("headers");
            for &idx in &order {
                if hierarchy.node(idx).is_leaf() {
                    continue;
                }
                surface.text(&self.header_label(hierarchy, idx, &styles));
            }
            surface.end_group();
        }
    }

    fn leaf_label(
        &self,
        hierarchy: &Hierarchy<'_>,
        idx: usize,
        styles: &StyleResolver<'_>,
    ) -> TextPrimitive {
        let hn = hierarchy.node(idx);
        let node = hn.node;
        let r = hn.rect;
        let (w, h) = (r.width(), r.height());
        let fs = styles.text_size(node, Role::Cell);
        let pad = styles.text_padding(node, Role::Cell);
        let halign = styles.halign(node, Role::Cell);
        let valign = styles.valign(node);

        let x = match halign {
            HAlign::Left => r.x0 + pad,
            HAlign::Center => r.x0 + 0.5 * w,
            HAlign::Right => r.x1 - pad,
        };
        let y = match valign {
            VAlign::Top => r.y0 + pad + fs,
            VAlign::Center => r.y0 + 0.5 * h + 0.3 * fs,
            VAlign::Bottom => r.y1 - pad,
        };
        let opacity = if h < fs || w < 2.0 * fs { 0.0 } else { 1.0 };

        let text = label_text(node, self.ctx.settings.show_values);
        let wrapped = wrap_label(
            &text,
            LabelBox::new(w - 2.0 * pad, h - 2.0 * pad),
            fs,
            valign,
            self.measurer,
        );

        TextPrimitive {
            node: idx,
            kind: TextKind::Label,
            x,
            y,
            anchor: halign,
            font_size: fs,
            fill: styles.text_color(node, Role::Cell).to_css(),
            opacity,
            lines: wrapped.lines,
            title: node.name.clone(),
        }
    }

    fn header_label(
        &self,
        hierarchy: &Hierarchy<'_>,
        idx: usize,
        styles: &StyleResolver<'_>,
    ) -> TextPrimitive {
        let hn = hierarchy.node(idx);
        let node = hn.node;
        let r = hn.rect;
        let w = r.width();
        let scale = self.ctx.scale;
        let outer = self.ctx.settings.outer_padding * scale;
        let header_size = self.ctx.settings.h_text_size * scale;
        let fs = styles.text_size(node, Role::Header);
        let pad = styles.text_padding(node, Role::Header);
        let halign = styles.halign(node, Role::Header);

        let x = match halign {
            HAlign::Left => r.x0 + pad,
            HAlign::Center => r.x0 + 0.5 * w,
            HAlign::Right => r.x1 - pad,
        };
        let y = r.y0 + outer / 2.0 + pad + 0.8 * fs;
        let opacity = if header_size + pad < fs || w < fs {
            0.0
        } else {
            1.0
        };
        let text = ellipsize(&node.name, w - 2.0 * pad, fs, self.measurer);

        TextPrimitive {
            node: idx,
            kind: TextKind::Header,
            x,
            y,
            anchor: halign,
            font_size: fs,
            fill: styles.text_color(node, Role::Header).to_css(),
            opacity,
            lines: vec![LabelLine { text, dy_em: 0.0 }],
            title: node.name.clone(),
        }
    }
}
