#![forbid(unsafe_code)]

//! Headless treemap rendering: rectangle layout, label fitting and SVG output.

pub mod layout;
pub mod model;
pub mod scene;
pub mod svg;
pub mod text;

use crate::layout::{RectangleLayout, SquarifiedLayout};
use crate::model::TreemapLayout;
use crate::scene::{BasePathResolver, ImageResolver, RenderContext, SceneAssembler};
use crate::svg::{SvgOptions, SvgSize, SvgSurface};
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use etreemap_core::{Hierarchy, TreeNode};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid drawing surface {width}x{height}: both sides must be positive and finite")]
    InvalidSurface { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Collaborators used while rendering.
#[derive(Clone)]
pub struct RenderOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub image_resolver: Arc<dyn ImageResolver + Send + Sync>,
    pub layout: Arc<dyn RectangleLayout + Send + Sync>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            image_resolver: Arc::new(BasePathResolver::default()),
            layout: Arc::new(SquarifiedLayout::default()),
        }
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions").finish_non_exhaustive()
    }
}

fn check_surface(ctx: &RenderContext<'_>) -> Result<()> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if ok(ctx.width) && ok(ctx.height) {
        Ok(())
    } else {
        Err(Error::InvalidSurface {
            width: ctx.width,
            height: ctx.height,
        })
    }
}

/// Builds and lays out the hierarchy for `root`.
pub fn layout_tree<'a>(
    root: &'a TreeNode,
    ctx: &RenderContext<'_>,
    options: &RenderOptions,
) -> Result<Hierarchy<'a>> {
    check_surface(ctx)?;
    let mut hierarchy = Hierarchy::build(root, ctx.settings.sort_by_value);
    options.layout.layout(&mut hierarchy, &ctx.layout_params());
    Ok(hierarchy)
}

/// Serializable rectangles for `root`.
pub fn layout_snapshot(
    root: &TreeNode,
    ctx: &RenderContext<'_>,
    options: &RenderOptions,
) -> Result<TreemapLayout> {
    let hierarchy = layout_tree(root, ctx, options)?;
    Ok(TreemapLayout::from_hierarchy(
        &hierarchy,
        ctx.width,
        ctx.height,
        ctx.scale,
    ))
}

/// Lays out `root` and draws it onto `surface`.
pub fn draw_tree(
    root: &TreeNode,
    ctx: &RenderContext<'_>,
    options: &RenderOptions,
    surface: &mut dyn scene::DrawingSurface,
) -> Result<()> {
    let hierarchy = layout_tree(root, ctx, options)?;
    let assembler = SceneAssembler {
        ctx: *ctx,
        measurer: options.text_measurer.as_ref(),
        images: options.image_resolver.as_ref(),
    };
    assembler.draw(&hierarchy, surface);
    Ok(())
}

/// Renders `root` to a standalone SVG string.
pub fn render_tree_svg(
    root: &TreeNode,
    ctx: &RenderContext<'_>,
    size: SvgSize,
    diagram_id: &str,
    options: &RenderOptions,
) -> Result<String> {
    let mut surface = SvgSurface::new(&SvgOptions::new(diagram_id, size, ctx.settings));
    draw_tree(root, ctx, options, &mut surface)?;
    Ok(surface.finish())
}
