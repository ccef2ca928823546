#![forbid(unsafe_code)]

//! `etreemap` renders "enhanced treemap" JSON documents to SVG, headless.
//!
//! A document is a node tree (`name`, optional `value`, `children` and per-node style overrides)
//! plus an ordered list of settings blocks. Rendering runs the settings cascade, builds the
//! weighted hierarchy, tiles it with a squarified layout and fits labels into the cells.
//!
//! - [`render::HeadlessRenderer`]: synchronous and async entry points
//! - [`lifecycle::RenderChild`]: re-render driver for a host that owns one code block

pub use etreemap_core::*;

pub mod lifecycle;

pub mod render {
    pub use etreemap_render::model::{LayoutNode, TreemapLayout};
    pub use etreemap_render::scene::{BasePathResolver, ImageResolver, RenderContext, Viewport};
    pub use etreemap_render::svg::SvgSize;
    pub use etreemap_render::text::{
        CachingTextMeasurer, DeterministicTextMeasurer, TextMeasurer,
    };
    pub use etreemap_render::{RenderOptions, layout_snapshot, render_tree_svg};

    use etreemap_core::{Document, SettingsErrors, TreemapSettings, resolve_settings};
    use etreemap_render::svg::escape_xml;
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] etreemap_core::Error),
        #[error(transparent)]
        Render(#[from] etreemap_render::Error),
    }

    impl From<SettingsErrors> for HeadlessError {
        fn from(value: SettingsErrors) -> Self {
            Self::Parse(value.into())
        }
    }

    impl HeadlessError {
        /// One human-readable line per problem; settings failures are listed individually.
        pub fn messages(&self) -> Vec<String> {
            match self {
                Self::Parse(etreemap_core::Error::Settings(errors)) => errors.messages(),
                other => vec![other.to_string()],
            }
        }
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Turns a diagram id into a suffix that is safe inside SVG ids and `url(#...)` refs.
    ///
    /// The id suffixes the root, gradient and filter ids, so two treemaps inlined in the same
    /// page must not share one. Anything outside `[A-Za-z0-9_-]` becomes `_`; an empty id
    /// becomes `0`.
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return "0".to_string();
        }
        raw.chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Outcome of rendering one code block: a diagram, or the messages shown in its place.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Rendered {
        Svg(String),
        Error(Vec<String>),
    }

    impl Rendered {
        pub fn is_svg(&self) -> bool {
            matches!(self, Self::Svg(_))
        }

        pub fn svg(&self) -> Option<&str> {
            match self {
                Self::Svg(svg) => Some(svg),
                Self::Error(_) => None,
            }
        }

        /// Markup that replaces the code block: the SVG itself, or a red error block.
        pub fn to_html(&self) -> String {
            match self {
                Self::Svg(svg) => svg.clone(),
                Self::Error(messages) => {
                    let body = messages
                        .iter()
                        .map(|m| escape_xml(m))
                        .collect::<Vec<_>>()
                        .join("<br>");
                    format!(r#"<div style="color: red">{body}</div>"#)
                }
            }
        }
    }

    impl From<Result<String>> for Rendered {
        fn from(value: Result<String>) -> Self {
            match value {
                Ok(svg) => Self::Svg(svg),
                Err(err) => Self::Error(err.messages()),
            }
        }
    }

    /// Parses `text` and resolves its settings blocks over `defaults`.
    pub fn prepare_document(
        text: &str,
        defaults: &TreemapSettings,
    ) -> Result<(Document, TreemapSettings)> {
        let document = Document::parse(text)?;
        let settings = resolve_settings(&document.settings, defaults).into_result()?;
        Ok((document, settings))
    }

    /// Outer SVG size for a render pass.
    ///
    /// Adaptive renders are displayed at the viewport size and drawn in the magnified layout
    /// space through the `viewBox`.
    pub fn svg_size(ctx: &RenderContext<'_>) -> SvgSize {
        if ctx.scale == 1.0 {
            return SvgSize::Fixed {
                width: ctx.width,
                height: ctx.height,
            };
        }
        SvgSize::Scaled {
            width: ctx.width / ctx.scale,
            height: ctx.height / ctx.scale,
            view_width: ctx.width,
            view_height: ctx.height,
        }
    }

    /// Synchronous layout helper (executor-free).
    pub fn layout_document_sync(
        text: &str,
        defaults: &TreemapSettings,
        viewport: Option<Viewport>,
        options: &RenderOptions,
    ) -> Result<TreemapLayout> {
        let (document, settings) = prepare_document(text, defaults)?;
        let ctx = RenderContext::for_settings(&settings, viewport);
        Ok(layout_snapshot(&document.root, &ctx, options)?)
    }

    pub async fn layout_document(
        text: &str,
        defaults: &TreemapSettings,
        viewport: Option<Viewport>,
        options: &RenderOptions,
    ) -> Result<TreemapLayout> {
        layout_document_sync(text, defaults, viewport, options)
    }

    /// Synchronous SVG render helper (executor-free).
    pub fn render_svg_sync(
        text: &str,
        defaults: &TreemapSettings,
        viewport: Option<Viewport>,
        diagram_id: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        let (document, settings) = prepare_document(text, defaults)?;
        let ctx = RenderContext::for_settings(&settings, viewport);
        tracing::debug!(
            width = ctx.width,
            height = ctx.height,
            scale = ctx.scale,
            "rendering treemap"
        );
        let id = sanitize_svg_id(diagram_id);
        Ok(render_tree_svg(
            &document.root,
            &ctx,
            svg_size(&ctx),
            &id,
            options,
        )?)
    }

    pub async fn render_svg(
        text: &str,
        defaults: &TreemapSettings,
        viewport: Option<Viewport>,
        diagram_id: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        render_svg_sync(text, defaults, viewport, diagram_id, options)
    }

    /// Bundles plugin defaults, collaborators and the host viewport for repeated renders.
    ///
    /// It stays runtime-agnostic: all work is CPU-bound and does not perform I/O.
    #[derive(Debug, Clone, Default)]
    pub struct HeadlessRenderer {
        pub defaults: Arc<TreemapSettings>,
        pub options: RenderOptions,
        pub viewport: Option<Viewport>,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_defaults(mut self, defaults: TreemapSettings) -> Self {
            self.defaults = Arc::new(defaults);
            self
        }

        /// Layers saved plugin data (JSON object) over the built-in defaults.
        pub fn with_plugin_data(self, data: &serde_json::Value) -> Result<Self> {
            let defaults = TreemapSettings::from_plugin_data(data)?;
            Ok(self.with_defaults(defaults))
        }

        pub fn with_viewport(mut self, viewport: Viewport) -> Self {
            self.viewport = Some(viewport);
            self
        }

        pub fn with_options(mut self, options: RenderOptions) -> Self {
            self.options = options;
            self
        }

        /// Settings errors for `text`, without laying anything out.
        pub fn validate_sync(&self, text: &str) -> Result<Vec<String>> {
            let document = Document::parse(text)?;
            let resolved = resolve_settings(&document.settings, &self.defaults);
            Ok(resolved.errors.iter().map(ToString::to_string).collect())
        }

        pub fn layout_sync(&self, text: &str) -> Result<TreemapLayout> {
            layout_document_sync(text, &self.defaults, self.viewport, &self.options)
        }

        pub fn render_svg_sync(&self, text: &str, diagram_id: &str) -> Result<String> {
            render_svg_sync(
                text,
                &self.defaults,
                self.viewport,
                diagram_id,
                &self.options,
            )
        }

        /// Renders a code block the way a host displays it: errors become an error block.
        pub fn render_document_sync(&self, text: &str, diagram_id: &str) -> Rendered {
            let rendered = Rendered::from(self.render_svg_sync(text, diagram_id));
            if let Rendered::Error(messages) = &rendered {
                tracing::warn!(count = messages.len(), "treemap rendered as error block");
            }
            rendered
        }

        pub async fn layout(&self, text: &str) -> Result<TreemapLayout> {
            self.layout_sync(text)
        }

        pub async fn render_svg(&self, text: &str, diagram_id: &str) -> Result<String> {
            self.render_svg_sync(text, diagram_id)
        }

        pub async fn render_document(&self, text: &str, diagram_id: &str) -> Rendered {
            self.render_document_sync(text, diagram_id)
        }
    }
}
