use crate::scene::{
    DrawingSurface, Fill, ImagePrimitive, RectPrimitive, ShadowFilter, TextKind, TextPrimitive,
};
use etreemap_core::TreemapSettings;
use std::fmt::Write as _;

/// Outer size of the produced `<svg>` element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvgSize {
    /// `width`/`height` attributes in layout units.
    Fixed { width: f64, height: f64 },
    /// Displayed at `width` x `height`, drawn in a `view_width` x `view_height` viewBox.
    Scaled {
        width: f64,
        height: f64,
        view_width: f64,
        view_height: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Suffix for element ids, so several diagrams can share one page.
    pub diagram_id: String,
    pub size: SvgSize,
    pub h_shadow_size: f64,
    pub shadow_size: f64,
}

impl SvgOptions {
    pub fn new(diagram_id: impl Into<String>, size: SvgSize, settings: &TreemapSettings) -> Self {
        Self {
            diagram_id: diagram_id.into(),
            size,
            h_shadow_size: settings.h_shadow_size,
            shadow_size: settings.shadow_size,
        }
    }
}

/// Serializes draw primitives into a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    id: String,
    out: String,
    open_groups: usize,
}

impl SvgSurface {
    pub fn new(options: &SvgOptions) -> Self {
        let id = escape_attr(&options.diagram_id);
        let mut out = String::with_capacity(4096);

        let _ = write!(
            &mut out,
            r#"<svg id="enhancedtreemap_{id}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink""#
        );
        match options.size {
            SvgSize::Fixed { width, height } => {
                let _ = write!(
                    &mut out,
                    r#" width="{w}" height="{h}""#,
                    w = fmt(width),
                    h = fmt(height)
                );
            }
            SvgSize::Scaled {
                width,
                height,
                view_width,
                view_height,
            } => {
                let _ = write!(
                    &mut out,
                    r#" width="{w}" height="{h}" viewBox="0 0 {vw} {vh}""#,
                    w = fmt(width),
                    h = fmt(height),
                    vw = fmt(view_width),
                    vh = fmt(view_height)
                );
            }
        }
        out.push_str(r#" name="enhancedtreemap" class="enhancedtreemap">"#);

        let _ = write!(
            &mut out,
            r#"<defs><radialGradient id="radialgradient_{id}" cx="25%" cy="25%" r="100%"><stop offset="0%" stop-color="hsla(0, 0%, 100%, 10%)"/><stop offset="100%" stop-color="hsla(0, 0%, 0%, 10%)"/></radialGradient></defs>"#
        );
        for (prefix, size) in [
            ("h_shadow", options.h_shadow_size),
            ("shadow", options.shadow_size),
        ] {
            let s = fmt(size);
            let _ = write!(
                &mut out,
                r#"<filter id="{prefix}_{id}" color-interpolation-filters="sRGB"><feDropShadow dx="{s}" dy="{s}" stdDeviation="{s}" flood-opacity="0.5"/></filter>"#
            );
        }
        out.push_str("<g>");

        Self {
            id,
            out,
            open_groups: 0,
        }
    }

    /// Closes any open groups and the document.
    pub fn finish(mut self) -> String {
        for _ in 0..self.open_groups {
            self.out.push_str("</g>");
        }
        self.out.push_str("</g></svg>");
        self.out
    }

    fn filter_ref(&self, filter: ShadowFilter) -> String {
        match filter {
            ShadowFilter::Header => format!("url(#h_shadow_{})", self.id),
            ShadowFilter::Cell => format!("url(#shadow_{})", self.id),
        }
    }
}

impl DrawingSurface for SvgSurface {
    fn begin_group(&mut self, name: &str) {
        let _ = write!(&mut self.out, r#"<g class="{}">"#, escape_attr(name));
        self.open_groups += 1;
    }

    fn end_group(&mut self) {
        if self.open_groups > 0 {
            self.out.push_str("</g>");
            self.open_groups -= 1;
        }
    }

    fn rect(&mut self, rect: &RectPrimitive) {
        let r = rect.rect;
        let fill = match &rect.fill {
            Fill::Paint(paint) => escape_attr(paint),
            Fill::Gradient => format!("url(#radialgradient_{})", self.id),
        };
        let _ = write!(
            &mut self.out,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}""#,
            x = fmt(r.x0),
            y = fmt(r.y0),
            w = fmt(r.width()),
            h = fmt(r.height())
        );
        if let Some(stroke) = rect.stroke.as_deref() {
            let _ = write!(&mut self.out, r#" stroke="{}""#, escape_attr(stroke));
        }
        let _ = write!(&mut self.out, r#" fill="{fill}""#);
        if let Some(filter) = rect.filter {
            let filter = self.filter_ref(filter);
            let _ = write!(&mut self.out, r#" filter="{filter}""#);
        }
        match rect.title.as_deref() {
            Some(title) => {
                let _ = write!(
                    &mut self.out,
                    "><title>{}</title></rect>",
                    escape_xml(title)
                );
            }
            None => self.out.push_str("/>"),
        }
    }

    fn image(&mut self, image: &ImagePrimitive) {
        let r = image.rect;
        let _ = write!(
            &mut self.out,
            r#"<image x="{x}" y="{y}" width="{w}" height="{h}" xlink:href="{href}"/>"#,
            x = fmt(r.x0),
            y = fmt(r.y0),
            w = fmt(r.width()),
            h = fmt(r.height()),
            href = escape_attr(&image.href)
        );
    }

    fn text(&mut self, text: &TextPrimitive) {
        let class = match text.kind {
            TextKind::Label => "label",
            TextKind::Header => "header",
        };
        let x = fmt(text.x);
        let y = fmt(text.y);
        let _ = write!(
            &mut self.out,
            r#"<text class="{class}" x="{x}" y="{y}" text-anchor="{anchor}" font-size="{fs}px" fill="{fill}" opacity="{opacity}">"#,
            anchor = text.anchor.text_anchor(),
            fs = fmt(text.font_size),
            fill = escape_attr(&text.fill),
            opacity = fmt(text.opacity)
        );
        for line in &text.lines {
            let _ = write!(
                &mut self.out,
                r#"<tspan x="{x}" y="{y}" dy="{dy}em">{t}</tspan>"#,
                dy = fmt(line.dy_em),
                t = escape_xml(&line.text)
            );
        }
        let _ = write!(
            &mut self.out,
            "<title>{}</title></text>",
            escape_xml(&text.title)
        );
    }
}

/// Formats a number for an SVG attribute: no `-0`, no float noise around integers.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == 0.0 {
        v = 0.0;
    }
    format!("{v}")
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(text: &str) -> String {
    escape_xml(text)
}
