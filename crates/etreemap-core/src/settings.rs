use crate::color::Hsla;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    pub const ALLOWED: &'static [&'static str] = &["left", "center", "right"];

    pub fn as_str(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }

    /// SVG `text-anchor` value for this alignment.
    pub fn text_anchor(self) -> &'static str {
        match self {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        }
    }
}

impl FromStr for HAlign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VAlign {
    pub const ALLOWED: &'static [&'static str] = &["top", "center", "bottom"];

    pub fn as_str(self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Center => "center",
            VAlign::Bottom => "bottom",
        }
    }
}

impl FromStr for VAlign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => Err(()),
        }
    }
}

impl fmt::Display for VAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully populated treemap settings.
///
/// `Default` holds the plugin-wide defaults. Host plugin data is layered over them with
/// [`TreemapSettings::from_plugin_data`]; per-document overrides are applied by
/// [`crate::cascade::resolve_settings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapSettings {
    pub aspect_ratio: f64,
    pub aspect_w: f64,
    pub aspect_h: f64,
    pub outer_padding: f64,
    pub fixed_width: bool,
    pub h_shadow_size: f64,
    pub h_text_padding: f64,
    pub shadow_size: f64,
    pub show_headers: bool,
    pub show_values: bool,
    pub sort_by_value: bool,
    pub width: f64,

    pub h_border_color: Hsla,
    pub h_fill: Hsla,
    pub h_halign: HAlign,
    pub h_shading: bool,
    pub h_shadow: bool,
    pub h_text_color: Hsla,
    pub h_text_size: f64,

    pub border_color: Hsla,
    pub fill: Hsla,
    pub halign: HAlign,
    pub shading: bool,
    pub shadow: bool,
    pub text_color: Hsla,
    pub text_padding: f64,
    pub text_size: f64,
    pub valign: VAlign,
}

impl Default for TreemapSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            aspect_w: 1.0,
            aspect_h: 1.0,
            outer_padding: 8.0,
            fixed_width: true,
            h_shadow_size: 4.0,
            h_text_padding: 8.0,
            shadow_size: 4.0,
            show_headers: true,
            show_values: false,
            sort_by_value: true,
            width: 800.0,

            h_border_color: Hsla::new(0.0, 0.0, 0.0, 0.5),
            h_fill: Hsla::new(0.0, 0.0, 0.3, 1.0),
            h_halign: HAlign::Left,
            h_shading: true,
            h_shadow: true,
            h_text_color: Hsla::new(0.0, 0.0, 0.9, 1.0),
            h_text_size: 16.0,

            border_color: Hsla::new(0.0, 0.0, 0.0, 0.5),
            fill: Hsla::new(0.0, 0.0, 0.3, 1.0),
            halign: HAlign::Left,
            shading: true,
            shadow: true,
            text_color: Hsla::new(0.0, 0.0, 0.8, 1.0),
            text_padding: 8.0,
            text_size: 13.0,
            valign: VAlign::Top,
        }
    }
}

impl TreemapSettings {
    /// Layers host plugin data (saved settings JSON) over the defaults.
    ///
    /// Missing keys keep their default. A stored `aspect_w`/`aspect_h` pair recomputes
    /// `aspect_ratio`; a non-positive ratio falls back to the default square.
    pub fn from_plugin_data(data: &serde_json::Value) -> crate::Result<Self> {
        let mut settings: Self = serde_json::from_value(data.clone())?;
        let has_components = data.get("aspect_w").is_some() || data.get("aspect_h").is_some();
        if has_components && settings.aspect_w > 0.0 && settings.aspect_h > 0.0 {
            settings.aspect_ratio = settings.aspect_w / settings.aspect_h;
        }
        let components_ok = settings.aspect_w > 0.0 && settings.aspect_h > 0.0;
        let ratio_ok = settings.aspect_ratio.is_finite() && settings.aspect_ratio > 0.0;
        if !ratio_ok || (has_components && !components_ok) {
            tracing::warn!(
                aspect_ratio = settings.aspect_ratio,
                aspect_w = settings.aspect_w,
                aspect_h = settings.aspect_h,
                "ignoring non-positive stored aspect ratio"
            );
            let defaults = Self::default();
            settings.aspect_ratio = defaults.aspect_ratio;
            settings.aspect_w = defaults.aspect_w;
            settings.aspect_h = defaults.aspect_h;
        }
        Ok(settings)
    }

    /// Height of the drawing surface for a fixed-width treemap.
    pub fn fixed_height(&self) -> f64 {
        self.width / self.aspect_ratio
    }
}
