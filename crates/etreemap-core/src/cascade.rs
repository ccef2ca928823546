//! Per-document settings cascade.
//!
//! A document's `settings` array is applied in order onto one working copy of the plugin
//! defaults. Every value is validated field by field. Rejected values are collected as
//! [`SettingsError`]s instead of aborting, so an author sees every problem at once.
//!
//! Write policy when a value fails validation:
//! - out-of-range numbers are still written (the document is flagged as errored anyway)
//! - values of the wrong JSON type keep the previous value
//! - an aspect ratio with a zero component is never divided

use crate::color::Hsla;
use crate::error::{SettingsError, SettingsErrors};
use crate::model::json_f64;
use crate::settings::{HAlign, TreemapSettings, VAlign};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// One raw settings block as written in the document.
///
/// Every field is optional; absent and `null` are equivalent. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub aspect_ratio: Option<Value>,
    pub outer_padding: Option<Value>,
    pub fixed_width: Option<Value>,
    pub h_shadow_size: Option<Value>,
    pub h_text_padding: Option<Value>,
    pub shadow_size: Option<Value>,
    pub show_headers: Option<Value>,
    pub sort_by_value: Option<Value>,
    pub width: Option<Value>,

    pub h_border_color: Option<Value>,
    pub h_fill: Option<Value>,
    pub h_halign: Option<Value>,
    pub h_shading: Option<Value>,
    pub h_shadow: Option<Value>,
    pub h_text_color: Option<Value>,
    pub h_text_size: Option<Value>,

    pub border_color: Option<Value>,
    pub fill: Option<Value>,
    pub halign: Option<Value>,
    pub shading: Option<Value>,
    pub shadow: Option<Value>,
    pub show_values: Option<Value>,
    pub text_color: Option<Value>,
    pub text_padding: Option<Value>,
    pub text_size: Option<Value>,
    pub valign: Option<Value>,
}

/// Result of resolving one document's settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub settings: TreemapSettings,
    pub errors: Vec<SettingsError>,
}

impl ResolvedSettings {
    pub fn is_errored(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<TreemapSettings, SettingsErrors> {
        if self.errors.is_empty() {
            Ok(self.settings)
        } else {
            Err(SettingsErrors(self.errors))
        }
    }
}

/// Applies `blocks` (in order, later blocks win) onto a copy of `base`.
pub fn resolve_settings(blocks: &[Value], base: &TreemapSettings) -> ResolvedSettings {
    let mut settings = base.clone();
    let mut verifier = Verifier::default();

    for (index, block) in blocks.iter().enumerate() {
        if !block.is_object() {
            verifier.errors.push(SettingsError::NotAnObject { index });
            continue;
        }
        let patch = match SettingsPatch::deserialize(block) {
            Ok(patch) => patch,
            Err(err) => {
                tracing::warn!(index, error = %err, "unreadable settings block");
                verifier.errors.push(SettingsError::NotAnObject { index });
                continue;
            }
        };
        tracing::debug!(index, "applying settings block");
        apply_patch(&mut settings, &patch, &mut verifier);
    }

    if !settings.show_headers {
        settings.h_text_size = 0.0;
    }

    for err in &verifier.errors {
        tracing::warn!(field = err.field(), "{err}");
    }

    ResolvedSettings {
        settings,
        errors: verifier.errors,
    }
}

/// Applies one block onto `settings`, recording rejected values in `verifier`.
pub fn apply_patch(settings: &mut TreemapSettings, patch: &SettingsPatch, verifier: &mut Verifier) {
    let v = verifier;

    // Treemap
    if let Some(raw) = &patch.aspect_ratio {
        if let Some((w, h, ratio)) = v.aspect_ratio(raw) {
            settings.aspect_w = w;
            settings.aspect_h = h;
            settings.aspect_ratio = ratio;
        }
    }
    v.number_into(&patch.outer_padding, "outer_padding", 0.0, None, &mut settings.outer_padding);
    v.bool_into(&patch.fixed_width, "fixed_width", &mut settings.fixed_width);
    v.number_into(&patch.h_shadow_size, "h_shadow_size", 0.0, None, &mut settings.h_shadow_size);
    v.number_into(&patch.h_text_padding, "h_text_padding", 0.0, None, &mut settings.h_text_padding);
    v.number_into(&patch.shadow_size, "shadow_size", 0.0, None, &mut settings.shadow_size);
    v.bool_into(&patch.show_headers, "show_headers", &mut settings.show_headers);
    v.bool_into(&patch.sort_by_value, "sort_by_value", &mut settings.sort_by_value);
    v.number_into(&patch.width, "width", 1.0, None, &mut settings.width);

    // Headers
    v.color_into(&patch.h_border_color, "h_border_color", &mut settings.h_border_color);
    v.color_into(&patch.h_fill, "h_fill", &mut settings.h_fill);
    v.enum_into(&patch.h_halign, "h_halign", HAlign::ALLOWED, &mut settings.h_halign);
    v.bool_into(&patch.h_shading, "h_shading", &mut settings.h_shading);
    v.bool_into(&patch.h_shadow, "h_shadow", &mut settings.h_shadow);
    v.color_into(&patch.h_text_color, "h_text_color", &mut settings.h_text_color);
    v.number_into(&patch.h_text_size, "h_text_size", 1.0, None, &mut settings.h_text_size);

    // Cells
    v.color_into(&patch.border_color, "border_color", &mut settings.border_color);
    v.color_into(&patch.fill, "fill", &mut settings.fill);
    v.enum_into(&patch.halign, "halign", HAlign::ALLOWED, &mut settings.halign);
    v.bool_into(&patch.shading, "shading", &mut settings.shading);
    v.bool_into(&patch.shadow, "shadow", &mut settings.shadow);
    v.bool_into(&patch.show_values, "show_values", &mut settings.show_values);
    v.color_into(&patch.text_color, "text_color", &mut settings.text_color);
    v.number_into(&patch.text_padding, "text_padding", 0.0, None, &mut settings.text_padding);
    v.number_into(&patch.text_size, "text_size", 1.0, None, &mut settings.text_size);
    v.enum_into(&patch.valign, "valign", VAlign::ALLOWED, &mut settings.valign);
}

/// Collects validation failures while individual values are checked.
#[derive(Debug, Default)]
pub struct Verifier {
    pub errors: Vec<SettingsError>,
}

impl Verifier {
    /// Checks a numeric value against inclusive bounds.
    ///
    /// Returns the number whenever one could be read, even when it is out of range.
    pub fn verify_number(
        &mut self,
        value: &Value,
        field: &str,
        low: f64,
        high: Option<f64>,
    ) -> Option<f64> {
        let Some(n) = json_f64(value).filter(|n| !n.is_nan()) else {
            self.errors.push(SettingsError::NotANumber {
                field: field.to_string(),
            });
            return None;
        };
        self.check_range(n, field, low, high);
        Some(n)
    }

    fn check_range(&mut self, n: f64, field: &str, low: f64, high: Option<f64>) {
        if n < low {
            self.errors.push(SettingsError::BelowMinimum {
                field: field.to_string(),
                low,
                value: n,
            });
        }
        if let Some(high) = high.filter(|high| n > *high) {
            self.errors.push(SettingsError::AboveMaximum {
                field: field.to_string(),
                high,
                value: n,
            });
        }
    }

    pub fn verify_bool(&mut self, value: &Value, field: &str) -> Option<bool> {
        let b = value.as_bool();
        if b.is_none() {
            self.errors.push(SettingsError::NotABoolean {
                field: field.to_string(),
            });
        }
        b
    }

    pub fn verify_enum<T: FromStr>(
        &mut self,
        value: &Value,
        field: &str,
        allowed: &'static [&'static str],
    ) -> Option<T> {
        let parsed = value.as_str().and_then(|s| s.parse::<T>().ok());
        if parsed.is_none() {
            self.errors.push(SettingsError::NotInList {
                field: field.to_string(),
                allowed,
            });
        }
        parsed
    }

    fn number_into(
        &mut self,
        raw: &Option<Value>,
        field: &str,
        low: f64,
        high: Option<f64>,
        slot: &mut f64,
    ) {
        if let Some(n) = raw.as_ref().and_then(|v| self.verify_number(v, field, low, high)) {
            *slot = n;
        }
    }

    fn bool_into(&mut self, raw: &Option<Value>, field: &str, slot: &mut bool) {
        if let Some(b) = raw.as_ref().and_then(|v| self.verify_bool(v, field)) {
            *slot = b;
        }
    }

    fn enum_into<T: FromStr>(
        &mut self,
        raw: &Option<Value>,
        field: &str,
        allowed: &'static [&'static str],
        slot: &mut T,
    ) {
        if let Some(parsed) = raw.as_ref().and_then(|v| self.verify_enum(v, field, allowed)) {
            *slot = parsed;
        }
    }

    fn color_into(&mut self, raw: &Option<Value>, field: &str, slot: &mut Hsla) {
        let Some(raw) = raw else {
            return;
        };
        let Some(obj) = raw.as_object() else {
            self.errors.push(SettingsError::NotAColor {
                field: field.to_string(),
            });
            return;
        };
        let channels: [(&str, &str, f64, &mut f64); 4] = [
            ("h", "hue", 360.0, &mut slot.h),
            ("s", "saturation", 1.0, &mut slot.s),
            ("l", "lightness", 1.0, &mut slot.l),
            ("a", "alpha", 1.0, &mut slot.a),
        ];
        for (key, label, high, channel) in channels {
            let Some(v) = obj.get(key).filter(|v| !v.is_null()) else {
                continue;
            };
            let name = format!("{field} {label}");
            if let Some(n) = self.verify_number(v, &name, 0.0, Some(high)) {
                *channel = n;
            }
        }
    }

    /// Parses `"W:H"` into `(w, h, w / h)`.
    ///
    /// A zero component is reported and nothing is returned, so no division ever happens.
    fn aspect_ratio(&mut self, raw: &Value) -> Option<(f64, f64, f64)> {
        let malformed = |raw: &Value| SettingsError::MalformedAspectRatio {
            raw: raw.to_string(),
        };
        let Some(text) = raw.as_str() else {
            self.errors.push(malformed(raw));
            return None;
        };
        let Some((w, h)) = text.split_once(':') else {
            self.errors.push(malformed(raw));
            return None;
        };
        let (Ok(w), Ok(h)) = (w.trim().parse::<f64>(), h.trim().parse::<f64>()) else {
            self.errors.push(malformed(raw));
            return None;
        };
        if !(w.is_finite() && h.is_finite()) {
            self.errors.push(malformed(raw));
            return None;
        }
        if w == 0.0 || h == 0.0 {
            self.errors.push(SettingsError::AspectRatioZero);
            return None;
        }
        let ratio = w / h;
        self.check_range(ratio, "aspect_ratio", 0.0, None);
        Some((w, h, ratio))
    }
}
