//! HSLA colors as used by every color setting.
//!
//! Settings store colors as `[hue, saturation, lightness, alpha]`. Node data may override any
//! subset of channels with a partial `{h, s, l, a}` object, or replace the color entirely with a
//! literal CSS color string.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Hsla {
    pub const TRANSPARENT: Hsla = Hsla::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.h, self.s, self.l, self.a]
    }

    /// Returns a copy where every channel present in `patch` replaces the corresponding channel.
    pub fn with_channels(self, patch: &PartialHsla) -> Self {
        Self {
            h: patch.h.unwrap_or(self.h),
            s: patch.s.unwrap_or(self.s),
            l: patch.l.unwrap_or(self.l),
            a: patch.a.unwrap_or(self.a),
        }
    }

    /// Converts to sRGB channels in `0..=255` (unclamped, unrounded).
    pub fn to_rgb(self) -> (f64, f64, f64) {
        let h = if self.h.is_nan() {
            f64::NAN
        } else {
            let wrap = if self.h < 0.0 { 360.0 } else { 0.0 };
            self.h % 360.0 + wrap
        };
        let s = if h.is_nan() || self.s.is_nan() {
            0.0
        } else {
            self.s
        };
        let l = self.l;
        let m2 = l + (if l < 0.5 { l } else { 1.0 - l }) * s;
        let m1 = 2.0 * l - m2;

        fn channel(h: f64, m1: f64, m2: f64) -> f64 {
            let v = if h < 60.0 {
                m1 + (m2 - m1) * h / 60.0
            } else if h < 180.0 {
                m2
            } else if h < 240.0 {
                m1 + (m2 - m1) * (240.0 - h) / 60.0
            } else {
                m1
            };
            v * 255.0
        }

        let hr = if h >= 240.0 { h - 240.0 } else { h + 120.0 };
        let hb = if h < 120.0 { h + 240.0 } else { h - 120.0 };
        (channel(hr, m1, m2), channel(h, m1, m2), channel(hb, m1, m2))
    }

    /// Formats as `rgb(r, g, b)` or `rgba(r, g, b, a)`, matching d3-color's `toString()`.
    pub fn to_css(self) -> String {
        fn clamp_channel(v: f64) -> u8 {
            if v.is_nan() {
                return 0;
            }
            v.round().clamp(0.0, 255.0) as u8
        }
        let (r, g, b) = self.to_rgb();
        let a = if self.a.is_nan() {
            1.0
        } else {
            self.a.clamp(0.0, 1.0)
        };
        let (r, g, b) = (clamp_channel(r), clamp_channel(g), clamp_channel(b));
        if a == 1.0 {
            format!("rgb({r}, {g}, {b})")
        } else {
            format!("rgba({r}, {g}, {b}, {a})")
        }
    }
}

impl From<[f64; 4]> for Hsla {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl fmt::Display for Hsla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.h, self.s, self.l, self.a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected four comma separated numbers (hue, saturation, lightness, alpha), got {input:?}")]
pub struct ParseHslaError {
    input: String,
}

impl Hsla {
    /// Applies a `"h, s, l, a"` string on top of `self`.
    ///
    /// Channels that fail to parse or fall outside their range keep the current value, so a
    /// partially valid string still updates the valid channels.
    pub fn apply_str(self, value: &str) -> Result<Self, ParseHslaError> {
        let parts = value.split(',').map(str::trim).collect::<Vec<_>>();
        if parts.len() != 4 {
            return Err(ParseHslaError {
                input: value.to_string(),
            });
        }
        let channel = |idx: usize, high: f64, current: f64| -> f64 {
            match parts[idx].parse::<f64>() {
                Ok(v) if (0.0..=high).contains(&v) => v,
                _ => current,
            }
        };
        Ok(Self {
            h: channel(0, 360.0, self.h),
            s: channel(1, 1.0, self.s),
            l: channel(2, 1.0, self.l),
            a: channel(3, 1.0, self.a),
        })
    }
}

impl FromStr for Hsla {
    type Err = ParseHslaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = Hsla::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN).apply_str(s)?;
        if parsed.to_array().iter().any(|c| c.is_nan()) {
            return Err(ParseHslaError {
                input: s.to_string(),
            });
        }
        Ok(parsed)
    }
}

impl Serialize for Hsla {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Hsla {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HslaVisitor;

        impl<'de> Visitor<'de> for HslaVisitor {
            type Value = Hsla;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an [h, s, l, a] array or an \"h, s, l, a\" string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Hsla, E> {
                v.parse::<Hsla>().map_err(E::custom)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Hsla, A::Error> {
                let mut out = [0.0; 4];
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = seq
                        .next_element::<f64>()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(5, &self));
                }
                Ok(Hsla::from(out))
            }
        }

        deserializer.deserialize_any(HslaVisitor)
    }
}

/// A channel-wise color override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialHsla {
    #[serde(default, deserialize_with = "crate::model::lenient_f64")]
    pub h: Option<f64>,
    #[serde(default, deserialize_with = "crate::model::lenient_f64")]
    pub s: Option<f64>,
    #[serde(default, deserialize_with = "crate::model::lenient_f64")]
    pub l: Option<f64>,
    #[serde(default, deserialize_with = "crate::model::lenient_f64")]
    pub a: Option<f64>,
}

impl PartialHsla {
    pub fn hue(h: f64) -> Self {
        Self {
            h: Some(h),
            ..Self::default()
        }
    }

    /// Channel-wise merge: channels set on `self` win over channels set on `fallback`.
    pub fn or(self, fallback: PartialHsla) -> Self {
        Self {
            h: self.h.or(fallback.h),
            s: self.s.or(fallback.s),
            l: self.l.or(fallback.l),
            a: self.a.or(fallback.a),
        }
    }
}

impl From<Hsla> for PartialHsla {
    fn from(c: Hsla) -> Self {
        Self {
            h: Some(c.h),
            s: Some(c.s),
            l: Some(c.l),
            a: Some(c.a),
        }
    }
}

/// Color override as it appears in node data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorOverride {
    Channels(PartialHsla),
    Css(String),
}

/// A fully resolved paint value.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Hsla(Hsla),
    Css(String),
}

impl Paint {
    pub fn to_css(&self) -> String {
        match self {
            Paint::Hsla(c) => c.to_css(),
            Paint::Css(s) => s.clone(),
        }
    }

    pub fn as_hsla(&self) -> Option<Hsla> {
        match self {
            Paint::Hsla(c) => Some(*c),
            Paint::Css(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fill_formats_like_d3() {
        assert_eq!(Hsla::new(0.0, 0.0, 0.3, 1.0).to_css(), "rgb(77, 77, 77)");
        assert_eq!(
            Hsla::new(0.0, 0.0, 0.0, 0.5).to_css(),
            "rgba(0, 0, 0, 0.5)"
        );
        assert_eq!(Hsla::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn saturated_hues_convert_to_primaries() {
        assert_eq!(Hsla::new(0.0, 1.0, 0.5, 1.0).to_css(), "rgb(255, 0, 0)");
        assert_eq!(Hsla::new(120.0, 1.0, 0.5, 1.0).to_css(), "rgb(0, 255, 0)");
        assert_eq!(Hsla::new(240.0, 1.0, 0.5, 1.0).to_css(), "rgb(0, 0, 255)");
        assert_eq!(Hsla::new(360.0, 1.0, 0.5, 1.0).to_css(), "rgb(255, 0, 0)");
    }

    #[test]
    fn apply_str_keeps_out_of_range_channels() {
        let base = Hsla::new(10.0, 0.5, 0.5, 1.0);
        let out = base.apply_str("400, 0.2, 2, 0.25").unwrap();
        assert_eq!(out, Hsla::new(10.0, 0.2, 0.5, 0.25));
        assert!(base.apply_str("1, 2, 3").is_err());
    }

    #[test]
    fn deserializes_from_array_or_string() {
        let a: Hsla = serde_json::from_str("[0, 0, 0.3, 1]").unwrap();
        let b: Hsla = serde_json::from_str("\"0, 0, 0.3, 1\"").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Hsla>("[0, 0, 0.3]").is_err());
    }

    #[test]
    fn node_color_override_accepts_channels_or_css() {
        let c: ColorOverride = serde_json::from_str(r#"{"h": 200}"#).unwrap();
        assert_eq!(c, ColorOverride::Channels(PartialHsla::hue(200.0)));
        let c: ColorOverride = serde_json::from_str(r#""steelblue""#).unwrap();
        assert_eq!(c, ColorOverride::Css("steelblue".to_string()));
    }
}
