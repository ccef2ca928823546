use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use unicode_width::UnicodeWidthChar;

pub mod ellipsis;
pub mod wrap;

#[cfg(test)]
mod tests;

pub use ellipsis::{ELLIPSIS, ellipsize};
pub use wrap::{LINE_HEIGHT_EM, LabelBox, LabelLine, WrappedLabel, wrap_label};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Measurement oracle used by the label fitting engines.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    fn width(&self, text: &str, style: &TextStyle) -> f64 {
        self.measure(text, style).width
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }
}

/// Font-free measurer: every character is `char_width_factor` em wide, East Asian wide
/// characters twice that.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    fn char_width_factor(&self) -> f64 {
        if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        }
    }

    fn line_height_factor(&self) -> f64 {
        if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        }
    }

    /// Width of `line` in character cells.
    pub fn cells(line: &str) -> usize {
        line.chars().map(|ch| ch.width().unwrap_or(0)).sum()
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let font_size = style.font_size.max(1.0);
        let lines = text.split('\n').collect::<Vec<_>>();
        let max_cells = lines.iter().map(|l| Self::cells(l)).max().unwrap_or(0);

        TextMetrics {
            width: max_cells as f64 * font_size * self.char_width_factor(),
            height: lines.len() as f64 * font_size * self.line_height_factor(),
            line_count: lines.len(),
        }
    }
}

type CacheKey = (String, u64, Option<String>, Option<String>);

/// Memoizes another measurer. Useful when the oracle is slow (e.g. backed by a browser).
#[derive(Debug, Default)]
pub struct CachingTextMeasurer<M> {
    inner: M,
    cache: Mutex<FxHashMap<CacheKey, TextMetrics>>,
}

impl<M: TextMeasurer> CachingTextMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: TextMeasurer> TextMeasurer for CachingTextMeasurer<M> {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let key = (
            text.to_string(),
            style.font_size.to_bits(),
            style.font_family.clone(),
            style.font_weight.clone(),
        );
        // A poisoned lock only loses memoization; measuring is still correct.
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return *hit;
            }
        }
        let metrics = self.inner.measure(text, style);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, metrics);
        }
        metrics
    }
}
