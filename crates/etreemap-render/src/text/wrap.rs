//! Greedy label wrapping for leaf cells.
//!
//! Labels are broken at whitespace, `-` and `_` (the separators stay in the text). A token that
//! is wider than the box on its own is cut into fractions. When the box runs out of lines the
//! last line is elided with `"..."`.

use super::ellipsis::ELLIPSIS;
use super::{TextMeasurer, TextStyle};
use etreemap_core::VAlign;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Line advance in em.
pub const LINE_HEIGHT_EM: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelBox {
    pub width: f64,
    pub height: f64,
}

impl LabelBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLine {
    pub text: String,
    /// Offset from the label anchor, in em.
    pub dy_em: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WrappedLabel {
    pub lines: Vec<LabelLine>,
    /// Set when content had to be dropped; the last line then ends with `"..."`.
    pub overflow: bool,
}

impl WrappedLabel {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_-]+").unwrap_or_else(|e| unreachable!("static pattern: {e}")))
}

/// Splits `text` into words and separator runs, keeping both and dropping empty pieces.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut last = 0usize;
    for m in separators().find_iter(text) {
        if m.start() > last {
            out.push(&text[last..m.start()]);
        }
        out.push(m.as_str());
        last = m.end();
    }
    if last < text.len() {
        out.push(&text[last..]);
    }
    out
}

fn is_blank(token: &str) -> bool {
    token.chars().all(char::is_whitespace)
}

struct LineBreaker<'m> {
    measurer: &'m dyn TextMeasurer,
    style: TextStyle,
    bounds: LabelBox,
    lines: Vec<String>,
    current: String,
    line_number: usize,
    overflow: bool,
    /// A separator did not fit; the next word starts a new line.
    pending_break: bool,
}

impl LineBreaker<'_> {
    fn fits(&self, s: &str) -> bool {
        self.measurer.width(s, &self.style) <= self.bounds.width
    }

    /// Starts a new line if the box has room for it; records overflow otherwise.
    fn break_line(&mut self) -> bool {
        let needed = (self.line_number + 2) as f64 * LINE_HEIGHT_EM * self.style.font_size;
        if needed > self.bounds.height {
            self.overflow = true;
            return false;
        }
        let done = std::mem::take(&mut self.current);
        self.lines.push(done.trim_end().to_string());
        self.line_number += 1;
        true
    }

    /// Longest prefix `floor(len / k)` that fits, bottoming out at two characters.
    fn split_point(&self, chars: &[char]) -> usize {
        let len = chars.len();
        let mut k = 1usize;
        let mut take = len;
        while take > 2 && !self.fits(&chars[..take].iter().collect::<String>()) {
            k += 1;
            take = len / k;
        }
        take
    }

    fn run(&mut self, mut stack: Vec<String>) {
        while let Some(token) = stack.pop() {
            let blank = is_blank(&token);
            if blank && self.current.is_empty() {
                continue;
            }
            if self.pending_break {
                self.pending_break = false;
                stack.push(token);
                if !self.break_line() {
                    return;
                }
                continue;
            }

            let candidate = format!("{}{}", self.current, token);
            if self.fits(&candidate) {
                self.current = candidate;
                continue;
            }

            if blank {
                // Dropped; the break it implies only happens once a word follows.
                self.pending_break = true;
            } else if self.current.is_empty() {
                let chars = token.chars().collect::<Vec<_>>();
                let take = self.split_point(&chars);
                self.current = chars[..take].iter().collect();
                if take < chars.len() {
                    stack.push(chars[take..].iter().collect());
                    if !self.break_line() {
                        return;
                    }
                }
            } else {
                stack.push(token);
                if !self.break_line() {
                    return;
                }
            }
        }
    }

    fn finish(mut self, valign: VAlign) -> WrappedLabel {
        let last = self.current.trim_end();
        if !last.is_empty() {
            self.lines.push(last.to_string());
        }

        if self.overflow {
            if let Some(last) = self.lines.pop() {
                let mut text = format!("{last}{ELLIPSIS}");
                let mut len = text.chars().count();
                while !self.fits(&text) && len > ELLIPSIS.len() {
                    text = text.chars().take(len - 4).collect::<String>() + ELLIPSIS;
                    len -= 1;
                }
                self.lines.push(text);
            }
            tracing::trace!(
                lines = self.lines.len(),
                width = self.bounds.width,
                height = self.bounds.height,
                "label overflowed its cell"
            );
        }

        let n = self.lines.len();
        let span = n.saturating_sub(1) as f64 * LINE_HEIGHT_EM;
        let start = match valign {
            VAlign::Top => 0.0,
            VAlign::Center => -0.5 * span,
            VAlign::Bottom => -span,
        };
        WrappedLabel {
            lines: self
                .lines
                .into_iter()
                .enumerate()
                .map(|(i, text)| LabelLine {
                    text,
                    dy_em: start + LINE_HEIGHT_EM * i as f64,
                })
                .collect(),
            overflow: self.overflow,
        }
    }
}

/// Fits `text` into `bounds` at `font_size`.
///
/// Always yields at least one line for text with any visible content, even when the box is
/// narrower than a single character. Empty or whitespace-only text yields no lines.
pub fn wrap_label(
    text: &str,
    bounds: LabelBox,
    font_size: f64,
    valign: VAlign,
    measurer: &dyn TextMeasurer,
) -> WrappedLabel {
    let stack = tokenize(text)
        .into_iter()
        .rev()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut breaker = LineBreaker {
        measurer,
        style: TextStyle::sized(font_size),
        bounds,
        lines: Vec::new(),
        current: String::new(),
        line_number: 0,
        overflow: false,
        pending_break: false,
    };
    breaker.run(stack);
    breaker.finish(valign)
}
