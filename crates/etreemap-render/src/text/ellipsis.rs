use super::{TextMeasurer, TextStyle};

pub const ELLIPSIS: &str = "...";

/// Shortens a single-line header to `max_width`.
///
/// Text that fits is returned unchanged. Otherwise `"..."` is appended and one content
/// character is dropped per step until it fits or only the ellipsis is left.
pub fn ellipsize(
    text: &str,
    max_width: f64,
    font_size: f64,
    measurer: &dyn TextMeasurer,
) -> String {
    let style = TextStyle::sized(font_size);
    let too_wide = |s: &str| measurer.width(s, &style) > max_width;

    if text.is_empty() || !too_wide(text) {
        return text.to_string();
    }

    let mut out = format!("{text}{ELLIPSIS}");
    let mut len = out.chars().count();
    while too_wide(&out) && len > ELLIPSIS.len() {
        out = out.chars().take(len - 4).collect::<String>() + ELLIPSIS;
        len -= 1;
    }
    tracing::trace!(text, out = %out, max_width, "header ellipsized");
    out
}
