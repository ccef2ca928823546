use crate::model::DOCUMENT_TYPE;
use regex::Regex;
use std::sync::OnceLock;

fn type_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r#""type"\s*:\s*"{}""#, regex::escape(DOCUMENT_TYPE));
        Regex::new(&pattern).unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

/// Returns `true` when a code block's text declares itself a treemap document.
///
/// This is a cheap textual check used before any JSON parsing.
pub fn is_treemap_block(text: &str) -> bool {
    type_marker().is_match(text)
}
