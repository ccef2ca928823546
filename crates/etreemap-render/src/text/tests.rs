use super::*;
use etreemap_core::VAlign;
use std::sync::atomic::{AtomicUsize, Ordering};

fn measurer() -> DeterministicTextMeasurer {
    DeterministicTextMeasurer::default()
}

fn wrap(text: &str, width: f64, height: f64) -> WrappedLabel {
    wrap_label(
        text,
        LabelBox::new(width, height),
        10.0,
        VAlign::Top,
        &measurer(),
    )
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn deterministic_measurer_counts_wide_chars_twice() {
    let m = measurer();
    assert_eq!(m.width("abcd", &TextStyle::sized(10.0)), 24.0);
    assert_eq!(m.width("漢字", &TextStyle::sized(10.0)), 24.0);
    let metrics = m.measure("a\nbb", &TextStyle::sized(10.0));
    assert_eq!(metrics.line_count, 2);
    assert_eq!(metrics.width, 12.0);
}

#[test]
fn tokenize_keeps_separator_runs() {
    assert_eq!(
        wrap::tokenize("a-b_c  d"),
        vec!["a", "-", "b", "_", "c", "  ", "d"]
    );
    assert!(wrap::tokenize("").is_empty());
}

#[test]
fn wraps_at_whitespace() {
    let out = wrap("alpha beta gamma", 60.0, 100.0);
    assert_eq!(out.texts(), vec!["alpha beta", "gamma"]);
    assert!(!out.overflow);
    assert_eq!(out.lines[0].dy_em, 0.0);
    assert_eq!(out.lines[1].dy_em, LINE_HEIGHT_EM);
}

#[test]
fn whitespace_never_starts_a_line() {
    let out = wrap("alpha beta", 30.0, 100.0);
    assert_eq!(out.texts(), vec!["alpha", "beta"]);
}

#[test]
fn long_words_are_split_into_fractions() {
    let out = wrap("averyveryverylongsingleword", 60.0, 1000.0);
    assert_eq!(out.texts(), vec!["averyvery", "verylongs", "ingleword"]);
    assert!(!out.overflow);
}

#[test]
fn overflow_elides_the_last_line() {
    let out = wrap("averyveryverylongsingleword", 60.0, 25.0);
    assert!(out.overflow);
    assert_eq!(out.texts(), vec!["averyvery", "verylon..."]);
}

#[test]
fn empty_text_yields_no_lines() {
    assert!(wrap("", 60.0, 100.0).lines.is_empty());
    assert!(wrap("   ", 60.0, 100.0).lines.is_empty());
}

#[test]
fn narrow_box_still_yields_lines() {
    let out = wrap("abc def", 1.0, 1000.0);
    assert_eq!(out.texts(), vec!["a", "bc", "d", "ef"]);
}

#[test]
fn vertical_alignment_offsets_lines() {
    let center = wrap_label(
        "alpha beta gamma",
        LabelBox::new(60.0, 100.0),
        10.0,
        VAlign::Center,
        &measurer(),
    );
    let dys = center.lines.iter().map(|l| l.dy_em).collect::<Vec<_>>();
    assert!((dys[0] + 0.55).abs() < 1e-9);
    assert!((dys[1] - 0.55).abs() < 1e-9);

    let bottom = wrap_label(
        "alpha beta gamma",
        LabelBox::new(60.0, 100.0),
        10.0,
        VAlign::Bottom,
        &measurer(),
    );
    assert!((bottom.lines[0].dy_em + 1.1).abs() < 1e-9);
    assert!(bottom.lines[1].dy_em.abs() < 1e-9);

    let single = wrap_label(
        "one",
        LabelBox::new(60.0, 100.0),
        10.0,
        VAlign::Bottom,
        &measurer(),
    );
    assert_eq!(single.lines[0].dy_em, 0.0);
}

#[test]
fn wrapping_is_idempotent() {
    let text = "north-east regional_distribution centre operations";
    assert_eq!(wrap(text, 70.0, 60.0), wrap(text, 70.0, 60.0));
}

#[test]
fn no_content_is_lost_without_overflow() {
    for text in [
        "alpha beta gamma",
        "north-east regional_distribution centre operations",
        "averyveryverylongsingleword",
        "  leading and trailing  ",
    ] {
        let out = wrap(text, 50.0, 10_000.0);
        assert!(!out.overflow, "{text}");
        let joined = out.texts().concat();
        assert_eq!(strip_whitespace(&joined), strip_whitespace(text), "{text}");
    }
}

#[test]
fn taller_boxes_never_introduce_overflow() {
    let text = "north-east regional_distribution centre operations";
    let mut seen_fit = false;
    for step in 0..40 {
        let out = wrap(text, 70.0, step as f64 * 5.0);
        if seen_fit {
            assert!(!out.overflow, "height {}", step * 5);
        }
        seen_fit |= !out.overflow;
    }
    assert!(seen_fit);
}

#[test]
fn trailing_whitespace_does_not_force_overflow() {
    let out = wrap("abc ", 18.0, 15.0);
    assert_eq!(out.texts(), vec!["abc"]);
    assert!(!out.overflow);
    assert_eq!(out, wrap("abc", 18.0, 15.0));

    // The separator still breaks the line once a word follows it.
    let out = wrap("abc def", 18.0, 100.0);
    assert_eq!(out.texts(), vec!["abc", "def"]);
}

#[test]
fn shorter_boxes_never_add_lines() {
    let text = "north-east regional_distribution centre operations";
    let mut previous = usize::MAX;
    for step in (0..40).rev() {
        let out = wrap(text, 70.0, step as f64 * 5.0);
        assert!(out.lines.len() <= previous, "height {}", step * 5);
        previous = out.lines.len();
    }
}

#[test]
fn second_line_needs_two_line_advances_of_height() {
    let needed = 2.0 * LINE_HEIGHT_EM * 10.0;

    let out = wrap("alpha beta", 30.0, needed);
    assert_eq!(out.texts(), vec!["alpha", "beta"]);
    assert!(!out.overflow);

    let out = wrap("alpha beta", 30.0, needed - 1e-9);
    assert!(out.overflow);
    assert_eq!(out.texts(), vec!["al..."]);
}

#[test]
fn narrow_boxes_keep_a_first_line() {
    for text in ["abc def", "averyveryverylongsingleword", "  x", "a-b_c"] {
        for width in [0.5, 1.0, 5.0, 7.0, 13.0] {
            for height in [20.0, 22.0, 35.0, 100.0] {
                let out = wrap(text, width, height);
                let first = out.lines.first().map(|l| l.text.as_str());
                assert!(
                    first.is_some_and(|t| !t.is_empty()),
                    "{text:?} in {width}x{height}: {:?}",
                    out.texts()
                );
            }
        }
    }
}

#[test]
fn ellipsize_leaves_fitting_text_alone() {
    assert_eq!(ellipsize("Food", 100.0, 10.0, &measurer()), "Food");
    assert_eq!(ellipsize("", -1.0, 10.0, &measurer()), "");
}

#[test]
fn ellipsize_drops_one_character_per_step() {
    assert_eq!(
        ellipsize("Household budget", 60.0, 10.0, &measurer()),
        "Househo..."
    );
}

#[test]
fn ellipsize_terminates_at_the_ellipsis() {
    let out = ellipsize("averyveryverylongsingleword", 5.0, 10.0, &measurer());
    assert_eq!(out, ELLIPSIS);
    assert!(out.chars().count() >= 3);
}

#[derive(Default)]
struct CountingMeasurer {
    calls: AtomicUsize,
}

impl TextMeasurer for CountingMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DeterministicTextMeasurer::default().measure(text, style)
    }
}

#[test]
fn caching_measurer_memoizes_by_text_and_style() {
    let cached = CachingTextMeasurer::new(CountingMeasurer::default());
    let a = cached.measure("label", &TextStyle::sized(12.0));
    let b = cached.measure("label", &TextStyle::sized(12.0));
    assert_eq!(a, b);
    assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);

    cached.measure("label", &TextStyle::sized(13.0));
    assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    assert_eq!(cached.len(), 2);
}
