//! Reading-order adjacency between consecutive text runs.
//!
//! The rules lean towards treating runs as contiguous: a missing space
//! merges two words, a spurious one splits a word, and the latter hurts
//! search and spelling more.

use crate::config::FlowSettings;
use crate::fixed::som::SomTextRun;
use crate::geometry::Rect;

/// Geometric relationship between two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphComparison {
    SameLine,
    DifferentLine,
    Adjacent,
    Unknown,
}

/// Languages written without spaces between words.
const ALWAYS_ADJACENT_LANGUAGES: [&str; 6] = ["zh", "ja", "th", "lo", "km", "my"];

/// Characters that end a line without requiring a separator.
const HYPHENS: [char; 7] = [
    '-', '\u{00AD}', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}',
];

pub fn is_hyphen(ch: char) -> bool {
    HYPHENS.contains(&ch)
}

fn primary_language(culture: &str) -> &str {
    culture.split(['-', '_']).next().unwrap_or(culture)
}

fn cultures_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn is_always_adjacent(culture: &str) -> bool {
    let primary = primary_language(culture);
    ALWAYS_ADJACENT_LANGUAGES
        .iter()
        .any(|lang| lang.eq_ignore_ascii_case(primary))
}

/// Whether a separator must be synthesized between `prev` and `current`.
pub fn is_non_contiguous(prev: &SomTextRun, current: &SomTextRun, comparison: GlyphComparison) -> bool {
    if !cultures_match(&prev.culture, &current.culture) {
        return true;
    }
    if is_always_adjacent(&prev.culture) {
        return false;
    }
    if prev.sideways != current.sideways {
        return true;
    }
    if prev.is_empty() || current.is_empty() {
        return false;
    }
    needs_separator_after(prev, comparison)
}

/// Trailing-character and line rules, shared with the separator check before objects.
pub fn needs_separator_after(prev: &SomTextRun, comparison: GlyphComparison) -> bool {
    let Some(last) = prev.last_char() else {
        return false;
    };
    if !prev.sideways && last == ' ' {
        return false;
    }
    match comparison {
        GlyphComparison::DifferentLine | GlyphComparison::Unknown => !is_hyphen(last),
        GlyphComparison::SameLine => true,
        GlyphComparison::Adjacent => false,
    }
}

/// Compare two runs geometrically in page space.
pub fn compare_glyphs(prev: &SomTextRun, current: &SomTextRun, settings: &FlowSettings) -> GlyphComparison {
    if prev.node == current.node {
        return GlyphComparison::SameLine;
    }
    if prev.is_reversed() != current.is_reversed() {
        return compare_boxes(&prev.bounds, &current.bounds, settings);
    }
    compare_run_to_box(prev, &current.bounds, settings)
}

/// Compare a run with whatever box follows it, refining `SameLine` to `Adjacent`
/// when the horizontal gap is negligible.
pub fn compare_run_to_box(prev: &SomTextRun, next: &Rect, settings: &FlowSettings) -> GlyphComparison {
    let comparison = compare_boxes(&prev.bounds, next, settings);
    if comparison != GlyphComparison::SameLine {
        return comparison;
    }
    let gap = if prev.is_reversed() {
        prev.bounds.left() - next.right()
    } else {
        next.left() - prev.bounds.right()
    };
    let limit = prev.bounds.height.max(next.height) * settings.adjacent_gap;
    if gap.abs() < limit {
        GlyphComparison::Adjacent
    } else {
        comparison
    }
}

/// Line relationship of two boxes by vertical overlap relative to the smaller height.
pub fn compare_boxes(first: &Rect, second: &Rect, settings: &FlowSettings) -> GlyphComparison {
    let smaller = first.height.min(second.height);
    if smaller <= 0.0 {
        return GlyphComparison::Unknown;
    }
    let delta = second.top() - first.top();
    let overlap = if delta > 0.0 {
        first.height - delta
    } else {
        second.height + delta
    };
    if overlap / smaller > settings.line_overlap {
        GlyphComparison::SameLine
    } else {
        GlyphComparison::DifferentLine
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fixed::node::FixedNode;

    pub(crate) fn run(culture: &str, text: &str, index: usize) -> SomTextRun {
        SomTextRun {
            node: FixedNode::new(0, &[index]),
            text: text.to_string(),
            start_index: 0,
            end_index: text.chars().count(),
            culture: culture.to_string(),
            bidi_level: 0,
            sideways: false,
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            font_size: 10.0,
            line_index: 0,
            navigate_uri: None,
        }
    }

    fn classify(c1: &str, c2: &str, t1: &str, t2: &str, cmp: GlyphComparison) -> bool {
        is_non_contiguous(&run(c1, t1, 0), &run(c2, t2, 1), cmp)
    }

    #[test]
    fn test_documented_cases() {
        assert!(!classify("en-US", "en-US", "cat", "dog", GlyphComparison::Adjacent));
        assert!(!classify("en-US", "en-US", "cat ", "dog", GlyphComparison::DifferentLine));
        assert!(classify("en-US", "fr-FR", "cat", "chien", GlyphComparison::Adjacent));
        assert!(!classify("zh-CN", "zh-CN", "你", "好", GlyphComparison::DifferentLine));
        assert!(!classify("en-US", "en-US", "auto-", "mobile", GlyphComparison::DifferentLine));
    }

    #[test]
    fn test_line_rules() {
        assert!(classify("en-US", "en-US", "cat", "dog", GlyphComparison::DifferentLine));
        assert!(classify("en-US", "en-US", "cat", "dog", GlyphComparison::Unknown));
        assert!(classify("en-US", "en-US", "cat", "dog", GlyphComparison::SameLine));
        assert!(!classify("en-US", "en-US", "soft\u{00AD}", "ware", GlyphComparison::DifferentLine));
        assert!(!classify("en-US", "en-US", "", "dog", GlyphComparison::DifferentLine));
    }

    #[test]
    fn test_writing_mode_mismatch() {
        let prev = run("en-US", "cat", 0);
        let mut current = run("en-US", "dog", 1);
        current.sideways = true;
        assert!(is_non_contiguous(&prev, &current, GlyphComparison::Adjacent));
    }

    #[test]
    fn test_compare_glyphs_geometry() {
        let settings = FlowSettings::default();
        let mut a = run("en-US", "cat", 0);
        let mut b = run("en-US", "dog", 1);
        a.bounds = Rect::new(0.0, 0.0, 30.0, 10.0);

        b.bounds = Rect::new(30.2, 1.0, 30.0, 10.0);
        assert_eq!(compare_glyphs(&a, &b, &settings), GlyphComparison::Adjacent);

        b.bounds = Rect::new(40.0, 1.0, 30.0, 10.0);
        assert_eq!(compare_glyphs(&a, &b, &settings), GlyphComparison::SameLine);

        b.bounds = Rect::new(0.0, 6.0, 30.0, 10.0);
        assert_eq!(compare_glyphs(&a, &b, &settings), GlyphComparison::DifferentLine);

        b.bounds = Rect::new(0.0, -4.0, 30.0, 10.0);
        assert_eq!(compare_boxes(&a.bounds, &b.bounds, &settings), GlyphComparison::SameLine);

        assert_eq!(compare_glyphs(&a, &a.slice(1, 2), &settings), GlyphComparison::SameLine);
    }

    #[test]
    fn test_rtl_adjacency() {
        let settings = FlowSettings::default();
        let mut a = run("ar", "abc", 0);
        let mut b = run("ar", "def", 1);
        a.bidi_level = 1;
        b.bidi_level = 1;
        a.bounds = Rect::new(100.0, 0.0, 30.0, 10.0);
        b.bounds = Rect::new(70.0, 0.0, 30.0, 10.0);
        assert_eq!(compare_glyphs(&a, &b, &settings), GlyphComparison::Adjacent);
    }
}
