use crate::checker::dictionary::Dictionary;

/// Suggestions for a misspelled (lowercased) word, best first.
///
/// Cheap strategies run first; the full dictionary is only scanned for words
/// of three characters or fewer.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    let mut suggestions = Vec::new();
    let length = word.chars().count();
    if max_suggestions == 0 || length == 0 {
        return suggestions;
    }

    if length >= 3 {
        push_prefix_matches(word, &prefix(word, 3), 2, dictionary, &mut suggestions);
        if suggestions.len() >= max_suggestions {
            suggestions.truncate(max_suggestions);
            return suggestions;
        }
    }

    for transform in generate_transformations(word) {
        if dictionary.contains(&transform) && !suggestions.contains(&transform) {
            suggestions.push(transform);
            if suggestions.len() >= max_suggestions {
                return suggestions;
            }
        }
    }

    if length >= 2 {
        push_prefix_matches(word, &prefix(word, 2), 3, dictionary, &mut suggestions);
        if suggestions.len() >= max_suggestions {
            suggestions.truncate(max_suggestions);
            return suggestions;
        }
    }

    if length <= 3 {
        let mut candidates: Vec<(usize, String)> = dictionary
            .all_words()
            .into_iter()
            .filter(|w| w.chars().count().abs_diff(length) <= 1)
            .take(100)
            .filter_map(|w| {
                let distance = edit_distance(word, &w);
                (distance <= 2 && !suggestions.contains(&w)).then_some((distance, w))
            })
            .collect();
        candidates.sort();
        suggestions.extend(candidates.into_iter().map(|(_, w)| w));
    }

    suggestions.truncate(max_suggestions);
    suggestions
}

fn prefix(word: &str, count: usize) -> String {
    word.chars().take(count).collect()
}

fn push_prefix_matches(
    word: &str,
    prefix: &str,
    max_distance: usize,
    dictionary: &Dictionary,
    suggestions: &mut Vec<String>,
) {
    let mut matches: Vec<(usize, String)> = dictionary
        .words_with_prefix(prefix)
        .into_iter()
        .filter(|candidate| !candidate.contains(' '))
        .map(|candidate| (edit_distance(word, &candidate), candidate))
        .filter(|(distance, candidate)| *distance <= max_distance && !suggestions.contains(candidate))
        .collect();
    matches.sort();
    suggestions.extend(matches.into_iter().map(|(_, w)| w));
}

/// Levenshtein distance over chars, two rows at a time.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Letters typists confuse, tried in one direction only.
const CONFUSIONS: [(char, char); 11] = [
    ('a', 'e'),
    ('e', 'i'),
    ('i', 'o'),
    ('o', 'u'),
    ('b', 'v'),
    ('c', 'k'),
    ('f', 'v'),
    ('g', 'j'),
    ('m', 'n'),
    ('s', 'z'),
    ('t', 'd'),
];

/// Single-character deletions, adjacent swaps and confusion replacements.
fn generate_transformations(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::new();

    for i in 0..chars.len() {
        let mut candidate = chars.clone();
        candidate.remove(i);
        out.push(candidate.into_iter().collect());
    }
    for i in 1..chars.len() {
        let mut candidate = chars.clone();
        candidate.swap(i - 1, i);
        out.push(candidate.into_iter().collect());
    }
    for (i, &ch) in chars.iter().enumerate() {
        for &(_, to) in CONFUSIONS.iter().filter(|(from, _)| *from == ch) {
            let mut candidate = chars.clone();
            candidate[i] = to;
            out.push(candidate.into_iter().collect());
        }
    }

    out
}
