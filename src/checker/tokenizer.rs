use unicode_segmentation::UnicodeSegmentation;

const SENTENCE_WINDOW: usize = 512;

/// A word-boundary piece of a sentence. `start` and `length` count chars in the whole buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub start: usize,
    pub length: usize,
    pub text: &'a str,
    pub is_word: bool,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_hyphen(&self) -> bool {
        matches!(self.text, "-" | "\u{2010}" | "\u{2011}")
    }
}

/// Length in chars of the sentence starting at `from`.
pub fn sentence_length(text: &[char], from: usize) -> usize {
    let remaining = text.len().saturating_sub(from);
    if remaining == 0 {
        return 0;
    }
    let mut window = SENTENCE_WINDOW.min(remaining);
    loop {
        let chunk: String = text[from..from + window].iter().collect();
        let first = chunk
            .split_sentence_bounds()
            .next()
            .map_or(window, |sentence| sentence.chars().count());
        if first < window || window == remaining {
            return first.clamp(1, remaining);
        }
        window = (window * 2).min(remaining);
    }
}

/// Word-boundary pieces of `sentence`, offset by `base`.
pub fn word_tokens(sentence: &str, base: usize) -> Vec<Token<'_>> {
    let mut position = base;
    sentence
        .split_word_bounds()
        .map(|text| {
            let length = text.chars().count();
            let token = Token {
                start: position,
                length,
                text,
                is_word: text.chars().any(char::is_alphanumeric),
            };
            position += length;
            token
        })
        .collect()
}
