use unicode_normalization::UnicodeNormalization;

/// Default maximum length, in characters, of a query treated as a single word
pub const DEFAULT_SINGLE_WORD_MAX_CHARS: usize = 50;

pub trait Preprocessor {
    /// Display form: trimmed, NFKC-normalized, internal whitespace collapsed
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        let text: String = text.nfkc().collect();

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Lookup key: the display form, case-folded
    fn fold(&self, text: &str) -> String {
        self.process(text).to_lowercase()
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

/// Case-folded lookup key using the default preprocessor
pub fn normalize_query(text: &str) -> String {
    DefaultPreprocessor.fold(text)
}

/// A query is a single word when, after trimming, it holds no space, tab or
/// newline and is shorter than `max_chars`.
pub fn is_single_word(text: &str, max_chars: usize) -> bool {
    let trimmed = text.trim();

    !trimmed.is_empty()
        && !trimmed.contains([' ', '\t', '\n', '\r'])
        && trimmed.chars().count() < max_chars
}
