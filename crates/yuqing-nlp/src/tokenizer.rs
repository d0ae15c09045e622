//! Language-pluggable text segmentation.

use std::sync::Arc;

use jieba_rs::Jieba;
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into an ordered token sequence.
///
/// Implementations are deterministic for a given input and dictionary and
/// have no side effects.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn name(&self) -> &'static str;
}

/// Dictionary-based Chinese segmentation with HMM discovery of unknown words.
///
/// Punctuation and whitespace come back as their own tokens. They never
/// match a lexicon entry but do count toward the sequence length.
#[derive(Clone)]
pub struct ChineseTokenizer {
    jieba: Arc<Jieba>,
}

impl ChineseTokenizer {
    /// Loads the bundled dictionary. This takes a noticeable moment, so build
    /// one instance at startup and clone it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jieba: Arc::new(Jieba::new()),
        }
    }
}

impl Default for ChineseTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for ChineseTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, true)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &'static str {
        "jieba"
    }
}

/// UAX #29 word segmentation, lowercased. Punctuation is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_lowercase).collect()
    }

    fn name(&self) -> &'static str {
        "unicode"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Chinese,
    English,
    Other,
}

impl Language {
    /// Maps a language code such as `zh`, `zh-CN` or `en` to a [`Language`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" | "cn" | "chinese" => Language::Chinese,
            "en" | "english" => Language::English,
            _ => Language::Other,
        }
    }
}

/// Routes text to the tokenizer for its language.
#[derive(Clone, Default)]
pub struct TokenPipeline {
    chinese: ChineseTokenizer,
    unicode: UnicodeTokenizer,
}

impl TokenPipeline {
    #[must_use]
    pub fn new(chinese: ChineseTokenizer) -> Self {
        Self {
            chinese,
            unicode: UnicodeTokenizer,
        }
    }

    #[must_use]
    pub fn tokenizer_for(&self, language: Language) -> &dyn Tokenizer {
        match language {
            Language::Chinese => &self.chinese,
            Language::English | Language::Other => &self.unicode,
        }
    }

    #[must_use]
    pub fn tokenize(&self, text: &str, language: Language) -> Vec<String> {
        self.tokenizer_for(language).tokenize(text)
    }
}
