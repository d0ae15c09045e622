//! Text analysis for collected items.
//!
//! Segments text into tokens, scores sentiment against fixed positive and
//! negative word sets, and extracts the most frequent non-stopword tokens.
//! [`LexiconAnalyzer`] runs all of this in-process; [`RemoteAnalyzer`] talks
//! to an analysis service that speaks the same wire contract (see [`wire`]).

pub mod analyzer;
pub mod client;
pub mod error;
pub mod keywords;
pub mod lexicon;
pub mod scorer;
pub mod tokenizer;
pub mod wire;

pub use analyzer::{build_analyzer, LexiconAnalyzer, TextAnalysis, TextAnalyzer};
pub use client::RemoteAnalyzer;
pub use error::NlpError;
pub use keywords::KeywordExtractor;
pub use scorer::SentimentScorer;
pub use tokenizer::{ChineseTokenizer, Language, TokenPipeline, Tokenizer, UnicodeTokenizer};
