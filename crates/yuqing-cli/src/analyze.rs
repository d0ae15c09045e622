//! `analyze`: in-process sentiment and keywords for one text.

use yuqing_nlp::wire::KeywordResponse;
use yuqing_nlp::LexiconAnalyzer;

pub(crate) fn run_analyze(text: &str, language: &str, top_k: usize) -> anyhow::Result<()> {
    let analyzer = LexiconAnalyzer::default();
    let sentiment = analyzer.sentiment(text, language)?;
    let keywords: Vec<KeywordResponse> = analyzer
        .keywords(text, language, top_k)?
        .into_iter()
        .map(Into::into)
        .collect();

    let output = serde_json::json!({
        "sentiment": sentiment.sentiment,
        "score": sentiment.score,
        "confidence": sentiment.confidence,
        "tokens": analyzer.tokenize(text, language),
        "keywords": keywords,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
