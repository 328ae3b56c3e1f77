//! Per-field analyzer.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Applies a different analyzer to selected fields, with a default for the rest.
///
/// Reuse one instance through `Arc::clone` when several fields share an
/// analyzer; the jieba dictionary behind [`ChineseAnalyzer`] is large.
///
/// [`ChineseAnalyzer`]: crate::analysis::analyzer::chinese::ChineseAnalyzer
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use lucerna::analysis::analyzer::Analyzer;
/// use lucerna::analysis::analyzer::keyword::KeywordAnalyzer;
/// use lucerna::analysis::analyzer::per_field::PerFieldAnalyzer;
/// use lucerna::analysis::analyzer::standard::StandardAnalyzer;
///
/// let analyzer = PerFieldAnalyzer::new(Arc::new(StandardAnalyzer::new()))
///     .with_analyzer("sku", Arc::new(KeywordAnalyzer::new()));
///
/// let tokens: Vec<_> = analyzer.analyze_field("sku", "AB-12 X").unwrap().collect();
/// assert_eq!(tokens.len(), 1);
/// ```
#[derive(Clone)]
pub struct PerFieldAnalyzer {
    default_analyzer: Arc<dyn Analyzer>,
    field_analyzers: AHashMap<String, Arc<dyn Analyzer>>,
}

impl PerFieldAnalyzer {
    pub fn new(default_analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            default_analyzer,
            field_analyzers: AHashMap::new(),
        }
    }

    /// Use `analyzer` for `field`.
    pub fn add_analyzer(&mut self, field: impl Into<String>, analyzer: Arc<dyn Analyzer>) {
        self.field_analyzers.insert(field.into(), analyzer);
    }

    pub fn with_analyzer(mut self, field: impl Into<String>, analyzer: Arc<dyn Analyzer>) -> Self {
        self.add_analyzer(field, analyzer);
        self
    }

    /// Get the analyzer for a specific field.
    pub fn get_analyzer(&self, field: &str) -> &Arc<dyn Analyzer> {
        self.field_analyzers
            .get(field)
            .unwrap_or(&self.default_analyzer)
    }

    pub fn default_analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.default_analyzer
    }
}

impl fmt::Debug for PerFieldAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<(&str, &'static str)> = self
            .field_analyzers
            .iter()
            .map(|(field, analyzer)| (field.as_str(), analyzer.name()))
            .collect();
        fields.sort_unstable();
        f.debug_struct("PerFieldAnalyzer")
            .field("default", &self.default_analyzer.name())
            .field("fields", &fields)
            .finish()
    }
}

impl Analyzer for PerFieldAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.default_analyzer.analyze(text)
    }

    fn analyze_field(&self, field: &str, text: &str) -> Result<TokenStream> {
        self.get_analyzer(field).analyze_field(field, text)
    }

    fn name(&self) -> &'static str {
        "per_field"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::keyword::KeywordAnalyzer;
    use crate::analysis::analyzer::standard::StandardAnalyzer;

    fn texts(stream: TokenStream) -> Vec<String> {
        stream.map(|t| t.text).collect()
    }

    #[test]
    fn test_per_field_analyzer() {
        let keyword: Arc<dyn Analyzer> = Arc::new(KeywordAnalyzer::new());
        let analyzer = PerFieldAnalyzer::new(Arc::new(StandardAnalyzer::new()))
            .with_analyzer("id", Arc::clone(&keyword))
            .with_analyzer("category", keyword);

        let text = "Hello World";
        assert_eq!(
            texts(analyzer.analyze_field("title", text).unwrap()),
            vec!["hello", "world"]
        );
        assert_eq!(
            texts(analyzer.analyze_field("id", text).unwrap()),
            vec!["Hello World"]
        );
        assert_eq!(
            texts(analyzer.analyze_field("category", text).unwrap()),
            vec!["Hello World"]
        );
    }

    #[test]
    fn test_plain_analyze_uses_default() {
        let analyzer = PerFieldAnalyzer::new(Arc::new(StandardAnalyzer::new()))
            .with_analyzer("id", Arc::new(KeywordAnalyzer::new()));

        assert_eq!(
            texts(analyzer.analyze("Hello World").unwrap()),
            vec!["hello", "world"]
        );
        assert_eq!(analyzer.get_analyzer("unknown").name(), "standard");
    }
}
