//! Analyzer for mixed Chinese and Latin text.
//!
//! Segments with [`JiebaTokenizer`] and lowercases the result, so
//! `"Apple/苹果 iPhone 90G"` becomes `["apple", "苹果", "iphone", "90g"]`.
//! This is the default analyzer of the index writer.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::tokenizer::jieba::JiebaTokenizer;
use crate::error::Result;

/// Chinese word segmentation followed by lowercasing.
#[derive(Debug, Clone)]
pub struct ChineseAnalyzer {
    inner: PipelineAnalyzer,
}

impl ChineseAnalyzer {
    /// Create a new Chinese analyzer.
    pub fn new() -> Self {
        let analyzer = PipelineAnalyzer::new(Arc::new(JiebaTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("chinese");

        ChineseAnalyzer { inner: analyzer }
    }
}

impl Default for ChineseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ChineseAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "chinese"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_analyzer_lowercases_latin_words() {
        let analyzer = ChineseAnalyzer::new();
        let tokens: Vec<String> = analyzer
            .analyze("Apple/苹果 iPhone 90G 银白")
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert!(tokens.contains(&"apple".to_string()));
        assert!(tokens.contains(&"苹果".to_string()));
        assert!(tokens.contains(&"iphone".to_string()));
        assert!(tokens.contains(&"90g".to_string()));
    }
}
