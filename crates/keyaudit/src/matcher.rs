//! Case-sensitive substring matching against the union of two keyword lists.

use crate::extractor::ExtractedContent;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub matched: bool,
    /// Keywords found, in union order.
    pub hits: Vec<String>,
}

impl MatchResult {
    fn from_hits(hits: Vec<String>) -> Self {
        Self {
            matched: !hits.is_empty(),
            hits,
        }
    }
}

/// Union of list A and list B, first occurrence wins. Read-only for a run.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new(list_a: &[String], list_b: &[String]) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(list_a.len() + list_b.len());
        for keyword in list_a.iter().chain(list_b.iter()) {
            if !keywords.contains(keyword) {
                keywords.push(keyword.clone());
            }
        }
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn match_text(&self, text: &str) -> MatchResult {
        let hits = self
            .keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .cloned()
            .collect();
        MatchResult::from_hits(hits)
    }

    /// Archive members are searched one by one so a hit never spans two
    /// members. A keyword counts once if any member contains it.
    pub fn match_content(&self, content: &ExtractedContent) -> MatchResult {
        match content {
            ExtractedContent::Text(text) => self.match_text(text),
            ExtractedContent::Archive(members) => {
                let hits = self
                    .keywords
                    .iter()
                    .filter(|k| members.values().any(|text| text.contains(k.as_str())))
                    .cloned()
                    .collect();
                MatchResult::from_hits(hits)
            }
        }
    }
}

/// Pure matching over two ad-hoc lists.
pub fn match_keywords(text: &str, list_a: &[String], list_b: &[String]) -> MatchResult {
    KeywordSet::new(list_a, list_b).match_text(text)
}
