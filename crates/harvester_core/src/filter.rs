use crate::ExtractedRecord;

/// Optional content predicate applied to fresh records before admission.
pub trait ContentFilter: Send + Sync {
    fn accept(&self, record: &ExtractedRecord) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ContentFilter for AcceptAll {
    fn accept(&self, _record: &ExtractedRecord) -> bool {
        true
    }
}

/// Rejects records whose text contains any of the terms, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct BlockedTerms {
    terms: Vec<String>,
}

impl BlockedTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl ContentFilter for BlockedTerms {
    fn accept(&self, record: &ExtractedRecord) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let text = record.text.to_lowercase();
        !self.terms.iter().any(|term| text.contains(term.as_str()))
    }
}
