use std::collections::HashMap;

/// Ephemeral code → form id lookup table, built from the latest fetched
/// list of forms awaiting verification. Rebuilt wholesale on refresh;
/// mutated only by single-entry removal after a confirmed pickup.
/// Never persisted.
#[derive(Debug, Clone, Default)]
pub struct PendingIndex {
    by_code: HashMap<String, i64>,
}

/// Scanners and manual entry disagree on case; codes are matched uppercase.
fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl PendingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from (code, id) pairs, replacing any prior contents.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let by_code = entries
            .into_iter()
            .map(|(code, id)| (normalize(&code), id))
            .collect();
        Self { by_code }
    }

    pub fn get(&self, code: &str) -> Option<i64> {
        self.by_code.get(&normalize(code)).copied()
    }

    /// Remove one entry after a confirmed pickup. No-op for unknown codes.
    pub fn remove(&mut self, code: &str) {
        self.by_code.remove(&normalize(code));
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
