use std::collections::BTreeSet;

/// Symbols the live feed has been asked for during this session.
///
/// Append-only: a symbol moves from pending to subscribed when the sink confirms it and is
/// never removed. A failed request just clears the pending mark so the next selection retries.
#[derive(Debug, Default, Clone)]
pub struct SubscribedSymbolSet {
    subscribed: BTreeSet<String>,
    pending: BTreeSet<String>,
}

impl SubscribedSymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `requested` down to symbols neither subscribed nor already in flight,
    /// and mark those as pending. Duplicates inside `requested` collapse to one.
    pub fn begin<S: AsRef<str>>(&mut self, requested: &[S]) -> Vec<String> {
        let mut fresh = Vec::new();
        for symbol in requested {
            let symbol = symbol.as_ref().trim();
            if symbol.is_empty() || self.subscribed.contains(symbol) || self.pending.contains(symbol) {
                continue;
            }
            self.pending.insert(symbol.to_string());
            fresh.push(symbol.to_string());
        }
        fresh
    }

    pub fn complete(&mut self, symbols: &[String], succeeded: bool) {
        for symbol in symbols {
            self.pending.remove(symbol);
            if succeeded {
                self.subscribed.insert(symbol.clone());
            }
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.subscribed.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.subscribed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_against_subscribed_and_pending() {
        let mut set = SubscribedSymbolSet::new();
        let first = set.begin(&["CE1", "PE1", "CE1"]);
        assert_eq!(first, vec!["CE1", "PE1"]);

        // Still in flight: not requested twice
        assert!(set.begin(&["CE1", "PE1"]).is_empty());

        set.complete(&first, true);
        assert!(set.contains("CE1"));
        assert_eq!(set.len(), 2);

        // Switching strike only asks for the new legs
        assert_eq!(set.begin(&["CE1", "CE2", "PE2"]), vec!["CE2", "PE2"]);
    }

    #[test]
    fn test_failed_request_is_retried() {
        let mut set = SubscribedSymbolSet::new();
        let attempt = set.begin(&["CE1"]);
        set.complete(&attempt, false);
        assert!(set.is_empty());
        assert_eq!(set.begin(&["CE1"]), vec!["CE1"]);
    }
}
