//! Facts established by earlier checks in the same run.

use rustc_hash::FxHashMap;

use super::CheckKind;

/// Map from check kind to the arguments it was invoked with.
///
/// Built fresh for every file: the engine records a check here only after it
/// passed, so a check sees exactly the checks declared before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertionSet {
    facts: FxHashMap<CheckKind, Vec<String>>,
}

impl AssertionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passed check. A later check of the same kind replaces it.
    pub fn record(&mut self, kind: CheckKind, args: &[String]) {
        self.facts.insert(kind, args.to_vec());
    }

    pub fn get(&self, kind: CheckKind) -> Option<&[String]> {
        self.facts.get(&kind).map(Vec::as_slice)
    }

    /// First argument of the asserted `encoding(...)` check, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.get(CheckKind::Encoding)
            .and_then(|args| args.first())
            .map(String::as_str)
    }

    /// Convenience for tests and direct check calls.
    pub fn with_encoding(encoding: &str) -> Self {
        let mut set = Self::new();
        set.record(CheckKind::Encoding, &[encoding.to_string()]);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_record_replaces_earlier() {
        let mut set = AssertionSet::new();
        assert_eq!(set.encoding(), None);
        set.record(CheckKind::Encoding, &["ascii".to_string()]);
        set.record(CheckKind::Encoding, &["utf-8".to_string()]);
        assert_eq!(set.encoding(), Some("utf-8"));
        assert_eq!(set.get(CheckKind::Bom), None);
    }
}
