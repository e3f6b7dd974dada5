use crate::domain_name::{normalize_query_name, Domain};
use std::collections::HashSet;

/// An immutable snapshot of the blocklist: an exact-match set of domains
/// plus a generation counter bumped on every reload.
///
/// Suffix matching is done by iteratively stripping leading labels off the
/// query name and probing the same `HashSet`, rather than by building a
/// trie — the list is static at runtime, lookups are dominated by hash
/// probes, and the average label count is small (<5), so a trie buys
/// nothing here.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    domains: HashSet<Domain>,
    generation: u64,
}

impl Blocklist {
    pub fn new(domains: HashSet<Domain>, generation: u64) -> Self {
        Self { domains, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// `true` if `name` or any proper suffix of it is listed.
    ///
    /// `name` is normalized (lowercased, trailing dot stripped) before the
    /// lookup; it need not already be a validated `Domain`, since a
    /// malformed incoming query name should simply fail to match.
    pub fn contains(&self, name: &str) -> bool {
        let normalized = normalize_query_name(name);
        let mut rest: &str = &normalized;
        loop {
            if self.domains.contains(rest) {
                return true;
            }
            match rest.find('.') {
                Some(i) if i + 1 < rest.len() => rest = &rest[i + 1..],
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> HashSet<Domain> {
        names.iter().map(|n| Domain::parse(n).unwrap()).collect()
    }

    #[test]
    fn exact_match() {
        let bl = Blocklist::new(set(&["example.com"]), 1);
        assert!(bl.contains("example.com"));
    }

    #[test]
    fn subdomain_is_blocked_by_parent() {
        let bl = Blocklist::new(set(&["example.com"]), 1);
        assert!(bl.contains("a.b.example.com"));
    }

    #[test]
    fn listed_subdomain_does_not_block_ancestor() {
        let bl = Blocklist::new(set(&["a.b.example.com"]), 1);
        assert!(!bl.contains("example.com"));
        assert!(bl.contains("a.b.example.com"));
    }

    #[test]
    fn unrelated_domain_not_blocked() {
        let bl = Blocklist::new(set(&["example.com"]), 1);
        assert!(!bl.contains("github.com"));
    }

    #[test]
    fn query_name_is_case_and_dot_normalized() {
        let bl = Blocklist::new(set(&["example.com"]), 1);
        assert!(bl.contains("EXAMPLE.com."));
    }
}
