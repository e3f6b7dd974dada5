use crate::errors::DomainError;
use crate::validators::is_valid_fqdn;
use std::fmt;

/// A lowercased ASCII fully-qualified domain name, stored without a
/// trailing dot.
///
/// Two independently-listed forms of the same name (`example.com` and
/// `www.example.com`) are both kept — `Domain` does not collapse a
/// `www.` prefix, it only refuses to invent one that was not present in
/// the source list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    /// Parses and validates a domain name, lowercasing it and stripping a
    /// single trailing dot first.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_suffix('.').unwrap_or(trimmed);
        let lowered = stripped.to_ascii_lowercase();

        if !is_valid_fqdn(&lowered) {
            return Err(DomainError::InvalidDomainName(raw.to_string()));
        }

        Ok(Domain(lowered))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates this name and every proper suffix obtained by dropping
    /// leading labels, e.g. `a.b.example.com` yields `a.b.example.com`,
    /// `b.example.com`, `example.com`, `com`.
    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        let s = self.0.as_str();
        let mut start = Some(0usize);
        std::iter::from_fn(move || {
            let s_start = start?;
            let rest = &s[s_start..];
            start = s[s_start..]
                .find('.')
                .map(|i| s_start + i + 1)
                .filter(|&next| next < s.len());
            Some(rest)
        })
    }
}

impl std::borrow::Borrow<str> for Domain {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases `name` and strips a single trailing dot, without validating
/// it as a well-formed label set. Used on the query path, where a
/// malformed incoming name should simply fail to match rather than be
/// rejected outright.
pub fn normalize_query_name(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_lowercases() {
        let d = Domain::parse("Example.COM.").unwrap();
        assert_eq!(d.as_str(), "example.com");
    }

    #[test]
    fn rejects_double_dot() {
        assert!(Domain::parse("a..com").is_err());
    }

    #[test]
    fn rejects_oversized_label() {
        let label = "a".repeat(64);
        assert!(Domain::parse(&format!("{label}.com")).is_err());
    }

    #[test]
    fn suffixes_walk_labels() {
        let d = Domain::parse("a.b.example.com").unwrap();
        let suffixes: Vec<&str> = d.suffixes().collect();
        assert_eq!(
            suffixes,
            vec!["a.b.example.com", "b.example.com", "example.com", "com"]
        );
    }

    #[test]
    fn single_label_has_no_further_suffix() {
        let d = Domain::parse("localhost").unwrap();
        assert_eq!(d.suffixes().collect::<Vec<_>>(), vec!["localhost"]);
    }
}
