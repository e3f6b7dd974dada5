//! Standalone validation helpers shared by the domain types.

/// Checks a single DNS label against `[a-z0-9]([a-z0-9-]*[a-z0-9])?`, 1-63 octets.
pub fn is_valid_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    let bytes = label.as_bytes();
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    if !is_alnum(bytes[0]) {
        return false;
    }
    if bytes.len() == 1 {
        return true;
    }
    if !is_alnum(bytes[bytes.len() - 1]) {
        return false;
    }
    bytes[1..bytes.len() - 1]
        .iter()
        .all(|&b| is_alnum(b) || b == b'-')
}

/// Checks a fully-qualified name: 1-253 octets, every label valid, no empty
/// labels (which would indicate a `..` or leading/trailing dot).
pub fn is_valid_fqdn(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    if name.contains("..") {
        return false;
    }
    name.split('.').all(is_valid_label)
}
