//! Composition of the SIP identity from what the user typed.

const SCHEME: &str = "sip:";

/// Trim the domain and drop a leading `sip:`.
pub fn normalize_domain(domain: &str) -> &str {
    let domain = domain.trim();
    domain.strip_prefix(SCHEME).unwrap_or(domain)
}

/// Build the identity URI for `username` on `domain`.
///
/// A username that already carries `@` keeps its own domain; the `sip:`
/// scheme is only added when missing.
pub fn infer_identity(username: &str, domain: &str) -> String {
    let user = username.trim();
    let domain = normalize_domain(domain);

    match (user.starts_with(SCHEME), user.contains('@')) {
        (true, true) => user.to_string(),
        (true, false) => format!("{}@{}", user, domain),
        (false, true) => format!("{}{}", SCHEME, user),
        (false, false) => format!("{}{}@{}", SCHEME, user, domain),
    }
}

/// Server address for the registrar on `domain`.
pub fn server_uri(domain: &str) -> String {
    format!("{}{}", SCHEME, normalize_domain(domain))
}

/// Digits of an international dialing prefix, `None` when nothing is left.
pub fn international_prefix_digits(prefix: &str) -> Option<&str> {
    let prefix = prefix.trim();
    let digits = prefix.strip_prefix('+').unwrap_or(prefix);
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
