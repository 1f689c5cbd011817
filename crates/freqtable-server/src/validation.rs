//! Request validation.
//!
//! URLs are checked by hand: the rules below are all the service needs and
//! each failure maps to one message.

/// Check that `value` is an absolute URL: `scheme://host[...]`.
///
/// - scheme: an ASCII letter followed by letters, digits, `+`, `-` or `.`
/// - host: non-empty, after an optional `user@` and before an optional `:port`
/// - no whitespace anywhere
///
/// # Errors
///
/// Returns a description of the first rule `value` breaks.
pub fn validate_url(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("URL cannot be empty".to_string());
    }
    if value.chars().any(char::is_whitespace) {
        return Err("URL cannot contain whitespace".to_string());
    }

    let Some((scheme, rest)) = value.split_once("://") else {
        return Err(format!("'{value}' is not an absolute URL (missing scheme)"));
    };

    let mut chars = scheme.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(format!("invalid URL scheme '{scheme}'"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return Err(format!("invalid URL scheme '{scheme}'"));
    }

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    };
    if host.is_empty() {
        return Err(format!("'{value}' has no host"));
    }

    Ok(())
}
