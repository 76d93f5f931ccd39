/// Get environment variable with SESSIONKIT_ prefix, falling back to unprefixed version
///
/// Checks `SESSIONKIT_{key}` first, then `{key}`.
///
/// # Examples
///
/// ```rust,ignore
/// use crate::utils::get_env_with_prefix;
///
/// // Checks SESSIONKIT_SESSION_DIR first, then SESSION_DIR
/// let dir = get_env_with_prefix("SESSION_DIR");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("SESSIONKIT_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse a boolean environment value, accepting `1`/`0`, `yes`/`no` and `on`/`off`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
