//! Small helpers for login input handling.

use axum::http::HeaderMap;

pub(super) const MAX_USERNAME_LEN: usize = 64;
pub(super) const MAX_PASSWORD_LEN: usize = 128;
pub(super) const UNKNOWN_CLIENT: &str = "unknown";

/// Extract a client address for rate limiting from common proxy headers.
///
/// Requests without either header share the `"unknown"` bucket.
pub(super) fn extract_client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), str::to_string)
}

/// Length bounds, counted in characters, checked before any hashing work.
pub(super) fn valid_login_input(username: &str, password: &str) -> bool {
    (1..=MAX_USERNAME_LEN).contains(&username.chars().count())
        && (1..=MAX_PASSWORD_LEN).contains(&password.chars().count())
}

/// Username as it may appear in audit logs: out-of-bounds input is replaced
/// by `-`, and control characters are escaped so one request is one line.
pub(super) fn audit_username(username: &str) -> String {
    if (1..=MAX_USERNAME_LEN).contains(&username.chars().count()) {
        username.escape_debug().to_string()
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extract_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 198.51.100.4 , 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(extract_client_ip(&headers), "198.51.100.4");
    }

    #[test]
    fn extract_client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(extract_client_ip(&headers), "10.0.0.2");

        assert_eq!(extract_client_ip(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn login_input_bounds() {
        assert!(valid_login_input("a", "p"));
        assert!(valid_login_input(&"u".repeat(64), &"p".repeat(128)));
        assert!(!valid_login_input("", "password"));
        assert!(!valid_login_input("admin", ""));
        assert!(!valid_login_input(&"u".repeat(65), "password"));
        assert!(!valid_login_input("admin", &"p".repeat(129)));
        // Characters, not bytes.
        assert!(valid_login_input(&"é".repeat(64), "password"));
    }

    #[test]
    fn audit_username_is_bounded_and_single_line() {
        assert_eq!(audit_username("heisenberg"), "heisenberg");
        assert_eq!(audit_username(""), "-");
        assert_eq!(audit_username(&"a".repeat(MAX_USERNAME_LEN + 1)), "-");
        assert_eq!(
            audit_username("walt\naudit: login.success"),
            "walt\\naudit: login.success"
        );
        assert!(!audit_username("walt\nforged").contains('\n'));
    }
}
