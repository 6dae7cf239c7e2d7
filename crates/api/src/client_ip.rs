//! Caller identification for rate limiting.

use axum::http::HeaderMap;

/// Identifier used when no forwarding header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address from proxy headers.
///
/// Checks `x-forwarded-for` (first entry), then `x-real-ip`, then
/// `cf-connecting-ip`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(first) = header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return first.to_string();
    }

    header("x-real-ip")
        .or_else(|| header("cf-connecting-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
