use url::Url;

/// Validates a next-URL to prevent open redirects.
///
/// Returns `Some(url)` if the URL is a valid relative path, `None` otherwise.
///
/// # Security
///
/// This function prevents open redirect attacks by ensuring URLs:
/// - Start with a single `/` (relative path)
/// - Do not start with `//` (protocol-relative URLs like `//evil.com`)
/// - Do not contain control characters (potential injection)
/// - Have no `\` or `://` in the path, which browsers may turn into a host
///
/// The query string is left alone, so a path like
/// `/search?u=https://example.org` survives the round trip through login.
///
/// # Examples
///
/// ```
/// use oauthgate_core::auth::validate_next;
///
/// assert_eq!(validate_next("/restrict?key=value"), Some("/restrict?key=value"));
/// assert_eq!(validate_next("/"), Some("/"));
///
/// assert_eq!(validate_next("//evil.com"), None);
/// assert_eq!(validate_next("/\\evil.com"), None);
/// assert_eq!(validate_next("https://evil.com"), None);
/// ```
pub fn validate_next(url: &str) -> Option<&str> {
    if !url.starts_with('/') {
        return None;
    }

    if url.starts_with("//") {
        return None;
    }

    if url.chars().any(|c| c.is_control()) {
        return None;
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.contains('\\') || path.contains("://") {
        return None;
    }

    Some(url)
}

/// Extracts the path and query of an absolute `Referer` header value.
///
/// Host and scheme are dropped, so the result always points back into this
/// application. The result still goes through [`validate_next`].
///
/// ```
/// use oauthgate_core::auth::next_from_referer;
///
/// assert_eq!(
///     next_from_referer("https://app.example.com/docs?page=2").as_deref(),
///     Some("/docs?page=2")
/// );
/// assert_eq!(next_from_referer("not a url"), None);
/// ```
pub fn next_from_referer(referer: &str) -> Option<String> {
    let url = Url::parse(referer).ok()?;
    let mut next = url.path().to_string();
    if let Some(query) = url.query() {
        next.push('?');
        next.push_str(query);
    }
    validate_next(&next).map(String::from)
}
