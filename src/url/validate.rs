use ::url::Url;

/// Returns true if `input` is a well-formed absolute URL that can be analyzed
///
/// The check is purely syntactic: the input must parse as an absolute URL
/// with an `http` or `https` scheme and a non-empty host. No network access
/// is performed.
///
/// # Examples
///
/// ```
/// use page_analyzer::url::validate_url;
///
/// assert!(validate_url("https://www.example.com"));
/// assert!(!validate_url("example"));
/// assert!(!validate_url(""));
/// ```
pub fn validate_url(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }

    match Url::parse(input) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}
