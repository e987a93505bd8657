use crate::UrlError;
use ::url::Url;

/// Normalizes an analysis target
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; reject if malformed
/// 3. Reject schemes other than HTTP and HTTPS
/// 4. Reject URLs without a host
///
/// Host lowercasing, default port removal and empty-path-to-`/` come from
/// the WHATWG parser itself.
///
/// # Examples
///
/// ```
/// use page_analyzer::url::normalize_url;
///
/// let url = normalize_url("HTTPS://WWW.Example.COM").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}
