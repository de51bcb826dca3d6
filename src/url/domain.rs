use crate::UrlError;
use url::Url;

/// Parses an absolute HTTP(S) address that has a host
///
/// Used for seed addresses, which anchor the crawl's domain and so must be complete.
pub fn parse_web_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Extracts the authority (`host[:port]`) from a URL
///
/// The host is lowercased. The port is only included when it is explicit and not
/// the scheme's default, so `https://example.com:443/` and `https://example.com/`
/// share an authority. Returns None for URLs without a host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if `url` lives on exactly the given authority
pub fn is_same_authority(url: &Url, authority: &str) -> bool {
    extract_authority(url).is_some_and(|candidate| candidate == authority)
}
