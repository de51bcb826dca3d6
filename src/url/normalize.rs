use crate::url::domain::extract_authority;
use crate::UrlError;
use std::fmt;
use url::Url;

/// Deduplication identity of a page address
///
/// Authority (`host[:port]`) followed by the path, with trailing slashes removed
/// and everything lowercased. Scheme, query, and fragment are not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes an address string into its canonical key
///
/// # Normalization Steps
///
/// 1. Parse the address; input without `scheme://` is read as `http://`
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Take the authority (lowercased host plus any explicit port)
/// 4. Append the path with all trailing slashes removed
/// 5. Lowercase the result
///
/// Because scheme-less input is accepted, a key fed back in normalizes to itself.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::normalize_url;
///
/// let a = normalize_url("https://Blog.Example.com/Path/").unwrap();
/// let b = normalize_url("http://blog.example.com/path").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "blog.example.com/path");
/// ```
pub fn normalize_url(url_str: &str) -> Result<CanonicalKey, UrlError> {
    let url = parse_lenient(url_str.trim())?;
    canonical_key(&url)
}

/// Builds the canonical key for an already parsed URL
pub fn canonical_key(url: &Url) -> Result<CanonicalKey, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let authority = extract_authority(url).ok_or(UrlError::MissingDomain)?;
    let path = url.path().trim_end_matches('/');

    Ok(CanonicalKey(format!("{}{}", authority, path).to_lowercase()))
}

fn parse_lenient(input: &str) -> Result<Url, UrlError> {
    if input.contains("://") {
        return Url::parse(input).map_err(|e| UrlError::Parse(e.to_string()));
    }

    match Url::parse(input) {
        // `mailto:`, `data:` and friends keep their own scheme and get rejected later
        Ok(url) if !starts_with_host_port(input) => Ok(url),
        _ => Url::parse(&format!("http://{}", input)).map_err(|e| UrlError::Parse(e.to_string())),
    }
}

/// `localhost:8080/x` parses as scheme `localhost`; a digit after the colon means a port.
fn starts_with_host_port(input: &str) -> bool {
    input
        .split_once(':')
        .map(|(_, rest)| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(false)
}
