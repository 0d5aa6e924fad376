use regex::Regex;
use std::sync::LazyLock;

static PROXY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<addr>[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}:[0-9]{1,5}) (?P<option>.+)$")
        .expect("proxy line pattern is valid")
});

/// A single proxy endpoint from the proxy list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEntry {
    /// Endpoint in `host:port` form
    pub addr: String,

    /// Two-letter country code
    pub country: String,

    /// Anonymity level marker (e.g. `N`, `A`, `H`)
    pub anonymity: String,

    /// Whether the proxy tunnels HTTPS
    pub supports_https: bool,

    /// Whether the proxy passed the search engine check
    pub google_passed: bool,
}

/// Parses one line of the proxy list
///
/// Accepted shape: `ADDR:PORT CC[-]A[-S]...[+]`, where `CC` is the country
/// code, `A` the anonymity marker, `-S` flags HTTPS support and a trailing
/// `+` flags a passed search engine check. Returns `None` for anything else
/// (headers, comments, blank lines).
///
/// # Example
///
/// ```
/// use rating_harvest::proxy::parse_proxy_line;
///
/// let entry = parse_proxy_line("1.2.3.4:8080 KR1-S+").unwrap();
/// assert_eq!(entry.addr, "1.2.3.4:8080");
/// assert!(entry.supports_https);
/// ```
pub fn parse_proxy_line(line: &str) -> Option<ProxyEntry> {
    let captures = PROXY_LINE.captures(line.trim())?;
    let addr = captures.name("addr")?.as_str().trim();
    let option = captures.name("option")?.as_str().trim();

    let mut chars = option.chars();
    let country: String = chars.by_ref().take(2).collect();
    if country.chars().count() != 2 {
        return None;
    }

    let rest = chars.as_str();
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let mut rest_chars = rest.chars();
    let anonymity = rest_chars.next().filter(|c| !c.is_whitespace())?;
    let flags = rest_chars.as_str();

    Some(ProxyEntry {
        addr: addr.to_string(),
        country,
        anonymity: anonymity.to_string(),
        supports_https: flags.contains("-S"),
        google_passed: option.ends_with('+'),
    })
}
