//! Input validation for submitted URLs.
//!
//! Purely syntactic: nothing here touches the network.

use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

/// Schemes accepted as web addresses
const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("No URL entered.")]
    Empty,
    #[error("Invalid URL format.")]
    Invalid,
}

/// Validate raw user input, returning the parsed URL.
///
/// Blank input is rejected before any parsing is attempted.
pub fn check_input(raw: &str) -> Result<Url, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    parse_web_url(trimmed).ok_or(InputError::Invalid)
}

/// Boolean verdict on URL well-formedness
pub fn is_valid_url(raw: &str) -> bool {
    parse_web_url(raw.trim()).is_some()
}

fn parse_web_url(candidate: &str) -> Option<Url> {
    if candidate.chars().any(char::is_whitespace) {
        return None;
    }

    let url = Url::parse(candidate).ok()?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return None;
    }

    match url.host()? {
        Host::Domain(domain) if !is_valid_domain(domain) => None,
        _ => Some(url),
    }
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.eq_ignore_ascii_case("localhost") {
        return true;
    }
    // `url` keeps some numeric hosts as domains
    if domain.parse::<IpAddr>().is_ok() {
        return true;
    }

    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld = labels[labels.len() - 1];
    let tld_ok = tld.len() >= 2
        && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"));

    labels_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_empty_error() {
        assert_eq!(check_input(""), Err(InputError::Empty));
        assert_eq!(check_input("   \t\n"), Err(InputError::Empty));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        for bad in [
            "not a url",
            "htp://bad",
            "example.com",
            "https://",
            "https://example",
            "https://exa mple.com",
            "mailto:someone@example.com",
            "https://-bad-.com",
        ] {
            assert_eq!(check_input(bad), Err(InputError::Invalid), "{bad}");
            assert!(!is_valid_url(bad), "{bad}");
        }
    }

    #[test]
    fn well_formed_urls_are_accepted() {
        for good in [
            "https://example.com",
            "http://www.example.co.uk/path?q=1#frag",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "http://127.0.0.1:8080/page",
            "http://[::1]/",
            "http://localhost:3000",
            "ftp://files.example.org/readme.txt",
        ] {
            assert!(check_input(good).is_ok(), "{good}");
            assert!(is_valid_url(good), "{good}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let url = check_input("  https://example.com/a  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }
}
