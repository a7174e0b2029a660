//! Domain Value Objects
//!
//! Immutable values with validation baked into construction.

use url::Url;

/// Error raised when an operator submits a destination that cannot be used.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DestinationError {
    #[error("invalid destination URL: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("destination URL has no host")]
    MissingHost,
}

/// A validated, absolute destination URL.
///
/// Parsed once at provisioning time and immutable afterwards. The
/// dispatcher forwards to exactly this URL; the inbound request's path
/// beyond the identifier segment is never appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination(Url);

impl Destination {
    /// Parse a raw operator-supplied line into a destination.
    pub fn parse(input: &str) -> Result<Self, DestinationError> {
        let url = Url::parse(input.trim())?;
        if !url.has_host() {
            return Err(DestinationError::MissingHost);
        }
        Ok(Self(url))
    }

    /// The full destination URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Host (and port, when present) for the reverse-forward command
    /// echoed to the operator.
    pub fn host(&self) -> String {
        let host = self.0.host_str().unwrap_or_default();
        match self.0.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_http_url() {
        let dest = Destination::parse("http://127.0.0.1:9000/hook").unwrap();
        assert_eq!(dest.as_str(), "http://127.0.0.1:9000/hook");
        assert_eq!(dest.host(), "127.0.0.1:9000");
    }

    #[test]
    fn test_parse_https_url_without_port() {
        let dest = Destination::parse("https://hooks.example.com/notify").unwrap();
        assert_eq!(dest.host(), "hooks.example.com");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let dest = Destination::parse("  http://localhost:9000/hook \r\n").unwrap();
        assert_eq!(dest.as_str(), "http://localhost:9000/hook");
    }

    #[test]
    fn test_parse_relative_url_fails() {
        let err = Destination::parse("/just/a/path").unwrap_err();
        assert!(matches!(err, DestinationError::Malformed(_)));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Destination::parse("not a url at all").is_err());
    }

    #[test]
    fn test_parse_hostless_url_fails() {
        let err = Destination::parse("data:text/plain,hello").unwrap_err();
        assert!(matches!(err, DestinationError::MissingHost));
    }

    #[test]
    fn test_query_is_preserved() {
        let dest = Destination::parse("http://localhost:9000/hook?token=x").unwrap();
        assert_eq!(dest.as_str(), "http://localhost:9000/hook?token=x");
    }
}
