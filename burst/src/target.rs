use core::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use http::{
    uri::{InvalidUri, PathAndQuery, Scheme},
    Uri,
};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 80;

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target URL: {0}")]
    InvalidUri(#[from] InvalidUri),
    #[error("unsupported scheme \"{0}\", only plain HTTP is supported")]
    UnsupportedScheme(String),
    #[error("target URL has no host")]
    MissingHost,
    #[error("credentials in the target URL are not supported")]
    UserInfo,
}

/// HTTP endpoint requests are sent to.
///
/// Accepts either a full `http://host[:port][/path]` URL or a bare
/// `host[:port]`, in which case the `http` scheme is implied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Target {
    uri: Uri,
    host: String,
    port: u16,
    path: String,
}

impl Target {
    /// Host name or IP address, IPv6 literals without brackets.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request target in origin-form, i.e. path with optional query.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value for the `Host` header.
    #[inline]
    pub fn authority(&self) -> &str {
        // Validated to be present on construction.
        self.uri.authority().map(|v| v.as_str()).unwrap_or(self.host.as_str())
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let uri: Uri = if s.contains("://") { s.parse()? } else { format!("http://{s}").parse()? };

        match uri.scheme() {
            Some(scheme) if scheme == &Scheme::HTTP => {}
            Some(scheme) => return Err(TargetError::UnsupportedScheme(scheme.to_string())),
            None => return Err(TargetError::UnsupportedScheme(String::new())),
        }

        if uri.authority().is_some_and(|v| v.as_str().contains('@')) {
            return Err(TargetError::UserInfo);
        }

        let host = match uri.host() {
            Some(host) if !host.is_empty() => host.trim_start_matches('[').trim_end_matches(']').to_string(),
            _ => return Err(TargetError::MissingHost),
        };
        let port = uri.port_u16().unwrap_or(DEFAULT_PORT);
        let path = match uri.path_and_query().map(PathAndQuery::as_str) {
            Some(path) if path.starts_with('/') => path.to_string(),
            Some(path) => format!("/{path}"),
            None => "/".to_string(),
        };

        let m = Self { uri, host, port, path };

        Ok(m)
    }
}

impl TryFrom<String> for Target {
    type Error = TargetError;

    #[inline]
    fn try_from(v: String) -> Result<Self, Self::Error> {
        v.parse()
    }
}

impl Display for Target {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self.path.as_str() {
            "/" => write!(fmt, "http://{}", self.authority()),
            path => write!(fmt, "http://{}{}", self.authority(), path),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bare_host() {
        let target: Target = "127.0.0.1".parse().unwrap();

        assert_eq!("127.0.0.1", target.host());
        assert_eq!(80, target.port());
        assert_eq!("/", target.path());
        assert_eq!("127.0.0.1", target.authority());
        assert_eq!("http://127.0.0.1", target.to_string());
    }

    #[test]
    fn test_full_url() {
        let target: Target = "http://lb.local:8080/health?verbose=1".parse().unwrap();

        assert_eq!("lb.local", target.host());
        assert_eq!(8080, target.port());
        assert_eq!("/health?verbose=1", target.path());
        assert_eq!("lb.local:8080", target.authority());
        assert_eq!("http://lb.local:8080/health?verbose=1", target.to_string());
    }

    #[test]
    fn test_credentials_rejected() {
        let err = "http://user:pw@lb.local:8080/".parse::<Target>().unwrap_err();
        assert!(matches!(err, TargetError::UserInfo));

        assert!(matches!("user@lb.local".parse::<Target>(), Err(TargetError::UserInfo)));
        assert!(serde_yaml::from_str::<Target>("http://user:pw@lb.local/").is_err());
    }

    #[test]
    fn test_ipv6_literal() {
        let target: Target = "[::1]:8000".parse().unwrap();

        assert_eq!("::1", target.host());
        assert_eq!(8000, target.port());
        assert_eq!("[::1]:8000", target.authority());
    }

    #[test]
    fn test_https_rejected() {
        let err = "https://example.com".parse::<Target>().unwrap_err();

        assert!(matches!(err, TargetError::UnsupportedScheme(s) if s == "https"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!("http://".parse::<Target>().is_err());
        assert!("not a host".parse::<Target>().is_err());
    }
}
