use core::{
    fmt::{self, Display, Formatter},
    time::Duration,
};
use std::io;

/// Reasons a single request attempt may fail.
///
/// Failures are local to a request: they are converted to an
/// [`Observation`] and never propagated further.
#[derive(Debug, thiserror::Error)]
pub enum RequestFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    #[error("{0}")]
    Http(#[from] hyper::Error),
    #[error("invalid request: {0}")]
    Request(#[from] http::Error),
}

/// Outcome of one request attempt.
#[derive(Debug)]
pub enum Observation {
    Response { status: u16, body: String },
    Failure(RequestFailure),
}

impl Observation {
    /// Constructs a successful observation, trimming the body.
    pub fn response(status: u16, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body).trim().to_string();

        Self::Response { status, body }
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response { .. })
    }
}

impl From<RequestFailure> for Observation {
    #[inline]
    fn from(err: RequestFailure) -> Self {
        Self::Failure(err)
    }
}

impl Display for Observation {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            Self::Response { status, body } => write!(fmt, "Status: {status}, Response: {body}"),
            Self::Failure(err) => write!(fmt, "Request failed: {err}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_response() {
        let obs = Observation::response(200, b"ok");

        assert!(obs.is_response());
        assert_eq!("Status: 200, Response: ok", obs.to_string());
    }

    #[test]
    fn test_response_body_trimmed() {
        let obs = Observation::response(503, b"  \n\tbackend-2 is down\r\n");

        assert_eq!("Status: 503, Response: backend-2 is down", obs.to_string());
    }

    #[test]
    fn test_render_failure() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let obs: Observation = RequestFailure::Connect(err).into();

        assert!(!obs.is_response());
        assert_eq!("Request failed: failed to connect: connection refused", obs.to_string());
    }

    #[test]
    fn test_render_timeout() {
        let obs: Observation = RequestFailure::Timeout(Duration::from_secs(5)).into();

        assert_eq!("Request failed: timed out after 5s", obs.to_string());
    }
}
