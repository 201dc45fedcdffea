use core::time::Duration;

use bytes::Bytes;
use http::{header::HOST, Request};
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use tokio::net::TcpStream;

use self::io::TokioIo;
use super::{Job, Task};
use crate::{
    observation::{Observation, RequestFailure},
    target::Target,
};

mod io;

/// Performs a single HTTP GET against the target over a fresh connection.
#[derive(Debug, Clone)]
pub struct HttpTask {
    /// Target endpoint.
    target: Target,
    /// Request timeout, covering connection, request and the whole body.
    timeout: Duration,
}

impl HttpTask {
    pub fn new(target: Target, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    /// Performs the request, folding any failure into the observation.
    #[inline]
    pub async fn get(&self) -> Observation {
        match tokio::time::timeout(self.timeout, self.perform_request()).await {
            Ok(Ok((status, body))) => Observation::response(status, &body),
            Ok(Err(err)) => err.into(),
            Err(..) => RequestFailure::Timeout(self.timeout).into(),
        }
    }

    async fn perform_request(&self) -> Result<(u16, Bytes), RequestFailure> {
        let stream = TcpStream::connect((self.target.host(), self.target.port()))
            .await
            .map_err(RequestFailure::Connect)?;

        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await?;
        tokio::task::spawn(async move {
            if let Err(err) = conn.await {
                log::debug!("connection failed: {err}");
            }
        });

        let req = Request::get(self.target.path())
            .header(HOST, self.target.authority())
            .body(Empty::<Bytes>::new())?;
        let resp = sender.send_request(req).await?;

        let status = resp.status().as_u16();
        let body = resp.into_body().collect().await?.to_bytes();

        Ok((status, body))
    }
}

impl Task for HttpTask {
    #[inline]
    async fn execute(&self, _job: Job) -> Observation {
        self.get().await
    }
}
