//! Readiness probes.
//!
//! Two flavours with different retry policies:
//! - [`TcpProbe`] is bounded: it gives up with [`DevnetError::Timeout`] after a fixed number of
//!   connection attempts.
//! - [`HttpProbe`] is unbounded: it keeps POSTing until it gets a `200`, because a fresh base
//!   chain can take a very long time to initialise. The only way out besides success is an
//!   optional [`CancellationToken`].

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use backon::{ConstantBuilder, Retryable};
use reqwest::{StatusCode, header::CONTENT_TYPE};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::{error::DevnetError, rpc};

/// Bounded TCP reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpProbe {
    pub host: String,
    pub port: u16,
    pub max_attempts: usize,
    pub interval: Duration,
}

impl TcpProbe {
    /// Upper bound on a single connection attempt.
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Block until a TCP connection to the target succeeds, retrying every `interval`.
    ///
    /// The connection is closed right after it is established.
    pub async fn wait_ready(&self) -> anyhow::Result<()> {
        let target = self.target();
        let max_attempts = self.max_attempts.max(1);
        let attempts = AtomicUsize::new(0);

        let attempts_ref = &attempts;
        let host = self.host.as_str();
        let port = self.port;
        let connect = move || async move {
            let attempt = attempts_ref.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(host, port, attempt, "Trying");

            let stream = tokio::time::timeout(
                Self::CONNECT_TIMEOUT,
                TcpStream::connect((host, port)),
            )
            .await
            .map_err(std::io::Error::from)??;
            drop(stream);

            Ok::<_, std::io::Error>(())
        };

        let backoff = ConstantBuilder::default()
            .with_delay(self.interval)
            .with_max_times(max_attempts - 1);

        connect
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .notify(|err: &std::io::Error, delay: Duration| {
                tracing::debug!(addr = %target, error = %err, ?delay, "Not reachable yet, retrying");
            })
            .await
            .map_err(|err| {
                tracing::debug!(addr = %target, error = %err, "Giving up");
                DevnetError::Timeout {
                    target: target.clone(),
                    attempts: attempts.load(Ordering::SeqCst),
                }
            })?;

        tracing::info!(addr = %target, "Connected");
        Ok(())
    }
}

/// Unbounded HTTP readiness probe.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    pub url: String,
    pub body: String,
    pub interval: Duration,
    /// Logged once before the first attempt.
    pub wait_message: String,
    pub cancel: Option<CancellationToken>,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            wait_message: format!("Waiting for {url}..."),
            url,
            body: body.into(),
            interval: Duration::from_secs(5),
            cancel: None,
        }
    }

    /// Probe that POSTs an `eth_blockNumber` request.
    pub fn block_number(url: impl Into<String>) -> Self {
        Self::new(url, rpc::request_body("eth_blockNumber", &[]))
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn wait_message(mut self, message: impl Into<String>) -> Self {
        self.wait_message = message.into();
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Block until the endpoint answers `200`, retrying every `interval` on any other status
    /// or on any transport error (refused, reset or dropped connections, timeouts).
    pub async fn wait_ready(&self) -> anyhow::Result<()> {
        tracing::info!("{}", self.wait_message);

        let client = rpc::create_client()?;
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            let response = client
                .post(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .body(self.body.clone())
                .send()
                .await;

            match response {
                Ok(response) if response.status() == StatusCode::OK => {
                    tracing::info!(url = %self.url, attempt, "Status code is 200, continue next step");
                    return Ok(());
                }
                Ok(response) => {
                    tracing::debug!(url = %self.url, attempt, status = %response.status(), "Not ready yet");
                }
                Err(err) => {
                    tracing::debug!(url = %self.url, attempt, error = %err, "Not reachable yet");
                }
            }

            match &self.cancel {
                Some(cancel) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::warn!(url = %self.url, attempt, "Readiness wait cancelled");
                            return Err(DevnetError::Cancelled { target: self.url.clone() }.into());
                        }
                        _ = tokio::time::sleep(self.interval) => {}
                    }
                }
                None => tokio::time::sleep(self.interval).await,
            }
        }
    }
}
