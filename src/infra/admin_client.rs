//! HTTP client for the admin listener, used by process-level commands.
//!
//! Writes go through the running server so its response cache sees them.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use reqwest::{Client, StatusCode, Url};
use sitedesk_api_types::{ApiFailure, ApiMessage, SingletonKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminClientError {
    #[error("invalid admin URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("admin request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("admin listener answered {status}: {message}")]
    Server { status: StatusCode, message: String },
}

/// Outcome of a reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Removed { message: String },
    NothingStored,
}

#[derive(Clone, Debug)]
pub struct AdminClient {
    client: Client,
    base: Url,
}

impl AdminClient {
    pub fn new(base: &str) -> Result<Self, AdminClientError> {
        let base = Url::parse(base)?.join("/")?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, base })
    }

    /// Client for a listener bound to `addr`; wildcard hosts are reached over loopback.
    pub fn for_listener(addr: SocketAddr) -> Result<Self, AdminClientError> {
        Self::new(&listener_url(addr))
    }

    pub fn user_agent() -> &'static str {
        concat!("sitedesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn reset(&self, kind: SingletonKind) -> Result<ResetOutcome, AdminClientError> {
        let url = self.base.join(&format!("api/v1/{}", kind.as_str()))?;
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let message = serde_json::from_slice::<ApiMessage>(&bytes)
                .map(|body| body.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Ok(ResetOutcome::Removed { message });
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(ResetOutcome::NothingStored);
        }

        let message = serde_json::from_slice::<ApiFailure>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        Err(AdminClientError::Server { status, message })
    }
}

fn listener_url(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}/", SocketAddr::new(ip, addr.port()))
}
