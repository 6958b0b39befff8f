//! Executes `HttpRequest` values against the network.
//!
//! `Transport` is the seam between the pure request/response handling in
//! `BlogClient` and real I/O. `UreqTransport` is the bundled blocking
//! implementation; hosts with their own HTTP stack implement the trait.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Failure to obtain a response at all (connection refused, timeout,
/// unreadable body). Non-2xx statuses are not transport failures.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

pub trait Transport: Send + Sync {
    /// Perform one round-trip. `timeout` bounds the whole call when set.
    fn execute(
        &self,
        request: &HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Statuses are data here; BlogClient classifies them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: &HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match timeout {
            Some(limit) => builder.config().timeout_global(Some(limit)).build().call()?,
            None => builder.call()?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
