//! Retrieval of JSON resources linked from the email body

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::error::{ExtractError, FetchError, Result};
use crate::types::FetchResult;

/// Issues the single outbound GET of a request.
///
/// Owns two clients: a verifying one for every host, and, when
/// `insecure_hosts` is non-empty, one without certificate verification that
/// is used for exactly those hosts.
#[derive(Debug, Clone)]
pub struct LinkFetcher {
    client: Client,
    insecure_client: Option<Client>,
    insecure_hosts: Vec<String>,
    max_body_bytes: usize,
}

impl LinkFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = build_client(config, false)?;
        let insecure_hosts: Vec<String> = config
            .insecure_hosts
            .iter()
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        let insecure_client = if insecure_hosts.is_empty() {
            None
        } else {
            warn!(
                hosts = ?insecure_hosts,
                "TLS certificate verification disabled for listed hosts"
            );
            Some(build_client(config, true)?)
        };

        Ok(Self {
            client,
            insecure_client,
            insecure_hosts,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// GET the URL and return the body of a 200 response.
    ///
    /// Failures are logged and reported as [`FetchResult::Absent`].
    pub fn fetch(&self, url: &str) -> FetchResult {
        match self.try_fetch(url) {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched linked resource");
                FetchResult::Content(body)
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to fetch linked resource");
                FetchResult::Absent
            }
        }
    }

    pub fn try_fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client_for(url).get(url).send()?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let limit = self.max_body_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::new();
        response.take(limit as u64 + 1).read_to_end(&mut body)?;
        if body.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }

        String::from_utf8(body).map_err(|_| FetchError::Body)
    }

    fn client_for(&self, url: &str) -> &Client {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase));

        match (&self.insecure_client, host) {
            (Some(insecure), Some(host)) if self.insecure_hosts.contains(&host) => insecure,
            _ => &self.client,
        }
    }
}

fn build_client(config: &FetchConfig, accept_invalid_certs: bool) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| ExtractError::Config(format!("HTTP client: {e}")))
}
