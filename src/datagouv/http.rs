//! Thin JSON-over-HTTP adapter shared by every upstream call.

use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::DataGouvError;

/// Performs single-attempt GET requests and decodes JSON bodies.
///
/// A non-success status never reaches the decoder: it is reported as
/// [`DataGouvError::RemoteApi`] with the status and request URL.
#[derive(Clone)]
pub struct HttpJsonClient {
    client: reqwest::Client,
}

impl HttpJsonClient {
    /// Build a client whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("datagouv-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, DataGouvError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| DataGouvError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Upstream response");

        if !status.is_success() {
            return Err(DataGouvError::RemoteApi {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                DataGouvError::InvalidResponse {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                DataGouvError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            }
        })
    }
}

/// Join a base URL, percent-encoded path segments and query parameters.
///
/// Every path produced here ends with a trailing slash, which both upstream
/// APIs expect.
pub fn build_url(
    base: &str,
    segments: &[&str],
    params: &[(&str, String)],
) -> Result<Url, DataGouvError> {
    let mut raw = base.trim_end_matches('/').to_string();
    for segment in segments {
        raw.push('/');
        raw.push_str(&urlencoding::encode(segment));
    }
    raw.push('/');

    // An empty param list would still leave a dangling '?'.
    let parsed = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };

    parsed.map_err(|e| DataGouvError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}
