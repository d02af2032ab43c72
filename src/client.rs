//! HTTP client with retry and optional on-disk response caching
//!
//! Every upstream call goes through [`ApiClient::fetch`]. Transient failures
//! (timeouts, connection errors, 5xx, 408, 429) are retried with exponential
//! backoff by `reqwest-retry`; successful JSON bodies are written to the
//! client's cache namespace, if it has one.

use crate::cache::ResponseCache;
use crate::config::HttpConfig;
use crate::{AqimapError, Result};
use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Query parameters of one request. Repeated names are allowed.
pub type QueryParams = Vec<(&'static str, String)>;

/// Build the shared retrying HTTP client
pub fn build_http_client(config: &HttpConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| AqimapError::config(format!("Failed to create HTTP client: {e}")))?;

    let policy = ExponentialBackoff::builder()
        .retry_bounds(
            Duration::from_millis(config.retry_min_delay_ms),
            Duration::from_millis(config.retry_max_delay_ms),
        )
        .build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(policy))
        .build())
}

/// Deterministic request URL: parameters sorted by name and value, list
/// parameters joined with commas. Doubles as the cache key.
pub fn request_url(base: &str, params: &[(&str, String)]) -> Result<Url> {
    let mut merged: Vec<(&str, String)> = Vec::with_capacity(params.len());
    for (name, value) in params {
        match merged.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                existing.push(',');
                existing.push_str(value);
            }
            None => merged.push((*name, value.clone())),
        }
    }
    merged.sort();

    Url::parse_with_params(base, merged)
        .map_err(|e| AqimapError::config(format!("Invalid endpoint URL '{base}': {e}")))
}

/// Whether a status left over after the retry budget is a transient failure
fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Open-Meteo error body: `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    reason: String,
}

/// Client handle bound to at most one cache namespace
#[derive(Clone)]
pub struct ApiClient {
    http: ClientWithMiddleware,
    cache: Option<ResponseCache>,
}

impl ApiClient {
    /// Client without response caching
    #[must_use]
    pub fn uncached(http: ClientWithMiddleware) -> Self {
        Self { http, cache: None }
    }

    #[must_use]
    pub fn cached(http: ClientWithMiddleware, cache: ResponseCache) -> Self {
        Self {
            http,
            cache: Some(cache),
        }
    }

    /// GET `url` with `params` and decode the JSON body.
    ///
    /// Fresh cache entries are served without touching the network.
    #[instrument(
        name = "fetch",
        skip(self, params),
        fields(namespace = ?self.cache.as_ref().map(ResponseCache::namespace))
    )]
    pub async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let request_url = request_url(url, params)?;
        let key = request_url.as_str().to_owned();

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                    Ok(value) => {
                        debug!("Serving {} from cache", request_url.path());
                        return Ok(value);
                    }
                    Err(e) => warn!("Ignoring undecodable cache entry: {}", e),
                },
                Ok(None) => debug!("Cache miss for {}", request_url.path()),
                Err(e) => warn!("Cache read failed, requesting upstream: {}", e),
            }
        }

        let provider = request_url.host_str().unwrap_or("upstream").to_owned();
        let bytes = self.get_bytes(request_url).await?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AqimapError::malformed(provider, format!("body is not JSON: {e}")))?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, bytes).await {
                warn!("Failed to write response to cache: {}", e);
            }
        }

        Ok(value)
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let start = Instant::now();
        let path = url.path().to_owned();

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", path, e);
            AqimapError::network(format!("request to {path} failed: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| AqimapError::network(format!("reading body of {path}: {e}")))?;
            info!(
                "Fetched {} ({} bytes) in {:.3}s",
                path,
                bytes.len(),
                start.elapsed().as_secs_f64()
            );
            return Ok(bytes.to_vec());
        }

        if is_transient(status) {
            warn!("{} still failing with {} after retries", path, status);
            return Err(AqimapError::network(format!(
                "{path} returned {status} after exhausting retries"
            )));
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.reason)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
        warn!("{} rejected with {}: {}", path, status, reason);
        Err(AqimapError::upstream(status.as_u16(), reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&'static str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect()
    }

    #[test]
    fn test_request_url_is_order_independent() {
        let a = request_url(
            "https://example.com/v1/archive",
            &params(&[("longitude", "77.2"), ("latitude", "28.6")]),
        )
        .unwrap();
        let b = request_url(
            "https://example.com/v1/archive",
            &params(&[("latitude", "28.6"), ("longitude", "77.2")]),
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.as_str(),
            "https://example.com/v1/archive?latitude=28.6&longitude=77.2"
        );
    }

    #[test]
    fn test_request_url_joins_list_params() {
        let url = request_url(
            "https://example.com/v1/archive",
            &params(&[("daily", "sunrise"), ("timezone", "Asia/Kolkata"), ("daily", "sunset")]),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v1/archive?daily=sunrise%2Csunset&timezone=Asia%2FKolkata"
        );
    }

    #[test]
    fn test_request_url_rejects_garbage_base() {
        assert!(request_url("not a url", &[]).is_err());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::NOT_FOUND));
    }
}
