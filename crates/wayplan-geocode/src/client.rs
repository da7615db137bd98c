//! HTTP client for the place-search and reverse-geocode endpoints.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use wayplan_core::Suggestion;

use crate::error::GeocodeError;
use crate::normalize::{suggestion_from_hit, suggestions_from_hits};
use crate::types::PlaceHit;

/// A bounding box used to bias search results toward the visible map area.
///
/// Serialized in the service's `viewbox` order: west, north, east, south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewbox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Viewbox {
    fn to_param(self) -> String {
        format!("{},{},{},{}", self.west, self.north, self.east, self.south)
    }
}

/// Client for a Nominatim-style geocoding service.
///
/// Manages the HTTP client and base URL. Use [`GeocodeClient::new`] for the
/// public service or point `base_url` at a mock server in tests.
#[derive(Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
}

impl GeocodeClient {
    /// Creates a client with configured timeout and `User-Agent`.
    ///
    /// The public service requires an identifying `User-Agent`; requests
    /// without one are refused.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joined paths land under the root rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Searches for places matching free text, optionally biased to a
    /// viewbox.
    ///
    /// Hits the service cannot represent as finite coordinates are dropped
    /// rather than failing the whole result.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::RateLimited`] — HTTP 429.
    /// - [`GeocodeError::Http`] on network failure.
    /// - [`GeocodeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GeocodeError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        viewbox: Option<Viewbox>,
    ) -> Result<Vec<Suggestion>, GeocodeError> {
        let mut params = vec![
            ("format".to_string(), "jsonv2".to_string()),
            ("addressdetails".to_string(), "1".to_string()),
            ("q".to_string(), query.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        if let Some(vb) = viewbox {
            params.push(("viewbox".to_string(), vb.to_param()));
            params.push(("bounded".to_string(), "1".to_string()));
        }

        let url = self.build_url("search", &params);
        let hits: Vec<PlaceHit> = self.request_json(&url).await?;
        Ok(suggestions_from_hits(hits))
    }

    /// Reverse-geocodes a single coordinate into an address suggestion.
    ///
    /// Returns `None` when the service has no answer for the point or its
    /// answer cannot be parsed.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GeocodeClient::search`].
    pub async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<Suggestion>, GeocodeError> {
        let params = vec![
            ("format".to_string(), "jsonv2".to_string()),
            ("lat".to_string(), lat.to_string()),
            ("lon".to_string(), lng.to_string()),
        ];
        let url = self.build_url("reverse", &params);
        let hit: PlaceHit = self.request_json(&url).await?;
        Ok(suggestion_from_hit(&hit))
    }

    fn build_url(&self, op: &str, params: &[(String, String)]) -> Url {
        // base_url always ends with '/', so join keeps the full base path.
        let mut url = self.base_url.join(op).unwrap_or_else(|_| self.base_url.clone());
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, maps non-success statuses to typed errors, and
    /// parses the body as JSON.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, GeocodeError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = check_status(response, url.as_str())?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

/// Maps 429 to [`GeocodeError::RateLimited`] (honoring `Retry-After`) and any
/// other non-2xx status to [`GeocodeError::UnexpectedStatus`].
pub(crate) fn check_status(response: Response, url: &str) -> Result<Response, GeocodeError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(GeocodeError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        return Err(GeocodeError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}
