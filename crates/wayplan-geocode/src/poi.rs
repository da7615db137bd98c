//! HTTP client for the nearby-POI interpreter.

use std::time::Duration;

use reqwest::{Client, Url};

use wayplan_core::ResolvedPlace;

use crate::client::check_status;
use crate::error::GeocodeError;
use crate::normalize::place_from_element;
use crate::types::OverpassResponse;

/// Maximum POI elements requested per lookup.
const MAX_ELEMENTS: u32 = 10;

/// Client for an Overpass-style POI interpreter.
///
/// Issues a radius-bounded query for named nodes around a coordinate and
/// normalizes the element list into [`ResolvedPlace`] items.
pub struct PoiClient {
    client: Client,
    endpoint: Url,
}

impl PoiClient {
    /// Creates a client with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `endpoint` does not parse.
    pub fn new(endpoint: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let endpoint = Url::parse(endpoint).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, endpoint })
    }

    /// Looks up named points of interest within `radius_m` meters of a
    /// coordinate.
    ///
    /// Unnamed elements are dropped during normalization, so the returned
    /// list may be shorter than what the service sent — or empty.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::RateLimited`] — HTTP 429.
    /// - [`GeocodeError::Http`] on network failure.
    /// - [`GeocodeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GeocodeError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
    ) -> Result<Vec<ResolvedPlace>, GeocodeError> {
        let query = build_query(lat, lng, radius_m);
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("data", query.as_str())])
            .send()
            .await?;
        let response = check_status(response, self.endpoint.as_str())?;
        let body = response.text().await?;
        let parsed: OverpassResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("nearby({lat},{lng})"),
                source: e,
            })?;

        Ok(parsed
            .elements
            .iter()
            .filter_map(place_from_element)
            .collect())
    }
}

/// Builds the interpreter query: named amenity/shop nodes around the point.
fn build_query(lat: f64, lng: f64, radius_m: u32) -> String {
    format!(
        "[out:json][timeout:10];(node(around:{radius_m},{lat},{lng})[amenity][name];node(around:{radius_m},{lat},{lng})[shop][name];);out body {MAX_ELEMENTS};"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_contains_radius_and_coordinates() {
        let q = build_query(37.8, -122.27, 350);
        assert!(q.contains("around:350,37.8,-122.27"), "query: {q}");
        assert!(q.starts_with("[out:json]"));
        assert!(q.contains("[amenity][name]"));
        assert!(q.contains("[shop][name]"));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = PoiClient::new("::not-a-url::", 10, "wayplan-test/0.1");
        assert!(matches!(result, Err(GeocodeError::InvalidBaseUrl { .. })));
    }
}
