//! HTTP client for the drivable-path service.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::RoutingError;
use crate::optimizer::check_status;
use crate::types::{DrivablePath, Location, OsrmResponse};

/// Client for an OSRM-style `/route/v1/driving/{coordinates}` endpoint.
pub struct PathClient {
    client: Client,
    base_url: Url,
}

impl PathClient {
    /// Creates a client with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RoutingError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RoutingError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, base_url })
    }

    /// Fetches a drivable path visiting `points` in the given order.
    ///
    /// Points are addressed lng-first on the wire; the returned polyline is
    /// flipped back to lat-first pairs for display.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::RateLimited`] — HTTP 429.
    /// - [`RoutingError::Http`] on network failure.
    /// - [`RoutingError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`RoutingError::Api`] if the service reports a non-`Ok` code or
    ///   returns no routes.
    /// - [`RoutingError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn route(&self, points: &[Location]) -> Result<DrivablePath, RoutingError> {
        let coords = coordinate_string(points);
        let mut url = self
            .base_url
            .join(&format!("route/v1/driving/{coords}"))
            .map_err(|e| RoutingError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson")
            .append_pair("steps", "false");

        let response = self.client.get(url.clone()).send().await?;
        let response = check_status(response, url.as_str())?;
        let body = response.text().await?;
        let parsed: OsrmResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Deserialize {
                context: format!("route({} points)", points.len()),
                source: e,
            })?;

        if let Some(code) = &parsed.code {
            if code != "Ok" {
                return Err(RoutingError::Api(format!("path service code {code}")));
            }
        }
        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::Api("path service returned no routes".to_string()))?;

        // Wire geometry is lng-first; flip for display.
        let polyline = route
            .geometry
            .coordinates
            .iter()
            .map(|pair| (pair[1], pair[0]))
            .collect();

        Ok(DrivablePath {
            polyline,
            duration_s: route.duration,
            distance_m: route.distance,
        })
    }
}

/// Joins points into the wire format: semicolon-separated `lng,lat` pairs in
/// visiting order.
fn coordinate_string(points: &[Location]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{},{}", p.lng, p.lat);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_string_is_lng_first_semicolon_joined() {
        let points = vec![
            Location { lat: 37.8, lng: -122.27 },
            Location { lat: 37.7955, lng: -122.3937 },
        ];
        assert_eq!(coordinate_string(&points), "-122.27,37.8;-122.3937,37.7955");
    }

    #[test]
    fn coordinate_string_of_empty_slice_is_empty() {
        assert_eq!(coordinate_string(&[]), "");
    }
}
