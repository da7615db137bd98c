//! HTTP client for the optimizer backend.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use crate::error::RoutingError;
use crate::types::{Location, MatrixRequest, MatrixResponse, OptimizeRequest, OptimizedRoute};

/// Client for the optimizer backend's `/optimize-route` and
/// `/distance-matrix` endpoints.
pub struct OptimizerClient {
    client: Client,
    base_url: Url,
}

impl OptimizerClient {
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

    /// Requests an optimized visiting order for `locations`, with the given
    /// priority indices constrained to come early.
    ///
    /// The response `order` is checked to be a permutation of
    /// `0..locations.len()` before it is returned.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::RateLimited`] — HTTP 429.
    /// - [`RoutingError::Http`] on network failure.
    /// - [`RoutingError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`RoutingError::Deserialize`] if the body does not match the
    ///   expected shape.
    /// - [`RoutingError::InvalidOrder`] if `order` is not a permutation.
    pub async fn optimize(
        &self,
        locations: &[Location],
        priority: &[usize],
    ) -> Result<OptimizedRoute, RoutingError> {
        let url = self.endpoint("optimize-route");
        let request = OptimizeRequest {
            locations,
            priority,
        };

        let response = self.client.post(url.clone()).json(&request).send().await?;
        let response = check_status(response, url.as_str())?;
        let body = response.text().await?;
        let route: OptimizedRoute =
            serde_json::from_str(&body).map_err(|e| RoutingError::Deserialize {
                context: format!("optimize({} locations)", locations.len()),
                source: e,
            })?;

        validate_order(&route.order, locations.len())?;
        Ok(route)
    }

    /// Requests the pairwise distance matrix for `locations`, in meters.
    ///
    /// # Errors
    ///
    /// Same HTTP taxonomy as [`OptimizerClient::optimize`], plus
    /// [`RoutingError::Api`] if the matrix is not `n x n`.
    pub async fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<Vec<Vec<f64>>, RoutingError> {
        let url = self.endpoint("distance-matrix");
        let request = MatrixRequest { locations };

        let response = self.client.post(url.clone()).json(&request).send().await?;
        let response = check_status(response, url.as_str())?;
        let body = response.text().await?;
        let parsed: MatrixResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Deserialize {
                context: format!("distance_matrix({} locations)", locations.len()),
                source: e,
            })?;

        let n = locations.len();
        if parsed.matrix.len() != n || parsed.matrix.iter().any(|row| row.len() != n) {
            return Err(RoutingError::Api(format!(
                "distance matrix is not {n}x{n}"
            )));
        }
        Ok(parsed.matrix)
    }

    fn endpoint(&self, op: &str) -> Url {
        self.base_url.join(op).unwrap_or_else(|_| self.base_url.clone())
    }
}

/// Maps 429 to [`RoutingError::RateLimited`] (honoring `Retry-After`) and
/// any other non-2xx status to [`RoutingError::UnexpectedStatus`].
pub(crate) fn check_status(response: Response, url: &str) -> Result<Response, RoutingError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(RoutingError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        return Err(RoutingError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// Checks that `order` visits every index in `0..n` exactly once.
fn validate_order(order: &[usize], n: usize) -> Result<(), RoutingError> {
    if order.len() != n {
        return Err(RoutingError::InvalidOrder {
            reason: format!("expected {n} indices, got {}", order.len()),
        });
    }
    let mut seen = vec![false; n];
    for &idx in order {
        if idx >= n || seen[idx] {
            return Err(RoutingError::InvalidOrder {
                reason: format!("index {idx} repeated or out of bounds"),
            });
        }
        seen[idx] = true;
    }
    Ok(())
}
