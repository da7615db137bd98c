//! Integration tests for `OptimizerClient` and `PathClient` against a
//! wiremock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wayplan_routing::{Location, OptimizerClient, PathClient, RoutingError};

fn optimizer(base_url: &str) -> OptimizerClient {
    OptimizerClient::new(base_url, 5, "wayplan-test/0.1").expect("failed to build OptimizerClient")
}

fn path_client(base_url: &str) -> PathClient {
    PathClient::new(base_url, 5, "wayplan-test/0.1").expect("failed to build PathClient")
}

fn three_points() -> Vec<Location> {
    vec![
        Location { lat: 0.0, lng: 0.0 },
        Location { lat: 0.0, lng: 1.0 },
        Location { lat: 1.0, lng: 1.0 },
    ]
}

#[tokio::test]
async fn optimize_sends_locations_and_priority_and_parses_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimize-route"))
        .and(body_partial_json(json!({
            "locations": [
                { "lat": 0.0, "lng": 0.0 },
                { "lat": 0.0, "lng": 1.0 },
                { "lat": 1.0, "lng": 1.0 },
            ],
            "priority": [2],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "order": [2, 0, 1],
            "total_distance_m": 314000.0,
        })))
        .mount(&server)
        .await;

    let client = optimizer(&server.uri());
    let route = client.optimize(&three_points(), &[2]).await.unwrap();

    assert_eq!(route.order, vec![2, 0, 1]);
    assert!((route.total_distance_m - 314_000.0).abs() < 1e-9);
}

#[tokio::test]
async fn optimize_normalizes_legacy_total_distance_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimize-route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "order": [0, 1, 2],
            "total_distance": 99.5,
        })))
        .mount(&server)
        .await;

    let client = optimizer(&server.uri());
    let route = client.optimize(&three_points(), &[]).await.unwrap();
    assert!((route.total_distance_m - 99.5).abs() < 1e-9);
}

#[tokio::test]
async fn optimize_rejects_non_permutation_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimize-route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "order": [0, 0, 2],
            "total_distance_m": 1.0,
        })))
        .mount(&server)
        .await;

    let client = optimizer(&server.uri());
    let err = client.optimize(&three_points(), &[]).await.unwrap_err();
    assert!(matches!(err, RoutingError::InvalidOrder { .. }));
}

#[tokio::test]
async fn optimize_maps_429_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimize-route"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = optimizer(&server.uri());
    let err = client.optimize(&three_points(), &[]).await.unwrap_err();
    assert!(
        matches!(err, RoutingError::RateLimited { retry_after_secs: 30 }),
        "expected RateLimited(30), got: {err:?}"
    );
}

#[tokio::test]
async fn distance_matrix_round_trips() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/distance-matrix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "matrix": [
                [0.0, 10.0, 20.0],
                [10.0, 0.0, 15.0],
                [20.0, 15.0, 0.0],
            ]
        })))
        .mount(&server)
        .await;

    let client = optimizer(&server.uri());
    let matrix = client.distance_matrix(&three_points()).await.unwrap();
    assert_eq!(matrix[0][1], 10.0);
    assert_eq!(matrix[2][1], 15.0);
}

#[tokio::test]
async fn distance_matrix_rejects_wrong_dimensions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/distance-matrix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "matrix": [[0.0, 1.0]]
        })))
        .mount(&server)
        .await;

    let client = optimizer(&server.uri());
    let err = client.distance_matrix(&three_points()).await.unwrap_err();
    assert!(matches!(err, RoutingError::Api(_)));
}

#[tokio::test]
async fn route_addresses_points_lng_first_and_flips_geometry_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/driving/0,0;1,0"))
        .and(query_param("geometries", "geojson"))
        .and(query_param("overview", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "Ok",
            "routes": [{
                "geometry": { "coordinates": [[0.0, 0.0], [0.5, 0.1], [1.0, 0.0]] },
                "duration": 3600.0,
                "distance": 111000.0,
            }]
        })))
        .mount(&server)
        .await;

    let client = path_client(&server.uri());
    let points = vec![
        Location { lat: 0.0, lng: 0.0 },
        Location { lat: 0.0, lng: 1.0 },
    ];
    let path = client.route(&points).await.unwrap();

    // Wire pairs are (lng, lat); display pairs are (lat, lng).
    assert_eq!(path.polyline, vec![(0.0, 0.0), (0.1, 0.5), (0.0, 1.0)]);
    assert!((path.duration_s - 3600.0).abs() < 1e-9);
    assert!((path.distance_m - 111_000.0).abs() < 1e-9);
}

#[tokio::test]
async fn route_maps_429_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/driving/0,0;1,0"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = path_client(&server.uri());
    let points = vec![
        Location { lat: 0.0, lng: 0.0 },
        Location { lat: 0.0, lng: 1.0 },
    ];
    let err = client.route(&points).await.unwrap_err();
    assert!(matches!(err, RoutingError::RateLimited { .. }));
}

#[tokio::test]
async fn route_with_error_code_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/driving/0,0;1,0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "NoRoute",
            "routes": []
        })))
        .mount(&server)
        .await;

    let client = path_client(&server.uri());
    let points = vec![
        Location { lat: 0.0, lng: 0.0 },
        Location { lat: 0.0, lng: 1.0 },
    ];
    let err = client.route(&points).await.unwrap_err();
    assert!(matches!(err, RoutingError::Api(_)));
}
