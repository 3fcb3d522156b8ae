use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderValue, Request};
use klanavo_core::{Coordinate, Listing, PostalArea, RouteGeometry, SearchFilters};
use klanavo_geo::{GeoError, GeocodeProvider, Geocoder, PostalCache, RouteProvider};
use klanavo_scraper::{ListingSource, ScraperError};
use klanavo_search::UsageStats;
use tower::ServiceExt;

use super::*;

/// Knows "Berlin" and "Leipzig"; every point reverse-geocodes to 10115 Berlin.
struct FakeGeo;

#[async_trait]
impl GeocodeProvider for FakeGeo {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn geocode(&self, text: &str) -> Result<Coordinate, GeoError> {
        match text {
            "Berlin" => Ok(Coordinate::new(0.0, 0.0)),
            "Leipzig" => Ok(Coordinate::new(0.27, 0.0)),
            _ => Err(GeoError::NoMatch {
                provider: "fake",
                query: text.to_owned(),
            }),
        }
    }

    async fn reverse(&self, _point: Coordinate) -> Result<PostalArea, GeoError> {
        Ok(PostalArea {
            postal_code: Some("10115".to_owned()),
            locality: Some("Berlin".to_owned()),
            coordinate: None,
        })
    }
}

/// 28 points along the equator, 0.01 degrees apart.
struct StraightRoute;

#[async_trait]
impl RouteProvider for StraightRoute {
    async fn route(&self, _: Coordinate, _: Coordinate) -> Result<RouteGeometry, GeoError> {
        Ok((0..28)
            .map(|i| Coordinate::new(f64::from(i) * 0.01, 0.0))
            .collect())
    }
}

/// Returns one listing for "10115" and a 503 for anything else.
struct OneListing;

#[async_trait]
impl ListingSource for OneListing {
    fn name(&self) -> &'static str {
        "one"
    }

    async fn fetch(&self, filters: &SearchFilters) -> Result<Vec<Listing>, ScraperError> {
        if filters.location.as_deref() == Some("10115") {
            Ok(vec![Listing {
                adid: "1".to_owned(),
                url: "https://listings.test/s-anzeige/rad/1".to_owned(),
                title: "Rad".to_owned(),
                price: "50".to_owned(),
                description: String::new(),
            }])
        } else {
            Err(ScraperError::UnexpectedStatus {
                status: 503,
                url: "https://listings.test/s-seite:1".to_owned(),
            })
        }
    }
}

fn pipeline(with_router: bool) -> Arc<RouteSearch> {
    let providers: Vec<Arc<dyn GeocodeProvider>> = vec![Arc::new(FakeGeo)];
    let geocoder = Arc::new(Geocoder::new(providers, Arc::new(PostalCache::new())));
    let search = RouteSearch::new(geocoder, Arc::new(OneListing), Arc::new(UsageStats::new()));
    Arc::new(if with_router {
        search.with_router(Arc::new(StraightRoute))
    } else {
        search
    })
}

fn app_for(search: Arc<RouteSearch>) -> Router {
    build_app(AppState { search }, admission_gate(0))
}

fn app() -> Router {
    app_for(pipeline(false))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("geocoding_failed", StatusCode::BAD_GATEWAY),
        ("routing_failed", StatusCode::BAD_GATEWAY),
        ("fetch_failed", StatusCode::BAD_GATEWAY),
        ("configuration_missing", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "x").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[tokio::test]
async fn health_is_ok_on_both_paths() {
    for uri in ["/health", "/api/health"] {
        let (status, json) = send(app(), get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }
}

#[tokio::test]
async fn request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .expect("request");
    let response = app().oneshot(request).await.expect("response");
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("abc-123")
    );
}

#[tokio::test]
async fn inserate_returns_listings() {
    let (status, json) = send(app(), get("/inserate?location=10115&query=rad")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["adid"], "1");
    assert_eq!(json["data"][0]["price"], "50");
}

#[tokio::test]
async fn inserate_without_location_is_a_validation_error() {
    let (status, json) = send(app(), get("/api/inserate?query=rad")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn inserate_with_malformed_number_is_a_validation_error() {
    let (status, json) = send(app(), get("/inserate?location=10115&radius=far")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn inserate_upstream_failure_is_bad_gateway() {
    let (status, json) = send(app(), get("/inserate?location=80331")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "fetch_failed");
}

#[tokio::test]
async fn route_search_without_router_reports_missing_configuration() {
    let (status, json) = send(
        app(),
        post_json("/route-search", r#"{"start":"Berlin","ziel":"Leipzig"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "configuration_missing");
}

#[tokio::test]
async fn route_search_rejects_malformed_body() {
    let (status, json) = send(app(), post_json("/api/route-search", r#"{"start":"Berlin"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn route_search_rejects_blank_endpoint() {
    let (status, json) = send(
        app(),
        post_json("/route-search", r#"{"start":"  ","ziel":"Leipzig"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn stats_counts_distinct_visitors() {
    let app = app();
    let with_ip = |ip: &'static str| {
        Request::builder()
            .uri("/stats")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .expect("request")
    };

    let (_, first) = send(app.clone(), with_ip("203.0.113.5")).await;
    assert_eq!(first["visitors"], 1);
    let (_, again) = send(app.clone(), with_ip("203.0.113.5")).await;
    assert_eq!(again["visitors"], 1);
    let (status, other) = send(app, with_ip("198.51.100.2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(other["visitors"], 2);
    assert_eq!(other["searches_saved"], 0);
}

#[tokio::test]
async fn stats_without_any_address_records_nobody() {
    let (status, json) = send(app(), get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["visitors"], 0);
}

#[tokio::test]
async fn route_search_returns_route_and_located_listings() {
    let search = pipeline(true);
    let request = Request::builder()
        .method("POST")
        .uri("/api/route-search")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.5")
        .body(Body::from(r#"{"start":"Berlin","ziel":"Leipzig","step":10}"#))
        .expect("request");

    let (status, json) = send(app_for(Arc::clone(&search)), request).await;
    assert_eq!(status, StatusCode::OK);

    let route = json["route"].as_array().expect("route array");
    assert_eq!(route.len(), 28);
    assert_eq!(route[0], serde_json::json!([0.0, 0.0]));

    let listings = json["listings"].as_array().expect("listings array");
    assert_eq!(listings.len(), 1);
    let first = &listings[0];
    assert_eq!(first["adid"], "1");
    assert_eq!(first["url"], "https://listings.test/s-anzeige/rad/1");
    assert_eq!(first["plz"], "10115");
    assert_eq!(first["label"], "10115 Berlin");
    assert_eq!(first["lat"], 0.0);
    assert!(first["lon"].as_f64().is_some_and(|lon| lon > 0.0));

    let stats = search.stats().snapshot();
    assert_eq!(stats.searches_saved, 1);
    assert_eq!(stats.listings_found, 1);
    assert_eq!(stats.visitors, 1);
}

#[tokio::test]
async fn failed_route_search_records_no_visitor() {
    let search = pipeline(false);
    let request = Request::builder()
        .method("POST")
        .uri("/route-search")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.5")
        .body(Body::from(r#"{"start":"Berlin","ziel":"Leipzig"}"#))
        .expect("request");

    let (status, _) = send(app_for(Arc::clone(&search)), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(search.stats().snapshot().visitors, 0);
}

fn peer() -> Option<SocketAddr> {
    Some("192.0.2.10:55000".parse().unwrap())
}

#[test]
fn forwarded_for_first_entry_wins() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
    );
    headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
    assert_eq!(client_ip(&headers, peer()).as_deref(), Some("203.0.113.5"));
}

#[test]
fn client_ip_falls_through_proxy_headers_in_order() {
    let mut headers = HeaderMap::new();
    headers.insert("true-client-ip", HeaderValue::from_static("198.51.100.9"));
    headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.7"));
    assert_eq!(client_ip(&headers, peer()).as_deref(), Some("198.51.100.7"));
}

#[test]
fn blank_proxy_header_is_skipped() {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
    headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
    assert_eq!(client_ip(&headers, peer()).as_deref(), Some("198.51.100.2"));
}

#[test]
fn peer_address_is_last_resort() {
    assert_eq!(
        client_ip(&HeaderMap::new(), peer()).as_deref(),
        Some("192.0.2.10")
    );
    assert!(client_ip(&HeaderMap::new(), None).is_none());
}
