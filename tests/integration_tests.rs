//! End-to-end tests for campus-route sessions
//!
//! Routing and geocoding backends are mocked with wiremock; the map is the
//! in-memory `HeadlessMap`.

use campus_route::{
    wait_style_ready, AppConfig, BasemapStyle, CampusMap, Error, HeadlessMap, Language,
    LineGeometry, LngLat, MapSurface, MapViewState, MapboxGeocoder, MemoryStore, Role, RouteKind,
    RouteLayers, RoutingProfile,
};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const BOYD_ORR_TO_FRASER: &str = "/route/v1/foot/-4.2927,55.87355;-4.2878,55.8731";

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.routing.all_access = format!("{}/all", server.uri());
    config.routing.step_free = format!("{}/step", server.uri());
    config.geocoding.base_url = format!("{}/geocode", server.uri());
    config.geocoding.access_token = "pk.test".to_string();
    config
}

fn session_for(config: &AppConfig) -> CampusMap<HeadlessMap, MapboxGeocoder> {
    let map = HeadlessMap::new(&config.styles.detailed, config.initial_view);
    CampusMap::new(
        config,
        map,
        MapboxGeocoder::new(&config.geocoding),
        Box::new(MemoryStore::default()),
    )
}

fn three_point_route() -> serde_json::Value {
    json!({
        "routes": [{
            "geometry": {
                "type": "LineString",
                "coordinates": [[-4.2927, 55.87355], [-4.2903, 55.8733], [-4.2878, 55.8731]]
            },
            "distance": 450.0,
            "duration": 360.0
        }]
    })
}

async fn select_boyd_orr_and_fraser(session: &mut CampusMap<HeadlessMap, MapboxGeocoder>) {
    session.locate(Role::Origin, "Boyd Orr").await.unwrap();
    session.locate(Role::Destination, "Fraser").await.unwrap();
}

#[tokio::test]
async fn test_all_access_route_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/all{BOYD_ORR_TO_FRASER}")))
        .and(query_param("geometries", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_point_route()))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);
    select_boyd_orr_and_fraser(&mut session).await;

    let route = session.plan_route().await.unwrap();
    assert_eq!(route.kind, RouteKind::AllAccess);
    assert_eq!(route.geometry.coordinates.len(), 3);
    assert_eq!(
        session.info().as_deref(),
        Some("Distance: 0.45 km | Duration: 6 min")
    );
    assert_eq!(
        session.layers().cached(RouteKind::AllAccess),
        Some(&route.geometry)
    );
    assert!(session.notice().is_none());

    let map = session.map();
    assert!(map.has_layer("route-all-layer"));
    assert!(map.has_source("route-all"));
    assert_eq!(map.fit_requests().last().map(|f| f.padding), Some(50));
}

#[tokio::test]
async fn test_step_free_without_routes_keeps_previous_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/all{BOYD_ORR_TO_FRASER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_point_route()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/step{BOYD_ORR_TO_FRASER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "routes": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);
    select_boyd_orr_and_fraser(&mut session).await;
    session.plan_route().await.unwrap();
    let drawn_before = session.map().to_feature_collection();

    session.set_profile(RoutingProfile::StepFree);
    let err = session.plan_route().await.unwrap_err();
    assert!(matches!(err, Error::NoRouteFound));
    assert_eq!(session.notice(), Some("No route found."));
    assert!(session.layers().cached(RouteKind::StepFree).is_none());
    assert!(session.layers().cached(RouteKind::AllAccess).is_some());
    assert_eq!(session.map().to_feature_collection(), drawn_before);
}

#[tokio::test]
async fn test_fetch_failure_notice_is_localized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/all/route/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);
    session.set_language(Language::Zh);
    select_boyd_orr_and_fraser(&mut session).await;

    let err = session.plan_route().await.unwrap_err();
    assert!(matches!(err, Error::RouteFetchFailed(_)));
    assert_eq!(session.notice(), Some("获取或绘制路线失败。"));
    assert_eq!(session.map().layer_count(), 0);
}

#[tokio::test]
async fn test_fetch_failure_keeps_planned_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/all{BOYD_ORR_TO_FRASER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_point_route()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/all{BOYD_ORR_TO_FRASER}")))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);
    select_boyd_orr_and_fraser(&mut session).await;
    let planned = session.plan_route().await.unwrap();
    let drawn = session.map().to_feature_collection();

    let err = session.plan_route().await.unwrap_err();
    assert!(matches!(err, Error::RouteFetchFailed(_)));
    assert_eq!(session.notice(), Some("Failed to fetch or render the route."));
    assert_eq!(
        session.layers().cached(RouteKind::AllAccess),
        Some(&planned.geometry)
    );
    assert_eq!(session.map().to_feature_collection(), drawn);
    assert_eq!(session.map().fit_requests().len(), 1);
}

#[tokio::test]
async fn test_geocoding_only_when_no_landmark_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/geocode/.+\\.json$"))
        .and(query_param("access_token", "pk.test"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [
                { "place_name": "Byres Road, Glasgow", "geometry": { "coordinates": [-4.2935, 55.8745] } },
                { "place_name": "Byres Road Station, Glasgow", "geometry": { "coordinates": [-4.2931, 55.8751] } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);

    let local = session.type_query(Role::Origin, "Stai").await.to_vec();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].label, "Stair Building (Mathematics & Statistics)");

    let remote = session.type_query(Role::Destination, "byres road").await.to_vec();
    assert_eq!(remote.len(), 2);
    assert!(session.selection().input(Role::Destination).is_visible());

    assert!(session.type_query(Role::Destination, "  ").await.is_empty());
    assert!(!session.selection().input(Role::Destination).is_visible());
}

#[tokio::test]
async fn test_geocoding_outage_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);
    assert!(session.type_query(Role::Origin, "byres road").await.is_empty());
    assert!(session.notice().is_none());
}

#[tokio::test]
async fn test_style_round_trip_keeps_camera_and_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/(all|step)/route/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_point_route()))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = session_for(&config);
    select_boyd_orr_and_fraser(&mut session).await;
    session.plan_route().await.unwrap();
    session.set_profile(RoutingProfile::StepFree);
    session.plan_route().await.unwrap();

    let camera = MapViewState::capture(session.map());
    let drawn = session.map().to_feature_collection();

    session.switch_style(BasemapStyle::HighContrast).await.unwrap();
    session.switch_style(BasemapStyle::Detailed).await.unwrap();

    let map = session.map();
    assert_eq!(MapViewState::capture(map), camera);
    assert_eq!(map.layer_count(), 2);
    assert_eq!(map.source_count(), 2);
    assert_eq!(map.to_feature_collection(), drawn);
    assert_eq!(map.controls().len(), 2);
    assert_eq!(
        map.style_history(),
        [
            config.styles.detailed.as_str(),
            config.styles.high_contrast.as_str(),
            config.styles.detailed.as_str()
        ]
    );
}

#[tokio::test]
async fn test_ensure_rendered_is_idempotent() {
    let config = AppConfig::default();
    let mut map = HeadlessMap::new(&config.styles.detailed, config.initial_view);
    let mut layers = RouteLayers::new();
    let line = LineGeometry::new(vec![
        LngLat::new(-4.2927, 55.87355),
        LngLat::new(-4.2878, 55.8731),
    ]);

    layers.set_route(RouteKind::StepFree, line, &mut map).await.unwrap();
    let once = map.to_feature_collection();
    layers.ensure_rendered(RouteKind::StepFree, &mut map).await.unwrap();
    layers.ensure_rendered(RouteKind::StepFree, &mut map).await.unwrap();

    assert_eq!(map.to_feature_collection(), once);
    assert_eq!(map.layer_count(), 1);
    assert_eq!(
        map.layer("route-step-layer").and_then(|l| l.paint.dash.clone()),
        Some(vec![2.0, 2.0])
    );
}

#[test]
fn test_loaded_style_is_ready_without_events() {
    let config = AppConfig::default();
    let mut map = HeadlessMap::new(&config.styles.detailed, config.initial_view);
    assert!(map.is_style_loaded());
    tokio_test::block_on(wait_style_ready(&mut map)).unwrap();
}
