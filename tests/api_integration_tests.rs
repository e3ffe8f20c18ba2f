// API Integration Tests
//
// Purpose: Exercise the dashboard router end to end with small in-memory and
// on-disk tables and a scripted image provider.
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use bird_banding_dashboard::{
        create_router, AppState, DashboardData, HeatmapCount, IllustrationError, IllustrationFetcher,
        ImageProvider, ImageSettings, ViewSettings, YearlyCount,
    };
    use bird_banding_dashboard::illustration::ProviderFuture;
    use serde_json::Value;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    struct FixedProvider {
        fail: bool,
    }

    impl ImageProvider for FixedProvider {
        fn generate<'a>(&'a self, _prompt: &'a str) -> ProviderFuture<'a> {
            Box::pin(async move {
                if self.fail {
                    Err(IllustrationError::Status {
                        status: 401,
                        body: "invalid api key".to_string(),
                    })
                } else {
                    Ok("https://images.test/blue-goose.png".to_string())
                }
            })
        }
    }

    fn record(species: &str, code: &str, year: i64, count: u64) -> YearlyCount {
        YearlyCount {
            species_id: "1690".to_string(),
            species_name: species.to_string(),
            iso_subdivision: code.to_string(),
            event_year: year,
            item_count: count,
        }
    }

    fn blue_goose() -> DashboardData {
        DashboardData::from_records(
            vec![
                record("Blue Goose", "US-CA", 2020, 5),
                record("Blue Goose", "US-NY", 2020, 3),
                record("Blue Goose", "US-CA", 2021, 9),
            ],
            vec![HeatmapCount {
                species_name: "Blue Goose".to_string(),
                event_year: 2022,
                iso_subdivision: "US-CA".to_string(),
                lat_dd: 38.5,
                lon_dd: -121.5,
                item_count: 4,
            }],
        )
    }

    fn assets_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
    }

    fn create_test_app(data: DashboardData, fail_images: bool) -> axum::Router {
        let settings = ImageSettings::default();
        let fetcher = IllustrationFetcher::new(Arc::new(FixedProvider { fail: fail_images }), &settings);
        let state = AppState::from_parts(
            data,
            ViewSettings::default(),
            fetcher,
            "Blue Goose",
            assets_dir(),
        );
        create_router(state)
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn text_response(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
    }

    fn update_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/update")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn update_for<'a>(body: &'a Value, output: &str) -> &'a Value {
        body["updates"]
            .as_array()
            .unwrap()
            .iter()
            .find(|u| u["output"] == output)
            .unwrap_or_else(|| panic!("no update for {}", output))
    }

    // =========================================================================
    // Section 1: Health, Page, Assets
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_dashboard_page() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = text_response(response).await;
        assert!(html.contains("See where the birds were and where they are going!"));
        assert!(html.contains("id=\"population-over-time\""));
        assert!(html.contains("North American Bird Banding Program"));
    }

    #[tokio::test]
    async fn test_static_assets() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(Request::builder().uri("/assets/dashboard.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        // Out-of-order turn responses must not overwrite newer outputs
        let script = text_response(response).await;
        assert!(script.contains("lastApplied[update.output] = seq"));
        assert!(script.contains("> seq"));
    }

    // =========================================================================
    // Section 2: Layout Bootstrap
    // =========================================================================

    #[tokio::test]
    async fn test_layout_defaults() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(Request::builder().uri("/api/layout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;

        assert_eq!(
            body["species_options"],
            serde_json::json!([{"label": "Blue Goose", "value": "Blue Goose"}])
        );
        assert_eq!(body["subdivision_options"].as_array().unwrap().len(), 2);
        assert_eq!(body["default_controls"]["species"], "Blue Goose");
        assert_eq!(body["default_controls"]["regions"], serde_json::json!(["US-CA", "US-NY"]));
        assert_eq!(body["heatmap_year"], 2022);
    }

    // =========================================================================
    // Section 3: Recomputation Turns
    // =========================================================================

    #[tokio::test]
    async fn test_species_turn_updates_every_view() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": ["species"],
                "controls": {"species": "Blue Goose", "regions": ["US-CA", "US-NY"]}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["updates"].as_array().unwrap().len(), 5);

        let population = &update_for(&body, "population-over-time")["value"];
        let traces = population["data"].as_array().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0]["name"], "US-CA");
        assert_eq!(traces[0]["x"], serde_json::json!([2020, 2021]));
        assert_eq!(traces[0]["y"], serde_json::json!([5, 9]));
        assert_eq!(traces[1]["name"], "US-NY");
        assert_eq!(traces[1]["y"], serde_json::json!([3]));

        assert_eq!(
            update_for(&body, "bird-image")["value"],
            "https://images.test/blue-goose.png"
        );

        let slider = &update_for(&body, "time-slider")["value"];
        assert_eq!(slider["data"].as_array().unwrap().len(), 2);
        assert_eq!(slider["layout"]["sliders"][0]["steps"].as_array().unwrap().len(), 2);
        assert_eq!(slider["data"][0]["visible"], true);
        assert_eq!(slider["data"][1]["visible"], false);

        let heatmap = &update_for(&body, "heatmap")["value"];
        assert_eq!(heatmap["data"][0]["type"], "scattergeo");
        assert_eq!(heatmap["data"][0]["marker"]["size"], serde_json::json!([4]));

        let options = update_for(&body, "region-options")["value"].as_array().unwrap();
        assert_eq!(options.len(), 2);
    }

    #[tokio::test]
    async fn test_region_turn_updates_only_population() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": ["regions"],
                "controls": {"species": "Blue Goose", "regions": ["US-CA"]}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        let updates = body["updates"].as_array().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["output"], "population-over-time");

        let traces = updates[0]["value"]["data"].as_array().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0]["name"], "US-CA");
    }

    #[tokio::test]
    async fn test_unknown_species_renders_empty_states() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": ["species"],
                "controls": {"species": "Dodo", "regions": ["US-CA"]}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;

        assert_eq!(update_for(&body, "population-over-time")["value"]["data"], serde_json::json!([]));
        assert_eq!(update_for(&body, "time-slider")["value"]["data"], serde_json::json!([]));
        assert_eq!(
            update_for(&body, "heatmap")["value"]["layout"]["title"]["text"],
            "No Data Available"
        );
    }

    #[tokio::test]
    async fn test_image_failure_uses_fallback() {
        let app = create_test_app(blue_goose(), true);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": ["species"],
                "controls": {"species": "Blue Goose", "regions": ["US-CA", "US-NY"]}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(
            update_for(&body, "bird-image")["value"],
            ImageSettings::default().fallback_url.as_str()
        );
        assert_eq!(
            update_for(&body, "population-over-time")["value"]["data"].as_array().unwrap().len(),
            2
        );
    }

    // =========================================================================
    // Section 4: Request Validation
    // =========================================================================

    #[tokio::test]
    async fn test_empty_changed_is_bad_request() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": [],
                "controls": {"species": "Blue Goose", "regions": []}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("changed"));
    }

    #[tokio::test]
    async fn test_unknown_input_is_rejected() {
        let app = create_test_app(blue_goose(), false);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": ["weather"],
                "controls": {"species": "Blue Goose"}
            })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    // =========================================================================
    // Section 5: CSV Load → Turn
    // =========================================================================

    #[tokio::test]
    async fn test_loaded_tables_drive_population_chart() {
        let dir = tempfile::TempDir::new().unwrap();
        let yearly = dir.path().join("countbyyear.csv");
        let heatmap = dir.path().join("heatmap.csv");
        std::fs::File::create(&yearly)
            .unwrap()
            .write_all(
                b"species_id,species_name,iso_subdivision,event_year,item_count\n\
                  1690,Blue Goose,US-CA,2020,5\n\
                  1690,Blue Goose,US-NY,2020,3\n\
                  1690,Blue Goose,US-CA,2021,9\n",
            )
            .unwrap();
        std::fs::File::create(&heatmap)
            .unwrap()
            .write_all(
                b"species_name,event_year,iso_subdivision,lat_dd,lon_dd,item_count\n\
                  Mallard,2022,US-TX,29.75,-95.25,7\n",
            )
            .unwrap();

        let data = DashboardData::load(&yearly, &heatmap).unwrap();
        let app = create_test_app(data, false);

        let response = app
            .oneshot(update_request(serde_json::json!({
                "changed": ["species", "regions"],
                "controls": {"species": "Blue Goose", "regions": ["US-CA", "US-NY"]}
            })))
            .await
            .unwrap();

        let body = json_response(response).await;
        let traces = update_for(&body, "population-over-time")["value"]["data"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0]["x"], serde_json::json!([2020, 2021]));
        assert_eq!(traces[0]["y"], serde_json::json!([5, 9]));
        assert_eq!(traces[1]["x"], serde_json::json!([2020]));

        assert_eq!(
            update_for(&body, "heatmap")["value"]["layout"]["title"]["text"],
            "No Data Available"
        );
    }
}
