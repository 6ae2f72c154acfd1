//! End-to-end tests for the plot service router with a stub renderer.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use regex::Regex;
use serde_json::{json, Value};
use tower::ServiceExt;

use dighyd_plot::{
    ChartRenderer, FigureType, ImageStore, PlotDispatcher, PlotError, RenderRequest,
};
use dighyd_web::{router::build_plot_router, state::PlotState};

/// Writes a deterministic fake PNG derived from the job.
struct StubRenderer;

#[async_trait]
impl ChartRenderer for StubRenderer {
    async fn render(&self, request: &RenderRequest<'_>) -> dighyd_plot::Result<()> {
        let body = format!("\u{89}PNG {:?}", request.job);
        tokio::fs::write(request.image_path, body).await?;
        Ok(())
    }
}

/// Fails the way a plotting script does on a bad dataset.
struct FailingRenderer;

#[async_trait]
impl ChartRenderer for FailingRenderer {
    async fn render(&self, _: &RenderRequest<'_>) -> dighyd_plot::Result<()> {
        Err(PlotError::Render("FileNotFoundError: Total_Data.csv".into()))
    }
}

async fn app(dir: &Path, renderer: Arc<dyn ChartRenderer>) -> Router {
    let store = ImageStore::open(dir, 100, 50).await.unwrap();
    let dispatcher =
        PlotDispatcher::new(store, renderer, "data/Total_Data.csv", "https://plot.dighyd.org");
    build_plot_router(PlotState::new(dispatcher))
}

async fn post_plot(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/plot")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn markdown_pattern() -> Regex {
    Regex::new(r"^!\[Plot\]\(https://plot\.dighyd\.org/images/([0-9a-f]{32}\.png)\)$").unwrap()
}

#[tokio::test]
async fn test_every_figure_type_returns_markdown_image() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;
    let pattern = markdown_pattern();

    for figure in FigureType::ALL {
        let (status, body) = post_plot(&app, json!({ "figure_type": figure.tag() })).await;
        assert_eq!(status, StatusCode::OK, "{figure}: {body}");

        let markdown = body["markdown"].as_str().unwrap();
        let caps = pattern.captures(markdown).unwrap_or_else(|| panic!("bad markdown {markdown}"));
        assert!(dir.path().join(&caps[1]).exists());
    }
}

#[tokio::test]
async fn test_unknown_figure_type_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;

    let (status, body) = post_plot(&app, json!({ "figure_type": "scatter_matrix" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unsupported figure_type" }));
}

#[tokio::test]
async fn test_inverted_year_range_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;

    let (status, body) = post_plot(
        &app,
        json!({ "figure_type": "publication_trend", "year_range": [2025, 1990] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid parameter:"));
}

#[tokio::test]
async fn test_null_parameters_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;

    let (status, body) = post_plot(
        &app,
        json!({
            "figure_type": "typical_material_analyses",
            "year_range": null,
            "material_type": null,
            "number_of_interested_elements": null,
            "interested_performance": null,
            "elements_in_typical_material": null,
            "color_list": null
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let file = markdown_pattern()
        .captures(body["markdown"].as_str().unwrap())
        .unwrap()[1]
        .to_string();
    let image = String::from_utf8_lossy(&std::fs::read(dir.path().join(file)).unwrap()).into_owned();
    assert!(image.contains(r#"interested_col: "Dehydrogenation temperature_processed""#), "{image}");
    assert!(image.contains("top_n: 5"), "{image}");
}

#[tokio::test]
async fn test_render_failure_is_structured_500() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(FailingRenderer)).await;

    let (status, body) = post_plot(&app, json!({ "figure_type": "material_type_ratio" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Rendering failed: FileNotFoundError: Total_Data.csv"
    );
}

#[tokio::test]
async fn test_identical_requests_create_distinct_images() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;
    let pattern = markdown_pattern();
    let request = json!({
        "figure_type": "typical_material_analyses",
        "elements_in_typical_material": ["Mg", "Ni"],
        "interested_performance": ["Hydrogen density"],
        "number_of_interested_elements": "3"
    });

    let (_, a) = post_plot(&app, request.clone()).await;
    let (_, b) = post_plot(&app, request).await;
    let a = pattern.captures(a["markdown"].as_str().unwrap()).unwrap()[1].to_string();
    let b = pattern.captures(b["markdown"].as_str().unwrap()).unwrap()[1].to_string();

    assert_ne!(a, b);
    assert_eq!(
        std::fs::read(dir.path().join(a)).unwrap(),
        std::fs::read(dir.path().join(b)).unwrap()
    );
}

#[tokio::test]
async fn test_generated_image_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;

    let (_, body) = post_plot(&app, json!({ "figure_type": "publication_trend" })).await;
    let file = markdown_pattern()
        .captures(body["markdown"].as_str().unwrap())
        .unwrap()[1]
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/images/{file}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), std::fs::read(dir.path().join(&file)).unwrap().as_slice());
}

#[tokio::test]
async fn test_privacy_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Arc::new(StubRenderer)).await;

    let response = app
        .oneshot(Request::builder().uri("/privacy").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<h1>Privacy Policy</h1>"));
}
