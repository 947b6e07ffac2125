//! Drives the router in-process through tower's `oneshot`.

use agrifilter::export::{ALL_SHEET, FILTERED_SHEET};
use agrifilter::handler::AppState;
use agrifilter::screening::KeywordSet;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use calamine::{Reader, Xlsx};
use serde_json::{Value, json};
use std::io::Cursor;
use tower::ServiceExt;

const BOUNDARY: &str = "agrifilter-test-boundary";
const PORTFOLIO_PDF: &[u8] = include_bytes!("fixtures/portfolio.pdf");

fn app_with_limit(max_upload_bytes: usize) -> Router {
    let keywords = KeywordSet::from_entries(["Dairy", "cheese", "dairy "]);
    agrifilter::app(AppState::new(keywords), max_upload_bytes)
}

fn test_app() -> Router {
    app_with_limit(1024 * 1024)
}

fn multipart_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
            BOUNDARY, field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_health() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_keywords_listing_is_normalized_and_deduplicated() {
    let response = test_app()
        .oneshot(Request::get("/keywords").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["keywords"], json!(["dairy", "cheese"]));
}

#[tokio::test]
async fn test_analyze_rejects_non_pdf() {
    let request = multipart_request("/analyze", "file", "rows.csv", b"name,description\n");
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("not a PDF"));
}

#[tokio::test]
async fn test_analyze_requires_file_field() {
    let request = multipart_request("/analyze", "attachment", "a.pdf", b"%PDF-1.4");
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing multipart field"));
}

#[tokio::test]
async fn test_analyze_rejects_empty_upload() {
    let request = multipart_request("/analyze", "file", "empty.pdf", b"");
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_unknown_filter() {
    let request = multipart_request("/analyze?filter=sheep", "file", "a.pdf", b"%PDF-1.4");
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("unknown filter"));
}

#[tokio::test]
async fn test_export_rejects_broken_pdf() {
    for uri in ["/export/csv", "/export/xlsx?filter=any"] {
        let request = multipart_request(uri, "file", "broken.pdf", b"%PDF-1.7\nnot a real document");
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_index_served_from_embedded_assets() {
    let response = test_app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");

    let missing = test_app()
        .oneshot(Request::get("/missing.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_filters_matching_projects() {
    let request = multipart_request("/analyze?filter=any", "file", "portfolio.pdf", PORTFOLIO_PDF);
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["document"], "portfolio.pdf");
    assert_eq!(body["filter"], "any");
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["summary"]["any_matches"], 1);

    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "Dairy Expansion");
    assert_eq!(projects[0]["description"], "Improve cheese yield");
    assert_eq!(projects[0]["name_matches"], json!(["dairy"]));
    assert_eq!(projects[0]["description_matches"], json!(["cheese"]));
    assert_eq!(projects[0]["category"], "any_match");
}

#[tokio::test]
async fn test_export_csv_attachment() {
    let request = multipart_request("/export/csv", "file", "portfolio.pdf", PORTFOLIO_PDF);
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"portfolio_livestock_filtered.csv\""));

    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "Dairy Expansion,Improve cheese yield,dairy,cheese");
    assert_eq!(lines[2], "Road Repair,Fix highway,None,None");
}

#[tokio::test]
async fn test_export_xlsx_attachment() {
    let request = multipart_request("/export/xlsx?filter=none", "file", "portfolio.pdf", PORTFOLIO_PDF);
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("portfolio_livestock_analysis.xlsx"));

    let mut workbook = Xlsx::new(Cursor::new(body_bytes(response).await)).unwrap();
    assert_eq!(workbook.sheet_names(), vec![FILTERED_SHEET, ALL_SHEET]);
    assert_eq!(workbook.worksheet_range(FILTERED_SHEET).unwrap().height(), 2);
    assert_eq!(workbook.worksheet_range(ALL_SHEET).unwrap().height(), 3);
}

#[tokio::test]
async fn test_upload_over_limit_is_payload_too_large() {
    let request = multipart_request("/analyze", "file", "big.pdf", &vec![b'x'; 8 * 1024]);
    let response = app_with_limit(1024).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
