//! End-to-end tests for search

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::Value;

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("Search response should be an array")
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.search("ALIEN").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(ids(&body), vec![ALIEN3_ID, ALIEN_RESURRECTION_ID]);
}

#[tokio::test]
async fn test_search_covers_shows() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.search("trek").await.json().await.unwrap();
    assert_eq!(ids(&body), vec![STAR_TREK_CONTINUES_ID]);
    assert_eq!(body[0]["type"], "show");
}

#[tokio::test]
async fn test_search_with_no_match() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.search("zzz-nothing").await.json().await.unwrap();
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_search_q_alias() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get("/api/search?q=resurrection").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(ids(&body), vec![ALIEN_RESURRECTION_ID]);
}

#[tokio::test]
async fn test_empty_keyword_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.search("   ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = client.get("/api/search").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
