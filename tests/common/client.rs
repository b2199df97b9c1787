//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    // ========================================================================
    // Listing
    // ========================================================================

    pub async fn get_collections(&self) -> Response {
        self.get("/api/collections").await
    }

    pub async fn get_movies(&self, page: usize, page_size: usize) -> Response {
        self.get(&format!("/api/movies?page={}&page_size={}", page, page_size))
            .await
    }

    pub async fn get_shows(&self) -> Response {
        self.get("/api/shows").await
    }

    pub async fn get_categories(&self) -> Response {
        self.get("/api/categories").await
    }

    pub async fn get_category(&self, name: &str) -> Response {
        self.get(&format!("/api/categories/{}", urlencoding::encode(name)))
            .await
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub async fn search(&self, keyword: &str) -> Response {
        self.get(&format!(
            "/api/search?keyword={}",
            urlencoding::encode(keyword)
        ))
        .await
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub async fn request_media(&self, media_id: Value, media_type: &str) -> Response {
        self.post_request(json!({"mediaId": media_id, "mediaType": media_type}))
            .await
    }

    pub async fn post_request(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/request", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }
}
