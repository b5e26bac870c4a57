//! GitHub REST implementation of [RepositoryService].
//!
//! List endpoints are paginated with `per_page=100` until a short page is
//! returned. `releases/latest` answers 404 when a repository has no
//! release; that is reported as `Ok(None)`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Branch, Release, RepositoryService, Tag};
use crate::context::RepositoryContext;
use crate::error::{BotError, Result};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "sweekt-bot";

/// Page size for list endpoints (GitHub's maximum).
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GitHub repository queried over the REST API
#[derive(Debug, Clone)]
pub struct GithubRepository {
    client: Client,
    context: RepositoryContext,
}

impl GithubRepository {
    /// Build a client sending the context's credentials on every request.
    pub fn new(context: RepositoryContext) -> Result<Self> {
        let client = Client::builder()
            .default_headers(default_headers(&context)?)
            .build()?;
        Ok(GithubRepository { client, context })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.context.api_url.trim_end_matches('/'),
            self.context.repository,
            path
        )
    }

    async fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = self.repo_url(path);
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            tracing::debug!("GET {} (page {})", url, page);
            let response = self
                .client
                .get(&url)
                .query(&[("per_page", PER_PAGE), ("page", page)])
                .send()
                .await?;
            let batch: Vec<T> = handle_response(response).await?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                return Ok(items);
            }
            page += 1;
        }
    }
}

fn default_headers(context: &RepositoryContext) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = &context.token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| BotError::config("GitHub token contains invalid header characters"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );
    Ok(headers)
}

/// Decode a successful response or turn the error body into [BotError::Forge].
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GitHubErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
    Err(BotError::forge(status.as_u16(), message))
}

#[async_trait]
impl RepositoryService for GithubRepository {
    fn context(&self) -> &RepositoryContext {
        &self.context
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        self.get_paginated("tags").await
    }

    async fn branches(&self) -> Result<Vec<Branch>> {
        self.get_paginated("branches").await
    }

    async fn latest_release(&self) -> Result<Option<Release>> {
        let url = self.repo_url("releases/latest");
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        handle_response(response).await.map(Some)
    }
}
