//! NewsAPI client and theme routing.

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use marketlens_core::config::ProviderEndpoint;
use marketlens_core::result::AppResult;

use crate::http::{decode, endpoint_url, get_text, require_key, status_error};
use crate::types::NewsFeed;

const PROVIDER: &str = "NewsAPI";
const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Query parameters accepted by the news feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsQuery {
    /// Curated theme; takes precedence over `category` and `q`.
    pub theme: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
}

/// NewsAPI endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsEndpoint {
    TopHeadlines,
    Everything,
}

impl NewsEndpoint {
    fn path(&self) -> &'static str {
        match self {
            Self::TopHeadlines => "/v2/top-headlines",
            Self::Everything => "/v2/everything",
        }
    }
}

/// A resolved NewsAPI request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRequest {
    pub endpoint: NewsEndpoint,
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: u32,
    pub page_size: u32,
    pub sort_by: String,
}

impl NewsRequest {
    fn headlines(category: &str) -> (NewsEndpoint, Option<String>, Option<String>) {
        (NewsEndpoint::TopHeadlines, Some(category.to_string()), None)
    }

    fn everything(q: &str) -> (NewsEndpoint, Option<String>, Option<String>) {
        (NewsEndpoint::Everything, None, Some(q.to_string()))
    }
}

impl From<&NewsQuery> for NewsRequest {
    fn from(query: &NewsQuery) -> Self {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let (endpoint, category, q) = match (
            non_empty(&query.theme),
            non_empty(&query.category),
            non_empty(&query.q),
        ) {
            (Some(theme), _, _) => match theme.as_str() {
                "business" | "technology" => Self::headlines(&theme),
                "political" => Self::everything("politics"),
                "geopolitical" => Self::everything("geopolitics"),
                "economics" => Self::everything("economics"),
                _ => Self::headlines("general"),
            },
            (None, Some(category), _) if category != "general" => Self::headlines(&category),
            (None, _, Some(q)) => Self::everything(&q),
            _ => Self::headlines("general"),
        };

        Self {
            endpoint,
            category,
            q,
            page: query.page.unwrap_or(1).max(1),
            page_size: query.page_size.unwrap_or(10),
            sort_by: non_empty(&query.sort_by).unwrap_or_else(|| "popularity".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsErrorBody {
    message: Option<String>,
}

/// NewsAPI REST client.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(http: Client, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http,
            base_url: endpoint.base_url_or(DEFAULT_BASE_URL).to_string(),
            api_key: endpoint.api_key.clone(),
        }
    }

    pub async fn fetch(&self, request: &NewsRequest) -> AppResult<NewsFeed> {
        let api_key = require_key(&self.api_key, PROVIDER)?;
        let page = request.page.to_string();
        let page_size = request.page_size.to_string();

        let mut params: Vec<(&str, &str)> = Vec::with_capacity(7);
        if let Some(category) = request.category.as_deref() {
            params.push(("category", category));
        }
        if let Some(q) = request.q.as_deref() {
            params.push(("q", q));
        }
        params.extend([
            ("language", "en"),
            ("pageSize", page_size.as_str()),
            ("page", page.as_str()),
            ("sortBy", request.sort_by.as_str()),
            ("apiKey", api_key),
        ]);

        let url = endpoint_url(&self.base_url, request.endpoint.path(), &params)?;
        let response = get_text(&self.http, PROVIDER, url).await?;

        if !response.status.is_success() {
            let message = serde_json::from_str::<NewsErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.message);
            warn!(
                status = response.status.as_u16(),
                message = ?message,
                "NewsAPI returned an error"
            );
            return Err(status_error(PROVIDER, response.status, message.as_deref()));
        }

        decode(PROVIDER, &response.body)
    }
}
