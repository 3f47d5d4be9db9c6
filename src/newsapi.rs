use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::config::{NewsConfig, PAGE_SIZE};
use crate::error::{HarvestError, Result};
use crate::source::NewsSource;
use crate::types::{Article, NewsPage};

const USER_AGENT: &str = concat!("harvest/", env!("CARGO_PKG_VERSION"));

pub struct NewsApi {
    client: Client,
    endpoint: Url,
    query: String,
    language: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for NewsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApi")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl NewsApi {
    pub fn new(config: &NewsConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url()?,
            query: config.query.clone(),
            language: config.language.clone(),
            api_key,
        })
    }

    fn query_params(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.query.clone()),
            ("language", self.language.clone()),
            ("pageSize", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ]
    }
}

// News API response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NaResponse {
    status: String,
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<NaArticle>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NaArticle {
    title: Option<String>,
    description: Option<String>,
    url_to_image: Option<String>,
    url: Option<String>,
    source: Option<NaSource>,
    published_at: Option<String>,
}

#[derive(Deserialize)]
struct NaSource {
    name: Option<String>,
}

fn parse_datetime(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}

fn into_article(raw: NaArticle) -> Article {
    Article {
        title: raw.title.unwrap_or_else(|| "(untitled)".to_string()),
        description: raw.description,
        image_url: raw.url_to_image,
        url: raw.url.unwrap_or_default(),
        source_name: raw.source.and_then(|s| s.name),
        published_at: raw.published_at.as_deref().and_then(parse_datetime),
    }
}

fn api_error(resp: &NaResponse) -> HarvestError {
    HarvestError::Api(format!(
        "{}: {}",
        resp.code.as_deref().unwrap_or("unknown"),
        resp.message.as_deref().unwrap_or("no message")
    ))
}

/// Turn a response body into a page, rejecting error envelopes.
fn parse_page(body: &str) -> Result<NewsPage> {
    let resp: NaResponse =
        serde_json::from_str(body).map_err(|e| HarvestError::Api(format!("bad response: {}", e)))?;

    if resp.status != "ok" {
        return Err(api_error(&resp));
    }

    Ok(NewsPage {
        total_results: resp.total_results,
        articles: resp.articles.into_iter().map(into_article).collect(),
    })
}

#[async_trait]
impl NewsSource for NewsApi {
    fn name(&self) -> &str {
        "News API"
    }

    async fn fetch_page(&self, page: u32) -> Result<NewsPage> {
        debug!(page, endpoint = %self.endpoint, "fetching news page");

        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&self.query_params(page));
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Error envelopes carry a useful code/message; fall back to the status.
            return Err(match serde_json::from_str::<NaResponse>(&body) {
                Ok(resp) => api_error(&resp),
                Err(_) => HarvestError::Api(format!("News API {}", status)),
            });
        }

        parse_page(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn parses_article_page() {
        let body = r#"{
            "status": "ok",
            "totalResults": 1432,
            "articles": [
                {
                    "source": {"id": null, "name": "The Hindu"},
                    "author": "Staff",
                    "title": "Government hikes MSP for rabi crops",
                    "description": "Wheat MSP raised by Rs 150 per quintal.",
                    "url": "https://example.com/msp",
                    "urlToImage": "https://example.com/msp.jpg",
                    "publishedAt": "2024-10-16T09:30:00Z",
                    "content": "..."
                },
                {
                    "source": {"id": null, "name": null},
                    "title": "Crop insurance claims rise",
                    "description": null,
                    "url": "https://example.com/claims",
                    "urlToImage": null,
                    "publishedAt": "not a date"
                }
            ]
        }"#;

        let page = parse_page(body).unwrap();
        assert_eq!(page.total_results, Some(1432));
        assert_eq!(page.articles.len(), 2);

        let first = &page.articles[0];
        assert_eq!(first.title, "Government hikes MSP for rabi crops");
        assert_eq!(first.source_name.as_deref(), Some("The Hindu"));
        assert_eq!(first.image_url.as_deref(), Some("https://example.com/msp.jpg"));
        assert!(first.published_at.is_some());

        let second = &page.articles[1];
        assert_eq!(second.description, None);
        assert_eq!(second.image_url, None);
        assert_eq!(second.source_name, None);
        assert_eq!(second.published_at, None);
    }

    #[test]
    fn empty_page_parses() {
        let page = parse_page(r#"{"status":"ok","totalResults":12,"articles":[]}"#).unwrap();
        assert!(page.articles.is_empty());
    }

    #[test]
    fn error_envelope_is_an_error() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let err = parse_page(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error: apiKeyInvalid: Your API key is invalid."
        );
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(matches!(parse_page("<html>"), Err(HarvestError::Api(_))));
    }

    #[test]
    fn query_uses_config_and_page() {
        let api = NewsApi::new(&NewsConfig::default(), None).unwrap();
        let params = api.query_params(3);
        assert!(params.contains(&("pageSize", "6".to_string())));
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("language", "en".to_string())));
        assert!(params
            .iter()
            .any(|(k, v)| *k == "q" && v.contains("crop insurance")));
    }

    #[test]
    fn page_size_stays_six_whatever_the_config_says() {
        let config = Config::parse("[news]\npage_size = 50\n").unwrap();
        let api = NewsApi::new(&config.news, None).unwrap();
        assert!(api.query_params(1).contains(&("pageSize", "6".to_string())));
    }

    #[test]
    fn debug_hides_key() {
        let api = NewsApi::new(&NewsConfig::default(), Some("secret".to_string())).unwrap();
        assert!(!format!("{:?}", api).contains("secret"));
    }
}
