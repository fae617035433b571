//! SerpAPI Google Scholar search client.
//!
//! Issues paged queries against the provider for two channels: the general
//! scholarly index and an arXiv-restricted variant. Each fetched item is
//! normalized and filtered inline; failures are contained per page.

use crate::error::{PipelineError, Result};
use crate::record::{self, PaperRecord, RawItem, Source};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default SerpAPI endpoint
pub const DEFAULT_API_URL: &str = "https://serpapi.com/search";

/// Fixed page size used by the provider
const PAGE_SIZE: u32 = 10;

/// Courtesy delay between page requests
const PAGE_DELAY: Duration = Duration::from_secs(2);

/// Search response document. A missing `organic_results` field signals
/// end-of-results, not an error.
///
/// Items are kept as raw JSON here so that one malformed item cannot fail
/// the whole page; each is parsed individually in the page loop.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    organic_results: Option<Vec<serde_json::Value>>,
}

/// Paged search client for the SerpAPI Google Scholar engine.
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    min_year: i32,
    min_citations: u32,
}

impl SearchClient {
    /// Create a client against the default endpoint.
    pub fn new(api_key: String, min_year: i32, min_citations: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: DEFAULT_API_URL.to_string(),
            api_key,
            min_year,
            min_citations,
        })
    }

    /// Override the provider endpoint (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run a paged query on one channel.
    ///
    /// Fetches up to `max_pages` pages, stopping early when a page has no
    /// results container. A network or parse failure aborts paging for this
    /// query only and returns whatever was accumulated so far. Records are
    /// filtered against the year and citation thresholds as they arrive.
    pub async fn search(&self, query: &str, max_pages: u32, category: Source) -> Vec<PaperRecord> {
        let q = match category {
            Source::Scholar => query.to_string(),
            Source::Arxiv => format!("{} source:arxiv", query),
        };

        info!(query = %q, pages = max_pages, category = %category, "Starting search");

        let mut papers = Vec::new();

        for page in 0..max_pages {
            if page > 0 {
                tokio::time::sleep(PAGE_DELAY).await;
            }

            let url = match self.build_search_url(&q, page * PAGE_SIZE) {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "Failed to build search URL");
                    break;
                }
            };

            debug!(page = page + 1, url = %url, "Fetching page");

            match self.fetch_page(&url).await {
                Ok(response) => {
                    let Some(items) = response.organic_results else {
                        debug!(page = page + 1, "No results container, stopping");
                        break;
                    };
                    for raw in items {
                        let item = match serde_json::from_value::<RawItem>(raw) {
                            Ok(item) => item,
                            Err(e) => {
                                warn!(error = %e, "Skipping malformed result item");
                                continue;
                            }
                        };
                        let record = record::normalize(&item, category);
                        if record.passes(self.min_year, self.min_citations) {
                            papers.push(record);
                        }
                    }
                    info!(page = page + 1, total = papers.len(), "Parsed page");
                }
                Err(e) => {
                    warn!(page = page + 1, error = %e, "Page fetch failed, stopping query");
                    break;
                }
            }
        }

        info!(total = papers.len(), "Query complete");
        papers
    }

    fn build_search_url(&self, query: &str, start: u32) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PipelineError::Config(format!("Invalid base URL: {}", e)))?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("engine", "google_scholar");
            params.append_pair("q", query);
            params.append_pair("hl", "en");
            params.append_pair("start", &start.to_string());
            params.append_pair("num", &PAGE_SIZE.to_string());
            params.append_pair("as_ylo", &self.min_year.to_string());
            params.append_pair("api_key", &self.api_key);
        }

        Ok(url)
    }

    async fn fetch_page(&self, url: &Url) -> Result<SearchResponse> {
        let response = self.http.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Api {
                code: status.as_u16() as i32,
                message: format!("HTTP error: {}", status),
            });
        }

        Ok(response.json::<SearchResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> SearchClient {
        SearchClient::new("test-key".to_string(), 2018, 10)
            .expect("client")
            .with_base_url(base_url)
    }

    fn item(title: &str, citations: u32, summary: &str) -> serde_json::Value {
        json!({
            "title": title,
            "link": format!("https://example.com/{}", title),
            "snippet": "snippet",
            "inline_links": {"cited_by": {"total": citations}},
            "publication_info": {"summary": summary}
        })
    }

    #[test]
    fn test_build_search_url() {
        let c = client(DEFAULT_API_URL);
        let url = c.build_search_url("machine learning", 20).expect("url");
        assert!(url.as_str().contains("engine=google_scholar"));
        assert!(url.as_str().contains("q=machine+learning"));
        assert!(url.as_str().contains("start=20"));
        assert!(url.as_str().contains("num=10"));
        assert!(url.as_str().contains("as_ylo=2018"));
        assert!(url.as_str().contains("api_key=test-key"));
    }

    #[tokio::test]
    async fn test_stops_when_results_container_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    item("Paper A", 50, "J Smith - Nature, 2021 - publisher"),
                    item("Paper B", 3, "A Lee - Science, 2022 - publisher"),
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let results = client(&server.uri()).search("test", 5, Source::Scholar).await;

        // Paper B fails the citation threshold; paging stops at page 2.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Paper A");
        assert_eq!(results[0].citations, 50);
    }

    #[tokio::test]
    async fn test_malformed_item_skipped_siblings_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    {"title": 123},
                    item("Paper A", 50, "J Smith - Nature, 2021 - publisher"),
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let results = client(&server.uri()).search("test", 2, Source::Scholar).await;

        // The unparseable item is dropped; its sibling survives.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Paper A");
    }

    #[tokio::test]
    async fn test_page_failure_returns_accumulated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [item("Paper A", 50, "J Smith - Nature, 2021")]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let results = client(&server.uri()).search("test", 3, Source::Scholar).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_arxiv_query_augmented() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "photon cloud source:arxiv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [{
                    "title": "Paper X",
                    "link": "https://arxiv.org/abs/2101.00001",
                    "inline_links": {"cited_by": {"total": 99}},
                    "publication_info": {"summary": "B Chen - 2022"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client(&server.uri())
            .search("photon cloud", 1, Source::Arxiv)
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pdf_link, "https://arxiv.org/pdf/2101.00001.pdf");
        assert_eq!(results[0].venue, "arXiv");
    }
}
