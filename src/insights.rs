//! Travel links and encyclopedia summary for a resolved location
//!
//! The map and video links are pure string building. The encyclopedia
//! summary needs two upstream calls and is best effort: any failure leaves
//! it out of the response.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::config::UpstreamConfig;
use crate::http::UpstreamHttp;
use crate::models::ResolvedLocation;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WikipediaSummary {
    pub title: String,
    pub extract: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationInsights {
    pub map_url: String,
    pub youtube_url: String,
    pub wikipedia: Option<WikipediaSummary>,
}

#[must_use]
pub fn map_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map=11/{latitude}/{longitude}"
    )
}

#[must_use]
pub fn youtube_url(name: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(&format!("{name} travel guide"))
    )
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InsightsClient {
    http: UpstreamHttp,
    api_url: String,
    rest_url: String,
}

impl InsightsClient {
    #[must_use]
    pub fn new(http: UpstreamHttp, config: &UpstreamConfig) -> Self {
        Self {
            http,
            api_url: config.wikipedia_api_url.trim_end_matches('/').to_string(),
            rest_url: config.wikipedia_rest_url.trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn build_insights(&self, location: &ResolvedLocation) -> LocationInsights {
        let wikipedia = match self.wikipedia_summary(&location.name).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Wikipedia lookup failed for {}: {}", location.name, e);
                None
            }
        };

        LocationInsights {
            map_url: map_url(location.latitude, location.longitude),
            youtube_url: youtube_url(&location.name),
            wikipedia,
        }
    }

    async fn wikipedia_summary(&self, name: &str) -> Result<Option<WikipediaSummary>> {
        let search_url = format!(
            "{}?action=query&list=search&srsearch={}&utf8=1&format=json",
            self.api_url,
            urlencoding::encode(name)
        );
        let search: SearchResponse = self.http.get_json(&search_url).await?;

        let Some(title) = search
            .query
            .and_then(|q| q.search.into_iter().next())
            .and_then(|hit| hit.title)
            .filter(|title| !title.is_empty())
        else {
            debug!("No Wikipedia article for {}", name);
            return Ok(None);
        };

        let encoded = urlencoding::encode(&title).into_owned();
        let summary: PageSummary = self
            .http
            .get_json(&format!("{}/page/summary/{}", self.rest_url, encoded))
            .await?;

        Ok(Some(WikipediaSummary {
            title: summary
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| title.clone()),
            extract: summary.extract.unwrap_or_default(),
            url: summary
                .content_urls
                .and_then(|c| c.desktop)
                .and_then(|d| d.page)
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| format!("https://en.wikipedia.org/wiki/{encoded}")),
        }))
    }
}
