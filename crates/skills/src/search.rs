//! Remote skill catalog search.

use std::time::Duration;

use {
    async_trait::async_trait,
    reqwest::Client,
    serde::{Deserialize, Serialize},
    skilldeck_config::CatalogConfig,
    tracing::debug,
    url::Url,
};

use crate::error::{Context, Error, Result};

/// One catalog search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub installs: u64,
    /// Source repository, usually `owner/repo`.
    #[serde(rename = "topSource")]
    pub source: String,
}

impl CatalogEntry {
    /// Catalog page for this entry.
    pub fn page_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.source,
            self.id
        )
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    skills: Vec<CatalogEntry>,
}

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<CatalogEntry>>;
}

/// HTTP client for the skills.sh search API.
pub struct SkillsShClient {
    client: Client,
    base_url: Url,
}

impl SkillsShClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid catalog URL '{base_url}'"))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skilldeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    fn search_url(&self, query: &str, limit: u32) -> Result<Url> {
        let mut url = self
            .base_url
            .join("api/search")
            .context("failed to build search URL")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl CatalogSearch for SkillsShClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<CatalogEntry>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.search_url(query, limit)?;
        debug!(url = %url, "searching skill catalog");

        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "catalog search returned HTTP {status}: {body}"
            )));
        }

        let parsed: SearchResponse = resp.json().await?;
        debug!(results = parsed.skills.len(), "catalog search finished");
        Ok(parsed.skills)
    }
}
