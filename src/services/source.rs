use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::config::SourceSettings;
use crate::models::{Criteria, Listing};

/// Errors that can occur while fetching from the listing feed
///
/// These never leave the source: a failed query is logged and contributes
/// no listings.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Feed returned error: {0}")]
    ApiError(String),
}

/// Supplier of raw listings for one cycle
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch listings for the criteria
    ///
    /// Transport and parsing failures are logged and yield an empty (or
    /// partial) result instead of an error.
    async fn fetch(&self, criteria: &Criteria) -> Vec<Listing>;
}

/// Number of skills appended to each keyword query
const QUERY_SKILLS: usize = 4;
/// Number of skills searched when only skills are configured
const SKILLS_ONLY_QUERY_SKILLS: usize = 6;

/// Build search queries combining keywords, skills and companies
///
/// - each keyword followed by the first few skills
/// - each company prefixed by the first keyword
/// - skills alone when nothing else is configured
pub fn build_search_queries(keywords: &[String], skills: &[String], companies: &[String]) -> Vec<String> {
    let mut queries = Vec::new();
    let top_skills = skills.iter().take(QUERY_SKILLS).cloned().collect::<Vec<_>>().join(" ");
    let primary_keyword = keywords.first();

    for keyword in keywords {
        if top_skills.is_empty() {
            queries.push(keyword.clone());
        } else {
            queries.push(format!("{} {}", keyword, top_skills));
        }
    }

    for company in companies {
        match primary_keyword {
            Some(keyword) => queries.push(format!("{} {}", keyword, company)),
            None => queries.push(company.clone()),
        }
    }

    if keywords.is_empty() && companies.is_empty() && !skills.is_empty() {
        queries.push(
            skills
                .iter()
                .take(SKILLS_ONLY_QUERY_SKILLS)
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
        );
    }

    queries
}

/// Map a configured job type to the feed's job type filter
fn feed_job_type(job_type: &str) -> Option<&'static str> {
    match job_type.to_lowercase().as_str() {
        "full-time" => Some("fulltime"),
        "part-time" => Some("parttime"),
        "contract" => Some("contract"),
        "internship" => Some("internship"),
        _ => None,
    }
}

/// One row as returned by the feed
#[derive(Debug, Default, Deserialize)]
struct FeedRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    job_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    job_level: Option<String>,
    #[serde(default)]
    job_type: Option<String>,
    #[serde(default)]
    date_posted: Option<String>,
}

impl FeedRow {
    /// Convert to a listing, dropping rows without any usable identifier
    fn into_listing(self) -> Option<Listing> {
        let url = self.job_url.unwrap_or_default();
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| url.clone());

        if id.is_empty() {
            return None;
        }

        Some(Listing {
            id,
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            url,
            description: self.description.unwrap_or_default(),
            experience_level: self.job_level.unwrap_or_default(),
            job_type: self.job_type.unwrap_or_default(),
            posted_date: self.date_posted.unwrap_or_default(),
        })
    }
}

/// Feeds answer either with a bare array or with `{"jobs": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    Rows(Vec<FeedRow>),
    Wrapped { jobs: Vec<FeedRow> },
}

impl FeedPayload {
    fn into_rows(self) -> Vec<FeedRow> {
        match self {
            FeedPayload::Rows(rows) => rows,
            FeedPayload::Wrapped { jobs } => jobs,
        }
    }
}

/// Listing source backed by a JSON job search endpoint
pub struct HttpListingSource {
    endpoint: String,
    results_wanted: u32,
    hours_old: u32,
    client: Client,
}

impl HttpListingSource {
    /// Create a new feed client
    pub fn new(settings: &SourceSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            results_wanted: settings.results_wanted,
            hours_old: settings.hours_old,
            client,
        })
    }

    fn query_url(&self, query: &str, criteria: &Criteria) -> String {
        let mut params: Vec<(&str, String)> = vec![
            ("search_term", query.to_string()),
            ("location", criteria.target_location().unwrap_or_default().to_string()),
            ("results_wanted", self.results_wanted.to_string()),
            ("hours_old", self.hours_old.to_string()),
        ];

        if let Some(job_type) = criteria.target_job_type() {
            if let Some(mapped) = feed_job_type(job_type) {
                params.push(("job_type", mapped.to_string()));
            }
            if job_type.eq_ignore_ascii_case("remote") {
                params.push(("is_remote", "true".to_string()));
            }
        }

        let query_string = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.endpoint, query_string)
    }

    /// Run a single search query
    async fn fetch_query(&self, query: &str, criteria: &Criteria) -> Result<Vec<Listing>, SourceError> {
        let url = self.query_url(query, criteria);
        tracing::debug!("Fetching listings from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::ApiError(format!(
                "Failed to fetch listings: {}",
                response.status()
            )));
        }

        let payload: FeedPayload = response.json().await?;

        Ok(payload
            .into_rows()
            .into_iter()
            .filter_map(FeedRow::into_listing)
            .collect())
    }
}

#[async_trait::async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, criteria: &Criteria) -> Vec<Listing> {
        let queries = build_search_queries(&criteria.keywords, &criteria.skills, &criteria.companies);
        tracing::info!("Built {} combined search queries", queries.len());

        let mut seen_ids = HashSet::new();
        let mut listings = Vec::new();

        for query in &queries {
            match self.fetch_query(query, criteria).await {
                Ok(found) if found.is_empty() => {
                    tracing::info!("No results for query '{}'", query);
                }
                Ok(found) => {
                    tracing::info!("Found {} jobs for query '{}'", found.len(), query);
                    for listing in found {
                        if seen_ids.insert(listing.id.clone()) {
                            listings.push(listing);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Scrape failed for query '{}': {}", query, e);
                }
            }
        }

        tracing::info!("Fetched {} unique jobs total", listings.len());
        listings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn create_source(endpoint: String) -> HttpListingSource {
        HttpListingSource::new(&SourceSettings {
            endpoint,
            results_wanted: 25,
            hours_old: 24,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_queries_keywords_with_top_skills() {
        let queries = build_search_queries(
            &strings(&["Java developer", "Backend engineer"]),
            &strings(&["Spring Boot", "REST API", "SQL", "Kafka", "Docker"]),
            &[],
        );
        assert_eq!(
            queries,
            vec![
                "Java developer Spring Boot REST API SQL Kafka",
                "Backend engineer Spring Boot REST API SQL Kafka",
            ]
        );
    }

    #[test]
    fn test_queries_companies_use_primary_keyword() {
        let queries = build_search_queries(&strings(&["Java developer"]), &[], &strings(&["Google"]));
        assert_eq!(queries, vec!["Java developer", "Java developer Google"]);

        let queries = build_search_queries(&[], &[], &strings(&["Google"]));
        assert_eq!(queries, vec!["Google"]);
    }

    #[test]
    fn test_queries_skills_only() {
        let queries = build_search_queries(
            &[],
            &strings(&["a", "b", "c", "d", "e", "f", "g"]),
            &[],
        );
        assert_eq!(queries, vec!["a b c d e f"]);
    }

    #[test]
    fn test_feed_job_type_mapping() {
        assert_eq!(feed_job_type("Full-time"), Some("fulltime"));
        assert_eq!(feed_job_type("part-time"), Some("parttime"));
        assert_eq!(feed_job_type("remote"), None);
    }

    #[test]
    fn test_row_without_id_falls_back_to_url() {
        let row = FeedRow {
            job_url: Some("https://example.com/jobs/9".to_string()),
            title: Some("Engineer".to_string()),
            ..Default::default()
        };
        let listing = row.into_listing().unwrap();
        assert_eq!(listing.id, "https://example.com/jobs/9");
        assert_eq!(listing.description, "");

        assert!(FeedRow::default().into_listing().is_none());
    }

    #[tokio::test]
    async fn test_fetch_deduplicates_across_queries() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"[
            {"id": "li-1", "title": "Rust Engineer", "company": "Acme", "job_url": "https://example.com/1", "job_level": "mid-senior level"},
            {"id": "li-2", "title": "Backend Engineer", "company": "Globex", "job_url": "https://example.com/2"}
        ]"#;

        let mock = server
            .mock("GET", "/jobs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(2)
            .create_async()
            .await;

        let source = create_source(format!("{}/jobs", server.url()));
        let criteria = Criteria {
            keywords: strings(&["rust", "backend"]),
            ..Default::default()
        };

        let listings = source.fetch(&criteria).await;

        mock.assert_async().await;
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, "li-1");
        assert_eq!(listings[0].experience_level, "mid-senior level");
    }

    #[tokio::test]
    async fn test_fetch_sends_search_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jobs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search_term".into(), "rust engineer Tokio".into()),
                Matcher::UrlEncoded("location".into(), "Berlin".into()),
                Matcher::UrlEncoded("job_type".into(), "fulltime".into()),
                Matcher::UrlEncoded("hours_old".into(), "24".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"jobs": [{"id": "li-7", "title": "Rust Engineer"}]}"#)
            .create_async()
            .await;

        let source = create_source(format!("{}/jobs", server.url()));
        let criteria = Criteria {
            keywords: strings(&["rust engineer"]),
            skills: strings(&["Tokio"]),
            location: Some("Berlin".to_string()),
            job_type: Some("full-time".to_string()),
            ..Default::default()
        };

        let listings = source.fetch(&criteria).await;

        mock.assert_async().await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "li-7");
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jobs")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let source = create_source(format!("{}/jobs", server.url()));
        let criteria = Criteria {
            keywords: strings(&["rust"]),
            ..Default::default()
        };

        assert!(source.fetch(&criteria).await.is_empty());
    }
}
