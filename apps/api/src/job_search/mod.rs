//! Job Search: vacancy lookup against the hh.ru public API.
//!
//! The dialogue only depends on the `JobSearch` trait; `HhJobSearch` is the
//! production implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const SNIPPET_LIMIT: usize = 200;
const USER_AGENT: &str = concat!("offer-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vacancy API returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Vacancy {
    pub id: String,
    pub name: String,
    pub salary: Option<Salary>,
    pub employer: Option<Named>,
    pub area: Option<Named>,
    pub schedule: Option<Named>,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Salary {
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Snippet {
    pub requirement: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Vacancy>,
}

#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Vacancy>, SearchError>;
}

/// hh.ru vacancy search, one page per query.
#[derive(Clone)]
pub struct HhJobSearch {
    client: Client,
    api_url: String,
    page_size: u32,
}

impl HhJobSearch {
    pub fn new(api_url: String, page_size: u32) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .user_agent(USER_AGENT)
                .build()?,
            api_url,
            page_size,
        })
    }
}

#[async_trait]
impl JobSearch for HhJobSearch {
    async fn search(&self, query: &str) -> Result<Vec<Vacancy>, SearchError> {
        debug!("Searching vacancies for {query:?}");
        let per_page = self.page_size.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("text", query), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        let mut items = body.items;
        items.truncate(self.page_size as usize);
        info!("Vacancy search for {query:?} returned {} items", items.len());
        Ok(items)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Presentation
// ────────────────────────────────────────────────────────────────────────────

fn salary_text(salary: Option<&Salary>) -> String {
    let Some(salary) = salary else {
        return "Salary not specified".to_string();
    };
    let currency = salary.currency.as_deref().unwrap_or("");
    let range = match (salary.from, salary.to) {
        (Some(from), Some(to)) => format!("from {from} to {to}"),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("up to {to}"),
        (None, None) => return "Salary not specified".to_string(),
    };
    format!("{range} {currency}").trim_end().to_string()
}

fn truncate_snippet(text: &str) -> String {
    if text.chars().count() > SNIPPET_LIMIT {
        let head: String = text.chars().take(SNIPPET_LIMIT).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// One vacancy rendered as a standalone chat message.
pub fn format_vacancy(vacancy: &Vacancy) -> String {
    let name_or = |field: &Option<Named>, fallback: &str| {
        field
            .as_ref()
            .map(|n| n.name.clone())
            .unwrap_or_else(|| fallback.to_string())
    };
    let requirement = vacancy
        .snippet
        .as_ref()
        .and_then(|s| s.requirement.as_deref())
        .map(truncate_snippet)
        .unwrap_or_default();

    format!(
        "🔹 {}\n💰 {}\n🏢 {}\n📍 {}\n💼 {}\n\n📝 {}\n\n🔗 https://hh.ru/vacancy/{}",
        vacancy.name,
        salary_text(vacancy.salary.as_ref()),
        name_or(&vacancy.employer, "Company not specified"),
        name_or(&vacancy.area, "City not specified"),
        name_or(&vacancy.schedule, "Work format not specified"),
        requirement,
        vacancy.id,
    )
}
