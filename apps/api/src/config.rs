use anyhow::{Context, Result};

const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_HH_API_URL: &str = "https://api.hh.ru/vacancies";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on adaptive follow-up questions per project stage.
    pub max_follow_ups: u32,
    pub hh_api_url: String,
    pub vacancy_page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_url: optional_env("OPENAI_API_URL", DEFAULT_COMPLETION_URL),
            llm_model: optional_env("LLM_MODEL", DEFAULT_MODEL),
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            max_follow_ups: optional_env("MAX_FOLLOW_UPS", "3")
                .parse::<u32>()
                .context("MAX_FOLLOW_UPS must be a non-negative integer")?,
            hh_api_url: optional_env("HH_API_URL", DEFAULT_HH_API_URL),
            vacancy_page_size: optional_env("VACANCY_PAGE_SIZE", "5")
                .parse::<u32>()
                .context("VACANCY_PAGE_SIZE must be a non-negative integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
