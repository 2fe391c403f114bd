use std::time::Duration;

use url::Url;

use crate::domain::{DigestRequest, Source};
use crate::errors::{DigestError, DigestResult};

pub const TASK_NAME: &str = "google_news_stablecoin_daily_digest";

pub const DEFAULT_RSS_URL_KR: &str = "https://news.google.com/rss/search?q=intitle:%22%EC%8A%A4%ED%85%8C%EC%9D%B4%EB%B8%94%EC%BD%94%EC%9D%B8%22&hl=ko&gl=KR&ceid=KR:ko";
pub const DEFAULT_RSS_URL_US: &str =
    "https://news.google.com/rss/search?q=intitle:stablecoin&hl=en-US&gl=US&ceid=US:en";

pub const KEYWORD_KR: &str = "스테이블코인";
pub const KEYWORD_US: &str = "stablecoin";

pub const DEFAULT_HOURS_BACK: i64 = 24;
pub const DEFAULT_MAX_ITEMS: i64 = 100;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// Pipeline settings: feed locations, window, cap, timeout
#[derive(Debug, Clone)]
pub struct Config {
    pub rss_url_kr: String,
    pub rss_url_us: String,
    pub hours_back: i64,
    pub max_items: i64,
    pub fetch_timeout: Duration,
}

/// Dispatcher settings, only needed when mail is actually sent
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub to_email: String,
    pub from_email: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Client id and secret for the authorize flow
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Get the directory where the executable is located
fn exe_dir() -> Option<std::path::PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
}

/// Load `.env` from the executable's directory, then the current directory
pub fn load_dotenv() {
    if let Some(dir) = exe_dir() {
        let env_path = dir.join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path).ok();
        }
    }
    dotenvy::dotenv().ok();
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Empty values count as unset
fn lookup<F>(vars: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    vars(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(vars: &F, name: &str) -> DigestResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(vars, name).ok_or_else(|| DigestError::MissingEnvVar(name.to_string()))
}

fn integer<F>(vars: &F, name: &str, default: i64) -> DigestResult<i64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(vars, name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| DigestError::Config(format!("{} must be an integer, got '{}'", name, raw))),
        None => Ok(default),
    }
}

fn feed_url<F>(vars: &F, name: &str, default: &str) -> DigestResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup(vars, name).unwrap_or_else(|| default.to_string());
    Url::parse(&url).map_err(|e| DigestError::InvalidUrl(format!("{}: {}", name, e)))?;
    Ok(url)
}

impl Config {
    pub fn from_env() -> DigestResult<Self> {
        load_dotenv();
        Self::from_vars(process_env)
    }

    pub fn from_vars<F>(vars: F) -> DigestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(task_name) = lookup(&vars, "TASK_NAME") {
            if task_name != TASK_NAME {
                return Err(DigestError::Config(format!(
                    "TASK_NAME must be '{}'",
                    TASK_NAME
                )));
            }
        }

        let hours_back = integer(&vars, "HOURS_BACK", DEFAULT_HOURS_BACK)?;
        if hours_back < 0 {
            return Err(DigestError::Config(
                "HOURS_BACK must not be negative".to_string(),
            ));
        }

        let timeout_secs = integer(
            &vars,
            "FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS as i64,
        )?;
        if timeout_secs <= 0 {
            return Err(DigestError::Config(
                "FETCH_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        Ok(Self {
            rss_url_kr: feed_url(&vars, "RSS_URL_KR", DEFAULT_RSS_URL_KR)?,
            rss_url_us: feed_url(&vars, "RSS_URL_US", DEFAULT_RSS_URL_US)?,
            hours_back,
            max_items: integer(&vars, "MAX_ITEMS", DEFAULT_MAX_ITEMS)?,
            fetch_timeout: Duration::from_secs(timeout_secs as u64),
        })
    }

    /// Configured feeds, KR first
    pub fn sources(&self) -> Vec<(Source, String)> {
        vec![
            (Source::Kr, self.rss_url_kr.clone()),
            (Source::Us, self.rss_url_us.clone()),
        ]
    }

    /// One digest request per keyword
    pub fn requests(&self) -> Vec<DigestRequest> {
        vec![
            DigestRequest::new(Source::Kr.as_str(), KEYWORD_KR)
                .with_lookback_hours(self.hours_back)
                .with_max_items(self.max_items),
            DigestRequest::new(Source::Us.as_str(), KEYWORD_US)
                .with_lookback_hours(self.hours_back)
                .with_max_items(self.max_items),
        ]
    }
}

impl MailConfig {
    pub fn from_env() -> DigestResult<Self> {
        load_dotenv();
        Self::from_vars(process_env)
    }

    pub fn from_vars<F>(vars: F) -> DigestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            to_email: required(&vars, "TO_EMAIL")?,
            from_email: required(&vars, "FROM_EMAIL")?,
            client_id: required(&vars, "GOOGLE_CLIENT_ID")?,
            client_secret: required(&vars, "GOOGLE_CLIENT_SECRET")?,
            refresh_token: required(&vars, "GOOGLE_REFRESH_TOKEN")?,
        })
    }

    pub fn credentials(&self) -> gmail::Credentials {
        gmail::Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

impl OAuthClientConfig {
    pub fn from_env() -> DigestResult<Self> {
        load_dotenv();
        Self::from_vars(process_env)
    }

    pub fn from_vars<F>(vars: F) -> DigestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&vars, "GOOGLE_CLIENT_ID")?,
            client_secret: required(&vars, "GOOGLE_CLIENT_SECRET")?,
        })
    }
}
