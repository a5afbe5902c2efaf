//! Application configuration module
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORE_NAME: &str = "sat_elements";
pub const DEFAULT_CELESTRAK_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store_name: String,
    /// Overrides the platform cache directory when set
    pub cache_dir: Option<PathBuf>,
    pub celestrak_url: String,
    pub user_agent: String,
    pub fetch_timeout: Duration,
    /// Entries older than this are downloaded again
    pub max_age_days: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            cache_dir: None,
            celestrak_url: DEFAULT_CELESTRAK_URL.to_string(),
            user_agent: format!("sat-elements/{}", env!("CARGO_PKG_VERSION")),
            fetch_timeout: Duration::from_secs(30),
            max_age_days: 1.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let store_name = env::var("ELEMENTS_STORE_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.store_name);

        let cache_dir = env::var("ELEMENTS_CACHE_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let celestrak_url = env::var("CELESTRAK_URL").unwrap_or(defaults.celestrak_url);
        let user_agent = env::var("HTTP_USER_AGENT").unwrap_or(defaults.user_agent);

        let fetch_timeout = Duration::from_secs(env_u64("FETCH_TIMEOUT_SECONDS", 30));
        let max_age_days = env_f64("ELEMENTS_MAX_AGE_DAYS", defaults.max_age_days);

        if max_age_days < 0.0 {
            anyhow::bail!("ELEMENTS_MAX_AGE_DAYS must not be negative, got {max_age_days}");
        }

        Ok(Self {
            store_name,
            cache_dir,
            celestrak_url,
            user_agent,
            fetch_timeout,
            max_age_days,
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
