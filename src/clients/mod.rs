//! External element-set source clients
use crate::errors::{ElementsError, ElementsResult};
use crate::formats::Format;
use crate::utils::parse_http_date;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, DATE};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{info, warn};

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> ElementsResult<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Body and provenance of one successful GET
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub bytes: Vec<u8>,
    /// Parsed `Date` response header
    pub server_date: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
}

/// Fetches raw element payloads over HTTP
pub struct ElementsClient {
    http_client: HttpClient,
    timeout: Duration,
}

impl ElementsClient {
    pub fn new(user_agent: &str, timeout: Duration) -> ElementsResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(user_agent)?,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` with the client's timeout
    pub async fn fetch(&self, url: &str) -> ElementsResult<FetchedPayload> {
        self.fetch_with_timeout(url, self.timeout).await
    }

    /// GET `url`, giving up after `timeout`. Non-2xx statuses are errors.
    pub async fn fetch_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> ElementsResult<FetchedPayload> {
        let parsed = Url::parse(url).map_err(|_| ElementsError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ElementsError::InvalidUrl(url.to_string()));
        }
        info!(%url, "fetching elements");

        let request = async {
            let resp = self.http_client.get_client().get(parsed).send().await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(ElementsError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let server_date = server_date(resp.headers().get(DATE).and_then(|v| v.to_str().ok()));
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = resp.bytes().await?.to_vec();

            Ok::<_, ElementsError>(FetchedPayload {
                bytes,
                server_date,
                content_type,
            })
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ElementsError::Timeout {
                url: url.to_string(),
                after: timeout,
            }),
        }
    }
}

fn server_date(header: Option<&str>) -> Option<DateTime<Utc>> {
    let Some(raw) = header else {
        warn!("no HTTP 'Date' header");
        return None;
    };
    let parsed = parse_http_date(raw);
    if parsed.is_none() {
        warn!(header = %raw, "HTTP 'Date' header malformed");
    }
    parsed
}

/// Build a CelesTrak GP query URL for a named group
pub fn celestrak_url(base_url: &str, group: &str, format: Format) -> ElementsResult<String> {
    Url::parse_with_params(
        base_url,
        &[("GROUP", group), ("FORMAT", format.celestrak_code())],
    )
    .map(String::from)
    .map_err(|_| ElementsError::InvalidUrl(base_url.to_string()))
}
