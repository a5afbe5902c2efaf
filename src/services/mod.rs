//! Download and caching pipelines for element catalogs
use crate::clients::{celestrak_url, ElementsClient};
use crate::config::AppConfig;
use crate::domain::Catalog;
use crate::errors::{ElementsError, ElementsResult};
use crate::formats::Format;
use crate::repo::ElementsStore;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Fetches element payloads, turns them into catalogs and optionally caches them
pub struct ElementsService {
    client: ElementsClient,
    store: Option<ElementsStore>,
    celestrak_url: String,
}

impl ElementsService {
    pub fn new(client: ElementsClient, store: Option<ElementsStore>, celestrak_url: String) -> Self {
        Self {
            client,
            store,
            celestrak_url,
        }
    }

    pub fn from_config(config: &AppConfig, store: Option<ElementsStore>) -> ElementsResult<Self> {
        let client = ElementsClient::new(&config.user_agent, config.fetch_timeout)?;
        Ok(Self::new(client, store, config.celestrak_url.clone()))
    }

    pub fn store(&self) -> Option<&ElementsStore> {
        self.store.as_ref()
    }

    /// Download `url`, parse it as `format` and return a new catalog named `name`.
    ///
    /// The catalog is dated with the server's `Date` header, or now when the
    /// server sends none. When a store is attached the catalog is cached
    /// under `name`; a failed cache write is logged and does not fail the
    /// download.
    pub async fn download(&self, url: &str, format: Format, name: &str) -> ElementsResult<Catalog> {
        info!(%url, %format, %name, "downloading catalog");
        let payload = self.client.fetch(url).await?;
        let as_of = payload.server_date.unwrap_or_else(Utc::now);

        let catalog = Catalog::from_payload(&payload.bytes, format, name, as_of)?;
        self.cache(&catalog, name);
        Ok(catalog)
    }

    /// Query CelesTrak for a named group.
    ///
    /// The response `Content-Type` picks the parser when it names a known
    /// format, otherwise the requested format is assumed. The catalog is
    /// named `<group>.<extension>`.
    pub async fn fetch_celestrak(&self, group: &str, format: Format) -> ElementsResult<Catalog> {
        let url = celestrak_url(&self.celestrak_url, group, format)?;
        let payload = self.client.fetch(&url).await?;

        let served = payload
            .content_type
            .as_deref()
            .and_then(Format::from_content_type)
            .unwrap_or(format);
        if served != format {
            warn!(requested = %format, %served, "CelesTrak answered in another format");
        }

        let name = format!("{group}.{}", served.extension());
        let as_of = payload.server_date.unwrap_or_else(Utc::now);
        let catalog = Catalog::from_payload(&payload.bytes, served, &name, as_of)?;
        self.cache(&catalog, &name);
        Ok(catalog)
    }

    /// Return the cached catalog `name` if it is younger than `max_age_days`,
    /// otherwise download it again
    pub async fn load_or_download(
        &self,
        url: &str,
        format: Format,
        name: &str,
        max_age_days: f64,
    ) -> ElementsResult<Catalog> {
        if let Some(store) = &self.store {
            match store.age(name) {
                Ok(Some(age)) if age < max_age_days => {
                    if let Some(catalog) = store.extract(name) {
                        info!(%name, age_days = age, "using cached catalog");
                        return Ok(catalog);
                    }
                }
                Ok(Some(age)) => info!(%name, age_days = age, "cached catalog is stale"),
                Ok(None) => info!(%name, "no cached catalog"),
                Err(e) => warn!(%name, error = %e, "ignoring cached catalog"),
            }
        }
        self.download(url, format, name).await
    }

    fn cache(&self, catalog: &Catalog, name: &str) {
        if let Some(store) = &self.store {
            if let Err(e) = store.insert(catalog, name, catalog.as_of()) {
                warn!(%name, error = %e, "could not cache catalog");
            }
        }
    }
}

/// Read a local element file. The catalog is dated with the file's
/// modification time.
pub fn load_file(path: &Path, format: Format, name: &str) -> ElementsResult<Catalog> {
    let read_error = |source| ElementsError::ReadFile {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(read_error)?;
    let as_of = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Catalog::from_payload(&bytes, format, name, as_of)
}
