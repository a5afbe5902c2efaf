//! Command line entry point: fetch, parse and cache element sets
use anyhow::Context;
use clap::{Parser, Subcommand};
use sat_elements::{load_file, AppConfig, Catalog, ElementsService, ElementsStore, Format};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Parser)]
#[command(name = "sat-elements", version, about = "Fetch and cache satellite orbital elements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download elements from a URL, reusing the cached copy while it is fresh
    Download {
        url: String,
        /// Store entry name
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "tle")]
        format: Format,
        /// Always download, even if the cached copy is fresh
        #[arg(long)]
        force: bool,
    },
    /// Query a CelesTrak group such as "visual" or "stations"
    Celestrak {
        group: String,
        #[arg(short, long, default_value = "json")]
        format: Format,
    },
    /// Parse a local element file
    ParseFile {
        path: PathBuf,
        #[arg(short, long, default_value = "tle")]
        format: Format,
        /// Also cache the catalog under this name
        #[arg(long)]
        store_as: Option<String>,
    },
    /// Print a cached catalog, or one record of it
    Show {
        name: String,
        #[arg(long)]
        norad: Option<u32>,
    },
    /// List cached entries
    Entries,
    /// Age of a cached entry in days
    Age { name: String },
    /// Remove one cached entry
    Delete { name: String },
    /// Remove every cached entry, or the whole store with --store
    Purge {
        #[arg(long)]
        store: bool,
    },
    /// Refresh a CelesTrak group periodically
    Watch {
        group: String,
        #[arg(short, long, default_value = "json")]
        format: Format,
        /// Minutes between refreshes, at most one week
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES))]
        interval_minutes: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let store = match &config.cache_dir {
        Some(dir) => ElementsStore::open(&config.store_name, dir),
        None => ElementsStore::open_default(&config.store_name),
    }
    .context("cannot open the element store")?;
    info!(directory = %store.directory().display(), "element store ready");

    match cli.command {
        Command::Download {
            url,
            name,
            format,
            force,
        } => {
            let service = ElementsService::from_config(&config, Some(store))?;
            let catalog = if force {
                service.download(&url, format, &name).await?
            } else {
                service
                    .load_or_download(&url, format, &name, config.max_age_days)
                    .await?
            };
            println!("{}", catalog.describe());
        }
        Command::Celestrak { group, format } => {
            let service = ElementsService::from_config(&config, Some(store))?;
            let catalog = service.fetch_celestrak(&group, format).await?;
            println!("{}", catalog.describe());
        }
        Command::ParseFile {
            path,
            format,
            store_as,
        } => {
            let name = store_as.clone().unwrap_or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format.to_string())
            });
            let catalog = load_file(&path, format, &name)
                .with_context(|| format!("cannot parse {}", path.display()))?;
            if let Some(entry) = store_as {
                store.insert(&catalog, &entry, catalog.as_of())?;
            }
            print_catalog(&catalog);
        }
        Command::Show { name, norad } => {
            let catalog = store
                .extract(&name)
                .with_context(|| format!("no readable entry {name:?} in the store"))?;
            match norad {
                Some(id) => {
                    let record = catalog
                        .lookup(id)
                        .with_context(|| format!("NORAD {id} is not in {name:?}"))?;
                    println!("{}", serde_json::to_string_pretty(record)?);
                }
                None => print_catalog(&catalog),
            }
        }
        Command::Entries => {
            for entry in store.entries()? {
                println!("{entry}");
            }
        }
        Command::Age { name } => match store.age(&name)? {
            Some(days) => println!("{days:.3}"),
            None => anyhow::bail!("no entry {name:?} in the store"),
        },
        Command::Delete { name } => store.delete(&name)?,
        Command::Purge { store: whole } => {
            if whole {
                store.delete_store()?;
                info!("store removed");
            } else {
                let removed = store.delete_all()?;
                info!(removed, "store emptied");
            }
        }
        Command::Watch {
            group,
            format,
            interval_minutes,
        } => {
            let service = ElementsService::from_config(&config, Some(store))?;
            let interval = refresh_interval(interval_minutes);
            info!(
                "Starting CelesTrak refresh for {group} (interval: {}s)",
                interval.as_secs()
            );
            loop {
                match service.fetch_celestrak(&group, format).await {
                    Ok(catalog) => info!(count = catalog.len(), "refreshed {}", catalog.name()),
                    Err(e) if e.is_retryable() => error!("CelesTrak refresh failed, will retry: {e}"),
                    Err(e) => return Err(e.into()),
                }
                tokio::time::sleep(interval).await;
            }
        }
    }

    Ok(())
}

fn refresh_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.clamp(1, MAX_INTERVAL_MINUTES).saturating_mul(60))
}

fn print_catalog(catalog: &Catalog) {
    println!("{}", catalog.describe());
    for id in catalog.norad_ids() {
        if let Some(record) = catalog.lookup(id) {
            println!("{}", record.describe());
        }
    }
}
