//! Satellite orbital element ingestion, cataloguing and caching
pub mod astro;
pub mod clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formats;
pub mod repo;
pub mod services;
pub mod utils;

pub use crate::clients::{ElementsClient, FetchedPayload};
pub use crate::config::AppConfig;
pub use crate::domain::{Catalog, ElementRecord};
pub use crate::errors::{AstroError, ElementsError, ElementsResult};
pub use crate::formats::{parse_records, Format};
pub use crate::repo::ElementsStore;
pub use crate::services::{load_file, ElementsService};
