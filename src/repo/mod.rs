//! File-backed store for element catalogs
use crate::domain::Catalog;
use crate::errors::{ElementsError, ElementsResult};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Modification date reported for entries that do not exist
pub fn distant_past() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// A directory of JSON-encoded [`Catalog`]s, one file per lower-cased name.
///
/// Each file's modification time carries the as-of date of the data it
/// holds, not the time it was written, so [`ElementsStore::age`] reports how
/// old the elements are. Writes go through a temporary file and a rename, so
/// an entry is replaced whole or not at all. Concurrent writers to the same
/// entry are not coordinated: the last rename wins.
#[derive(Debug, Clone)]
pub struct ElementsStore {
    store_name: String,
    directory: PathBuf,
}

impl ElementsStore {
    /// Open `base_dir/store_name`, creating it and any parents if missing
    pub fn open(store_name: &str, base_dir: impl AsRef<Path>) -> ElementsResult<Self> {
        let directory = base_dir.as_ref().join(store_name);
        fs::create_dir_all(&directory).map_err(|e| ElementsError::store_io(&directory, e))?;
        info!(path = %directory.display(), "elements store opened");

        Ok(Self {
            store_name: store_name.to_string(),
            directory,
        })
    }

    /// Open the store inside the platform cache directory
    /// (`~/.cache` on Linux, `~/Library/Caches` on macOS)
    pub fn open_default(store_name: &str) -> ElementsResult<Self> {
        let base_dirs = directories::BaseDirs::new().ok_or(ElementsError::NoCacheDir)?;
        Self::open(store_name, base_dirs.cache_dir())
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, name: &str) -> ElementsResult<PathBuf> {
        let key = name.trim().to_lowercase();
        if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
            return Err(ElementsError::InvalidEntryName(name.to_string()));
        }
        Ok(self.directory.join(key))
    }

    /// Write `catalog` under `name` and date the entry `as_of`.
    ///
    /// On failure the previous entry, if any, is left as it was.
    pub fn insert(&self, catalog: &Catalog, name: &str, as_of: DateTime<Utc>) -> ElementsResult<()> {
        let path = self.entry_path(name)?;
        let bytes = serde_json::to_vec(catalog)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self.directory.join(format!(".{file_name}.tmp"));

        let written = write_dated(&temp_path, &bytes, as_of)
            .and_then(|_| fs::rename(&temp_path, &path).map_err(|e| ElementsError::store_io(&path, e)));

        if let Err(e) = written {
            warn!(entry = %file_name, error = %e, "store insert failed");
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        debug!(entry = %file_name, %as_of, records = catalog.len(), "store entry written");
        Ok(())
    }

    /// Read the entry `name`; missing or unreadable entries yield `None`
    pub fn extract(&self, name: &str) -> Option<Catalog> {
        let path = match self.entry_path(name) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "store extract refused");
                return None;
            }
        };

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "store entry not readable");
                return None;
            }
        };

        match serde_json::from_slice::<Catalog>(&bytes) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store entry could not be decoded");
                None
            }
        }
    }

    /// Remove one entry. A missing entry is only worth a warning.
    pub fn delete(&self, name: &str) -> ElementsResult<()> {
        let path = self.entry_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "store entry deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(entry = %name, "store entry does not exist");
                Ok(())
            }
            Err(e) => Err(ElementsError::store_io(path, e)),
        }
    }

    /// Remove every file in the store, returning how many were removed
    pub fn delete_all(&self) -> ElementsResult<usize> {
        let dir_entries =
            fs::read_dir(&self.directory).map_err(|e| ElementsError::store_io(&self.directory, e))?;

        let mut removed = 0;
        for entry in dir_entries {
            let path = entry
                .map_err(|e| ElementsError::store_io(&self.directory, e))?
                .path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| ElementsError::store_io(&path, e))?;
                removed += 1;
            }
        }

        info!(store = %self.store_name, removed, "store emptied");
        Ok(removed)
    }

    /// Remove the store directory itself
    pub fn delete_store(&self) -> ElementsResult<()> {
        fs::remove_dir_all(&self.directory)
            .map_err(|e| ElementsError::store_io(&self.directory, e))?;
        info!(path = %self.directory.display(), "store deleted");
        Ok(())
    }

    /// Last-modified date of an entry, [`distant_past`] when it is absent
    pub fn modification_date(&self, name: &str) -> DateTime<Utc> {
        self.entry_path(name)
            .ok()
            .and_then(|path| fs::metadata(path).ok())
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(distant_past)
    }

    pub fn set_modification_date(&self, name: &str, date: DateTime<Utc>) -> ElementsResult<()> {
        let path = self.entry_path(name)?;
        let file = File::options()
            .write(true)
            .open(&path)
            .map_err(|e| ElementsError::store_io(&path, e))?;
        file.set_modified(SystemTime::from(date))
            .map_err(|e| ElementsError::store_io(&path, e))?;
        debug!(path = %path.display(), %date, "store entry redated");
        Ok(())
    }

    /// Age of an entry in days, `None` when the entry does not exist
    pub fn age(&self, name: &str) -> ElementsResult<Option<f64>> {
        let modified = self.modification_date(name);
        if modified == distant_past() {
            return Ok(None);
        }

        let now = Utc::now();
        if modified > now {
            warn!(entry = %name, %modified, "store entry is dated in the future");
            return Err(ElementsError::FutureModification {
                name: name.to_string(),
                modified,
            });
        }

        let days = (now - modified).num_milliseconds() as f64 / MILLIS_PER_DAY;
        if days < 7.0 {
            debug!(entry = %name, "store entry is {days:.2} days old");
        } else {
            debug!(entry = %name, "store entry is older than a week");
        }
        Ok(Some(days))
    }

    /// Names of the stored entries, sorted
    pub fn entries(&self) -> ElementsResult<Vec<String>> {
        let dir_entries =
            fs::read_dir(&self.directory).map_err(|e| ElementsError::store_io(&self.directory, e))?;

        let mut names = Vec::new();
        for entry in dir_entries {
            let entry = entry.map_err(|e| ElementsError::store_io(&self.directory, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn describe(&self) -> String {
        match self.entries() {
            Ok(names) => format!(
                "┌─[ElementsStore]────────────────────────────────────\n\
                 │  store: {}\n\
                 │  count: {}\n\
                 │  files: {:?}\n\
                 └────────────────────────────────────────────────────",
                self.directory.display(),
                names.len(),
                names
            ),
            Err(_) => format!(
                "┌─[ElementsStore]────────────────────────────────────\n\
                 │  store: {} does not exist.\n\
                 └────────────────────────────────────────────────────",
                self.directory.display()
            ),
        }
    }
}

/// Write `bytes` to `path` and stamp its modification time
fn write_dated(path: &Path, bytes: &[u8], as_of: DateTime<Utc>) -> ElementsResult<()> {
    let mut file = File::create(path).map_err(|e| ElementsError::store_io(path, e))?;
    file.write_all(bytes)
        .and_then(|_| file.sync_all())
        .and_then(|_| file.set_modified(SystemTime::from(as_of)))
        .map_err(|e| ElementsError::store_io(path, e))
}
