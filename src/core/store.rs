//! The on-disk call store.
//!
//! A store is one directory holding a `{identifier}.pickle` file per captured
//! call. Nothing is cached in memory: every read goes back to disk.

use crate::core::error::SylteError;
use crate::core::ident::CallId;
use crate::core::time;
use crate::core::value::Payload;
use chrono::NaiveDateTime;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable overriding the store location.
pub const CACHE_DIR_ENV: &str = "SYLTE_CACHE_DIR";

/// Extension of every entry file.
pub const ENTRY_EXTENSION: &str = "pickle";

static DEFAULT_STORE: OnceLock<Store> = OnceLock::new();

/// Handle to a store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    /// Directory holding the entry files. Created on first capture.
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store at `$SYLTE_CACHE_DIR`, or `~/.cache/sylte` when unset.
    pub fn from_env() -> Result<Self, SylteError> {
        match env::var(CACHE_DIR_ENV) {
            Ok(raw) => Ok(Self::new(cache_dir_from(Some(&raw))?)),
            Err(env::VarError::NotPresent) => Ok(Self::new(cache_dir_from(None)?)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn entry_path(&self, id: &CallId) -> PathBuf {
        self.path_for(id.as_str())
    }

    fn path_for(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{}.{}", identifier, ENTRY_EXTENSION))
    }

    /// Persist `payload` as a call of `function` from `caller`, stamped with the current time.
    pub fn capture(
        &self,
        caller: &str,
        function: &str,
        payload: &Payload,
    ) -> Result<CallId, SylteError> {
        self.capture_at(caller, function, payload, time::now_local())
    }

    /// Like [`Store::capture`] with an explicit timestamp.
    ///
    /// An existing entry with the same identifier is overwritten.
    pub fn capture_at(
        &self,
        caller: &str,
        function: &str,
        payload: &Payload,
        at: NaiveDateTime,
    ) -> Result<CallId, SylteError> {
        let id = CallId::new(caller, function, at)?;
        ensure_dir_exists(&self.root)?;
        let path = self.entry_path(&id);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, payload)?;
        writer.flush()?;
        tracing::debug!(id = %id, path = %path.display(), "Captured call");
        Ok(id)
    }

    /// Stems of all entry files, in directory order. A missing directory is an empty store.
    pub fn stems(&self) -> Result<Vec<String>, SylteError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut stems = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_entry = path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION);
            if !is_entry || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.push(stem.to_string());
            }
        }
        Ok(stems)
    }

    /// Identifiers containing `substring`, oldest first.
    ///
    /// The filter runs before timestamps are parsed; a matching foreign file
    /// without a timestamp fails the whole listing.
    pub fn list(&self, substring: &str) -> Result<Vec<CallId>, SylteError> {
        let mut ids = self
            .stems()?
            .into_iter()
            .filter(|stem| stem.contains(substring))
            .map(|stem| CallId::parse(&stem))
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_by_key(CallId::timestamp);
        Ok(ids)
    }

    /// Newest identifier containing `substring`.
    pub fn latest_id(&self, substring: &str) -> Result<Option<CallId>, SylteError> {
        Ok(self.list(substring)?.pop())
    }

    /// Payload of the newest entry containing `substring`, or `None` when nothing matches.
    pub fn latest(&self, substring: &str) -> Result<Option<Payload>, SylteError> {
        match self.latest_id(substring)? {
            Some(id) => self.unsylt(id.as_str()).map(Some),
            None => Ok(None),
        }
    }

    /// Load the payload stored under exactly `identifier`.
    pub fn unsylt(&self, identifier: &str) -> Result<Payload, SylteError> {
        if identifier.is_empty() || identifier.contains(['/', '\\']) {
            return Err(SylteError::ValidationError(format!(
                "invalid identifier '{}'",
                identifier
            )));
        }
        let path = self.path_for(identifier);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SylteError::NotFound(format!(
                    "no sylted call '{}' in {}",
                    identifier,
                    self.root.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::trace!(identifier, "Loading sylted call");
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Delete every entry file. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, SylteError> {
        let stems = self.stems()?;
        for stem in &stems {
            match fs::remove_file(self.path_for(stem)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::debug!(root = %self.root.display(), removed = stems.len(), "Cleared store");
        Ok(stems.len())
    }
}

/// Process-wide store, resolved from the environment on first use.
pub fn default_store() -> Result<&'static Store, SylteError> {
    if let Some(store) = DEFAULT_STORE.get() {
        return Ok(store);
    }
    let store = Store::from_env()?;
    Ok(DEFAULT_STORE.get_or_init(|| store))
}

/// Store root for a `SYLTE_CACHE_DIR` value.
///
/// A missing or blank value selects [`default_cache_dir`]. Anything else is
/// used as given, apart from expanding a leading `~`.
pub fn cache_dir_from(value: Option<&str>) -> Result<PathBuf, SylteError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => expand_home(raw),
        _ => Ok(default_cache_dir()),
    }
}

/// `~/.cache/sylte`, or a relative `.cache/sylte` without a home directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".cache").join("sylte"))
        .unwrap_or_else(|| PathBuf::from(".cache").join("sylte"))
}

fn expand_home(raw: &str) -> Result<PathBuf, SylteError> {
    let rest = if raw == "~" {
        ""
    } else if let Some(rest) = raw.strip_prefix("~/") {
        rest
    } else {
        return Ok(PathBuf::from(raw));
    };
    let home = dirs::home_dir()
        .ok_or_else(|| SylteError::PathError(format!("cannot expand '{}': no home directory", raw)))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Create `path` and its parents. A concurrent creator winning the race is fine.
pub fn ensure_dir_exists(path: &Path) -> Result<(), SylteError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
