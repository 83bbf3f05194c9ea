//! Loading RON files from disk and watching a directory for edits.
//!
//! The watcher only raises a shared flag; the owning system decides when to
//! reload. Settings use this for hot-reload during development.

use bevy::log::{info, warn};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failure while reading a single RON file.
#[derive(Debug, Error)]
pub enum RonError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ::ron::error::SpannedError,
    },
}

/// File-watcher handle for RON hot-reload.
pub struct RonWatcher {
    changed: Arc<AtomicBool>,
    _watcher: Option<RecommendedWatcher>, // kept alive for the lifetime of the handle
}

impl RonWatcher {
    /// A watcher with no OS backing. `take_changed` always returns `false`.
    ///
    /// Used when the directory does not exist or the platform watcher fails.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Returns `true` once per batch of file modifications and clears the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Raise the flag by hand, as if a watched file had been modified.
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}

/// Read and deserialize one RON file.
///
/// # Errors
/// Returns [`RonError::Io`] if the file cannot be read and
/// [`RonError::Parse`] if its contents do not deserialize into `T`.
pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, RonError> {
    let content = std::fs::read_to_string(path).map_err(|source| RonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ::ron::from_str::<T>(&content).map_err(|source| RonError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `.ron` file in `path`, sorted by file name.
///
/// Files that fail to load are skipped with a warning. A missing directory
/// yields an empty list.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path) else {
        info!("no RON directory at {path}, using defaults");
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    files
        .iter()
        .filter_map(|p| match load_ron_file::<T>(p) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

/// Watch `path` (non-recursively) for file modifications.
///
/// # Errors
/// Returns a `notify::Error` if the platform watcher cannot be created or the
/// directory cannot be registered.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(AtomicBool::new(false));
    let flag = changed.clone();
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched_path)
                });
                if relevant {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher {
        changed,
        _watcher: Some(watcher),
    })
}
