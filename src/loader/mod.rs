//! Event loading from JSON exports.
//!
//! Stands in for the hosted backend: reads event rows (already joined with
//! their sub-records) from a JSON file or a directory of JSON files and
//! scopes them to the signed-in user.

use crate::models::Event;
use crate::session::{SessionProvider, SessionState};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors raised while loading events.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No user is signed in")]
    SignedOut,

    #[error("Event source not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse events in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to walk event directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Configuration for event discovery.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory or file names to skip (e.g., ["archive", "drafts"])
    pub excludes: Vec<String>,
    /// Maximum export file size in bytes
    pub max_file_size: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            excludes: Vec::new(),
            max_file_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl From<&crate::config::DataConfig> for LoaderConfig {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            excludes: config.excludes.clone(),
            max_file_size: config.max_file_size,
        }
    }
}

/// Reads events for the current session.
pub struct EventStore {
    source: PathBuf,
    config: LoaderConfig,
    session: Arc<dyn SessionProvider>,
}

impl EventStore {
    /// Create a new event store over `source` (a file or directory).
    pub fn new(source: PathBuf, config: LoaderConfig, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            source,
            config,
            session,
        }
    }

    /// List the JSON files that would be read, in file-name order.
    pub fn discover(&self) -> Result<Vec<PathBuf>, LoadError> {
        if !self.source.exists() {
            return Err(LoadError::NotFound(self.source.clone()));
        }

        if self.source.is_file() {
            return Ok(vec![self.source.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.source)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !self.is_excluded(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file() || !is_json(path) {
                continue;
            }

            let size = entry.metadata()?.len();
            if size > self.config.max_file_size {
                warn!(
                    "Skipping {} ({} bytes exceeds limit of {})",
                    path.display(),
                    size,
                    self.config.max_file_size
                );
                continue;
            }

            files.push(path.to_path_buf());
        }

        debug!("Discovered {} event files", files.len());
        Ok(files)
    }

    /// Load, scope and order the session user's events.
    pub async fn load(&self) -> Result<Vec<Event>, LoadError> {
        let user_id = match self.session.state() {
            SessionState::SignedIn { user_id } => user_id,
            SessionState::SignedOut => return Err(LoadError::SignedOut),
        };

        let files = self.discover()?;
        let batches = try_join_all(files.iter().map(|path| read_events(path))).await?;

        let mut total = 0usize;
        let mut events: Vec<Event> = batches
            .into_iter()
            .flatten()
            .inspect(|_| total += 1)
            .filter(|event| belongs_to(event, &user_id))
            .collect();

        if total > events.len() {
            debug!(
                "Dropped {} events owned by other users",
                total - events.len()
            );
        }

        // Stable, so same-day events keep their export order.
        events.sort_by_key(|event| event.date);

        info!(
            "Loaded {} events from {} file(s) for {}",
            events.len(),
            files.len(),
            user_id
        );
        Ok(events)
    }

    /// Check if a name matches exclusion patterns.
    fn is_excluded(&self, name: &str) -> bool {
        // Hidden files
        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern)
    }
}

/// Rows without an owner are taken as already scoped.
fn belongs_to(event: &Event, user_id: &str) -> bool {
    event.user_id.as_deref().map_or(true, |owner| owner == user_id)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

async fn read_events(path: &Path) -> Result<Vec<Event>, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSession;
    use std::fs;
    use tempfile::TempDir;

    fn store(source: PathBuf, user: &str) -> EventStore {
        EventStore::new(
            source,
            LoaderConfig::default(),
            Arc::new(StaticSession::signed_in(user)),
        )
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_fixture() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/events.json");
        let events = tokio_test::block_on(store(fixture, "advisor-1").load()).unwrap();

        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.user_id.as_deref() != Some("advisor-2")));
        assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_load_directory_scopes_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "2024/march.json",
            r#"[
                {"id": "m1", "user_id": "u1", "date": "2024-03-20"},
                {"id": "m2", "user_id": "u2", "date": "2024-03-01"}
            ]"#,
        );
        write(
            dir.path(),
            "january.json",
            r#"[{"id": "j1", "date": "2024-01-15T00:00:00Z"}]"#,
        );
        write(dir.path(), "notes.txt", "not events");
        write(dir.path(), ".hidden/old.json", "[not json");

        let events = tokio_test::block_on(store(dir.path().to_path_buf(), "u1").load()).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["j1", "m1"]);
    }

    #[test]
    fn test_excluded_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "current.json", r#"[{"id": "a", "date": "2024-01-01"}]"#);
        write(dir.path(), "archive/old.json", r#"[{"id": "b", "date": "2020-01-01"}]"#);

        let config = LoaderConfig {
            excludes: vec!["archive".to_string()],
            ..Default::default()
        };
        let store = EventStore::new(
            dir.path().to_path_buf(),
            config,
            Arc::new(StaticSession::signed_in("u1")),
        );

        let files = store.discover().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("current.json"));
    }

    #[test]
    fn test_signed_out_session_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = EventStore::new(
            dir.path().to_path_buf(),
            LoaderConfig::default(),
            Arc::new(StaticSession::signed_out()),
        );

        let err = tokio_test::block_on(store.load()).unwrap_err();
        assert!(matches!(err, LoadError::SignedOut));
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = store(dir.path().join("nope.json"), "u1").discover().unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_whole_float_counts_load() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "export.json",
            r#"[
                {"id": "a", "date": "2024-02-01", "attendance": {"attendees": 32.0, "clients_from_event": 4}},
                {"id": "b", "date": "2024-02-02", "attendance": {"attendees": 7}}
            ]"#,
        );

        let events = tokio_test::block_on(store(path, "u1").load()).unwrap();

        assert_eq!(events.len(), 2);
        let attendance = events[0].attendance.as_ref().unwrap();
        assert_eq!(attendance.attendees, Some(32));
        assert_eq!(attendance.clients_from_event, Some(4));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "bad.json", r#"[{"id": "x", "date": "31/12/2024"}]"#);

        let err = tokio_test::block_on(store(path, "u1").load()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}
