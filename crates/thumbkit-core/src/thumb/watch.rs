//! Change notifications for the album index.
//!
//! Uses [`notify`] with debouncing on the music roots. A change only marks
//! the index dirty; recomputation happens on the next lookup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::Watcher as _;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer};

use crate::error::CoreResult;
use crate::thumb::album::AlbumIndex;

const DEBOUNCE: Duration = Duration::from_millis(500);

/// A live subscription. Dropping it unsubscribes.
pub struct MediaWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    roots: Vec<PathBuf>,
}

impl MediaWatcher {
    /// Watches every existing root recursively. Roots that do not exist are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Watch`] if the watcher cannot be created
    /// or a root cannot be watched.
    pub fn new(roots: &[PathBuf], index: Arc<AlbumIndex>) -> CoreResult<Self> {
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    if events.iter().any(|e| matches!(e.kind, DebouncedEventKind::Any)) {
                        tracing::debug!("media change, album index marked dirty");
                        index.mark_dirty();
                    }
                }
                Err(e) => tracing::warn!("media watcher error: {e}"),
            }
        })?;

        let mut watched = Vec::new();
        for root in roots {
            if !root.is_dir() {
                tracing::warn!("music root {} does not exist, not watching", root.display());
                continue;
            }
            debouncer
                .watcher()
                .watch(root, notify::RecursiveMode::Recursive)?;
            watched.push(root.clone());
        }

        Ok(Self {
            _debouncer: debouncer,
            roots: watched,
        })
    }

    /// Roots actually being watched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumb::album::{AlbumId, AlbumMap, AlbumSource};
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    struct Empty;

    impl AlbumSource for Empty {
        fn scan_albums(&self) -> CoreResult<AlbumMap> {
            Ok(AlbumMap::new())
        }

        fn album_art_path(&self, _id: AlbumId) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn missing_roots_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let index = Arc::new(AlbumIndex::new(Box::new(Empty)));
        let watcher = MediaWatcher::new(&[tmp.path().join("gone")], index).unwrap();
        assert!(watcher.roots().is_empty());
    }

    #[test]
    fn file_change_marks_index_dirty() {
        let tmp = TempDir::new().unwrap();
        let index = Arc::new(AlbumIndex::new(Box::new(Empty)));
        index.albums();
        assert!(!index.is_dirty());

        let _watcher = MediaWatcher::new(&[tmp.path().to_path_buf()], Arc::clone(&index)).unwrap();
        fs::write(tmp.path().join("new.mp3"), "x").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !index.is_dirty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(index.is_dirty(), "watcher should dirty the index after a change");
    }
}
