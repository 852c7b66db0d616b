//! Album index: which directories are music albums, and where their art is.
//!
//! The index is computed lazily and invalidated by change notifications.
//! Invalidation only flips a dirty flag; the next lookup recomputes while
//! holding the index lock, so any number of concurrent lookups after a
//! notification trigger exactly one recompute.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::CoreResult;
use crate::fs::category::is_audio_extension;
use crate::fs::media_path::MediaPathNormalizer;

/// Identifier of a music album.
pub type AlbumId = i64;

/// Directory path (normalised) → album id.
pub type AlbumMap = HashMap<String, AlbumId>;

/// Where album information comes from.
pub trait AlbumSource: Send + Sync {
    /// Computes the full directory → album map.
    fn scan_albums(&self) -> CoreResult<AlbumMap>;

    /// Returns the path of the album's cover image, if it has one.
    fn album_art_path(&self, id: AlbumId) -> Option<PathBuf>;
}

struct IndexState {
    dirty: bool,
    albums: Arc<AlbumMap>,
}

/// Shared, lazily recomputed album index.
///
/// Passed by `Arc` to the cache, its worker and the change watcher.
pub struct AlbumIndex {
    source: Box<dyn AlbumSource>,
    state: Mutex<IndexState>,
    recomputes: AtomicUsize,
}

impl AlbumIndex {
    /// Creates a dirty index; nothing is scanned until the first lookup.
    pub fn new(source: Box<dyn AlbumSource>) -> Self {
        Self {
            source,
            state: Mutex::new(IndexState {
                dirty: true,
                albums: Arc::new(AlbumMap::new()),
            }),
            recomputes: AtomicUsize::new(0),
        }
    }

    /// Returns the current map, recomputing it first if it is dirty.
    pub fn albums(&self) -> Arc<AlbumMap> {
        let mut state = self.state.lock();
        self.refresh(&mut state);
        Arc::clone(&state.albums)
    }

    /// Looks up the album whose directory is `dir` (a normalised path).
    pub fn lookup(&self, dir: &str) -> Option<AlbumId> {
        self.albums().get(dir).copied()
    }

    pub fn album_art_path(&self, id: AlbumId) -> Option<PathBuf> {
        self.source.album_art_path(id)
    }

    /// Cover image of the album at `dir`.
    ///
    /// The id lookup and the art lookup happen under the index lock, so a
    /// rescan triggered by another caller cannot land in between.
    pub fn album_art(&self, dir: &str) -> Option<PathBuf> {
        let mut state = self.state.lock();
        self.refresh(&mut state);
        let id = state.albums.get(dir).copied()?;
        self.source.album_art_path(id)
    }

    fn refresh(&self, state: &mut IndexState) {
        if !state.dirty {
            return;
        }
        self.recomputes.fetch_add(1, Ordering::Relaxed);
        state.albums = match self.source.scan_albums() {
            Ok(albums) => {
                tracing::debug!(count = albums.len(), "album index rebuilt");
                Arc::new(albums)
            }
            Err(e) => {
                tracing::warn!("album scan failed: {e}");
                Arc::new(AlbumMap::new())
            }
        };
        state.dirty = false;
    }

    /// Marks the index stale without recomputing it.
    pub fn mark_dirty(&self) {
        self.state.lock().dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Number of recomputes performed so far.
    pub fn recompute_count(&self) -> usize {
        self.recomputes.load(Ordering::Relaxed)
    }
}

/// Cover file names checked in order, compared case-insensitively.
const ART_NAMES: [&str; 7] = [
    "cover.jpg",
    "cover.png",
    "folder.jpg",
    "folder.png",
    "front.jpg",
    "front.png",
    "albumart.jpg",
];

/// Treats every directory under the music roots that directly contains an
/// audio file as an album.
///
/// A directory keeps the id it was first given for the lifetime of the
/// source, across rescans; ids are never reused.
pub struct FsAlbumSource {
    roots: Vec<PathBuf>,
    max_depth: usize,
    normalizer: MediaPathNormalizer,
    ids: Mutex<AssignedIds>,
}

#[derive(Default)]
struct AssignedIds {
    by_dir: HashMap<PathBuf, AlbumId>,
    current: HashMap<AlbumId, PathBuf>,
    last: AlbumId,
}

impl FsAlbumSource {
    pub fn new(roots: Vec<PathBuf>, max_depth: usize, normalizer: MediaPathNormalizer) -> Self {
        Self {
            roots,
            max_depth,
            normalizer,
            ids: Mutex::new(AssignedIds::default()),
        }
    }

    fn collect(&self, dir: &Path, depth: usize, found: &mut Vec<PathBuf>) {
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            return;
        };
        let mut has_audio = false;
        let mut subdirs = Vec::new();

        for child in read_dir.filter_map(|r| r.ok()) {
            let Ok(file_type) = child.file_type() else {
                continue;
            };
            let path = child.path();
            if file_type.is_dir() {
                subdirs.push(path);
            } else if !has_audio {
                has_audio = path
                    .extension()
                    .is_some_and(|e| is_audio_extension(&e.to_string_lossy()));
            }
        }

        if has_audio {
            found.push(dir.to_path_buf());
        }
        if depth < self.max_depth {
            for sub in subdirs {
                self.collect(&sub, depth + 1, found);
            }
        }
    }
}

impl AlbumSource for FsAlbumSource {
    fn scan_albums(&self) -> CoreResult<AlbumMap> {
        let mut found = Vec::new();
        for root in &self.roots {
            self.collect(root, 0, &mut found);
        }
        found.sort();
        found.dedup();

        let mut ids = self.ids.lock();
        let AssignedIds { by_dir, current, last } = &mut *ids;
        let mut albums = AlbumMap::with_capacity(found.len());
        current.clear();
        for dir in found {
            let id = *by_dir.entry(dir.clone()).or_insert_with(|| {
                *last += 1;
                *last
            });
            albums.insert(self.normalizer.normalize(&dir), id);
            current.insert(id, dir);
        }
        Ok(albums)
    }

    fn album_art_path(&self, id: AlbumId) -> Option<PathBuf> {
        let dir = self.ids.lock().current.get(&id).cloned()?;
        let files: Vec<PathBuf> = std::fs::read_dir(&dir)
            .ok()?
            .filter_map(|r| r.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();

        ART_NAMES.iter().find_map(|wanted| {
            files
                .iter()
                .find(|p| {
                    p.file_name()
                        .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(wanted))
                })
                .cloned()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    struct SlowSource {
        scans: Arc<AtomicUsize>,
    }

    impl AlbumSource for SlowSource {
        fn scan_albums(&self) -> CoreResult<AlbumMap> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(AlbumMap::from([("/music/a".to_string(), 7)]))
        }

        fn album_art_path(&self, _id: AlbumId) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn first_lookup_computes_once() {
        let scans = Arc::new(AtomicUsize::new(0));
        let index = AlbumIndex::new(Box::new(SlowSource {
            scans: scans.clone(),
        }));
        assert!(index.is_dirty());

        assert_eq!(index.lookup("/music/a"), Some(7));
        assert_eq!(index.lookup("/music/b"), None);

        assert_eq!(scans.load(Ordering::SeqCst), 1);
        assert!(!index.is_dirty());
    }

    #[test]
    fn dirty_mark_defers_recompute_until_next_lookup() {
        let scans = Arc::new(AtomicUsize::new(0));
        let index = AlbumIndex::new(Box::new(SlowSource {
            scans: scans.clone(),
        }));
        index.lookup("/music/a");

        index.mark_dirty();
        index.mark_dirty();
        assert_eq!(scans.load(Ordering::SeqCst), 1);

        index.lookup("/music/a");
        assert_eq!(scans.load(Ordering::SeqCst), 2);
        assert_eq!(index.recompute_count(), 2);
    }

    #[test]
    fn concurrent_lookups_after_notification_recompute_once() {
        let scans = Arc::new(AtomicUsize::new(0));
        let index = Arc::new(AlbumIndex::new(Box::new(SlowSource {
            scans: scans.clone(),
        })));
        index.lookup("/music/a");
        index.mark_dirty();

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    index.lookup("/music/a")
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), Some(7));
        }
        assert_eq!(scans.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fs_source_finds_album_directories_and_art() {
        let tmp = TempDir::new().unwrap();
        let album = tmp.path().join("Artist").join("Record");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("01.mp3"), "x").unwrap();
        fs::write(album.join("Cover.JPG"), "x").unwrap();
        let photos = tmp.path().join("Photos");
        fs::create_dir_all(&photos).unwrap();
        fs::write(photos.join("a.png"), "x").unwrap();

        let normalizer = MediaPathNormalizer::new(Vec::new());
        let source = FsAlbumSource::new(vec![tmp.path().to_path_buf()], 4, normalizer.clone());
        let albums = source.scan_albums().unwrap();

        assert_eq!(albums.len(), 1);
        let id = albums[&normalizer.normalize(&album)];
        assert_eq!(source.album_art_path(id), Some(album.join("Cover.JPG")));
    }

    #[test]
    fn fs_source_respects_depth() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("t.flac"), "x").unwrap();

        let shallow = FsAlbumSource::new(
            vec![tmp.path().to_path_buf()],
            2,
            MediaPathNormalizer::new(Vec::new()),
        );
        assert!(shallow.scan_albums().unwrap().is_empty());

        let deeper = FsAlbumSource::new(
            vec![tmp.path().to_path_buf()],
            3,
            MediaPathNormalizer::new(Vec::new()),
        );
        assert_eq!(deeper.scan_albums().unwrap().len(), 1);
    }

    #[test]
    fn album_ids_survive_rescans() {
        let tmp = TempDir::new().unwrap();
        let b = tmp.path().join("B");
        fs::create_dir(&b).unwrap();
        fs::write(b.join("01.mp3"), "x").unwrap();
        fs::write(b.join("cover.jpg"), "x").unwrap();

        let normalizer = MediaPathNormalizer::new(Vec::new());
        let index = AlbumIndex::new(Box::new(FsAlbumSource::new(
            vec![tmp.path().to_path_buf()],
            2,
            normalizer.clone(),
        )));
        let b_key = normalizer.normalize(&b);
        let b_id = index.lookup(&b_key).unwrap();

        // a new album sorting before B must not take over B's id
        let a = tmp.path().join("A");
        fs::create_dir(&a).unwrap();
        fs::write(a.join("01.mp3"), "x").unwrap();
        fs::write(a.join("cover.jpg"), "x").unwrap();
        index.mark_dirty();
        index.albums();

        assert_eq!(index.lookup(&b_key), Some(b_id));
        assert_eq!(index.album_art_path(b_id), Some(b.join("cover.jpg")));
        assert_eq!(index.album_art(&b_key), Some(b.join("cover.jpg")));
        assert_eq!(index.album_art(&normalizer.normalize(&a)), Some(a.join("cover.jpg")));
    }

    #[test]
    fn album_art_refreshes_a_dirty_index() {
        let scans = Arc::new(AtomicUsize::new(0));
        let index = AlbumIndex::new(Box::new(SlowSource {
            scans: scans.clone(),
        }));
        assert_eq!(index.album_art("/music/a"), None);
        assert_eq!(index.album_art("/music/b"), None);
        assert_eq!(scans.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn album_without_art_has_no_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("song.ogg"), "x").unwrap();

        let source = FsAlbumSource::new(
            vec![tmp.path().to_path_buf()],
            0,
            MediaPathNormalizer::new(Vec::new()),
        );
        let albums = source.scan_albums().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(source.album_art_path(1), None);
    }
}
