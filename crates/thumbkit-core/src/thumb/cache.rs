//! The icon/thumbnail cache owned by one screen.
//!
//! Everything here runs on the UI thread: requests are issued, completions
//! are applied and both tables (bounded cache, pending requests) are
//! mutated only from there. Decoding happens on the cache's single worker
//! thread and comes back through [`ThumbnailCache::process_completions`].

use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::Config;
use crate::config::theme::parse_color;
use crate::error::CoreResult;
use crate::fs::entry::FileEntry;
use crate::fs::media_path::MediaPathNormalizer;
use crate::thumb::album::{AlbumIndex, FsAlbumSource};
use crate::thumb::asset::{Tint, VisualAsset};
use crate::thumb::bounded::BoundedCache;
use crate::thumb::extract::{Extractors, FfmpegFrameGrabber, FrameGrabber, ThumbnailSource};
use crate::thumb::icons::{BuiltinIcons, IconData, IconId, IconLoader, StaticIcons};
use crate::thumb::surface::{DisplaySurface, SurfaceId};
use crate::thumb::watch::MediaWatcher;
use crate::thumb::worker::{Completion, Job, RequestId, Worker};

/// The collaborators a cache is built from.
pub struct ThumbnailServices {
    pub icons: Box<dyn IconLoader>,
    pub frames: Box<dyn FrameGrabber>,
    pub albums: Arc<AlbumIndex>,
}

impl ThumbnailServices {
    /// The portable defaults: built-in glyphs, `ffmpeg` frames and a
    /// filesystem album scan over the configured music roots.
    pub fn from_config(config: &Config) -> Self {
        let normalizer = MediaPathNormalizer::new(config.media.path_aliases.clone());
        let albums = FsAlbumSource::new(
            config.media.music_roots.clone(),
            config.media.scan_depth,
            normalizer,
        );
        Self {
            icons: Box::new(BuiltinIcons::new(
                config.icons.dir.clone(),
                config.icons.size,
            )),
            frames: Box::new(FfmpegFrameGrabber::new(
                config.video.ffmpeg.clone(),
                config.video.seek_seconds,
            )),
            albums: Arc::new(AlbumIndex::new(Box::new(albums))),
        }
    }
}

/// What happened to a completion taken off the result channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Cached and painted on its surface.
    Applied,
    /// Nothing could be produced; the fallback icon stays.
    Failed,
    /// Superseded, or its surface is gone.
    Discarded,
}

struct PendingRequest {
    id: RequestId,
    surface: Weak<dyn DisplaySurface>,
}

/// Resolves file entries to icons and thumbnails for one screen.
pub struct ThumbnailCache {
    use_thumbs: bool,
    folder_opacity: f32,
    directory_color: Tint,
    normalizer: MediaPathNormalizer,
    icons: StaticIcons,
    cache: BoundedCache,
    pending: HashMap<SurfaceId, PendingRequest>,
    next_request: u64,
    worker: Worker,
    completions: Receiver<Completion>,
    albums: Arc<AlbumIndex>,
    watcher: Option<MediaWatcher>,
    torn_down: bool,
}

impl ThumbnailCache {
    /// Builds a cache with the default collaborators and, when enabled,
    /// a watcher on the music roots.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Io`] if the worker thread cannot start.
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let services = ThumbnailServices::from_config(config);
        let albums = Arc::clone(&services.albums);
        let mut cache = Self::new(config, services)?;

        if config.cache.thumbnails && config.media.watch && !config.media.music_roots.is_empty() {
            match MediaWatcher::new(&config.media.music_roots, albums) {
                Ok(watcher) => cache.watcher = Some(watcher),
                Err(e) => tracing::warn!("album change notifications unavailable: {e}"),
            }
        }
        Ok(cache)
    }

    /// Builds a cache from explicit collaborators. No change watcher is
    /// installed; call [`AlbumIndex::mark_dirty`] on `services.albums` to
    /// deliver notifications.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Io`] if the worker thread cannot start.
    pub fn new(config: &Config, services: ThumbnailServices) -> CoreResult<Self> {
        let colors = config.icons.colors.clone();
        let directory_color = parse_color(&colors.folder).unwrap_or(Tint::WHITE);
        let folder_tint = directory_color.with_opacity(config.icons.folder_opacity);
        let icons = StaticIcons::new(services.icons, colors, folder_tint, config.icons.size);

        let (tx, rx) = mpsc::channel();
        let extractors = Extractors::new(
            config.cache.thumbnail_size,
            services.frames,
            Arc::clone(&services.albums),
        );
        let worker = Worker::spawn(extractors, tx)?;

        tracing::info!(
            capacity = config.cache.capacity,
            thumbnails = config.cache.thumbnails,
            "thumbnail cache ready"
        );

        Ok(Self {
            use_thumbs: config.cache.thumbnails,
            folder_opacity: config.icons.folder_opacity,
            directory_color,
            normalizer: MediaPathNormalizer::new(config.media.path_aliases.clone()),
            icons,
            cache: BoundedCache::new(config.cache.capacity),
            pending: HashMap::new(),
            next_request: 0,
            worker,
            completions: rx,
            albums: services.albums,
            watcher: None,
            torn_down: false,
        })
    }

    /// Returns the static icon `id`, loading it on first use.
    ///
    /// Repeat calls return the same asset instance.
    pub fn static_icon(&mut self, id: IconId) -> VisualAsset {
        self.icons.asset(id)
    }

    /// Paints `fallback` on `surface` and, if a thumbnail can be produced
    /// for `entry`, shows it from the cache or schedules it on the worker.
    ///
    /// Any earlier request for the same surface is cancelled. Never fails:
    /// if no thumbnail can be made, the fallback stays.
    pub fn request_thumbnail<S>(&mut self, surface: &Rc<S>, entry: &FileEntry, fallback: IconId)
    where
        S: DisplaySurface + 'static,
    {
        if self.torn_down {
            return;
        }
        self.prune_dead_surfaces();
        let surface_id = surface.surface_id();
        self.cancel_pending(surface_id);

        let icon = self.icons.data(fallback);
        paint_icon(&**surface, &icon);
        if !self.use_thumbs {
            let filter = if icon.is_dir {
                self.directory_color
            } else {
                Tint::WHITE
            };
            surface.set_color_filter(Some(filter));
            return;
        }

        let key = self.normalizer.normalize(entry.path());
        if let Some(asset) = self.cache.get(&key) {
            surface.set_tint(None);
            surface.set_asset(&asset);
            return;
        }

        let Some(source) = ThumbnailSource::for_entry(entry, &key) else {
            return;
        };

        self.next_request += 1;
        let id = RequestId(self.next_request);
        let dyn_surface: Rc<dyn DisplaySurface> = surface.clone();
        self.pending.insert(
            surface_id,
            PendingRequest {
                id,
                surface: Rc::downgrade(&dyn_surface),
            },
        );
        tracing::trace!(request = id.0, %key, "thumbnail queued");
        self.worker.enqueue(Job {
            request: id,
            surface: surface_id,
            key,
            source,
        });
    }

    /// Forgets whatever `surface` was waiting for, e.g. when its row is
    /// destroyed.
    pub fn forget_surface(&mut self, surface: SurfaceId) {
        self.cancel_pending(surface);
    }

    /// Applies every completion already delivered by the worker. Returns
    /// how many were painted.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions.try_recv() {
            if self.apply(completion) == CompletionOutcome::Applied {
                applied += 1;
            }
        }
        self.prune_dead_surfaces();
        applied
    }

    /// Blocks up to `timeout` for the next completion and applies it.
    /// Returns `None` on timeout.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Option<CompletionOutcome> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(self.apply(completion)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Reloads the directory icon with a new colour. Also used as the
    /// folder colour filter when thumbnails are disabled.
    pub fn set_directory_color(&mut self, color: Tint) {
        self.directory_color = color;
        self.icons.set_directory_color(color, self.folder_opacity);
    }

    /// The album index this cache consults; notifications go here.
    pub fn album_index(&self) -> &Arc<AlbumIndex> {
        &self.albums
    }

    /// `true` if a decoded thumbnail is cached for `entry`.
    pub fn is_cached(&self, entry: &FileEntry) -> bool {
        self.cache.contains(&self.normalizer.normalize(entry.path()))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Requests still awaited by a surface that is alive.
    pub fn pending_len(&self) -> usize {
        self.pending
            .values()
            .filter(|p| p.surface.strong_count() > 0)
            .count()
    }

    /// Requests waiting in the worker queue (not yet started).
    pub fn queued(&self) -> Vec<RequestId> {
        self.worker.queued()
    }

    /// `true` when the worker has nothing queued or running.
    pub fn is_idle(&self) -> bool {
        self.worker.is_idle()
    }

    /// Releases everything: joins the worker, clears all tables and drops
    /// the change subscription.
    pub fn cleanup(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.worker.shutdown();
        self.watcher = None;
        self.pending.clear();
        self.cache.clear();
        self.icons.clear();
        while self.completions.try_recv().is_ok() {}
        tracing::info!("thumbnail cache released");
    }

    fn cancel_pending(&mut self, surface: SurfaceId) {
        if let Some(previous) = self.pending.remove(&surface) {
            if self.worker.cancel(previous.id) {
                tracing::trace!(request = previous.id.0, "superseded request dequeued");
            }
        }
    }

    /// Drops pending entries whose surface no longer exists, pulling their
    /// jobs from the queue if they have not started.
    fn prune_dead_surfaces(&mut self) {
        let worker = &self.worker;
        self.pending.retain(|_, pending| {
            let alive = pending.surface.strong_count() > 0;
            if !alive {
                worker.cancel(pending.id);
            }
            alive
        });
    }

    fn apply(&mut self, completion: Completion) -> CompletionOutcome {
        let current = self.pending.get(&completion.surface).map(|p| p.id);
        if current != Some(completion.request) {
            tracing::debug!(
                request = completion.request.0,
                key = %completion.key,
                "discarding stale thumbnail"
            );
            return CompletionOutcome::Discarded;
        }
        let Some(pending) = self.pending.remove(&completion.surface) else {
            return CompletionOutcome::Discarded;
        };
        let Some(asset) = completion.asset else {
            return CompletionOutcome::Failed;
        };
        let Some(surface) = pending.surface.upgrade() else {
            return CompletionOutcome::Discarded;
        };

        self.cache.insert(completion.key, asset.clone());
        surface.set_tint(None);
        surface.set_asset(&asset);
        CompletionOutcome::Applied
    }
}

impl Drop for ThumbnailCache {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn paint_icon(surface: &dyn DisplaySurface, icon: &IconData) {
    surface.set_tint(Some(icon.tint));
    surface.set_asset(&icon.asset);
}
