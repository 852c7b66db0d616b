//! Icon and thumbnail loading.
//!
//! [`cache::ThumbnailCache`] is the entry point; the other modules are its
//! parts: the bounded table, the static icon set, the worker thread, the
//! per-source extractors, the album index and its change watcher.

pub mod album;
pub mod asset;
pub mod bounded;
pub mod cache;
pub mod extract;
pub mod icons;
pub mod surface;
pub mod watch;
pub mod worker;

pub use album::{AlbumId, AlbumIndex, AlbumMap, AlbumSource, FsAlbumSource};
pub use asset::{Tint, VisualAsset};
pub use bounded::BoundedCache;
pub use cache::{CompletionOutcome, ThumbnailCache, ThumbnailServices};
pub use extract::{FfmpegFrameGrabber, FrameGrabber, ThumbnailSource};
pub use icons::{BuiltinIcons, IconId, IconLoader};
pub use surface::{DisplaySurface, MemorySurface, SurfaceId};
pub use watch::MediaWatcher;
pub use worker::RequestId;
