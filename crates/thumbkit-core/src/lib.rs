//! thumbkit core library, icon and thumbnail cache for file browsers.
//!
//! `thumbkit-core` resolves file-system entries to something to show: a
//! static category icon right away, then a decoded thumbnail (image, video
//! frame, application icon or album art) once a background worker has
//! produced one. It is decoupled from any UI toolkit; frontends implement
//! [`DisplaySurface`] for their widgets.
//!
//! # Modules
//!
//! - [`thumb`]: the cache, its worker, extractors, static icons and album index.
//! - [`fs`]: [`FileEntry`], category classification, path normalisation, listing.
//! - [`config`]: TOML configuration ([`Config`]) and icon colours.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod fs;
pub mod thumb;

pub use config::settings::Config;
pub use config::theme::parse_color;
pub use error::{CoreError, CoreResult};
pub use fs::entry::FileEntry;
pub use fs::listing::read_directory;
pub use fs::{classify, Category, MediaPathNormalizer};
pub use thumb::{
    CompletionOutcome, DisplaySurface, IconId, MemorySurface, SurfaceId, ThumbnailCache,
    ThumbnailServices, Tint, VisualAsset,
};

/// Normalises a string to NFC (composed) form.
///
/// Some file systems store names decomposed (NFD); cache keys must not
/// depend on which form a listing happened to return.
pub fn nfc_string(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    s.nfc().collect()
}
