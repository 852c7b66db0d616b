//! File system side of the icon cache.
//!
//! The entry model ([`entry::FileEntry`]), content classification
//! ([`category::classify`]), cache-key normalisation
//! ([`media_path::MediaPathNormalizer`]) and directory listing
//! ([`listing::read_directory`]).

pub mod category;
pub mod entry;
pub mod listing;
pub mod media_path;

pub use category::{classify, Category};
pub use media_path::{MediaPathNormalizer, PathAlias};
