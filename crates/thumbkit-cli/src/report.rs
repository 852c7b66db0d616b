//! Plain-text output for the listing.

use std::path::{Path, PathBuf};

use thumbkit_core::{Category, FileEntry, VisualAsset};

/// What a row ended up showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Icon(&'static str),
    Thumbnail { width: u32, height: u32 },
}

impl Shown {
    pub fn label(&self) -> String {
        match self {
            Shown::Icon(name) => format!("icon:{name}"),
            Shown::Thumbnail { width, height } => format!("{width}x{height}"),
        }
    }
}

/// Formats one output line: category, what is shown, name.
pub fn format_row(entry: &FileEntry, category: Category, shown: &Shown) -> String {
    let mut name = entry.name().to_string();
    if entry.is_dir() {
        name.push('/');
    }
    format!("{:<9} {:<12} {}", category.label(), shown.label(), name)
}

/// Where the thumbnail of `entry` is written under `out`.
pub fn thumbnail_file(out: &Path, entry: &FileEntry) -> PathBuf {
    let stem: String = entry
        .name()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    out.join(format!("{stem}.png"))
}

/// Writes `asset` as a PNG.
pub fn save_thumbnail(asset: &VisualAsset, path: &Path) -> anyhow::Result<()> {
    asset
        .image()
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}
