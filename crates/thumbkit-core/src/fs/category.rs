//! Coarse content classification for file entries.
//!
//! The category picks both the fallback icon painted immediately and
//! whether a thumbnail can be extracted at all.

use crate::fs::entry::FileEntry;
use crate::thumb::icons::IconId;

/// Coarse content category of a file-system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Image,
    Video,
    Audio,
    Document,
    App,
    Archive,
    Directory,
    Other,
}

impl Category {
    /// Returns the static icon shown while (or instead of) loading a thumbnail.
    pub fn icon_id(self) -> IconId {
        match self {
            Category::Image => IconId::IMAGES,
            Category::Video => IconId::VIDEO,
            Category::Audio => IconId::AUDIO,
            Category::Document => IconId::DOCS,
            Category::App => IconId::APPS,
            Category::Archive => IconId::ARCHIVES,
            Category::Directory => IconId::FOLDER,
            Category::Other => IconId::MISC,
        }
    }

    /// Short lowercase name used in listings and logs.
    pub fn label(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Document => "document",
            Category::App => "app",
            Category::Archive => "archive",
            Category::Directory => "directory",
            Category::Other => "other",
        }
    }
}

/// Classifies an entry by its extension, falling back to a MIME lookup.
pub fn classify(entry: &FileEntry) -> Category {
    if entry.is_dir() {
        return Category::Directory;
    }
    match entry.extension() {
        Some(ext) => classify_extension(&ext),
        None => Category::Other,
    }
}

/// Classifies a bare extension (without the leading dot, any case).
pub fn classify_extension(ext: &str) -> Category {
    let ext = ext.to_lowercase();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "ico" | "tiff" | "tif" | "heic"
        | "heif" => Category::Image,
        "mp4" | "m4v" | "mkv" | "webm" | "avi" | "mov" | "3gp" | "3g2" | "ts" | "wmv"
        | "flv" => Category::Video,
        "mp3" | "wav" | "flac" | "ogg" | "oga" | "opus" | "aac" | "m4a" | "amr" | "mid"
        | "midi" | "wma" => Category::Audio,
        "apk" | "xapk" => Category::App,
        "zip" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "7z" | "rar" | "jar" => Category::Archive,
        "txt" | "md" | "pdf" | "doc" | "docx" | "odt" | "rtf" | "xls" | "xlsx" | "ods"
        | "ppt" | "pptx" | "odp" | "csv" | "epub" | "html" | "htm" | "xml" | "json" => {
            Category::Document
        }
        _ => classify_mime(&ext),
    }
}

/// Returns `true` for extensions that mark a directory as holding music.
pub fn is_audio_extension(ext: &str) -> bool {
    classify_extension(ext) == Category::Audio
}

fn classify_mime(ext: &str) -> Category {
    let Some(mime) = mime_guess::from_ext(ext).first() else {
        return Category::Other;
    };
    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("image", _) => Category::Image,
        ("video", _) => Category::Video,
        ("audio", _) => Category::Audio,
        ("text", _) => Category::Document,
        ("application", "vnd.android.package-archive") => Category::App,
        ("application", "zip" | "gzip" | "x-tar" | "x-7z-compressed" | "x-bzip2") => {
            Category::Archive
        }
        _ => Category::Other,
    }
}
