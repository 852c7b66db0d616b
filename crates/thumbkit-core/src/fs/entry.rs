//! File entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

/// A single file or directory entry as handed to the icon cache.
///
/// `FileEntry` is immutable. Directory sizes are reported as `0`.
///
/// # Examples
///
/// ```
/// use thumbkit_core::FileEntry;
///
/// let entry = FileEntry::from_parts("/sdcard/Movies/clip.mp4".into(), 2048, None, false);
/// assert_eq!(entry.name(), "clip.mp4");
/// assert_eq!(entry.extension(), Some("mp4".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    size: u64,
    modified: Option<SystemTime>,
    is_dir: bool,
    is_hidden: bool,
    is_symlink: bool,
}

impl FileEntry {
    /// Creates a new `FileEntry` from a path and its metadata.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let mut entry = Self::from_parts(
            path,
            metadata.len(),
            metadata.modified().ok(),
            metadata.is_dir(),
        );
        entry.is_symlink = metadata.is_symlink();
        entry
    }

    /// Creates a `FileEntry` without touching the file system.
    ///
    /// Used by frontends that already hold a listing, and by tests.
    pub fn from_parts(path: PathBuf, size: u64, modified: Option<SystemTime>, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().nfc().collect::<String>())
            .unwrap_or_default();
        let is_hidden = name.starts_with('.');

        Self {
            path,
            name,
            size: if is_dir { 0 } else { size },
            modified,
            is_dir,
            is_hidden,
            is_symlink: false,
        }
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file or directory name (last component of the path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lowercased extension, if the name has one.
    ///
    /// Directories and dot-files without a further dot have no extension.
    pub fn extension(&self) -> Option<String> {
        if self.is_dir {
            return None;
        }
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last-modified time, if available.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Returns `true` if this entry is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn entry_from_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("photo.JPG");
        fs::write(&file_path, "hello").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path.clone(), &metadata);

        assert_eq!(entry.name(), "photo.JPG");
        assert_eq!(entry.extension().as_deref(), Some("jpg"));
        assert_eq!(entry.size(), 5);
        assert!(!entry.is_dir());
        assert!(entry.modified().is_some());
        assert_eq!(entry.path(), file_path);
    }

    #[test]
    fn entry_from_directory_has_no_size_or_extension() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("album.v2");
        fs::create_dir(&dir_path).unwrap();
        fs::write(dir_path.join("track.mp3"), "data").unwrap();

        let metadata = fs::metadata(&dir_path).unwrap();
        let entry = FileEntry::new(dir_path, &metadata);

        assert!(entry.is_dir());
        assert_eq!(entry.size(), 0);
        assert_eq!(entry.extension(), None);
    }

    #[cfg(unix)]
    #[test]
    fn entry_symlink() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target.png");
        fs::write(&target, "data").unwrap();
        let link = tmp.path().join("link.png");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let metadata = fs::symlink_metadata(&link).unwrap();
        let entry = FileEntry::new(link, &metadata);

        assert!(entry.is_symlink());
    }

    #[test]
    fn from_parts_hidden_dotfile_has_no_extension() {
        let entry = FileEntry::from_parts(PathBuf::from("/data/.nomedia"), 0, None, false);
        assert!(entry.is_hidden());
        assert_eq!(entry.extension(), None);
    }

    #[test]
    fn from_parts_dir_zero_size() {
        let entry = FileEntry::from_parts(PathBuf::from("/music/Album"), 4096, None, true);
        assert_eq!(entry.size(), 0, "directory size should always be 0");
    }

    #[test]
    fn from_parts_composes_nfd_names() {
        let decomposed = "e\u{0301}te\u{0301}.png";
        let entry = FileEntry::from_parts(PathBuf::from(format!("/pics/{decomposed}")), 1, None, false);
        assert_eq!(entry.name(), "\u{e9}t\u{e9}.png");
    }
}
