//! Thumbnail extraction.
//!
//! [`ThumbnailSource`] is the closed set of things a thumbnail can be made
//! from; [`Extractors::extract`] has one handler per variant. Every handler
//! failure collapses into "no thumbnail".

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};

use crate::error::{CoreError, CoreResult};
use crate::fs::category::{classify, Category};
use crate::fs::entry::FileEntry;
use crate::thumb::album::AlbumIndex;
use crate::thumb::asset::VisualAsset;

/// What a thumbnail is extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailSource {
    Image(PathBuf),
    Video(PathBuf),
    AppPackage(PathBuf),
    /// A directory that may be a music album; carries its normalised path,
    /// which is the album index key.
    AlbumCandidate(String),
}

impl ThumbnailSource {
    /// Picks the source for `entry`, or `None` if its category has no
    /// extractor.
    pub fn for_entry(entry: &FileEntry, normalized: &str) -> Option<Self> {
        let path = entry.path().to_path_buf();
        match classify(entry) {
            Category::Image => Some(ThumbnailSource::Image(path)),
            Category::Video => Some(ThumbnailSource::Video(path)),
            Category::App => Some(ThumbnailSource::AppPackage(path)),
            Category::Directory => Some(ThumbnailSource::AlbumCandidate(normalized.to_string())),
            _ => None,
        }
    }
}

/// Extracts a single representative frame from a video file.
pub trait FrameGrabber: Send + Sync {
    /// Returns `Ok(None)` when the file has no frame to offer.
    fn grab_frame(&self, path: &Path) -> CoreResult<Option<DynamicImage>>;
}

/// Runs `ffmpeg` to pull one PNG frame through a pipe.
pub struct FfmpegFrameGrabber {
    binary: PathBuf,
    seek_seconds: f64,
}

impl FfmpegFrameGrabber {
    pub fn new(binary: PathBuf, seek_seconds: f64) -> Self {
        Self {
            binary,
            seek_seconds: seek_seconds.max(0.0),
        }
    }

    fn run(&self, path: &Path, seek: f64) -> CoreResult<Option<Vec<u8>>> {
        let output = Command::new(&self.binary)
            .args(["-v", "error", "-ss"])
            .arg(format!("{seek:.3}"))
            .arg("-i")
            .arg(path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        let output = match output {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("frame grabber {} not installed", self.binary.display());
                return Ok(None);
            }
            Err(e) => return Err(CoreError::Frame(e.to_string())),
        };

        if !output.status.success() {
            return Err(CoreError::Frame(format!(
                "{} exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        Ok((!output.stdout.is_empty()).then_some(output.stdout))
    }
}

impl FrameGrabber for FfmpegFrameGrabber {
    fn grab_frame(&self, path: &Path) -> CoreResult<Option<DynamicImage>> {
        let mut png = self.run(path, self.seek_seconds)?;
        // clips shorter than the seek offset produce no output
        if png.is_none() && self.seek_seconds > 0.0 {
            png = self.run(path, 0.0)?;
        }
        match png {
            Some(bytes) => Ok(Some(image::load_from_memory_with_format(
                &bytes,
                ImageFormat::Png,
            )?)),
            None => Ok(None),
        }
    }
}

/// The per-variant handlers, owned by the worker thread.
pub struct Extractors {
    size: u32,
    frames: Box<dyn FrameGrabber>,
    albums: Arc<AlbumIndex>,
}

impl Extractors {
    pub fn new(size: u32, frames: Box<dyn FrameGrabber>, albums: Arc<AlbumIndex>) -> Self {
        Self {
            size: size.max(1),
            frames,
            albums,
        }
    }

    /// Produces a thumbnail or `None`. Never fails.
    pub fn extract(&self, source: &ThumbnailSource) -> Option<VisualAsset> {
        match self.try_extract(source) {
            Ok(asset) => asset,
            Err(e) => {
                tracing::debug!(?source, "thumbnail extraction failed: {e}");
                None
            }
        }
    }

    fn try_extract(&self, source: &ThumbnailSource) -> CoreResult<Option<VisualAsset>> {
        match source {
            ThumbnailSource::Image(path) => image_thumbnail(path, self.size).map(Some),
            ThumbnailSource::Video(path) => Ok(self
                .frames
                .grab_frame(path)?
                .map(|frame| downsample(frame, self.size))),
            ThumbnailSource::AppPackage(path) => app_icon(path, self.size),
            ThumbnailSource::AlbumCandidate(dir) => match self.albums.album_art(dir) {
                Some(art) => image_thumbnail(&art, self.size).map(Some),
                None => Ok(None),
            },
        }
    }
}

/// Decodes an image file and shrinks it to fit in `size`×`size`.
pub fn image_thumbnail(path: &Path, size: u32) -> CoreResult<VisualAsset> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(downsample(img, size))
}

/// Extracts the launcher icon embedded in an application package.
///
/// Packages are zip archives; the highest-density launcher bitmap wins.
/// Returns `Ok(None)` when the package carries no bitmap icon.
pub fn app_icon(path: &Path, size: u32) -> CoreResult<Option<VisualAsset>> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let best = archive
        .file_names()
        .filter_map(|name| icon_score(name).map(|score| (score, name.to_string())))
        .max_by(|(a, an), (b, bn)| a.cmp(b).then_with(|| bn.cmp(an)));
    let Some((_, name)) = best else {
        return Ok(None);
    };

    let mut bytes = Vec::new();
    archive.by_name(&name)?.read_to_end(&mut bytes)?;
    let img = image::load_from_memory(&bytes)?;
    Ok(Some(downsample(img, size)))
}

/// Ranks an archive entry as a launcher icon candidate; `None` if it is
/// not one.
fn icon_score(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("res/")?;
    let (dir, file) = rest.split_once('/')?;
    if file.contains('/') || !file.ends_with(".png") {
        return None;
    }
    if !(dir.starts_with("mipmap") || dir.starts_with("drawable")) {
        return None;
    }
    let stem = file.trim_end_matches(".png");
    let name_score = match stem {
        "ic_launcher" | "icon" | "app_icon" => 2,
        "ic_launcher_round" => 1,
        _ => return None,
    };
    let density = [
        ("xxxhdpi", 6),
        ("xxhdpi", 5),
        ("xhdpi", 4),
        ("hdpi", 3),
        ("mdpi", 2),
        ("ldpi", 1),
    ]
    .iter()
    .find(|(q, _)| dir.split('-').any(|part| part == *q))
    .map_or(0, |(_, d)| *d);
    let mipmap_bonus = u32::from(dir.starts_with("mipmap"));

    Some(density * 10 + name_score * 2 + mipmap_bonus)
}

fn downsample(img: DynamicImage, size: u32) -> VisualAsset {
    let img = if img.width() > size || img.height() > size {
        img.thumbnail(size, size)
    } else {
        img
    };
    VisualAsset::new(img.to_rgba8())
}
