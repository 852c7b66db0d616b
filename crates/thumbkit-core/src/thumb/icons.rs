//! Static category icons.
//!
//! The default set (one icon per category plus the folder and the selection
//! check mark) is loaded once when the cache is built and never evicted.
//! Icons outside that set are loaded on first request and kept as well.

use std::collections::HashMap;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use crate::config::theme::IconColors;
use crate::error::CoreResult;
use crate::thumb::asset::{Tint, VisualAsset};

/// Smallest edge a built-in glyph is drawn at.
pub const MIN_ICON_SIZE: u32 = 8;

/// Largest edge a built-in glyph or placeholder is drawn at.
pub const MAX_ICON_SIZE: u32 = 512;

/// Identifier of a static icon resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconId(&'static str);

impl IconId {
    pub const APPS: IconId = IconId("category_apps");
    pub const ARCHIVES: IconId = IconId("category_archives");
    pub const AUDIO: IconId = IconId("category_audio");
    pub const DOCS: IconId = IconId("category_docs");
    pub const IMAGES: IconId = IconId("category_images");
    pub const MISC: IconId = IconId("category_misc");
    pub const VIDEO: IconId = IconId("category_video");
    pub const FOLDER: IconId = IconId("folder");
    pub const CHECK: IconId = IconId("check");

    /// Icons loaded eagerly when the set is built.
    pub const DEFAULTS: [IconId; 8] = [
        IconId::APPS,
        IconId::ARCHIVES,
        IconId::AUDIO,
        IconId::DOCS,
        IconId::IMAGES,
        IconId::MISC,
        IconId::VIDEO,
        IconId::CHECK,
    ];

    pub const fn new(name: &'static str) -> Self {
        IconId(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

/// Produces the image behind an [`IconId`].
pub trait IconLoader {
    fn load(&self, id: IconId) -> CoreResult<VisualAsset>;
}

/// Loads `<dir>/<id>.png` when an icon directory is configured and the file
/// exists, otherwise draws a built-in glyph.
pub struct BuiltinIcons {
    dir: Option<PathBuf>,
    size: u32,
}

impl BuiltinIcons {
    pub fn new(dir: Option<PathBuf>, size: u32) -> Self {
        if size > MAX_ICON_SIZE {
            tracing::warn!("icon size {size} too large, using {MAX_ICON_SIZE}");
        }
        Self {
            dir,
            size: size.clamp(MIN_ICON_SIZE, MAX_ICON_SIZE),
        }
    }

    fn glyph(&self, id: IconId) -> RgbaImage {
        let s = self.size;
        let white = Rgba([0xff, 0xff, 0xff, 0xff]);
        let mut img = RgbaImage::new(s, s);
        let m = s / 6;

        if id == IconId::FOLDER {
            // tab plus body
            fill(&mut img, m, 2 * m, s / 2, 3 * m, white);
            fill(&mut img, m, 3 * m, s - m, s - m, white);
        } else if id == IconId::CHECK {
            for i in 0..(s / 3) {
                fill(&mut img, m + i, s / 2 + i - 1, m + i + 2, s / 2 + i + 2, white);
                let x = m + s / 3 + i;
                fill(&mut img, x, s / 2 + s / 3 - 2 * i, x + 2, s / 2 + s / 3 - 2 * i + 3, white);
            }
        } else {
            // page with a per-icon number of text lines
            fill(&mut img, 2 * m, m, s - 2 * m, s - m, white);
            let clear = Rgba([0, 0, 0, 0]);
            let lines = (id.name().bytes().map(u32::from).sum::<u32>() % 3) + 1;
            for line in 0..lines {
                let y = 2 * m + line * m;
                fill(&mut img, 3 * m, y, s - 3 * m, y + (m / 3).max(1), clear);
            }
        }
        img
    }
}

impl IconLoader for BuiltinIcons {
    fn load(&self, id: IconId) -> CoreResult<VisualAsset> {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{}.png", id.name()));
            if path.is_file() {
                let img = image::open(&path)?;
                return Ok(VisualAsset::new(img.to_rgba8()));
            }
        }
        Ok(VisualAsset::new(self.glyph(id)))
    }
}

fn fill(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, px: Rgba<u8>) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.put_pixel(x, y, px);
        }
    }
}

/// A static icon with the tint painted behind it.
#[derive(Debug, Clone)]
pub struct IconData {
    pub asset: VisualAsset,
    pub tint: Tint,
    pub is_dir: bool,
}

/// The loaded static icons of one cache instance.
pub struct StaticIcons {
    loader: Box<dyn IconLoader>,
    colors: IconColors,
    icons: HashMap<IconId, IconData>,
    placeholder_size: u32,
}

impl StaticIcons {
    /// Builds the set and eagerly loads [`IconId::DEFAULTS`] plus the folder
    /// icon tinted with `folder_tint`.
    pub fn new(
        loader: Box<dyn IconLoader>,
        colors: IconColors,
        folder_tint: Tint,
        placeholder_size: u32,
    ) -> Self {
        let mut set = Self {
            loader,
            colors,
            icons: HashMap::new(),
            placeholder_size: placeholder_size.clamp(1, MAX_ICON_SIZE),
        };
        for id in IconId::DEFAULTS {
            let tint = set.colors.tint_for(id);
            set.load(id, tint, false);
        }
        set.load(IconId::FOLDER, folder_tint, true);
        set
    }

    /// Returns the icon's asset, loading it on first access.
    pub fn asset(&mut self, id: IconId) -> VisualAsset {
        self.data(id).asset
    }

    /// Returns the icon with its tint, loading it with the misc tint on
    /// first access.
    pub fn data(&mut self, id: IconId) -> IconData {
        if let Some(data) = self.icons.get(&id) {
            return data.clone();
        }
        let tint = self.colors.tint_for(IconId::MISC);
        self.load(id, tint, false)
    }

    /// Reloads the folder icon with a new background colour.
    pub fn set_directory_color(&mut self, color: Tint, opacity: f32) {
        self.icons.remove(&IconId::FOLDER);
        self.load(IconId::FOLDER, color.with_opacity(opacity), true);
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn clear(&mut self) {
        self.icons.clear();
    }

    fn load(&mut self, id: IconId, tint: Tint, is_dir: bool) -> IconData {
        match self.loader.load(id) {
            Ok(asset) => {
                let data = IconData {
                    asset,
                    tint,
                    is_dir,
                };
                self.icons.insert(id, data.clone());
                data
            }
            Err(e) => {
                tracing::warn!(icon = id.name(), "static icon failed to load: {e}");
                IconData {
                    asset: VisualAsset::blank(self.placeholder_size),
                    tint,
                    is_dir,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct CountingLoader {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl IconLoader for CountingLoader {
        fn load(&self, _id: IconId) -> CoreResult<VisualAsset> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(CoreError::Decode("broken".into()))
            } else {
                Ok(VisualAsset::blank(4))
            }
        }
    }

    fn icons(fail: bool) -> (StaticIcons, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let loader = CountingLoader {
            calls: calls.clone(),
            fail,
        };
        let set = StaticIcons::new(Box::new(loader), IconColors::default(), Tint::WHITE, 4);
        (set, calls)
    }

    #[test]
    fn oversized_icons_are_clamped() {
        let glyph = BuiltinIcons::new(None, 100_000).load(IconId::MISC).unwrap();
        assert_eq!(glyph.width(), MAX_ICON_SIZE);

        let tiny = BuiltinIcons::new(None, 0).load(IconId::MISC).unwrap();
        assert_eq!(tiny.width(), MIN_ICON_SIZE);

        let loader = CountingLoader {
            calls: Rc::new(Cell::new(0)),
            fail: true,
        };
        let mut set = StaticIcons::new(Box::new(loader), IconColors::default(), Tint::WHITE, 100_000);
        assert_eq!(set.asset(IconId::VIDEO).width(), MAX_ICON_SIZE);
    }

    #[test]
    fn defaults_are_loaded_eagerly() {
        let (set, calls) = icons(false);
        assert_eq!(calls.get(), IconId::DEFAULTS.len() + 1);
        assert_eq!(set.len(), IconId::DEFAULTS.len() + 1);
    }

    #[test]
    fn repeat_access_returns_same_instance_without_reloading() {
        let (mut set, calls) = icons(false);
        let before = calls.get();

        let a = set.asset(IconId::new("custom"));
        let b = set.asset(IconId::new("custom"));

        assert!(a.ptr_eq(&b));
        assert_eq!(calls.get(), before + 1);
    }

    #[test]
    fn failed_load_is_blank_and_not_cached() {
        let (mut set, calls) = icons(true);
        assert!(set.is_empty());
        let before = calls.get();

        let asset = set.asset(IconId::VIDEO);
        set.asset(IconId::VIDEO);

        assert_eq!(asset.width(), 4);
        assert_eq!(calls.get(), before + 2);
    }

    #[test]
    fn folder_is_marked_as_directory() {
        let (mut set, _) = icons(false);
        assert!(set.data(IconId::FOLDER).is_dir);
        assert!(!set.data(IconId::VIDEO).is_dir);
    }

    #[test]
    fn directory_color_applies_opacity() {
        let (mut set, _) = icons(false);
        set.set_directory_color(Tint::rgb(10, 20, 30), 0.5);
        let data = set.data(IconId::FOLDER);
        assert_eq!(data.tint, Tint::rgb(10, 20, 30).with_opacity(0.5));
    }

    #[test]
    fn builtin_glyphs_have_configured_size() {
        let loader = BuiltinIcons::new(None, 32);
        let asset = loader.load(IconId::FOLDER).unwrap();
        assert_eq!((asset.width(), asset.height()), (32, 32));
        assert!(asset.image().pixels().any(|p| p.0[3] == 0xff));
    }

    #[test]
    fn icon_directory_overrides_builtin() {
        let tmp = TempDir::new().unwrap();
        RgbaImage::new(5, 7)
            .save(tmp.path().join("category_video.png"))
            .unwrap();

        let loader = BuiltinIcons::new(Some(tmp.path().to_path_buf()), 48);
        let video = loader.load(IconId::VIDEO).unwrap();
        let audio = loader.load(IconId::AUDIO).unwrap();

        assert_eq!((video.width(), video.height()), (5, 7));
        assert_eq!(audio.width(), 48);
    }
}
