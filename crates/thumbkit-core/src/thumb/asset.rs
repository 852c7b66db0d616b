//! Decoded visual assets and tints.

use std::sync::Arc;

use image::{Rgba, RgbaImage};

/// An RGBA colour applied to an icon's background or as a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Tint {
    pub const WHITE: Tint = Tint::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Returns the same colour with alpha set from `opacity` in `0.0..=1.0`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (255.0 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// An immutable decoded image, cheap to clone and share between the
/// bounded cache and any number of surfaces.
#[derive(Debug, Clone)]
pub struct VisualAsset(Arc<RgbaImage>);

impl VisualAsset {
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// A fully transparent square, used when a static icon cannot be loaded.
    pub fn blank(size: u32) -> Self {
        Self::new(RgbaImage::new(size, size))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    /// Returns `true` if both handles point at the same decoded image.
    pub fn ptr_eq(&self, other: &VisualAsset) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_image() {
        let a = VisualAsset::blank(4);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&VisualAsset::blank(4)));
    }

    #[test]
    fn opacity_is_clamped_and_rounded() {
        assert_eq!(Tint::WHITE.with_opacity(0.5).a, 128);
        assert_eq!(Tint::WHITE.with_opacity(2.0).a, 255);
        assert_eq!(Tint::WHITE.with_opacity(-1.0).a, 0);
    }
}
