//! Display surfaces: whatever ultimately shows an icon.
//!
//! The cache only needs three things from a surface: a stable identity for
//! staleness checks, a way to set the displayed asset, and a way to set a
//! tint. Surfaces use interior mutability because the cache paints them
//! through shared `Rc` handles held by the UI.

use std::cell::{Cell, RefCell};

use crate::thumb::asset::{Tint, VisualAsset};

/// Identity of a display surface.
///
/// Recycled list rows keep their id, which is exactly what lets a newer
/// request supersede an older one for the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// A UI element that can show a [`VisualAsset`].
pub trait DisplaySurface {
    fn surface_id(&self) -> SurfaceId;

    fn set_asset(&self, asset: &VisualAsset);

    /// `None` clears any tint, which is how decoded thumbnails are shown.
    fn set_tint(&self, tint: Option<Tint>);

    /// Multiplies the displayed asset by `filter`; `None` removes it.
    ///
    /// Only used when thumbnails are disabled. Surfaces that cannot
    /// recolour their content may ignore it.
    fn set_color_filter(&self, _filter: Option<Tint>) {}
}

/// An in-memory surface that records what was painted on it.
///
/// Used by the command-line frontend and in tests.
#[derive(Debug)]
pub struct MemorySurface {
    id: SurfaceId,
    asset: RefCell<Option<VisualAsset>>,
    tint: Cell<Option<Tint>>,
    filter: Cell<Option<Tint>>,
    paints: Cell<usize>,
}

impl MemorySurface {
    pub fn new(id: SurfaceId) -> Self {
        Self {
            id,
            asset: RefCell::new(None),
            tint: Cell::new(None),
            filter: Cell::new(None),
            paints: Cell::new(0),
        }
    }

    /// The asset currently displayed.
    pub fn asset(&self) -> Option<VisualAsset> {
        self.asset.borrow().clone()
    }

    pub fn tint(&self) -> Option<Tint> {
        self.tint.get()
    }

    pub fn color_filter(&self) -> Option<Tint> {
        self.filter.get()
    }

    /// How many times an asset has been set.
    pub fn paint_count(&self) -> usize {
        self.paints.get()
    }

    /// Returns `true` if the displayed asset is `asset` (same instance).
    pub fn shows(&self, asset: &VisualAsset) -> bool {
        self.asset.borrow().as_ref().is_some_and(|a| a.ptr_eq(asset))
    }
}

impl DisplaySurface for MemorySurface {
    fn surface_id(&self) -> SurfaceId {
        self.id
    }

    fn set_asset(&self, asset: &VisualAsset) {
        *self.asset.borrow_mut() = Some(asset.clone());
        self.paints.set(self.paints.get() + 1);
    }

    fn set_tint(&self, tint: Option<Tint>) {
        self.tint.set(tint);
    }

    fn set_color_filter(&self, filter: Option<Tint>) {
        self.filter.set(filter);
    }
}
