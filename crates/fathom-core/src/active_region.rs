//! Tracking of the bounding box within which pressure is non-negligible.
//!
//! The engine uses this to skip substeps over quiet regions of a large
//! field. Growth only, by design — see the open question this resolves in
//! the room-level design notes: shrinking would require a second
//! neighborhood sweep per frame to confirm quiescence, which this crate
//! does not perform. [`ActiveRegion::shrink_candidate`] is a hook for that
//! future sweep and is intentionally unused today.

/// Inclusive pixel bounding box of recent activity, plus whether anything
/// has ever happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRegion {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    has_activity: bool,
}

impl ActiveRegion {
    /// An empty region with no recorded activity, within a field of the
    /// given dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        let _ = width;
        let _ = height;
        Self {
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
            has_activity: false,
        }
    }

    /// Whether any activity has been recorded since the last [`Self::reset`].
    #[inline]
    pub const fn has_activity(&self) -> bool {
        self.has_activity
    }

    /// The current inclusive bounding box, or `None` if nothing has
    /// happened yet.
    pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        self.has_activity
            .then_some((self.min_x, self.min_y, self.max_x, self.max_y))
    }

    /// Expands the tracked bounding box to cover `(x, y)` plus `margin`
    /// pixels on every side, clamped to `[0, width)` x `[0, height)`.
    ///
    /// The region only ever grows: repeated calls with points inside the
    /// current box plus margin are no-ops.
    pub fn grow(&mut self, x: u32, y: u32, margin: u32, width: u32, height: u32) {
        let x0 = x.saturating_sub(margin);
        let y0 = y.saturating_sub(margin);
        let x1 = (x + margin).min(width.saturating_sub(1));
        let y1 = (y + margin).min(height.saturating_sub(1));

        if self.has_activity {
            self.min_x = self.min_x.min(x0);
            self.min_y = self.min_y.min(y0);
            self.max_x = self.max_x.max(x1);
            self.max_y = self.max_y.max(y1);
        } else {
            self.min_x = x0;
            self.min_y = y0;
            self.max_x = x1;
            self.max_y = y1;
            self.has_activity = true;
        }
    }

    /// Expands the existing bounding box by `margin` pixels on all four
    /// sides, clamped to `[0, width)` x `[0, height)`. A no-op if nothing
    /// has happened yet — there is no box to expand.
    ///
    /// This is the frame-level wavefront-escape safety margin the scheduler
    /// applies once per frame, distinct from [`Self::grow`]'s per-impulse
    /// point expansion.
    pub fn expand_margin(&mut self, margin: u32, width: u32, height: u32) {
        if !self.has_activity {
            return;
        }
        self.min_x = self.min_x.saturating_sub(margin);
        self.min_y = self.min_y.saturating_sub(margin);
        self.max_x = (self.max_x + margin).min(width.saturating_sub(1));
        self.max_y = (self.max_y + margin).min(height.saturating_sub(1));
    }

    /// Clears all recorded activity, reverting to an empty region.
    pub fn reset(&mut self) {
        *self = Self {
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
            has_activity: false,
        };
    }

    /// Hook point for a future quiescence sweep that would allow the region
    /// to shrink back down; not implemented.
    #[allow(dead_code)]
    pub(crate) fn shrink_candidate(&self) -> Option<(u32, u32, u32, u32)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_has_no_bounds() {
        let region = ActiveRegion::new(512, 512);
        assert!(!region.has_activity());
        assert_eq!(region.bounds(), None);
    }

    #[test]
    fn grow_from_empty_sets_bounds_with_margin() {
        let mut region = ActiveRegion::new(512, 512);
        region.grow(100, 100, 10, 512, 512);
        assert_eq!(region.bounds(), Some((90, 90, 110, 110)));
    }

    #[test]
    fn grow_clamps_to_field_edges() {
        let mut region = ActiveRegion::new(64, 64);
        region.grow(2, 2, 10, 64, 64);
        let (min_x, min_y, _, _) = region.bounds().unwrap();
        assert_eq!(min_x, 0);
        assert_eq!(min_y, 0);

        region.grow(60, 60, 10, 64, 64);
        let (_, _, max_x, max_y) = region.bounds().unwrap();
        assert_eq!(max_x, 63);
        assert_eq!(max_y, 63);
    }

    #[test]
    fn region_only_grows_never_shrinks() {
        let mut region = ActiveRegion::new(512, 512);
        region.grow(256, 256, 5, 512, 512);
        let wide = region.bounds().unwrap();
        region.grow(256, 256, 1, 512, 512);
        assert_eq!(region.bounds().unwrap(), wide);
    }

    #[test]
    fn expand_margin_grows_box_on_all_sides() {
        let mut region = ActiveRegion::new(512, 512);
        region.grow(256, 256, 0, 512, 512);
        region.expand_margin(5, 512, 512);
        assert_eq!(region.bounds(), Some((251, 251, 261, 261)));
    }

    #[test]
    fn expand_margin_is_noop_without_activity() {
        let mut region = ActiveRegion::new(512, 512);
        region.expand_margin(5, 512, 512);
        assert!(!region.has_activity());
    }

    #[test]
    fn reset_clears_activity() {
        let mut region = ActiveRegion::new(512, 512);
        region.grow(10, 10, 2, 512, 512);
        region.reset();
        assert!(!region.has_activity());
    }
}
