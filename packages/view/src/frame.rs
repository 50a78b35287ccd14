//! Map framing: when to fit the view to the event bounds.
//!
//! The map should re-fit when the bounds of the filtered set change or when
//! the user asks for a reset. Otherwise the user's own pan/zoom is left
//! alone.

use quake_map_quake_models::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::ViewConfig;

/// Monotonically increasing "reset view" counter from the control surface.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ResetToken(pub u64);

impl ResetToken {
    /// The token for the next reset request.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A camera instruction for the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewFrame {
    /// Fit the camera to `bounds`.
    Fit {
        bounds: BoundingBox,
        padding_px: u32,
        max_zoom: u8,
    },
    /// Show the whole world.
    World { center: [f64; 2], zoom: u8 },
}

/// Picks the frame for the given bounds.
#[must_use]
pub const fn frame_for(bounds: Option<BoundingBox>, config: &ViewConfig) -> ViewFrame {
    match bounds {
        Some(bounds) => ViewFrame::Fit {
            bounds,
            padding_px: config.fit_padding_px,
            max_zoom: config.fit_max_zoom,
        },
        None => ViewFrame::World {
            center: config.world_center,
            zoom: config.world_zoom,
        },
    }
}

/// Remembers the last bounds and reset token so a frame is emitted only
/// when one of them changes.
#[derive(Debug, Default)]
pub struct FrameTracker {
    last: Option<(Option<BoundingBox>, ResetToken)>,
}

impl FrameTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns the frame to apply, or `None` to preserve the current view.
    pub fn update(
        &mut self,
        bounds: Option<BoundingBox>,
        reset: ResetToken,
        config: &ViewConfig,
    ) -> Option<ViewFrame> {
        let current = (bounds, reset);
        if self.last == Some(current) {
            return None;
        }
        self.last = Some(current);
        Some(frame_for(bounds, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_fall_back_to_world_view() {
        let config = ViewConfig::default();
        assert_eq!(
            frame_for(None, &config),
            ViewFrame::World {
                center: [20.0, 0.0],
                zoom: 2,
            }
        );
    }

    #[test]
    fn fit_uses_configured_padding_and_zoom_cap() {
        let config = ViewConfig::default();
        let bounds = BoundingBox::new(-5.0, 20.0, 10.0, 30.0);
        assert_eq!(
            frame_for(Some(bounds), &config),
            ViewFrame::Fit {
                bounds,
                padding_px: 20,
                max_zoom: 6,
            }
        );
    }

    #[test]
    fn tracker_refits_only_on_bounds_change_or_reset() {
        let config = ViewConfig::default();
        let mut tracker = FrameTracker::new();
        let bounds = Some(BoundingBox::new(-5.0, 20.0, 10.0, 30.0));
        let reset = ResetToken::default();

        assert!(tracker.update(bounds, reset, &config).is_some());
        assert!(tracker.update(bounds, reset, &config).is_none());

        let reset = reset.next();
        assert!(tracker.update(bounds, reset, &config).is_some());
        assert!(tracker.update(bounds, reset, &config).is_none());

        let moved = Some(BoundingBox::new(-6.0, 20.0, 10.0, 30.0));
        assert!(tracker.update(moved, reset, &config).is_some());
    }
}
