//! Pointer gesture tracking and swipe classification.
//!
//! A [`Gesture`] lives from pointer-down to pointer-up. While the pointer is
//! down the track follows the finger (clamped pull, no cursor change); on
//! release the gesture is either a swipe, which turns into an advance, or a
//! dud, which settles back to the unchanged cursor.

use std::time::Duration;

use crate::config::SwipeOptions;
use crate::slides::Direction;

#[derive(Debug, Clone)]
pub struct Gesture {
    origin_x: f32,
    dragging: bool,
}

impl Gesture {
    pub fn begin(origin_x: f32) -> Self {
        Self {
            origin_x,
            dragging: false,
        }
    }

    /// True once the pointer has moved past the dead zone; link activation
    /// is suppressed for the rest of the gesture.
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Pull offset to render at, in percent of the viewport, clamped to
    /// ±`max-pull-percent`.
    pub fn pull(&mut self, x: f32, viewport_width: f32, opts: &SwipeOptions) -> f32 {
        let diff = x - self.origin_x;
        if diff.abs() > opts.drag_threshold_px {
            self.dragging = true;
        }
        let width = viewport_width.max(1.0);
        (diff / width * 100.0).clamp(-opts.max_pull_percent, opts.max_pull_percent)
    }

    /// Classify the released gesture. A swipe needs either a long pull, or a
    /// shorter one finished inside the flick window. Pulling left (negative)
    /// asks for the next slide.
    pub fn classify(&self, x: f32, held: Duration, opts: &SwipeOptions) -> Option<Direction> {
        let diff = x - self.origin_x;
        let swipe = diff.abs() > opts.swipe_distance_px
            || (diff.abs() > opts.flick_distance_px && held < opts.flick_window);
        if !swipe {
            return None;
        }
        Some(if diff < 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SwipeOptions {
        SwipeOptions::default()
    }

    #[test]
    fn pull_is_a_clamped_viewport_fraction() {
        let mut g = Gesture::begin(500.0);
        assert!((g.pull(430.0, 1000.0, &opts()) - -7.0).abs() < f32::EPSILON);
        assert!((g.pull(1200.0, 1000.0, &opts()) - 50.0).abs() < f32::EPSILON);
        assert!((g.pull(-600.0, 1000.0, &opts()) - -50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pull_survives_a_degenerate_viewport() {
        let mut g = Gesture::begin(0.0);
        assert!((g.pull(10.0, 0.0, &opts()) - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn dead_zone_keeps_taps_from_becoming_drags() {
        let mut g = Gesture::begin(100.0);
        g.pull(108.0, 1000.0, &opts());
        assert!(!g.dragging());
        g.pull(111.0, 1000.0, &opts());
        assert!(g.dragging());
        // Returning inside the dead zone does not undo the drag.
        g.pull(101.0, 1000.0, &opts());
        assert!(g.dragging());
    }

    #[test]
    fn long_pull_is_a_swipe_regardless_of_speed() {
        let g = Gesture::begin(500.0);
        assert_eq!(
            g.classify(449.0, Duration::from_secs(5), &opts()),
            Some(Direction::Forward)
        );
        assert_eq!(
            g.classify(551.0, Duration::from_secs(5), &opts()),
            Some(Direction::Backward)
        );
    }

    #[test]
    fn short_fast_pull_is_a_flick() {
        let g = Gesture::begin(500.0);
        assert_eq!(
            g.classify(479.0, Duration::from_millis(100), &opts()),
            Some(Direction::Forward)
        );
        // Same distance, too slow.
        assert_eq!(g.classify(479.0, Duration::from_millis(400), &opts()), None);
    }

    #[test]
    fn sub_threshold_pull_settles_back() {
        let g = Gesture::begin(500.0);
        assert_eq!(g.classify(490.0, Duration::from_millis(50), &opts()), None);
        assert_eq!(g.classify(500.0, Duration::from_millis(50), &opts()), None);
    }
}
