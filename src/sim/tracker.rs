//! Pointer-driven spaceship movement

use glam::Vec2;

use super::state::Player;
use crate::approach;
use crate::renderer::PlayArea;

/// Eases the player toward pointer samples, throttled to ~60 Hz
#[derive(Debug, Clone)]
pub struct PositionTracker {
    smoothing_factor: f32,
    throttle_ms: u64,
    last_sample_ms: Option<u64>,
}

impl PositionTracker {
    /// `smoothing_factor` is clamped to (0, 1]
    pub fn new(smoothing_factor: f32, throttle_ms: u64) -> Self {
        let smoothing_factor = if smoothing_factor.is_finite() && smoothing_factor > 0.0 {
            smoothing_factor.min(1.0)
        } else {
            1.0
        };
        Self {
            smoothing_factor,
            throttle_ms,
            last_sample_ms: None,
        }
    }

    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    /// Apply a pointer sample given in client coordinates. Returns the new
    /// (play-area-local) position if the player moved. Samples outside the
    /// play area, or arriving within the throttle window, are dropped.
    pub fn on_pointer_sample(
        &mut self,
        player: &mut Player,
        client: Vec2,
        timestamp_ms: u64,
        area: &PlayArea,
    ) -> Option<Vec2> {
        if !area.contains_strict(client) {
            return None;
        }
        if let Some(last) = self.last_sample_ms {
            if timestamp_ms.saturating_sub(last) < self.throttle_ms {
                return None;
            }
        }
        self.last_sample_ms = Some(timestamp_ms);

        let target = area.to_local(client);
        player.pos = approach(player.pos, target, self.smoothing_factor);
        Some(player.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn area() -> PlayArea {
        PlayArea::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_smooth_sample_moves_fraction_of_gap() {
        let mut tracker = PositionTracker::new(0.2, 16);
        let mut player = Player::new(Vec2::new(400.0, 300.0), 50.0);

        let pos = tracker.on_pointer_sample(&mut player, Vec2::new(500.0, 200.0), 0, &area());
        assert_eq!(pos, Some(Vec2::new(420.0, 280.0)));
    }

    #[test]
    fn test_outside_samples_ignored() {
        let mut tracker = PositionTracker::new(1.0, 16);
        let mut player = Player::new(Vec2::new(400.0, 300.0), 50.0);

        assert!(tracker.on_pointer_sample(&mut player, Vec2::new(-5.0, 100.0), 0, &area()).is_none());
        assert!(tracker.on_pointer_sample(&mut player, Vec2::new(800.0, 100.0), 20, &area()).is_none());
        assert_eq!(player.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_throttle_drops_intermediate_samples() {
        let mut tracker = PositionTracker::new(1.0, 16);
        let mut player = Player::new(Vec2::new(400.0, 300.0), 50.0);

        assert!(tracker.on_pointer_sample(&mut player, Vec2::new(100.0, 100.0), 1000, &area()).is_some());
        assert!(tracker.on_pointer_sample(&mut player, Vec2::new(200.0, 200.0), 1010, &area()).is_none());
        assert_eq!(player.pos, Vec2::new(100.0, 100.0));
        assert!(tracker.on_pointer_sample(&mut player, Vec2::new(300.0, 300.0), 1016, &area()).is_some());
        assert_eq!(player.pos, Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_offset_play_area_uses_local_coordinates() {
        let area = PlayArea::new(100.0, 50.0, 800.0, 600.0);
        let mut tracker = PositionTracker::new(1.0, 16);
        let mut player = Player::new(Vec2::new(400.0, 300.0), 50.0);

        tracker.on_pointer_sample(&mut player, Vec2::new(150.0, 80.0), 0, &area);
        assert_eq!(player.pos, Vec2::new(50.0, 30.0));
    }

    #[test]
    fn test_direct_mode_is_idempotent() {
        let mut tracker = PositionTracker::new(1.0, 0);
        let mut player = Player::new(Vec2::new(400.0, 300.0), 50.0);
        let sample = Vec2::new(123.0, 456.0);

        for t in 0..5 {
            tracker.on_pointer_sample(&mut player, sample, t * 16, &area());
            assert_eq!(player.pos, sample);
        }
    }

    #[test]
    fn test_bad_factor_falls_back_to_direct() {
        assert_eq!(PositionTracker::new(0.0, 16).smoothing_factor(), 1.0);
        assert_eq!(PositionTracker::new(f32::NAN, 16).smoothing_factor(), 1.0);
        assert_eq!(PositionTracker::new(2.5, 16).smoothing_factor(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_interpolation_never_overshoots(
            start in (1.0f32..799.0, 1.0f32..599.0),
            sample in (1.0f32..799.0, 1.0f32..599.0),
            factor in 0.01f32..=1.0,
        ) {
            let mut tracker = PositionTracker::new(factor, 16);
            let old = Vec2::new(start.0, start.1);
            let target = Vec2::new(sample.0, sample.1);
            let mut player = Player::new(old, 50.0);

            tracker.on_pointer_sample(&mut player, target, 0, &area());

            // New position lies on the segment old -> sample
            let total = old.distance(target);
            let moved = old.distance(player.pos);
            let remaining = player.pos.distance(target);
            prop_assert!(moved <= total + 1e-3);
            prop_assert!((moved + remaining - total).abs() < 1e-2);
        }

        #[test]
        fn prop_repeated_samples_converge(
            sample in (1.0f32..799.0, 1.0f32..599.0),
            factor in 0.05f32..=1.0,
        ) {
            let mut tracker = PositionTracker::new(factor, 0);
            let target = Vec2::new(sample.0, sample.1);
            let mut player = Player::new(Vec2::new(400.0, 300.0), 50.0);

            let mut last_gap = player.pos.distance(target);
            for t in 0..20 {
                tracker.on_pointer_sample(&mut player, target, t, &area());
                let gap = player.pos.distance(target);
                prop_assert!(gap <= last_gap + 1e-3);
                last_gap = gap;
            }
        }
    }
}
