use glam::Vec2;

/// Boolean key state plus pointer deltas for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub boost: bool,
    /// Edge-triggered: set only on the frame the toggle key went down.
    pub toggle_physics_mode: bool,
    /// Pointer movement while orbiting, in pixels.
    pub orbit_delta: Vec2,
    /// Scroll amount; positive zooms out.
    pub zoom_delta: f32,
}

impl InputSnapshot {
    /// No keys held and no pointer movement.
    pub fn idle() -> Self {
        Self::default()
    }

    /// `-1` for left, `1` for right, `0` for neither or both.
    pub fn lateral_axis(&self) -> f32 {
        axis(self.left, self.right)
    }

    /// `-1` for down, `1` for up, `0` for neither or both.
    pub fn vertical_axis(&self) -> f32 {
        axis(self.down, self.up)
    }

    /// `1` while boosting.
    pub fn boost_axis(&self) -> f32 {
        axis(false, self.boost)
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_has_no_axes() {
        let input = InputSnapshot::idle();
        assert_eq!(input.lateral_axis(), 0.0);
        assert_eq!(input.vertical_axis(), 0.0);
        assert_eq!(input.boost_axis(), 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let input = InputSnapshot {
            left: true,
            right: true,
            up: true,
            ..Default::default()
        };
        assert_eq!(input.lateral_axis(), 0.0);
        assert_eq!(input.vertical_axis(), 1.0);
    }

    #[test]
    fn test_left_is_negative() {
        let input = InputSnapshot {
            left: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(input.lateral_axis(), -1.0);
        assert_eq!(input.vertical_axis(), -1.0);
    }
}
