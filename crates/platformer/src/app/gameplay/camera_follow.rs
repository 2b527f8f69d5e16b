use engine::{BoundaryRect, Camera2D, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

const MIN_SMOOTH_TIME: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CameraFollowSettings {
    pub offset: Vec2,
    pub smooth_speed: f32,
    pub use_smooth_damp: bool,
    pub smooth_time: f32,
    pub use_boundary: bool,
    pub boundary: BoundaryRect,
    pub ortho_half_height: f32,
}

impl Default for CameraFollowSettings {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.0, 3.0),
            smooth_speed: 5.0,
            use_smooth_damp: true,
            smooth_time: 0.3,
            use_boundary: true,
            boundary: BoundaryRect {
                min_x: -10.0,
                max_x: 100.0,
                min_y: -5.0,
                max_y: 20.0,
            },
            ortho_half_height: 5.0,
        }
    }
}

/// Follows a target with an offset and keeps the view inside an optional world boundary.
#[derive(Debug)]
pub(crate) struct CameraFollower {
    settings: CameraFollowSettings,
    damp_velocity: Vec2,
    missing_target_logged: bool,
}

impl CameraFollower {
    pub(crate) fn new(settings: CameraFollowSettings) -> Self {
        Self {
            settings,
            damp_velocity: Vec2::ZERO,
            missing_target_logged: false,
        }
    }

    pub(crate) fn settings(&self) -> &CameraFollowSettings {
        &self.settings
    }

    pub(crate) fn set_boundary(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32) {
        self.settings.boundary = BoundaryRect {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        info!(min_x, max_x, min_y, max_y, "camera_boundary_set");
    }

    pub(crate) fn set_boundary_enabled(&mut self, enabled: bool) {
        self.settings.use_boundary = enabled;
        info!(enabled, "camera_boundary_toggled");
    }

    /// Boundary to draw as a debug gizmo, if clamping is active.
    pub(crate) fn boundary_gizmo(&self) -> Option<BoundaryRect> {
        self.settings.use_boundary.then_some(self.settings.boundary)
    }

    /// Places the camera on the target immediately, without smoothing.
    pub(crate) fn snap(&mut self, camera: &mut Camera2D, target: Vec2, aspect_ratio: f32) {
        camera.orthographic_half_height = self.settings.ortho_half_height;
        self.damp_velocity = Vec2::ZERO;
        camera.position = self.clamped(camera, target + self.settings.offset, aspect_ratio);
    }

    pub(crate) fn follow(
        &mut self,
        camera: &mut Camera2D,
        target: Option<Vec2>,
        dt: f32,
        aspect_ratio: f32,
    ) {
        let Some(target) = target else {
            if !self.missing_target_logged {
                error!("camera_follow_target_missing");
                self.missing_target_logged = true;
            }
            return;
        };

        let desired = target + self.settings.offset;
        let smoothed = if self.settings.use_smooth_damp {
            Vec2::new(
                smooth_damp(
                    camera.position.x,
                    desired.x,
                    &mut self.damp_velocity.x,
                    self.settings.smooth_time,
                    dt,
                ),
                smooth_damp(
                    camera.position.y,
                    desired.y,
                    &mut self.damp_velocity.y,
                    self.settings.smooth_time,
                    dt,
                ),
            )
        } else {
            camera
                .position
                .lerp(desired, self.settings.smooth_speed * dt.max(0.0))
        };
        camera.position = self.clamped(camera, smoothed, aspect_ratio);
    }

    fn clamped(&self, camera: &Camera2D, position: Vec2, aspect_ratio: f32) -> Vec2 {
        if !self.settings.use_boundary {
            return position;
        }
        clamp_camera_position(
            position,
            &self.settings.boundary,
            camera.visible_half_extents(aspect_ratio),
        )
    }
}

/// Keeps the visible rectangle inside `boundary`; an axis whose view is wider than the boundary is
/// centered instead.
pub(crate) fn clamp_camera_position(
    position: Vec2,
    boundary: &BoundaryRect,
    half_extents: Vec2,
) -> Vec2 {
    Vec2::new(
        clamp_axis(position.x, boundary.min_x, boundary.max_x, half_extents.x),
        clamp_axis(position.y, boundary.min_y, boundary.max_y, half_extents.y),
    )
}

fn clamp_axis(value: f32, min: f32, max: f32, half_extent: f32) -> f32 {
    let low = min + half_extent;
    let high = max - half_extent;
    if low > high {
        (min + max) / 2.0
    } else {
        value.clamp(low, high)
    }
}

/// Critically damped approach with time constant `smooth_time` (Game Programming Gems 4
/// approximation of `exp`). Never steps past `target`.
pub(crate) fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        return target;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const ASPECT: f32 = 16.0 / 9.0;

    fn camera() -> Camera2D {
        Camera2D::default()
    }

    #[test]
    fn clamp_keeps_view_inside_boundary() {
        let boundary = BoundaryRect {
            min_x: -10.0,
            max_x: 100.0,
            min_y: -5.0,
            max_y: 20.0,
        };
        let half = camera().visible_half_extents(ASPECT);
        for target in [
            Vec2::new(-50.0, -50.0),
            Vec2::new(500.0, 500.0),
            Vec2::new(40.0, 3.0),
        ] {
            let clamped = clamp_camera_position(target, &boundary, half);
            let view = BoundaryRect {
                min_x: clamped.x - half.x,
                max_x: clamped.x + half.x,
                min_y: clamped.y - half.y,
                max_y: clamped.y + half.y,
            };
            assert!(boundary.contains_rect(&view, 1e-4), "{target:?} -> {clamped:?}");
        }
    }

    #[test]
    fn clamp_centers_axis_when_boundary_is_too_small() {
        let boundary = BoundaryRect {
            min_x: 0.0,
            max_x: 4.0,
            min_y: 0.0,
            max_y: 6.0,
        };
        let clamped = clamp_camera_position(Vec2::new(50.0, -3.0), &boundary, Vec2::new(8.0, 5.0));
        assert_eq!(clamped, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn smooth_damp_approaches_without_overshoot() {
        let mut velocity = 0.0;
        let mut value = 0.0;
        let mut previous_gap = 10.0f32;
        for _ in 0..300 {
            value = smooth_damp(value, 10.0, &mut velocity, 0.3, DT);
            assert!(value <= 10.0);
            let gap = 10.0 - value;
            assert!(gap <= previous_gap + 1e-5);
            previous_gap = gap;
        }
        assert!((value - 10.0).abs() < 1e-3);
    }

    #[test]
    fn smooth_damp_with_zero_dt_is_identity() {
        let mut velocity = 3.0;
        assert_eq!(smooth_damp(1.0, 5.0, &mut velocity, 0.3, 0.0), 1.0);
        assert_eq!(velocity, 3.0);
    }

    #[test]
    fn smooth_damp_snaps_and_stops_when_step_would_cross_target() {
        let mut velocity = 100.0;
        let value = smooth_damp(9.9, 10.0, &mut velocity, 0.3, 0.5);
        assert_eq!(value, 10.0);
        assert_eq!(velocity, 0.0);
    }

    #[test]
    fn lerp_mode_moves_fraction_of_gap() {
        let mut follower = CameraFollower::new(CameraFollowSettings {
            use_smooth_damp: false,
            use_boundary: false,
            offset: Vec2::ZERO,
            ..CameraFollowSettings::default()
        });
        let mut cam = camera();
        follower.follow(&mut cam, Some(Vec2::new(10.0, 0.0)), 0.1, ASPECT);
        assert!((cam.position.x - 5.0).abs() < 1e-5);

        follower.follow(&mut cam, Some(Vec2::new(10.0, 0.0)), 1.0, ASPECT);
        assert_eq!(cam.position.x, 10.0);
    }

    #[test]
    fn follow_applies_offset_and_leaves_depth() {
        let mut follower = CameraFollower::new(CameraFollowSettings {
            use_boundary: false,
            ..CameraFollowSettings::default()
        });
        let mut cam = camera();
        for _ in 0..600 {
            follower.follow(&mut cam, Some(Vec2::new(20.0, 1.0)), DT, ASPECT);
        }
        assert!((cam.position.x - 20.0).abs() < 1e-3);
        assert!((cam.position.y - 4.0).abs() < 1e-3);
        assert_eq!(cam.depth, -10.0);
    }

    #[test]
    fn missing_target_leaves_camera_untouched() {
        let mut follower = CameraFollower::new(CameraFollowSettings::default());
        let mut cam = camera();
        cam.position = Vec2::new(1.0, 2.0);
        follower.follow(&mut cam, None, DT, ASPECT);
        follower.follow(&mut cam, None, DT, ASPECT);
        assert_eq!(cam.position, Vec2::new(1.0, 2.0));
        assert!(follower.missing_target_logged);
    }

    #[test]
    fn boundary_can_be_replaced_and_disabled_at_runtime() {
        let mut follower = CameraFollower::new(CameraFollowSettings {
            use_smooth_damp: false,
            offset: Vec2::ZERO,
            ..CameraFollowSettings::default()
        });
        let mut cam = camera();
        follower.set_boundary(0.0, 4.0, 0.0, 4.0);
        follower.follow(&mut cam, Some(Vec2::new(50.0, 50.0)), 1.0, ASPECT);
        assert_eq!(cam.position, Vec2::new(2.0, 2.0));
        assert!(follower.boundary_gizmo().is_some());

        follower.set_boundary_enabled(false);
        follower.follow(&mut cam, Some(Vec2::new(50.0, 50.0)), 1.0, ASPECT);
        assert_eq!(cam.position, Vec2::new(50.0, 50.0));
        assert!(follower.boundary_gizmo().is_none());
    }

    #[test]
    fn snap_places_camera_at_clamped_offset_target() {
        let mut follower = CameraFollower::new(CameraFollowSettings::default());
        let mut cam = camera();
        follower.snap(&mut cam, Vec2::new(-20.0, 1.0), ASPECT);
        let half = cam.visible_half_extents(ASPECT);
        assert!((cam.position.x - (-10.0 + half.x)).abs() < 1e-4);
        assert!((cam.position.y - 4.0).abs() < 1e-4);
    }
}
