use engine::Vec2;
use thiserror::Error;

pub(crate) const ARRIVAL_THRESHOLD: f32 = 0.1;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum WaypointError {
    #[error("waypoint list is empty")]
    Empty,
}

/// Patrols a cyclic list of points at constant speed.
#[derive(Debug, Clone)]
pub(crate) struct WaypointCycler {
    waypoints: Vec<Vec2>,
    speed: f32,
    current_index: usize,
}

impl WaypointCycler {
    pub(crate) fn new(waypoints: Vec<Vec2>, speed: f32) -> Result<Self, WaypointError> {
        if waypoints.is_empty() {
            return Err(WaypointError::Empty);
        }
        Ok(Self {
            waypoints,
            speed: speed.max(0.0),
            current_index: 0,
        })
    }

    pub(crate) fn current_index(&self) -> usize {
        self.current_index
    }

    pub(crate) fn current_target(&self) -> Vec2 {
        self.waypoints[self.current_index]
    }

    pub(crate) fn first_point(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Advances past a reached waypoint, then steps toward the current one.
    pub(crate) fn step(&mut self, position: Vec2, dt: f32) -> Vec2 {
        if position.distance(self.current_target()) < ARRIVAL_THRESHOLD {
            self.current_index = (self.current_index + 1) % self.waypoints.len();
        }
        position.move_towards(self.current_target(), self.speed * dt.max(0.0))
    }
}
