// Agent kinematics and path steering.
//
// Two layers, composed rather than inherited: `Agent` is the bare kinematic
// body (integrate / seek / accumulate), `FollowAgent` wraps a body with an
// assigned path and waypoint progress. The flock engine only talks to the
// body through the `FlockAgent` trait, so the flocking step never depends on
// which steering behavior sits on top.

use std::sync::Arc;

use glam::Vec3;

use super::path::FollowPath;
use super::settings::AgentSettings;

/// How far ahead of the agent (in velocity frames) the path-projection probe
/// sits.
const PATH_LOOK_AHEAD: f32 = 5.0;
/// How far beyond the projected point the path-follow target is pushed along
/// the segment direction. Keeps agents sliding along the path instead of
/// parking on it.
const PATH_FORWARD_OFFSET: f32 = 10.0;

// ============================================================================
// KINEMATIC BODY
// ============================================================================

/// Point-mass agent. Forces accumulate into `acc` during a frame and are
/// consumed by `integrate`.
pub struct Agent {
    pub pos: Vec3,
    pub vel: Vec3,
    pub acc: Vec3,
    settings: Arc<AgentSettings>,
}

impl Agent {
    pub fn new(pos: Vec3, settings: Arc<AgentSettings>) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            acc: Vec3::ZERO,
            settings,
        }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Accumulate one steering force for this frame.
    #[inline]
    pub fn apply(&mut self, force: Vec3) {
        self.acc += force;
    }

    /// Steering force toward a desired velocity, capped at `max_force`.
    #[inline]
    pub fn seek(&self, desired: Vec3) -> Vec3 {
        (desired - self.vel).clamp_length_max(self.settings.max_force.get())
    }

    /// Steering force toward a world-space target.
    #[inline]
    pub fn seek_position(&self, target: Vec3) -> Vec3 {
        self.seek(target - self.pos)
    }

    /// Consume accumulated forces: velocity picks up the acceleration and is
    /// capped at `max_speed`, then position advances one frame.
    pub fn integrate(&mut self) {
        self.vel += self.acc;
        self.acc = Vec3::ZERO;
        self.vel = self.vel.clamp_length_max(self.settings.max_speed.get());
        self.pos += self.vel;
    }
}

/// Capability the flock engine needs from any agent kind it hosts.
pub trait FlockAgent {
    fn spawn(pos: Vec3, settings: Arc<AgentSettings>) -> Self;
    fn body(&self) -> &Agent;
    fn body_mut(&mut self) -> &mut Agent;
}

impl FlockAgent for Agent {
    fn spawn(pos: Vec3, settings: Arc<AgentSettings>) -> Self {
        Agent::new(pos, settings)
    }

    fn body(&self) -> &Agent {
        self
    }

    fn body_mut(&mut self) -> &mut Agent {
        self
    }
}

// ============================================================================
// FOLLOW AGENT
// ============================================================================

/// Agent with an assigned target path.
///
/// `path` is `None` until the first assignment; both steering entry points
/// return `None` in that state so an unassigned agent simply flocks.
pub struct FollowAgent {
    body: Agent,
    path: Option<Arc<FollowPath>>,
    /// Current waypoint, only meaningful for discrete waypoint pursuit.
    target_index: usize,
}

impl FlockAgent for FollowAgent {
    fn spawn(pos: Vec3, settings: Arc<AgentSettings>) -> Self {
        Self {
            body: Agent::new(pos, settings),
            path: None,
            target_index: 0,
        }
    }

    fn body(&self) -> &Agent {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Agent {
        &mut self.body
    }
}

impl FollowAgent {
    pub fn path(&self) -> Option<&Arc<FollowPath>> {
        self.path.as_ref()
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Swap the assigned path. Steering context resets, kinematic state does
    /// not — assignment is a target swap, never a teleport.
    pub fn assign_path(&mut self, path: Arc<FollowPath>) {
        self.path = Some(path);
        self.target_index = 0;
    }

    /// Discrete waypoint pursuit: seek the current waypoint; once inside the
    /// path's radius (squared test) with `move_along_targets` enabled, step
    /// to the next vertex, wrapping. The returned force still aims at the
    /// waypoint that was current on entry.
    pub fn seek_waypoint(&mut self) -> Option<Vec3> {
        let path = self.path.as_ref()?;
        let verts = path.vertices();
        let target = verts[self.target_index % verts.len()];

        if self.body.settings.move_along_targets()
            && target.distance_squared(self.body.pos) < path.radius * path.radius
        {
            self.target_index = (self.target_index + 1) % verts.len();
        }

        Some(self.body.seek_position(target))
    }

    /// Continuous path projection: project a short look-ahead probe onto
    /// every segment and chase a point just beyond the nearest projection.
    ///
    /// When the perpendicular projection lands outside a segment, the
    /// candidate falls back to that segment's end vertex and aims one edge
    /// further along, so corners hand the agent over to the next edge instead
    /// of snapping it backwards.
    pub fn seek_along_path(&self) -> Option<Vec3> {
        let path = self.path.as_ref()?;
        let verts = path.vertices();
        let n = verts.len();
        let probe = self.body.pos + self.body.vel * PATH_LOOK_AHEAD;

        let mut best_dist = f32::INFINITY;
        let mut target = verts[0];

        for i in 0..n {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            let ab = b - a;
            let len_sq = ab.length_squared();

            let t = if len_sq > f32::EPSILON {
                (probe - a).dot(ab) / len_sq
            } else {
                -1.0
            };

            let (normal_point, along) = if (0.0..=1.0).contains(&t) {
                (a + ab * t, ab)
            } else {
                (b, verts[(i + 2) % n] - b)
            };

            let dist = probe.distance_squared(normal_point);
            if dist < best_dist {
                best_dist = dist;
                target = normal_point + along.normalize_or_zero() * PATH_FORWARD_OFFSET;
            }
        }

        Some(self.body.seek_position(target))
    }

    /// Squared distance from the body to its current waypoint, or `None`
    /// when unassigned. This is the read-only half of the discrete arrival
    /// query — it never advances the waypoint.
    pub fn waypoint_distance_squared(&self) -> Option<f32> {
        let path = self.path.as_ref()?;
        let verts = path.vertices();
        Some(verts[self.target_index % verts.len()].distance_squared(self.body.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Arc<AgentSettings> {
        Arc::new(AgentSettings::default())
    }

    #[test]
    fn integrate_caps_speed() {
        let shared = settings();
        shared.max_speed.set(2.0);
        shared.max_force.set(100.0);
        let mut agent = Agent::new(Vec3::ZERO, shared);
        agent.apply(Vec3::new(50.0, 0.0, 0.0));
        agent.integrate();
        assert!(agent.vel.length() <= 2.0 + 1e-5);
        assert_eq!(agent.pos, agent.vel);
    }

    #[test]
    fn seek_caps_force() {
        let shared = settings();
        shared.max_force.set(0.5);
        let agent = Agent::new(Vec3::ZERO, shared);
        let force = agent.seek_position(Vec3::new(1000.0, 0.0, 0.0));
        assert!(force.length() <= 0.5 + 1e-5);
        assert!(force.x > 0.0);
    }

    fn square_path(radius: f32) -> Arc<FollowPath> {
        let mut path = FollowPath::from_vertices(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        path.radius = radius;
        Arc::new(path)
    }

    #[test]
    fn waypoint_advances_inside_radius_and_wraps() {
        let shared = settings();
        shared.set_move_along_targets(true);
        let mut agent = FollowAgent::spawn(Vec3::ZERO, shared);
        agent.assign_path(square_path(0.1));

        // On top of waypoint 0: force aims at the old waypoint, index steps.
        agent.seek_waypoint().unwrap();
        assert_eq!(agent.target_index(), 1);

        // Walk the body around the loop; the index wraps back to 0.
        for corner in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ] {
            agent.body_mut().pos = corner;
            agent.seek_waypoint().unwrap();
        }
        assert_eq!(agent.target_index(), 0);
    }

    #[test]
    fn waypoint_holds_when_move_along_targets_disabled() {
        let shared = settings();
        shared.set_move_along_targets(false);
        let mut agent = FollowAgent::spawn(Vec3::ZERO, shared);
        agent.assign_path(square_path(0.1));
        agent.seek_waypoint().unwrap();
        agent.seek_waypoint().unwrap();
        assert_eq!(agent.target_index(), 0);
    }

    #[test]
    fn unassigned_agent_steers_nowhere() {
        let mut agent = FollowAgent::spawn(Vec3::ZERO, settings());
        assert!(agent.seek_waypoint().is_none());
        assert!(agent.seek_along_path().is_none());
        assert!(agent.waypoint_distance_squared().is_none());
    }

    #[test]
    fn reassignment_resets_progress_but_not_kinematics() {
        let shared = settings();
        let mut agent = FollowAgent::spawn(Vec3::ZERO, shared);
        agent.assign_path(square_path(10.0));
        agent.seek_waypoint().unwrap(); // inside radius, advances
        assert_eq!(agent.target_index(), 1);

        agent.body_mut().vel = Vec3::new(0.5, 0.0, 0.0);
        agent.body_mut().pos = Vec3::new(3.0, 0.0, 0.0);
        agent.assign_path(square_path(0.1));
        assert_eq!(agent.target_index(), 0);
        assert_eq!(agent.body().pos, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(agent.body().vel, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn path_projection_pulls_toward_the_loop() {
        let shared = settings();
        shared.max_force.set(10.0);
        let mut agent = FollowAgent::spawn(Vec3::new(0.5, -2.0, 0.0), shared);
        agent.assign_path(square_path(0.1));
        agent.body_mut().vel = Vec3::new(0.01, 0.0, 0.0);
        let force = agent.seek_along_path().unwrap();
        // Nearest segment is the bottom edge; the force should push up toward
        // it (and forward along +X), never further away.
        assert!(force.y > 0.0, "force {force} does not approach the path");
    }

    #[test]
    fn path_projection_hands_over_at_corners() {
        let shared = settings();
        shared.max_force.set(10.0);
        // Past the (1,0) corner, below the loop: the look-ahead point lands
        // outside every segment, so the nearest candidate is the bottom
        // edge's fallback, its end vertex (1,0,0) aiming along the right edge.
        let mut agent = FollowAgent::spawn(Vec3::new(1.5, -0.5, 0.0), shared);
        agent.assign_path(square_path(0.1));
        let force = agent.seek_along_path().unwrap();
        // A bottom-edge in-segment target would pull along +X; the handover
        // target sits up the right edge, so +Y must dominate.
        assert!(force.y > 0.0, "force {force} does not turn up the next edge");
        assert!(
            force.y > force.x.abs(),
            "force {force} still follows the previous edge"
        );
    }
}
