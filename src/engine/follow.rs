// Path-following specialization of the flock engine.
//
// Owns the ordered list of target collections and the assignment of agents to
// them. Each tick layers one follow force per agent on top of the flocking
// forces, selected by `follow_mode`.

use glam::Vec3;

use super::agent::{FlockAgent, FollowAgent};
use super::flock::FlockEngine;
use super::path::PathCollection;
use super::settings::AgentSettings;

/// Which steering behavior runs on top of the flocking forces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FollowMode {
    #[default]
    None,
    /// Discrete waypoint pursuit: seek vertices one at a time.
    TargetFollow,
    /// Continuous projection: hug the path without snapping to vertices.
    PathFollow,
}

pub struct PathFollowingFlock {
    engine: FlockEngine<FollowAgent>,
    collections: Vec<PathCollection>,
    pub follow_mode: FollowMode,
    /// Scale on the follow force, independent of the flocking weights.
    pub follow_amount: f32,
}

impl Default for PathFollowingFlock {
    fn default() -> Self {
        Self::new()
    }
}

impl PathFollowingFlock {
    pub fn new() -> Self {
        Self {
            engine: FlockEngine::new(),
            collections: Vec::new(),
            follow_mode: FollowMode::default(),
            follow_amount: 1.0,
        }
    }

    // Engine surface, re-exposed so callers only deal with one type.

    pub fn add_agent(&mut self, pos: Vec3) {
        self.engine.add_agent(pos);
    }

    pub fn agents(&self) -> &[FollowAgent] {
        self.engine.agents()
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn settings(&self) -> &std::sync::Arc<AgentSettings> {
        self.engine.settings()
    }

    pub fn set_do_flock(&mut self, enabled: bool) {
        self.engine.do_flock = enabled;
    }

    // Collection management.

    /// Take ownership of a collection; returns the index it was assigned.
    pub fn add_path_collection(&mut self, collection: PathCollection) -> usize {
        self.collections.push(collection);
        self.collections.len() - 1
    }

    /// Replace the collection at `index` wholesale (live reload). Agents
    /// assigned to the old geometry keep steering toward it until the next
    /// explicit `assign_agents_to_collection` — replacement never reassigns.
    pub fn set_path_collection(&mut self, index: usize, collection: PathCollection) {
        assert!(
            index < self.collections.len(),
            "path collection index {index} out of range ({} collections)",
            self.collections.len()
        );
        self.collections[index] = collection;
    }

    pub fn collection(&self, index: usize) -> &PathCollection {
        &self.collections[index]
    }

    pub fn collections(&self) -> &[PathCollection] {
        &self.collections
    }

    /// Assign every agent a path from the collection at `index`, resetting
    /// waypoint progress but leaving kinematics untouched.
    ///
    /// With `distribute_individually` the agents spread across the
    /// collection's paths in proportion to vertex count, so denser paths
    /// receive more agents; with at least as many agents as paths every path
    /// gets at least one. Without it, everyone follows the first path.
    pub fn assign_agents_to_collection(&mut self, index: usize, distribute_individually: bool) {
        assert!(
            index < self.collections.len(),
            "path collection index {index} out of range ({} collections)",
            self.collections.len()
        );
        let collection = &self.collections[index];
        assert!(
            !collection.is_empty(),
            "cannot assign agents to empty path collection {index}"
        );

        let paths = collection.paths();
        log::info!(
            "assigning {} agents to collection {index} ({} paths, individual={distribute_individually})",
            self.engine.len(),
            paths.len()
        );

        if !distribute_individually {
            let path = paths[0].clone();
            for agent in self.engine.agents_mut() {
                agent.assign_path(path.clone());
            }
            return;
        }

        // Greedy weighted fill: each agent goes to the path with the lowest
        // assigned/weight ratio, which tracks the vertex-count proportions
        // and touches every path before any path doubles up.
        let weights: Vec<f32> = paths
            .iter()
            .map(|p| p.vertices().len().max(1) as f32)
            .collect();
        let mut assigned = vec![0u32; paths.len()];

        for agent in self.engine.agents_mut() {
            let (best, _) = assigned
                .iter()
                .zip(&weights)
                .map(|(&a, &w)| a as f32 / w)
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .expect("collection verified non-empty");
            assigned[best] += 1;
            agent.assign_path(paths[best].clone());
        }
    }

    /// One tick: flocking forces from the cache, then the follow force,
    /// then integration.
    pub fn update(&mut self) {
        self.engine.consume_cache();
        self.engine.apply_flock_forces();
        self.apply_follow_forces();
        self.engine.integrate();
    }

    fn apply_follow_forces(&mut self) {
        if self.follow_mode == FollowMode::None {
            return;
        }
        let amount = self.follow_amount;

        for agent in self.engine.agents_mut() {
            let force = match self.follow_mode {
                FollowMode::TargetFollow => agent.seek_waypoint(),
                FollowMode::PathFollow => agent.seek_along_path(),
                FollowMode::None => unreachable!(),
            };
            if let Some(force) = force {
                agent.body_mut().apply(force * amount);
            }
        }
    }

    /// Whether every agent sits within `threshold` of its current discrete
    /// waypoint. Valid in any follow mode: this reads waypoint distances
    /// directly and never touches `move_along_targets` or the mode flag.
    /// Unassigned agents count as not arrived.
    pub fn agents_at_destination(&self, threshold: f32) -> bool {
        let threshold_sq = threshold * threshold;
        self.engine.agents().iter().all(|agent| {
            agent
                .waypoint_distance_squared()
                .is_some_and(|d| d < threshold_sq)
        })
    }
}
