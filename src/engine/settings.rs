// Live-tunable movement parameters shared by every agent and by the
// background cache worker.
//
// The worker reads the two distance thresholds mid-pass without any
// synchronization beyond the atomic load, so a value changed on the main
// thread may take effect one pass late. The parameters are pure steering
// weights, never control flow, so a stale read only shifts forces slightly.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// An `f32` parameter stored as raw bits in an `AtomicU32`.
///
/// All accesses are relaxed: there is no ordering dependency between
/// parameters, each load just wants *some* recently written value.
pub struct Param(AtomicU32);

impl Param {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// The shared settings record. One instance lives in an `Arc`; agents and the
/// cache worker hold handles, nobody owns a private copy.
pub struct AgentSettings {
    /// Velocity magnitude cap applied after integration (units/frame).
    pub max_speed: Param,
    /// Cap on any single steering force before it is accumulated.
    pub max_force: Param,
    /// Neighbors inside this range pull the agent toward their centroid.
    pub cohesion_distance: Param,
    /// Neighbors inside this range push the agent away.
    pub separation_distance: Param,
    pub cohesion_amount: Param,
    pub separation_amount: Param,
    /// Whether reaching a waypoint advances a follow agent to the next one.
    pub move_along_targets: AtomicBool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_speed: Param::new(10.0),
            max_force: Param::new(1.0),
            cohesion_distance: Param::new(64.0),
            separation_distance: Param::new(24.0),
            cohesion_amount: Param::new(0.5),
            separation_amount: Param::new(1.0),
            move_along_targets: AtomicBool::new(true),
        }
    }
}

impl AgentSettings {
    #[inline]
    pub fn move_along_targets(&self) -> bool {
        self.move_along_targets.load(Ordering::Relaxed)
    }

    pub fn set_move_along_targets(&self, value: bool) {
        self.move_along_targets.store(value, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_round_trips_bits() {
        let p = Param::new(3.25);
        assert_eq!(p.get(), 3.25);
        p.set(-0.0625);
        assert_eq!(p.get(), -0.0625);
    }

    #[test]
    fn settings_are_shared_through_a_handle() {
        let settings = std::sync::Arc::new(AgentSettings::default());
        let handle = settings.clone();
        handle.max_speed.set(2.0);
        assert_eq!(settings.max_speed.get(), 2.0);
    }
}
