// Flocking/steering engine core.
//
// `flock` owns the population and the background force cache, `follow` layers
// path steering on top, `path` normalizes external geometry into steerable
// targets, `shapes` generates the built-in procedural ones.

pub mod agent;
pub mod cache;
pub mod flock;
pub mod follow;
pub mod path;
pub mod settings;
pub mod shapes;

// Re-export the surface most callers need.
pub use agent::{Agent, FlockAgent, FollowAgent};
pub use flock::FlockEngine;
pub use follow::{FollowMode, PathFollowingFlock};
pub use path::{Bounds, FollowPath, PathCollection, DEFAULT_RADIUS, DEFAULT_SPACING};
pub use settings::AgentSettings;
