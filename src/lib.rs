// pathflock — a real-time multi-agent steering simulation.
//
// Thousands of point agents move under boids-style cohesion/separation while
// being steered toward target path collections (vector outlines, glyphs,
// procedural curves). Rendering, asset decoding, and GUI are external; this
// crate is the simulation core only.

pub mod engine;

pub use engine::{
    Agent, AgentSettings, Bounds, FlockAgent, FlockEngine, FollowAgent, FollowMode,
    FollowPath, PathCollection, PathFollowingFlock,
};
