// Headless demo: a path-following flock cycling through procedural target
// collections, logging instead of rendering. A real front end would read
// agent positions after each update and draw them; here we just report.

use glam::Vec3;
use rand::Rng;

use pathflock::engine::shapes::{archimedean_sphere, icosphere_outlines};
use pathflock::{FlockAgent, FollowMode, FollowPath, PathCollection, PathFollowingFlock};

const NUM_AGENTS: usize = 2_000;
const TICKS_PER_COLLECTION: usize = 600;
const REPORT_EVERY: usize = 60;
const ARRIVAL_THRESHOLD: f32 = 4.0;

fn build_collections(flock: &mut PathFollowingFlock) {
    // Icosphere wireframe: every triangle is its own small loop.
    let mut sphere = PathCollection::new();
    sphere.add_outlines_default(&icosphere_outlines(180.0, 1));
    sphere.center_points(Vec3::ZERO);
    flock.add_path_collection(sphere);

    // One long spiral winding, dense enough to adopt directly.
    let mut spiral = PathCollection::new();
    let winding = archimedean_sphere(NUM_AGENTS, 180.0, 20);
    spiral.add_path(FollowPath::from_vertices(winding).expect("spiral winding is non-degenerate"));
    spiral.center_points(Vec3::ZERO);
    flock.add_path_collection(spiral);
}

fn main() {
    env_logger::init();

    let mut flock = PathFollowingFlock::new();
    flock.follow_mode = FollowMode::TargetFollow;
    flock.follow_amount = 1.0;

    let mut rng = rand::thread_rng();
    for _ in 0..NUM_AGENTS {
        flock.add_agent(Vec3::new(
            rng.gen_range(-200.0..200.0),
            rng.gen_range(-200.0..200.0),
            rng.gen_range(-200.0..200.0),
        ));
    }

    build_collections(&mut flock);
    log::info!(
        "flock ready: {} agents, {} collections",
        flock.len(),
        flock.collections().len()
    );

    for index in 0..flock.collections().len() {
        flock.assign_agents_to_collection(index, true);
        log::info!(
            "collection {index}: {} paths, {} vertices, {:.0} total length",
            flock.collection(index).len(),
            flock.collection(index).total_vertices(),
            flock.collection(index).total_length()
        );

        for tick in 0..TICKS_PER_COLLECTION {
            flock.update();

            if tick % REPORT_EVERY == 0 {
                let arrived = flock.agents_at_destination(ARRIVAL_THRESHOLD);
                let mean_speed: f32 = flock
                    .agents()
                    .iter()
                    .map(|a| a.body().vel.length())
                    .sum::<f32>()
                    / flock.len() as f32;
                log::info!(
                    "collection {index} tick {tick}: mean speed {mean_speed:.2}, arrived={arrived}"
                );
            }
        }
    }

    log::info!("demo finished");
}
