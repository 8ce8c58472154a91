// The flocking engine: agent population, per-frame integration, and the
// lifetime of the background cache worker.
//
// `update()` never waits for a pass to finish — it adopts whatever completed
// pass is parked in the handoff slot (possibly none) and steers off the front
// buffer it already owns. Staleness of a frame or two is accepted: the
// accumulated forces change smoothly, so a late pass shifts steering
// slightly, it never corrupts it.

use std::sync::Arc;
use std::thread::JoinHandle;

use glam::Vec3;

use super::agent::FlockAgent;
use super::cache::{accumulate_pass, CacheShared, ForceBuffers, ForceSum};
use super::settings::AgentSettings;

pub struct FlockEngine<A: FlockAgent> {
    agents: Vec<A>,
    settings: Arc<AgentSettings>,
    /// Master switch for the cohesion/separation forces. The worker keeps
    /// computing either way so re-enabling picks up a warm cache.
    pub do_flock: bool,
    front: ForceBuffers,
    shared: Arc<CacheShared>,
    worker: Option<JoinHandle<()>>,
}

impl<A: FlockAgent> Default for FlockEngine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: FlockAgent> FlockEngine<A> {
    pub fn new() -> Self {
        let settings = Arc::new(AgentSettings::default());
        let shared = Arc::new(CacheShared::new());
        let worker = spawn_cache_worker(shared.clone(), settings.clone());

        Self {
            agents: Vec::new(),
            settings,
            do_flock: true,
            front: ForceBuffers::default(),
            shared,
            worker: Some(worker),
        }
    }

    pub fn settings(&self) -> &Arc<AgentSettings> {
        &self.settings
    }

    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [A] {
        &mut self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Append one agent at `pos`, zero velocity, referencing the shared
    /// settings. The position snapshot is republished under its lock, so the
    /// next cache pass (never the in-flight one) sees the grown population.
    pub fn add_agent(&mut self, pos: Vec3) {
        self.agents.push(A::spawn(pos, self.settings.clone()));
        self.publish_positions();
    }

    /// One simulation tick: adopt the latest cache pass, steer, integrate.
    pub fn update(&mut self) {
        self.consume_cache();
        self.apply_flock_forces();
        self.integrate();
    }

    pub(crate) fn consume_cache(&mut self) {
        self.shared.consume(&mut self.front);
    }

    /// Cohesion pulls toward the cached neighborhood centroid, separation
    /// pushes along the cached mean away-direction at full speed. Entries
    /// missing from a stale pass (agents added since) contribute nothing.
    pub(crate) fn apply_flock_forces(&mut self) {
        if !self.do_flock {
            return;
        }

        let cohesion_amount = self.settings.cohesion_amount.get();
        let separation_amount = self.settings.separation_amount.get();
        let max_speed = self.settings.max_speed.get();

        for (i, agent) in self.agents.iter_mut().enumerate() {
            let body = agent.body_mut();

            let cohesion = self.front.cohesion.get(i).copied().unwrap_or_default();
            if cohesion.count > 0 {
                let centroid = cohesion.sum / cohesion.count as f32;
                let force = body.seek_position(centroid) * cohesion_amount;
                body.apply(force);
            }

            let separation: ForceSum =
                self.front.separation.get(i).copied().unwrap_or_default();
            if separation.count > 0 {
                let desired =
                    (separation.sum / separation.count as f32).normalize_or_zero() * max_speed;
                let force = body.seek(desired) * separation_amount;
                body.apply(force);
            }
        }
    }

    /// Integrate every body, then hand the new positions to the worker.
    pub(crate) fn integrate(&mut self) {
        for agent in &mut self.agents {
            agent.body_mut().integrate();
        }
        self.publish_positions();
    }

    fn publish_positions(&self) {
        self.shared
            .store_positions(self.agents.iter().map(|a| a.body().pos));
    }
}

impl<A: FlockAgent> Drop for FlockEngine<A> {
    fn drop(&mut self) {
        self.shared.begin_shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Worker loop: snapshot positions, run one brute-force pass into the back
/// buffer, trade it for the engine's stale buffer, repeat. The trade blocks
/// while the engine has an unconsumed pass, so the worker runs at most one
/// pass ahead of the consumer.
fn spawn_cache_worker(
    shared: Arc<CacheShared>,
    settings: Arc<AgentSettings>,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("flock-cache".into())
        .spawn(move || {
            let mut back = ForceBuffers::default();
            let mut scratch: Vec<Vec3> = Vec::new();

            while !shared.is_shutdown() {
                shared.snapshot_positions(&mut scratch);
                accumulate_pass(&scratch, &settings, &mut back);
                match shared.publish(back) {
                    Some(traded) => back = traded,
                    None => break,
                }
            }
            log::debug!("cache worker shut down");
        })
        .expect("spawn flock cache worker")
}
