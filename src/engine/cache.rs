// Background cohesion/separation cache.
//
// One worker thread per engine continuously recomputes the O(n²) neighbor
// accumulations while the main thread integrates. Exactly two `ForceBuffers`
// exist: the engine reads its *front* buffer without holding any lock, the
// worker fills its *back* buffer, and the two trade places through a
// mutex-guarded slot. The condvar lets the worker sleep once it has published
// a pass nobody has consumed yet, so an idle engine costs nothing.
//
// The worker never touches the agents themselves — it copies the position
// snapshot at pass start (brief lock) and works on that copy. A pass can
// therefore never index past its own snapshot, which is what makes adding
// agents while a pass is in flight safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

use glam::Vec3;

use super::settings::AgentSettings;

/// Accumulated neighbor contribution for one agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForceSum {
    pub sum: Vec3,
    pub count: u32,
}

/// One complete cache pass: per-agent cohesion and separation accumulations,
/// indexed by agent position in the population.
#[derive(Debug, Default)]
pub struct ForceBuffers {
    pub cohesion: Vec<ForceSum>,
    pub separation: Vec<ForceSum>,
}

impl ForceBuffers {
    /// Size both accumulations to the population and zero them. Capacity is
    /// retained, so a fixed population re-uses the same allocations forever.
    pub fn reset(&mut self, n: usize) {
        self.cohesion.clear();
        self.cohesion.resize(n, ForceSum::default());
        self.separation.clear();
        self.separation.resize(n, ForceSum::default());
    }

    pub fn len(&self) -> usize {
        self.cohesion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohesion.is_empty()
    }
}

/// Fill `out` with one full pairwise pass over `positions`.
///
/// Brute force by design: no spatial index, every pair is visited once and
/// contributes symmetrically. Cohesion accumulates neighbor positions (the
/// consumer divides to get the centroid); separation accumulates unit
/// away-vectors.
pub fn accumulate_pass(positions: &[Vec3], settings: &AgentSettings, out: &mut ForceBuffers) {
    out.reset(positions.len());

    let cohesion_d2 = settings.cohesion_distance.get().powi(2);
    let separation_d2 = settings.separation_distance.get().powi(2);

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let offset = positions[j] - positions[i];
            let dist_sq = offset.length_squared();
            if dist_sq <= f32::EPSILON {
                continue;
            }

            if dist_sq < cohesion_d2 {
                out.cohesion[i].sum += positions[j];
                out.cohesion[i].count += 1;
                out.cohesion[j].sum += positions[i];
                out.cohesion[j].count += 1;
            }

            if dist_sq < separation_d2 {
                let away = offset / dist_sq.sqrt();
                out.separation[i].sum -= away;
                out.separation[i].count += 1;
                out.separation[j].sum += away;
                out.separation[j].count += 1;
            }
        }
    }
}

// ============================================================================
// CROSS-THREAD HANDOFF
// ============================================================================

struct Slot {
    /// The buffer currently parked between the two threads. `Some` while the
    /// worker has published and is waiting, or just after the consumer traded
    /// its stale front in; `None` while both buffers are being worked on.
    parked: Option<ForceBuffers>,
    /// True when `parked` holds a completed pass the engine has not seen.
    fresh: bool,
}

/// Shared state between a flock engine and its cache worker.
pub struct CacheShared {
    positions: Mutex<Vec<Vec3>>,
    slot: Mutex<Slot>,
    consumed: Condvar,
    shutdown: AtomicBool,
}

impl CacheShared {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(Vec::new()),
            slot: Mutex::new(Slot {
                parked: None,
                fresh: false,
            }),
            consumed: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Engine side: overwrite the position snapshot the next pass will use.
    pub fn store_positions<I: IntoIterator<Item = Vec3>>(&self, positions: I) {
        let mut shared = self.positions.lock().unwrap();
        shared.clear();
        shared.extend(positions);
    }

    /// Worker side: copy the current snapshot into the pass-local scratch.
    pub fn snapshot_positions(&self, out: &mut Vec<Vec3>) {
        let shared = self.positions.lock().unwrap();
        out.clear();
        out.extend_from_slice(&shared);
    }

    /// Engine side: adopt the latest completed pass if one is waiting. The
    /// lock is held only for the swap instant; reading the front buffer
    /// afterwards is lock-free. Returns whether a fresh pass was adopted —
    /// `false` means the front buffer is simply one (or more) frames stale.
    pub fn consume(&self, front: &mut ForceBuffers) -> bool {
        let mut slot = self.slot.lock().unwrap();
        if !slot.fresh {
            return false;
        }
        if let Some(parked) = slot.parked.as_mut() {
            std::mem::swap(front, parked);
        }
        slot.fresh = false;
        self.consumed.notify_one();
        true
    }

    /// Worker side: park the completed pass and block until the engine trades
    /// its stale buffer back (or shutdown). Returns the traded buffer to
    /// compute the next pass into, or `None` when shutting down.
    pub fn publish(&self, back: ForceBuffers) -> Option<ForceBuffers> {
        let mut slot = self.slot.lock().unwrap();
        slot.parked = Some(back);
        slot.fresh = true;
        while slot.fresh {
            if self.is_shutdown() {
                return None;
            }
            slot = self.consumed.wait(slot).unwrap();
        }
        slot.parked.take()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Raise the shutdown flag and wake a worker parked in `publish`.
    pub fn begin_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.consumed.notify_all();
    }
}
