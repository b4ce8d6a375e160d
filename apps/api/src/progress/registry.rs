//! Per-learner tracker slots.
//!
//! Each learner gets one `UserSlot`, restored from the snapshot store the
//! first time the process sees them. The slot also carries the
//! generation-in-flight flag that blocks re-submission while busy.
//! Idle slots are evicted once the cache is full.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::progress::store::SnapshotStore;
use crate::progress::tracker::ProgressTracker;

pub struct UserSlot {
    pub tracker: Mutex<ProgressTracker>,
    generating: AtomicBool,
}

impl UserSlot {
    fn new(tracker: ProgressTracker) -> Self {
        Self {
            tracker: Mutex::new(tracker),
            generating: AtomicBool::new(false),
        }
    }

    /// Claims the slot for one generation request. `None` if one is running.
    pub fn begin_generation(self: &Arc<Self>) -> Option<GenerationGuard> {
        self.generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationGuard {
                slot: Arc::clone(self),
            })
    }
}

/// Releases the generation flag when dropped, including when the request
/// future is abandoned mid-flight.
pub struct GenerationGuard {
    slot: Arc<UserSlot>,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.slot.generating.store(false, Ordering::Release);
    }
}

struct CachedSlot {
    slot: Arc<UserSlot>,
    last_used: u64,
}

/// Bounded cache of learner slots.
///
/// The map lock is never held across a store read. Past `capacity`, the
/// least recently used slots that nobody else holds are dropped; their
/// learners are restored from the store again on the next visit.
pub struct TrackerRegistry {
    store: Arc<dyn SnapshotStore>,
    key_prefix: String,
    capacity: usize,
    clock: AtomicU64,
    slots: Mutex<HashMap<Uuid, CachedSlot>>,
}

impl TrackerRegistry {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        key_prefix: impl Into<String>,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn slot_key(&self, user_id: Uuid) -> String {
        format!("{}:{}", self.key_prefix, user_id)
    }

    pub async fn cached_users(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Returns the learner's slot, restoring it from the store on first use.
    ///
    /// Two first visits racing for the same learner both read the store; the
    /// first to re-lock the map wins and the other tracker is discarded
    /// unused.
    pub async fn slot(&self, user_id: Uuid) -> Arc<UserSlot> {
        if let Some(slot) = self.cached(user_id).await {
            return slot;
        }

        let tracker = ProgressTracker::load(Arc::clone(&self.store), self.slot_key(user_id)).await;
        info!(
            "Restored {} weeks for user {user_id} from {}",
            tracker.weeks().len(),
            self.store.backend()
        );

        let tick = self.tick();
        let mut slots = self.slots.lock().await;
        let cached = slots.entry(user_id).or_insert_with(|| CachedSlot {
            slot: Arc::new(UserSlot::new(tracker)),
            last_used: tick,
        });
        cached.last_used = tick;
        let slot = Arc::clone(&cached.slot);

        if slots.len() > self.capacity {
            evict_idle(&mut slots, self.capacity);
        }
        slot
    }

    async fn cached(&self, user_id: Uuid) -> Option<Arc<UserSlot>> {
        let tick = self.tick();
        let mut slots = self.slots.lock().await;
        slots.get_mut(&user_id).map(|cached| {
            cached.last_used = tick;
            Arc::clone(&cached.slot)
        })
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

/// Drops least recently used slots until `capacity` is met. A slot whose
/// `Arc` is held outside the map is in use (a request or a generation is
/// running on it) and is never dropped.
fn evict_idle(slots: &mut HashMap<Uuid, CachedSlot>, capacity: usize) {
    let mut idle: Vec<(u64, Uuid)> = slots
        .iter()
        .filter(|(_, cached)| Arc::strong_count(&cached.slot) == 1)
        .map(|(user_id, cached)| (cached.last_used, *user_id))
        .collect();
    idle.sort_unstable();

    let excess = slots.len().saturating_sub(capacity);
    for (_, user_id) in idle.into_iter().take(excess) {
        slots.remove(&user_id);
    }
    debug!("Evicted idle tracker slots, {} cached", slots.len());
}
