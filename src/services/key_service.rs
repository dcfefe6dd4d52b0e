//! Short numeric key generation for uploaded objects.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;

/// Generates the 4-digit suffix of every object key.
///
/// Keys are drawn uniformly from `[1000, 1999)`, so the output is always a
/// 4-character numeric string. The keyspace is deliberately small and offers
/// no global uniqueness: a collision is a silent overwrite at the backend,
/// never an error.
///
/// The generator owns its random source, seeded once from OS entropy at
/// construction, and guards it with a mutex so cloned handles can draw from
/// concurrent requests without corrupting generator state.
#[derive(Clone)]
pub struct KeyGenerator {
    rng: Arc<Mutex<StdRng>>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Draw the next key.
    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock();
        rng.gen_range(1000..1999).to_string()
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
