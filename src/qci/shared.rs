//! Mutex-guarded tracker for concurrent callers
//!
//! Every call holds the lock for its whole duration, so a broadcast or an
//! aggregate never sees a registry that is being modified underneath it.

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AgentState, BreathingCycle, Qci, Reception};
use crate::error::McbResult;

#[derive(Debug, Clone, Default)]
pub struct SharedQci {
    inner: Arc<Mutex<Qci>>,
}

impl SharedQci {
    pub fn new(qci: Qci) -> Self {
        Self {
            inner: Arc::new(Mutex::new(qci)),
        }
    }

    // Each operation is a single field update or a read, so a panic while
    // holding the lock cannot leave the registry half-written.
    fn lock(&self) -> MutexGuard<'_, Qci> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register_agent(&self, id: &str, initial_coherence: f64) -> McbResult<AgentState> {
        self.lock().register_agent(id, initial_coherence).cloned()
    }

    pub fn get(&self, id: &str) -> Option<AgentState> {
        self.lock().get(id).cloned()
    }

    pub fn update_coherence(&self, id: &str, level: f64) -> McbResult<AgentState> {
        self.lock().update_coherence(id, level).cloned()
    }

    pub fn calculate_rov_q(&self, id: &str, resonance: f64, quality: f64) -> McbResult<f64> {
        self.lock().calculate_rov_q(id, resonance, quality)
    }

    pub fn calculate_signal(&self, id: &str, base: f64) -> McbResult<f64> {
        self.lock().calculate_signal(id, base)
    }

    pub fn broadcast_signal(&self, source_id: &str, payload: &serde_json::Value) -> McbResult<IndexMap<String, Reception>> {
        self.lock().broadcast_signal(source_id, payload)
    }

    pub fn calculate_network_coherence(&self) -> f64 {
        self.lock().calculate_network_coherence()
    }

    pub fn sync_breathing(&self, ids: &[&str], cycle: BreathingCycle) -> usize {
        self.lock().sync_breathing(ids.iter().copied(), cycle)
    }

    /// Consistent copy of the whole registry
    pub fn snapshot(&self) -> Qci {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_registration() {
        let shared = SharedQci::default();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        shared.register_agent(&format!("t{}_{}", t, i), 1.0).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.len(), 200);
        assert_eq!(shared.calculate_network_coherence(), 1.0);
    }

    #[test]
    fn test_shared_operations_delegate() {
        let shared = SharedQci::new(Qci::new());
        shared.register_agent("src", 1.0).unwrap();
        shared.register_agent("dst", 0.6).unwrap();

        assert_eq!(shared.calculate_signal("src", 1.0).unwrap(), 1.0);
        let results = shared.broadcast_signal("src", &serde_json::json!({})).unwrap();
        assert!(results["dst"].received);

        assert_eq!(shared.sync_breathing(&["src", "nope"], BreathingCycle::Hold), 1);
        assert_eq!(shared.get("src").unwrap().breathing_cycle(), Some(BreathingCycle::Hold));
        assert!(shared.update_coherence("ghost", 0.1).is_err());
    }
}
