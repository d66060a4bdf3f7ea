//! Broadcast reception and network aggregation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Qci;
use crate::error::{McbError, McbResult};

/// Reception strength above which a broadcast counts as received
pub const RECEPTION_THRESHOLD: f64 = 0.5;

/// What one recipient got out of a broadcast.
///
/// A NaN source signal gives NaN clarity, which is never received.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reception {
    pub clarity: f64,
    pub received: bool,
}

impl Reception {
    fn from_strength(strength: f64) -> Self {
        Self {
            clarity: strength,
            received: strength > RECEPTION_THRESHOLD,
        }
    }
}

impl Qci {
    /// Reception of `source_id`'s signal at every other registered agent.
    ///
    /// Uses the source's computed signal, or its coherence level if none was
    /// computed. The payload is not interpreted.
    pub fn broadcast_signal(
        &self,
        source_id: &str,
        payload: &serde_json::Value,
    ) -> McbResult<IndexMap<String, Reception>> {
        let source = self
            .get(source_id)
            .ok_or_else(|| McbError::UnknownAgent(source_id.to_string()))?;
        let signal = source.effective_signal();
        if !signal.is_finite() {
            log::debug!("Broadcast from {} carries non-finite signal {}", source_id, signal);
        }

        let results: IndexMap<String, Reception> = self
            .agents
            .iter()
            .filter(|(id, _)| id.as_str() != source_id)
            .map(|(id, agent)| {
                let reception = Reception::from_strength(signal * agent.coherence_level());
                (id.clone(), reception)
            })
            .collect();

        log::debug!(
            "Broadcast from {} (signal {:.3}, payload {}) reached {}/{} agents",
            source_id,
            signal,
            payload,
            results.values().filter(|r| r.received).count(),
            results.len()
        );
        Ok(results)
    }

    /// Mean coherence level over all agents; 0.0 when nobody is registered
    pub fn calculate_network_coherence(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let total: f64 = self.agents().map(|a| a.coherence_level()).sum();
        total / self.len() as f64
    }
}
