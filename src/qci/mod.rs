//! Coherence tracker
//!
//! Holds one coherence state per registered agent and derives per-agent
//! signals, pairwise reception and a network-wide coherence score.

pub mod breathing;
pub mod broadcast;
pub mod shared;
pub mod state;
pub mod store;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{McbError, McbResult};
use crate::protocol::FlagVector;
use crate::protocol::message::validate_identifier;

pub use broadcast::{RECEPTION_THRESHOLD, Reception};
pub use shared::SharedQci;
pub use state::{AgentState, BreathingCycle};
pub use store::NetworkStore;

/// Registry of agent coherence states
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Qci {
    #[serde(default, deserialize_with = "deserialize_agents")]
    agents: IndexMap<String, AgentState>,
}

/// Every key must be a valid identifier and match the id stored under it
fn deserialize_agents<'de, D>(deserializer: D) -> Result<IndexMap<String, AgentState>, D::Error>
where
    D: Deserializer<'de>,
{
    let agents = IndexMap::<String, AgentState>::deserialize(deserializer)?;
    for (key, state) in &agents {
        validate_identifier("agent id", key).map_err(D::Error::custom)?;
        if key != state.id() {
            return Err(D::Error::custom(format!(
                "agent stored under {:?} has id {:?}",
                key,
                state.id()
            )));
        }
    }
    Ok(agents)
}

impl Qci {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`, replacing any previous state for it.
    ///
    /// Fails with `MalformedMessage` if `id` is not a `\w+` token.
    pub fn register_agent(&mut self, id: &str, initial_coherence: f64) -> McbResult<&AgentState> {
        validate_identifier("agent id", id)?;
        let state = AgentState::new(id, initial_coherence);
        if self.agents.contains_key(id) {
            log::debug!("Re-registering agent {}, previous state discarded", id);
        }
        log::debug!("Registered agent {} at coherence {:.3}", id, state.coherence_level());
        self.agents.insert(id.to_string(), state);
        Ok(&self.agents[id])
    }

    pub fn get(&self, id: &str) -> Option<&AgentState> {
        self.agents.get(id)
    }

    fn get_mut(&mut self, id: &str) -> McbResult<&mut AgentState> {
        self.agents
            .get_mut(id)
            .ok_or_else(|| McbError::UnknownAgent(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Registered agents in registration order
    pub fn agents(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// First agent holding an infinite or NaN value, with the field name
    pub fn first_non_finite(&self) -> Option<(&str, &'static str)> {
        self.agents()
            .find_map(|agent| agent.non_finite_field().map(|field| (agent.id(), field)))
    }

    /// Set a registered agent's coherence level (clamped)
    pub fn update_coherence(&mut self, id: &str, level: f64) -> McbResult<&AgentState> {
        let state = self.get_mut(id)?;
        state.set_coherence_level(level);
        Ok(state)
    }

    /// ROV-Q for a registered agent; see [`AgentState::calculate_rov_q`]
    pub fn calculate_rov_q(&mut self, id: &str, resonance: f64, quality: f64) -> McbResult<f64> {
        Ok(self.get_mut(id)?.calculate_rov_q(resonance, quality))
    }

    /// Signal for a registered agent; see [`AgentState::calculate_signal`]
    pub fn calculate_signal(&mut self, id: &str, base: f64) -> McbResult<f64> {
        Ok(self.get_mut(id)?.calculate_signal(base))
    }

    /// Display-only mapping of a coherence level onto a flag vector.
    ///
    /// Lossy and one-directional; see [`FlagVector::from_coherence`].
    pub fn coherence_to_flags(level: f64) -> FlagVector {
        FlagVector::from_coherence(level)
    }

    /// Alias of [`Qci::coherence_to_flags`]
    pub fn flags_from_coherence(level: f64) -> FlagVector {
        Self::coherence_to_flags(level)
    }
}
