//! Per-agent coherence state

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::McbError;

/// Fraction of the base signal an agent keeps at zero coherence
pub const SIGNAL_FLOOR: f64 = 0.5;

/// Clamp a coherence level into [0, 1]. NaN becomes 0.0.
pub fn clamp_coherence(level: f64) -> f64 {
    if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) }
}

fn deserialize_coherence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_coherence)
}

/// Discrete synchronization tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BreathingCycle {
    Inhale,
    Hold,
    Exhale,
}

impl BreathingCycle {
    /// Conventional successor. The tracker never advances cycles itself.
    pub fn next(self) -> Self {
        match self {
            BreathingCycle::Inhale => BreathingCycle::Hold,
            BreathingCycle::Hold => BreathingCycle::Exhale,
            BreathingCycle::Exhale => BreathingCycle::Inhale,
        }
    }
}

impl fmt::Display for BreathingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BreathingCycle::Inhale => "INHALE",
            BreathingCycle::Hold => "HOLD",
            BreathingCycle::Exhale => "EXHALE",
        };
        f.write_str(name)
    }
}

impl FromStr for BreathingCycle {
    type Err = McbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inhale" => Ok(BreathingCycle::Inhale),
            "hold" => Ok(BreathingCycle::Hold),
            "exhale" => Ok(BreathingCycle::Exhale),
            _ => Err(McbError::OutOfRangeValue {
                name: "breathing cycle",
                value: s.to_string(),
            }),
        }
    }
}

/// Coherence state of one registered agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    id: String,
    #[serde(deserialize_with = "deserialize_coherence")]
    coherence_level: f64,
    #[serde(default)]
    resonance: f64,
    #[serde(default)]
    quality: f64,
    #[serde(default)]
    rov_q: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    breathing_cycle: Option<BreathingCycle>,
}

impl AgentState {
    pub fn new(id: impl Into<String>, coherence_level: f64) -> Self {
        Self {
            id: id.into(),
            coherence_level: clamp_coherence(coherence_level),
            resonance: 0.0,
            quality: 0.0,
            rov_q: 0.0,
            signal: None,
            breathing_cycle: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn coherence_level(&self) -> f64 {
        self.coherence_level
    }

    pub fn set_coherence_level(&mut self, level: f64) {
        self.coherence_level = clamp_coherence(level);
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// Last computed ROV-Q, 0.0 until `calculate_rov_q` runs
    pub fn rov_q(&self) -> f64 {
        self.rov_q
    }

    /// Last computed signal, if any
    pub fn signal(&self) -> Option<f64> {
        self.signal
    }

    /// Signal used for broadcasting: the computed one, else the raw coherence level
    pub fn effective_signal(&self) -> f64 {
        self.signal.unwrap_or(self.coherence_level)
    }

    pub fn breathing_cycle(&self) -> Option<BreathingCycle> {
        self.breathing_cycle
    }

    /// Name of the first stored number that is infinite or NaN
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("resonance", self.resonance),
            ("quality", self.quality),
            ("rov_q", self.rov_q),
            ("signal", self.signal.unwrap_or(0.0)),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }

    pub(crate) fn set_breathing_cycle(&mut self, cycle: BreathingCycle) {
        self.breathing_cycle = Some(cycle);
    }

    /// Store resonance and quality, return `resonance * quality * coherence`.
    ///
    /// Any zero factor zeroes the result.
    pub fn calculate_rov_q(&mut self, resonance: f64, quality: f64) -> f64 {
        self.resonance = resonance;
        self.quality = quality;
        self.rov_q = resonance * quality * self.coherence_level;
        self.rov_q
    }

    /// `base * (0.5 + 0.5 * coherence)`: coherence attenuates by at most half
    pub fn calculate_signal(&mut self, base: f64) -> f64 {
        let signal = base * (SIGNAL_FLOOR + (1.0 - SIGNAL_FLOOR) * self.coherence_level);
        self.signal = Some(signal);
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_coherence() {
        assert_eq!(AgentState::new("x", 1.7).coherence_level(), 1.0);
        assert_eq!(AgentState::new("x", -0.3).coherence_level(), 0.0);
        assert_eq!(AgentState::new("x", f64::NAN).coherence_level(), 0.0);
        assert_eq!(AgentState::new("x", 0.42).coherence_level(), 0.42);
    }

    #[test]
    fn test_set_coherence_clamps() {
        let mut state = AgentState::new("x", 0.5);
        state.set_coherence_level(3.0);
        assert_eq!(state.coherence_level(), 1.0);
        state.set_coherence_level(-1.0);
        assert_eq!(state.coherence_level(), 0.0);
    }

    #[test]
    fn test_rov_q() {
        let mut state = AgentState::new("x", 0.5);
        let rov_q = state.calculate_rov_q(0.8, 0.5);
        assert!((rov_q - 0.2).abs() < 1e-12);
        assert_eq!(state.resonance(), 0.8);
        assert_eq!(state.quality(), 0.5);
        assert_eq!(state.rov_q(), rov_q);

        assert_eq!(state.calculate_rov_q(0.0, 0.9), 0.0);
    }

    #[test]
    fn test_signal_range() {
        let mut silent = AgentState::new("a", 0.0);
        assert_eq!(silent.calculate_signal(2.0), 1.0);

        let mut full = AgentState::new("b", 1.0);
        assert_eq!(full.calculate_signal(2.0), 2.0);

        let mut half = AgentState::new("c", 0.5);
        assert_eq!(half.calculate_signal(1.0), 0.75);
        assert_eq!(half.signal(), Some(0.75));
    }

    #[test]
    fn test_effective_signal_defaults_to_coherence() {
        let mut state = AgentState::new("x", 0.6);
        assert_eq!(state.effective_signal(), 0.6);
        state.calculate_signal(1.0);
        assert!((state.effective_signal() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_breathing_cycle_parse_and_next() {
        assert_eq!("INHALE".parse::<BreathingCycle>().unwrap(), BreathingCycle::Inhale);
        assert_eq!("hold".parse::<BreathingCycle>().unwrap(), BreathingCycle::Hold);
        assert!("sneeze".parse::<BreathingCycle>().is_err());
        assert_eq!(BreathingCycle::Exhale.next(), BreathingCycle::Inhale);
        assert_eq!(BreathingCycle::Inhale.to_string(), "INHALE");
    }

    #[test]
    fn test_non_finite_field() {
        let mut state = AgentState::new("x", 0.5);
        assert_eq!(state.non_finite_field(), None);

        state.calculate_rov_q(f64::INFINITY, 1.0);
        assert_eq!(state.non_finite_field(), Some("resonance"));

        let mut state = AgentState::new("y", 0.5);
        state.calculate_signal(f64::NAN);
        assert_eq!(state.non_finite_field(), Some("signal"));
    }

    #[test]
    fn test_deserialize_clamps() {
        let state: AgentState = serde_json::from_str(r#"{"id": "x", "coherence_level": 4.0}"#).unwrap();
        assert_eq!(state.coherence_level(), 1.0);
        assert_eq!(state.signal(), None);
        assert_eq!(state.breathing_cycle(), None);
    }
}
