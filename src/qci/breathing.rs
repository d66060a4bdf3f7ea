//! Breathing synchronization
//!
//! Tags a group of agents with a shared cycle. Best effort: unknown ids are
//! skipped, and nothing ever advances a cycle on its own.

use super::Qci;
use super::state::BreathingCycle;

impl Qci {
    /// Set `cycle` on every registered id in `ids`; returns how many were tagged
    pub fn sync_breathing<I, S>(&mut self, ids: I, cycle: BreathingCycle) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tagged = 0;
        for id in ids {
            let id = id.as_ref();
            match self.agents.get_mut(id) {
                Some(state) => {
                    state.set_breathing_cycle(cycle);
                    tagged += 1;
                }
                None => log::debug!("sync_breathing: skipping unregistered agent {}", id),
            }
        }
        log::debug!("Synchronized {} agents to {}", tagged, cycle);
        tagged
    }

    /// Registered ids currently in `cycle`
    pub fn agents_in_cycle(&self, cycle: BreathingCycle) -> Vec<&str> {
        self.agents()
            .filter(|a| a.breathing_cycle() == Some(cycle))
            .map(|a| a.id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_skips_unknown_ids() {
        let mut qci = Qci::new();
        qci.register_agent("a", 0.5).unwrap();
        qci.register_agent("b", 0.5).unwrap();
        qci.register_agent("c", 0.5).unwrap();

        let tagged = qci.sync_breathing(["a", "ghost", "c"], BreathingCycle::Inhale);
        assert_eq!(tagged, 2);
        assert_eq!(qci.get("a").unwrap().breathing_cycle(), Some(BreathingCycle::Inhale));
        assert_eq!(qci.get("b").unwrap().breathing_cycle(), None);
        assert!(!qci.contains("ghost"));
        assert_eq!(qci.agents_in_cycle(BreathingCycle::Inhale), vec!["a", "c"]);
    }

    #[test]
    fn test_sync_has_no_numeric_effect() {
        let mut qci = Qci::new();
        qci.register_agent("a", 0.3).unwrap();
        let before = qci.calculate_network_coherence();
        qci.sync_breathing(vec!["a".to_string()], BreathingCycle::Hold);
        assert_eq!(qci.calculate_network_coherence(), before);
        assert_eq!(qci.get("a").unwrap().coherence_level(), 0.3);
    }

    #[test]
    fn test_later_sync_replaces_cycle() {
        let mut qci = Qci::new();
        qci.register_agent("a", 0.5).unwrap();
        qci.sync_breathing(["a"], BreathingCycle::Inhale);
        qci.sync_breathing(["a"], BreathingCycle::Exhale);
        assert_eq!(qci.get("a").unwrap().breathing_cycle(), Some(BreathingCycle::Exhale));
    }
}
