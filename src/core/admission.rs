//! Capacity gate deciding whether a campaign may dispatch this tick.
//!
//! Recomputed from fresh counts every tick; nothing is persisted between
//! ticks.

/// Capacity available for dialing: `floor(agents * service_level / 100)`.
#[must_use]
pub const fn dial_capacity(available_agents: usize, service_level: u32) -> usize {
    available_agents.saturating_mul(service_level as usize) / 100
}

/// True if one more dial fits under the capacity.
#[must_use]
pub const fn is_dialable(available_agents: usize, service_level: u32, dialing: usize) -> bool {
    dial_capacity(available_agents, service_level) > dialing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_floors() {
        assert_eq!(dial_capacity(3, 50), 1);
        assert_eq!(dial_capacity(1, 99), 0);
        assert_eq!(dial_capacity(10, 100), 10);
        assert_eq!(dial_capacity(0, 100), 0);
    }

    #[test]
    fn test_dialable_matches_formula() {
        for agents in 0..12 {
            for level in [0, 1, 33, 50, 99, 100] {
                for dialing in 0..12 {
                    let expected = (agents * level as usize) / 100 > dialing;
                    assert_eq!(is_dialable(agents, level, dialing), expected);
                }
            }
        }
    }

    #[test]
    fn test_capacity_equal_to_dialing_blocks() {
        assert!(!is_dialable(4, 50, 2));
        assert!(is_dialable(4, 50, 1));
    }
}
