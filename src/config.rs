use clap::ValueEnum;

pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Which cards may travel together when a stack is lifted from a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StackRule {
    /// Any descending run moves, whatever the suits.
    #[default]
    AnySuit,
    /// Descending runs must alternate red and black.
    AlternatingColor,
}

/// Movement limits and search bounds, fixed for the lifetime of a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Largest stack that can be lifted at once; `0` means unbounded and `1`
    /// switches move generation to top cards only.
    pub max_stack_size: usize,
    pub stack_rule: StackRule,
    /// Recursion cap for the depth-first strategy.
    pub max_depth: usize,
    /// Optional cap on the number of generated states, for every strategy.
    pub max_states: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_stack_size: 0,
            stack_rule: StackRule::AnySuit,
            max_depth: DEFAULT_MAX_DEPTH,
            max_states: None,
        }
    }
}

impl SolverConfig {
    pub fn single_card(&self) -> bool {
        self.max_stack_size == 1
    }

    pub fn state_limit_reached(&self, states: usize) -> bool {
        self.max_states.is_some_and(|max| states >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.max_depth, 1000);
        assert!(!config.single_card());
        assert!(!config.state_limit_reached(usize::MAX));
    }

    #[test]
    fn test_state_limit() {
        let config = SolverConfig {
            max_states: Some(10),
            ..Default::default()
        };
        assert!(!config.state_limit_reached(9));
        assert!(config.state_limit_reached(10));
    }
}
