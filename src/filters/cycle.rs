//! Cycling through enum-valued options.
//!
//! Sort order and the locate criticality selector are both single-choice
//! options that a front end steps through; [`FilterState`] holds the current
//! choice for any such enum.

/// An option type that can step forwards and backwards through its values.
pub trait CycleFilter: Clone + Copy + Default {
    /// Get the next value in the cycle.
    #[must_use]
    fn next(&self) -> Self;

    /// Get the previous value in the cycle.
    #[must_use]
    fn prev(&self) -> Self;

    /// Get a display name for the value.
    fn display_name(&self) -> &str;
}

/// Current choice of a [`CycleFilter`] option.
#[derive(Debug, Clone)]
pub struct FilterState<F: CycleFilter> {
    pub current: F,
}

impl<F: CycleFilter> Default for FilterState<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: CycleFilter> FilterState<F> {
    pub fn new() -> Self {
        Self {
            current: F::default(),
        }
    }

    pub fn with_filter(filter: F) -> Self {
        Self { current: filter }
    }

    pub fn next(&mut self) {
        self.current = self.current.next();
    }

    pub fn prev(&mut self) {
        self.current = self.current.prev();
    }

    pub fn set(&mut self, filter: F) {
        self.current = filter;
    }

    pub fn reset(&mut self) {
        self.current = F::default();
    }

    pub fn display_name(&self) -> &str {
        self.current.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{SelectedCriticality, SortOption};

    #[test]
    fn test_sort_state_cycles_through_all_options() {
        let mut state = FilterState::<SortOption>::new();
        assert_eq!(state.display_name(), "Alphabetical");

        state.next();
        assert_eq!(state.current, SortOption::Criticality);
        state.next();
        assert_eq!(state.current, SortOption::Occurrence);
        state.next();
        assert_eq!(state.current, SortOption::Alphabetical);

        state.prev();
        assert_eq!(state.current, SortOption::Occurrence);
    }

    #[test]
    fn test_criticality_state_set_and_reset() {
        let mut state = FilterState::with_filter(SelectedCriticality::High);
        assert_eq!(state.display_name(), "High");

        state.set(SelectedCriticality::Medium);
        assert_eq!(state.current, SelectedCriticality::Medium);

        state.reset();
        assert_eq!(state.current, SelectedCriticality::Any);
    }
}
