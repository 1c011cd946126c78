//! Miscellaneous solver state.
use trisat_formula::Lit;

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Miscellaneous solver state.
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Validated assignment of the last successful extraction.
    pub model: Option<Vec<Lit>>,
}
