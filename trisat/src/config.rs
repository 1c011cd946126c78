//! Solver configuration.
use std::path::PathBuf;

/// Configurable parameters used during solving.
pub struct SolverConfig {
    /// Number of worker threads for the global consistency passes.
    ///
    /// With a value of 1 all passes run on the calling thread; larger values use the
    /// copy-and-merge parallel driver.
    pub workers: usize,

    /// Whether to commit the store to a total assignment after a consistent fixpoint.
    ///
    /// Without this, a satisfiable verdict comes without a model.
    pub find_solution: bool,

    /// Write the extracted assignment to this file on a satisfiable verdict.
    pub solution_output: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            workers: 1,
            find_solution: true,
            solution_output: None,
        }
    }
}
