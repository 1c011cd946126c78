//! Central solver data structure.
use partial_ref::{part, PartialRefTarget};

use trisat_formula::CnfFormula;

use crate::config::SolverConfig;
use crate::state::SolverState;

/// Part declarations for the [`Context`] struct.
mod parts {
    use super::*;

    part!(pub ConfigP: SolverConfig);
    part!(pub FormulaP: CnfFormula);
    part!(pub SolverStateP: SolverState);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept across solve calls. Functions operating on
/// multiple fields use partial references provided by the `partial_ref` crate, which
/// documents the data dependencies and keeps the borrow checker happy without passing
/// individual references. The constraint store itself is not part of the context: it
/// is created per solve call and torn down with the verdict.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part = "ConfigP"]
    pub config: SolverConfig,
    #[part = "FormulaP"]
    pub formula: CnfFormula,
    #[part = "SolverStateP"]
    pub solver_state: SolverState,
}
