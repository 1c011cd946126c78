//! Boolean satisfiability solver.
use std::io;

use partial_ref::{IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;
use thiserror::Error;

use trisat_dimacs::DimacsParser;
use trisat_formula::{CnfFormula, Lit};

use crate::config::SolverConfig;
use crate::context::{Context, FormulaP};
use crate::load::load_clause;
use crate::solve::solve;
use crate::state::SatState;

/// Errors of a solve call.
///
/// The propagator is incomplete: committing a consistent store to a total assignment
/// can fail even though the fixpoint found no contradiction. Such failures are
/// reported loudly instead of being folded into the verdict.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solution extraction ran into a dead end")]
    ExtractionFailed,
    #[error("extracted assignment does not satisfy the formula")]
    InvalidModel,
    #[error("could not write the solution file: {0}")]
    SolutionOutput(#[from] io::Error),
}

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// The solver configuration.
    pub fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.ctx.config
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(FormulaP).set_var_count(formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Add a single clause to the solver.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        load_clause(ctx.borrow(), lits);
    }

    /// Reads and adds a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let formula = DimacsParser::parse(input)?;

        info!(
            "parsed formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );

        self.add_formula(&formula);
        Ok(())
    }

    /// Check the satisfiability of the current formula.
    ///
    /// Returns the verdict, or an error when solution extraction was requested and
    /// failed; in that case no verdict claim is made beyond the fixpoint being
    /// consistent.
    pub fn solve(&mut self) -> Result<bool, SolverError> {
        let mut ctx = self.ctx.into_partial_ref_mut();
        solve(ctx.borrow())
    }

    /// Set of literals that satisfy the formula, from the last successful solve call
    /// with solution extraction enabled.
    pub fn model(&self) -> Option<Vec<Lit>> {
        if self.ctx.solver_state.sat_state == SatState::Sat {
            self.ctx.solver_state.model.clone()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    use trisat_formula::{cnf_formula, lits, test::sat_formula};

    #[test]
    fn trivially_sat_without_clauses() {
        let mut solver = Solver::new();
        assert_eq!(solver.solve().unwrap(), true);
        assert_eq!(solver.model(), Some(vec![]));
    }

    #[test]
    fn no_model_without_extraction() {
        let mut solver = Solver::new();
        solver.config_mut().find_solution = false;
        solver.add_formula(&cnf_formula![1, 2; -1;]);

        assert_eq!(solver.solve().unwrap(), true);
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut solver = Solver::new();
        solver.add_clause(&lits![1, 2]);
        solver.add_clause(&[]);

        assert_eq!(solver.solve().unwrap(), false);
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn solve_from_dimacs() {
        let mut solver = Solver::new();
        solver
            .add_dimacs_cnf(&b"p cnf 3 2\n1 2 3 0\n-1 -2 -3 0\n"[..])
            .unwrap();

        assert_eq!(solver.solve().unwrap(), true);

        let model = solver.model().unwrap();
        assert_eq!(model.len(), 3);
        assert!(model.iter().any(|lit| lit.is_positive()));
        assert!(model.iter().any(|lit| lit.is_negative()));
    }

    #[test]
    fn adding_clauses_resets_a_sat_verdict() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![1;]);
        assert_eq!(solver.solve().unwrap(), true);

        solver.add_clause(&lits![-1]);
        assert_eq!(solver.solve().unwrap(), false);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn sat_formulas_get_validated_models(
            formula in sat_formula(3..9usize, 0..25usize, 1..4usize),
        ) {
            let mut solver = Solver::new();
            solver.add_formula(&formula);

            match solver.solve() {
                Ok(verdict) => {
                    // Contradictions are sound, so a satisfiable formula can never be
                    // refuted.
                    prop_assert!(verdict);

                    let model = solver.model().unwrap();
                    prop_assert_eq!(model.len(), formula.var_count());
                    for clause in formula.iter() {
                        prop_assert!(clause.iter().any(|lit| model.contains(lit)));
                    }
                }
                // The commit phase has no backtracking and may fail; that is reported
                // as an error instead of a bogus verdict.
                Err(SolverError::ExtractionFailed) | Err(SolverError::InvalidModel) => {}
                Err(err) => return Err(TestCaseError::fail(err.to_string())),
            }
        }
    }
}
