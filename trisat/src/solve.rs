//! The solving pipeline: load the store, reach a fixpoint, optionally extract.
use std::fs;
use std::time::Instant;

use log::info;

use partial_ref::{partial, PartialRef};

use crate::context::{ConfigP, Context, FormulaP, SolverStateP};
use crate::extract::{assign_all, read_model, validate_model};
use crate::index::{pair_count, triple_count};
use crate::load::apply_formula;
use crate::parallel::propagate_parallel;
use crate::prop::fixpoint::{propagate_range, sweep_store};
use crate::solver::SolverError;
use crate::state::SatState;
use crate::store::{Conflict, Store};

/// Decide the current formula and, if configured, extract a validated assignment.
pub fn solve(
    mut ctx: partial!(Context, mut SolverStateP, ConfigP, FormulaP),
) -> Result<bool, SolverError> {
    let (state, ctx) = ctx.split_part_mut(SolverStateP);
    let formula = ctx.part(FormulaP);
    let config = ctx.part(ConfigP);

    if state.sat_state == SatState::Unsat {
        return Ok(false);
    }
    state.model = None;

    info!(
        "solving formula with {} variables and {} clauses",
        formula.var_count(),
        formula.len()
    );

    let start = Instant::now();
    let mut store = Store::new(formula.var_count());

    let fixpoint = reach_fixpoint(&mut store, formula, config.workers);

    info!(
        "fixpoint {} after {:.1?}",
        if fixpoint.is_err() {
            "hit a contradiction"
        } else {
            "reached"
        },
        start.elapsed()
    );

    if fixpoint.is_err() {
        state.sat_state = SatState::Unsat;
        return Ok(false);
    }

    state.sat_state = SatState::Sat;

    if !config.find_solution {
        return Ok(true);
    }

    if assign_all(&mut store).is_err() {
        return Err(SolverError::ExtractionFailed);
    }
    let model = read_model(&store, formula.var_count()).ok_or(SolverError::ExtractionFailed)?;

    if !validate_model(formula, &model) {
        return Err(SolverError::InvalidModel);
    }

    if let Some(path) = &config.solution_output {
        let mut file = fs::File::create(path)?;
        trisat_dimacs::write_solution(&mut file, &model)?;
        info!("solution written to {}", path.display());
    }

    state.model = Some(model);
    Ok(true)
}

/// Apply the clauses, precondition with a cross-level sweep and run the global
/// fixpoint, sequentially or with worker threads.
fn reach_fixpoint(
    store: &mut Store,
    formula: &trisat_formula::CnfFormula,
    workers: usize,
) -> Result<(), Conflict> {
    apply_formula(store, formula)?;
    sweep_store(store)?;

    if workers >= 2 {
        propagate_parallel(store, workers)?;
    } else {
        let end = pair_count(triple_count(store.var_count() as u64));
        propagate_range(store, 0, end)?;
    }
    Ok(())
}
