//! Committing a consistent store to a concrete assignment.
use log::debug;

use trisat_formula::{CnfFormula, Lit};

use crate::index::{pair_count, pair_index, triple_count, triple_index};
use crate::prop::fixpoint::{propagate_range, sweep_store};
use crate::prop::local::{update_pair, update_triple};
use crate::store::{Conflict, Store, TermState};

/// Narrow every mask of the store until all terms are decided.
///
/// Variables are committed three at a time: each stride triple that is still
/// ambiguous is fixed to its lowest surviving pattern, the store is swept back to
/// local consistency and the global fixpoint is re-run from the committed triple
/// onward. A remainder of two variables is committed through its pair, a single
/// leftover ambiguous variable is fixed to positive.
///
/// Re-propagation after a commit is always sequential, so the extracted assignment
/// does not depend on the worker configuration.
///
/// There is no backtracking: a commit that later propagates to a contradiction
/// surfaces as [`Conflict`] and ends the extraction.
pub fn assign_all(store: &mut Store) -> Result<(), Conflict> {
    let n = store.var_count() as u64;
    let range_end = pair_count(triple_count(n));

    let mut i = 0;
    while i + 3 <= n {
        let (j, k) = (i + 1, i + 2);
        let triple_idx = triple_index(i, j, k);

        update_triple(store, i, j, k)?;

        let state = store.triple(triple_idx);
        if !state.is_fixed() {
            debug!("committing triple ({}, {}, {})", i, j, k);
            store.set_triple(triple_idx, state.lowest_bit());

            sweep_store(store)?;

            let start = pair_index(triple_idx, triple_idx + 1).min(range_end);
            propagate_range(store, start, range_end)?;
        }

        i += 3;
    }

    match n - i {
        2 => {
            update_pair(store, i, i + 1)?;

            let pair_idx = pair_index(i, i + 1);
            let state = store.pair(pair_idx);
            if !state.is_fixed() {
                store.set_pair(pair_idx, state.lowest_bit());
                update_pair(store, i, i + 1)?;
            }
        }
        1 => {
            if store.term(i) == TermState::ANY {
                store.set_term(i, TermState::POS);
            } else if store.term(i).is_empty() {
                return Err(Conflict);
            }
        }
        _ => {}
    }

    Ok(())
}

/// Read the assignment of the first `var_count` variables off the term states.
///
/// Returns `None` if any of those terms is not decided, which means the extraction
/// failed; callers must treat that as an error, not as a satisfying assignment.
pub fn read_model(store: &Store, var_count: usize) -> Option<Vec<Lit>> {
    let mut model = Vec::with_capacity(var_count);
    for index in 0..var_count {
        let term = store.term(index as u64);
        if !term.is_fixed() {
            return None;
        }
        model.push(Lit::from_index(index, term.sign() == 1));
    }
    Some(model)
}

/// Check that the model satisfies every clause of the original formula.
///
/// `model[index]` must be the literal assigned true for the variable with that
/// index. This runs after every extraction; the propagator is incomplete, so a
/// commit sequence can produce an assignment that does not satisfy the input.
pub fn validate_model(formula: &CnfFormula, model: &[Lit]) -> bool {
    formula.iter().all(|clause| {
        clause
            .iter()
            .any(|lit| model.get(lit.index()) == Some(lit))
    })
}
