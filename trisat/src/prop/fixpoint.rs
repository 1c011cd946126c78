//! Fixpoint iteration of triple-pair reconciliation.
use log::debug;

use crate::index::{pair_count, pair_from_index, triple_count, triple_from_index};
use crate::store::{Conflict, Store};

use super::bridge::reconcile_triples;
use super::local::{update_pair, update_triple};

/// Reconcile every pair of distinct triples in the half-open index range
/// `start..end` of the pair-of-triples space, repeating until a full pass changes
/// nothing.
///
/// Returns whether any pass changed anything. Termination follows from the masks
/// only ever losing bits.
pub fn propagate_range(store: &mut Store, start: u64, end: u64) -> Result<bool, Conflict> {
    let mut changed_any = false;

    loop {
        let mut changed = false;

        for position in start..end {
            let (first_idx, second_idx) = pair_from_index(position);
            let (i1, j1, k1) = triple_from_index(first_idx);
            let (i2, j2, k2) = triple_from_index(second_idx);
            changed |= reconcile_triples(store, [i1, j1, k1], [i2, j2, k2])?;
        }

        changed_any |= changed;
        if !changed {
            break;
        }
        debug!("repeating pass over triple pairs {}..{}", start, end);
    }

    Ok(changed_any)
}

/// One cheap cross-level pass: make every pair and every triple locally consistent,
/// repeating until quiescent.
///
/// Used as preconditioning before the global fixpoint and as the sweep after a
/// solution commit. This only clears bits the full fixpoint would clear as well.
pub fn sweep_store(store: &mut Store) -> Result<bool, Conflict> {
    let n = store.var_count() as u64;
    let pairs = pair_count(n);
    let triples = triple_count(n);

    let mut changed_any = false;

    loop {
        let mut changed = false;

        for position in 0..pairs {
            let (i, j) = pair_from_index(position);
            changed |= update_pair(store, i, j)?;
        }
        for position in 0..triples {
            let (i, j, k) = triple_from_index(position);
            changed |= update_triple(store, i, j, k)?;
        }

        changed_any |= changed;
        if !changed {
            break;
        }
    }

    Ok(changed_any)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::load::apply_formula;
    use trisat_formula::test::random_formula;

    fn full_range(store: &Store) -> u64 {
        pair_count(triple_count(store.var_count() as u64))
    }

    #[test]
    fn all_ones_store_is_a_fixpoint() {
        let mut store = Store::new(2);
        let range = full_range(&store);
        assert_eq!(propagate_range(&mut store, 0, range), Ok(false));

        let mut store = Store::new(4);
        let range = full_range(&store);
        assert_eq!(propagate_range(&mut store, 0, range), Ok(false));
    }

    #[test]
    fn sweep_handles_tiny_stores() {
        let mut store = Store::new(0);
        assert_eq!(sweep_store(&mut store), Ok(false));

        let mut store = Store::new(1);
        assert_eq!(sweep_store(&mut store), Ok(false));

        let mut store = Store::new(2);
        assert_eq!(sweep_store(&mut store), Ok(false));
    }

    proptest! {
        #[test]
        fn fixpoint_is_monotone_and_idempotent(
            formula in random_formula(4..9usize, 0..20usize, 1..4usize),
        ) {
            let mut store = Store::new(formula.var_count());
            prop_assume!(apply_formula(&mut store, &formula).is_ok());

            let before = store.clone();
            let end = full_range(&store);
            match propagate_range(&mut store, 0, end) {
                Err(Conflict) => {}
                Ok(_) => {
                    prop_assert!(store.refines(&before));

                    // A second run finds the store already at its fixpoint.
                    let fixed = store.clone();
                    prop_assert_eq!(propagate_range(&mut store, 0, end), Ok(false));
                    prop_assert_eq!(&store, &fixed);
                }
            }
        }

        #[test]
        fn sweep_never_strengthens_the_fixpoint(
            formula in random_formula(4..9usize, 0..20usize, 1..4usize),
        ) {
            let mut plain = Store::new(formula.var_count());
            prop_assume!(apply_formula(&mut plain, &formula).is_ok());
            let mut swept = plain.clone();

            let end = full_range(&plain);
            let plain_result = propagate_range(&mut plain, 0, end);

            let swept_result = sweep_store(&mut swept)
                .and_then(|_| propagate_range(&mut swept, 0, end));

            match (plain_result, swept_result) {
                (Err(Conflict), _) | (_, Err(Conflict)) => {}
                (Ok(_), Ok(_)) => prop_assert_eq!(&plain, &swept),
            }
        }
    }
}
