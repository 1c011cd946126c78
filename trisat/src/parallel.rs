//! Parallel global consistency with copy-and-merge workers.
//!
//! The pair-of-triples range is split into contiguous segments, one per worker. Each
//! worker runs the sequential fixpoint over its segment on a private copy of the
//! store; no state is shared during a pass. The driver then intersects all copies
//! into one store. Because every worker computes a monotone restriction of its input,
//! the bitwise-AND reduction is a semilattice meet and the verdict does not depend on
//! the worker count.
use std::thread;

use log::debug;

use crate::index::{pair_count, triple_count};
use crate::prop::fixpoint::propagate_range;
use crate::store::{Conflict, Store};

/// Run the global fixpoint with `workers` threads, repeating parallel passes until no
/// worker and no merge observes a change.
///
/// A worker that runs into a contradiction finishes early; the others complete their
/// segment and the driver short-circuits after the join.
pub fn propagate_parallel(store: &mut Store, workers: usize) -> Result<bool, Conflict> {
    debug_assert!(workers >= 2);

    let end = pair_count(triple_count(store.var_count() as u64));
    if end == 0 {
        return Ok(false);
    }

    let segment = (end + workers as u64 - 1) / workers as u64;
    let mut changed_any = false;
    let mut iterations = 0u32;

    loop {
        iterations += 1;

        let master: &Store = store;
        let results: Vec<Result<(Store, bool), Conflict>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers as u64)
                .map(|worker| {
                    let start = (segment * worker).min(end);
                    let stop = (start + segment).min(end);

                    scope.spawn(move || {
                        let mut local = master.clone();
                        let changed = propagate_range(&mut local, start, stop)?;
                        Ok((local, changed))
                    })
                })
                .collect();

            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        let mut pass_changed = false;
        let mut merged: Option<Store> = None;

        for result in results {
            let (local, worker_changed) = result?;
            pass_changed |= worker_changed;
            merged = Some(match merged.take() {
                None => local,
                Some(mut accumulated) => {
                    pass_changed |= accumulated.meet(&local)?;
                    accumulated
                }
            });
        }

        if let Some(merged) = merged {
            *store = merged;
        }

        changed_any |= pass_changed;
        if !pass_changed {
            break;
        }
        debug!("parallel pass {} changed the store, repeating", iterations);
    }

    debug!("parallel fixpoint reached after {} passes", iterations);
    Ok(changed_any)
}
