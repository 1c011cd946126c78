//! Consistency between two triples, transported through their intermediaries.
//!
//! An intermediary of two triples is any third triple drawn from the union of their
//! variables. Once the intermediaries are locally consistent, they are representative
//! of every other triple sharing variables with the two: a joint sign choice for the
//! two triples that no intermediary supports cannot be part of any solution, so it is
//! removed from both masks.
use crate::index::{pair_index, triple_index};
use crate::store::{Conflict, PairState, Store, TermState, TripleState};
use crate::tables::{TERMS_TO_TRIPLE, TRIPLE_FACTORS};

use super::local::update_triple;

/// Upper bound on intermediaries of two triples: `C(6, 3)` minus the two originals.
const MAX_INTERMEDIARIES: usize = 18;

/// One intermediary triple.
///
/// `offsets` locates each of its variables in the concatenation of the two original
/// triples (0..=2 for the first, 3..=5 for the second; shared variables keep the first
/// triple's offset), so joint term signs can be looked up without comparing variable
/// ids in the innermost loop.
#[derive(Copy, Clone, Default)]
struct Intermediary {
    index: u64,
    vars: [u64; 3],
    offsets: [usize; 3],
    proposal: u8,
}

/// Enumerates all intermediaries of the two sorted variable triples.
///
/// Returns the number of entries written to `out`. With `m` distinct variables over
/// both triples this is `C(m, 3) - 2`; callers must not pass two identical triples.
fn generate_intermediaries(
    first: &[u64; 3],
    second: &[u64; 3],
    out: &mut [Intermediary; MAX_INTERMEDIARIES],
) -> usize {
    // Sorted merge of both variable lists, remembering each variable's origin offset.
    let mut vars = [0u64; 6];
    let mut offsets = [0usize; 6];
    let mut count = 0;

    let mut a = 0;
    let mut b = 0;
    while a < 3 && b < 3 {
        if first[a] <= second[b] {
            vars[count] = first[a];
            offsets[count] = a;
            if first[a] == second[b] {
                b += 1;
            }
            a += 1;
        } else {
            vars[count] = second[b];
            offsets[count] = b + 3;
            b += 1;
        }
        count += 1;
    }
    while a < 3 {
        vars[count] = first[a];
        offsets[count] = a;
        count += 1;
        a += 1;
    }
    while b < 3 {
        vars[count] = second[b];
        offsets[count] = b + 3;
        count += 1;
        b += 1;
    }

    let first_idx = triple_index(first[0], first[1], first[2]);
    let second_idx = triple_index(second[0], second[1], second[2]);

    let mut emitted = 0;
    for x in 0..count {
        for y in x + 1..count {
            for z in y + 1..count {
                let index = triple_index(vars[x], vars[y], vars[z]);
                if index == first_idx || index == second_idx {
                    continue;
                }
                out[emitted] = Intermediary {
                    index,
                    vars: [vars[x], vars[y], vars[z]],
                    offsets: [offsets[x], offsets[y], offsets[z]],
                    proposal: 0,
                };
                emitted += 1;
            }
        }
    }
    emitted
}

/// Contract the masks of two distinct triples to their consistent bit-clique.
///
/// Both triples are first made locally consistent, then every intermediary, looping
/// until quiescent. After that a joint sign pattern pair survives only if every
/// intermediary still supports the term signs it implies; the surviving patterns are
/// installed in both triples (projected down to their pairs and terms) and each
/// intermediary is narrowed to the union of patterns the surviving clique proposed
/// for it.
pub fn reconcile_triples(
    store: &mut Store,
    first: [u64; 3],
    second: [u64; 3],
) -> Result<bool, Conflict> {
    let mut changed = update_triple(store, first[0], first[1], first[2])?;
    changed |= update_triple(store, second[0], second[1], second[2])?;
    changed |= update_triple(store, first[0], first[1], first[2])?;

    let mut intermediaries = [Intermediary::default(); MAX_INTERMEDIARIES];
    let count = generate_intermediaries(&first, &second, &mut intermediaries);

    loop {
        let mut round_changed = false;
        for inter in intermediaries[..count].iter() {
            round_changed |= update_triple(store, inter.vars[0], inter.vars[1], inter.vars[2])?;
        }
        changed |= round_changed;
        if !round_changed {
            break;
        }
    }

    let first_idx = triple_index(first[0], first[1], first[2]);
    let second_idx = triple_index(second[0], second[1], second[2]);
    let first_state = store.triple(first_idx);
    let second_state = store.triple(second_idx);

    let mut new_first = 0u8;
    let mut new_second = 0u8;
    let mut proposals = [0u8; MAX_INTERMEDIARIES];

    let mut first_bits = first_state.bits();
    while first_bits != 0 {
        let first_bit = first_bits & first_bits.wrapping_neg();
        first_bits &= first_bits - 1;

        let first_factors = &TRIPLE_FACTORS[first_bit as usize];

        let mut second_bits = second_state.bits();
        while second_bits != 0 {
            let second_bit = second_bits & second_bits.wrapping_neg();
            second_bits &= second_bits - 1;

            let second_factors = &TRIPLE_FACTORS[second_bit as usize];

            // Term signs implied by this pattern pair, keyed by concatenated offset.
            let joint = [
                first_factors[3],
                first_factors[4],
                first_factors[5],
                second_factors[3],
                second_factors[4],
                second_factors[5],
            ];

            let mut consistent = true;
            for (inter, proposal) in intermediaries[..count].iter().zip(proposals.iter_mut()) {
                *proposal = TERMS_TO_TRIPLE[joint[inter.offsets[0]] as usize]
                    [joint[inter.offsets[1]] as usize][joint[inter.offsets[2]] as usize];
                if store.triple(inter.index).bits() & *proposal == 0 {
                    consistent = false;
                    break;
                }
            }

            if consistent {
                new_first |= first_bit;
                new_second |= second_bit;
                for (inter, &proposal) in
                    intermediaries[..count].iter_mut().zip(proposals.iter())
                {
                    inter.proposal |= proposal;
                }
            }
        }
    }

    if new_first != first_state.bits() {
        install_triple(store, first, first_idx, new_first)?;
        changed = true;
    }
    if new_second != second_state.bits() {
        install_triple(store, second, second_idx, new_second)?;
        changed = true;
    }

    for inter in intermediaries[..count].iter() {
        store.set_triple(inter.index, TripleState::from_bits(inter.proposal));
    }

    Ok(changed)
}

/// Replace a triple's mask and project the new mask down into its pairs and terms.
fn install_triple(
    store: &mut Store,
    vars: [u64; 3],
    index: u64,
    bits: u8,
) -> Result<(), Conflict> {
    store.set_triple(index, TripleState::from_bits(bits));

    let factors = &TRIPLE_FACTORS[bits as usize];
    let ij_idx = pair_index(vars[0], vars[1]);
    let ik_idx = pair_index(vars[0], vars[2]);
    let jk_idx = pair_index(vars[1], vars[2]);

    let pair_ij = store.pair(ij_idx) & PairState::from_bits(factors[0]);
    let pair_ik = store.pair(ik_idx) & PairState::from_bits(factors[1]);
    let pair_jk = store.pair(jk_idx) & PairState::from_bits(factors[2]);
    let term_i = store.term(vars[0]) & TermState::from_bits(factors[3]);
    let term_j = store.term(vars[1]) & TermState::from_bits(factors[4]);
    let term_k = store.term(vars[2]) & TermState::from_bits(factors[5]);

    store.set_pair(ij_idx, pair_ij);
    store.set_pair(ik_idx, pair_ik);
    store.set_pair(jk_idx, pair_jk);
    store.set_term(vars[0], term_i);
    store.set_term(vars[1], term_j);
    store.set_term(vars[2], term_k);

    if bits == 0
        || pair_ij.is_empty()
        || pair_ik.is_empty()
        || pair_jk.is_empty()
        || term_i.is_empty()
        || term_j.is_empty()
        || term_k.is_empty()
    {
        return Err(Conflict);
    }
    Ok(())
}
