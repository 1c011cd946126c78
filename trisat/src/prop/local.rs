//! Local consistency inside one variable pair or one variable triple.
use crate::index::{pair_index, triple_index};
use crate::store::{Conflict, PairState, Store, TermState, TripleState};
use crate::tables::{PAIR_COORD, PAIR_FACTORS, PAIR_TO_TRIPLE, TRIPLE_COORD, TRIPLE_FACTORS};

/// Make the pair `(i, j)` and its two terms mutually consistent.
///
/// Fixed terms clear the matching half of the pair mask, then the pair mask is
/// projected back into both terms. Returns whether any of the three masks changed.
pub fn update_pair(store: &mut Store, i: u64, j: u64) -> Result<bool, Conflict> {
    let pair_idx = pair_index(i, j);

    let mut term_i = store.term(i);
    let mut term_j = store.term(j);
    let mut pair = store.pair(pair_idx);
    let orig = (term_i, term_j, pair);

    if term_i.is_empty() || term_j.is_empty() {
        return Err(Conflict);
    }

    if term_i.is_fixed() {
        pair &= PairState::from_bits(PAIR_COORD[0][term_i.sign()]);
    }
    if term_j.is_fixed() {
        pair &= PairState::from_bits(PAIR_COORD[1][term_j.sign()]);
    }

    let factors = &PAIR_FACTORS[pair.bits() as usize];
    term_i &= TermState::from_bits(factors[0]);
    term_j &= TermState::from_bits(factors[1]);

    store.set_term(i, term_i);
    store.set_term(j, term_j);
    store.set_pair(pair_idx, pair);

    if pair.is_empty() || term_i.is_empty() || term_j.is_empty() {
        return Err(Conflict);
    }

    Ok((term_i, term_j, pair) != orig)
}

/// Make the triple `(i, j, k)`, its three pairs and its three terms mutually
/// consistent.
///
/// Fixed terms clear the matching halves of their pair and triple masks, the triple
/// is tightened from each pair, and the result is projected back down through all six
/// factor masks. Returns whether any of the seven masks changed.
pub fn update_triple(store: &mut Store, i: u64, j: u64, k: u64) -> Result<bool, Conflict> {
    let ij_idx = pair_index(i, j);
    let ik_idx = pair_index(i, k);
    let jk_idx = pair_index(j, k);
    let triple_idx = triple_index(i, j, k);

    let mut term_i = store.term(i);
    let mut term_j = store.term(j);
    let mut term_k = store.term(k);
    let mut pair_ij = store.pair(ij_idx);
    let mut pair_ik = store.pair(ik_idx);
    let mut pair_jk = store.pair(jk_idx);
    let mut triple = store.triple(triple_idx);
    let orig = (
        term_i, term_j, term_k, pair_ij, pair_ik, pair_jk, triple,
    );

    if term_i.is_empty() || term_j.is_empty() || term_k.is_empty() {
        return Err(Conflict);
    }

    if term_i.is_fixed() {
        let sign = term_i.sign();
        pair_ij &= PairState::from_bits(PAIR_COORD[0][sign]);
        pair_ik &= PairState::from_bits(PAIR_COORD[0][sign]);
        triple &= TripleState::from_bits(TRIPLE_COORD[0][sign]);
    }
    if term_j.is_fixed() {
        let sign = term_j.sign();
        pair_ij &= PairState::from_bits(PAIR_COORD[1][sign]);
        pair_jk &= PairState::from_bits(PAIR_COORD[0][sign]);
        triple &= TripleState::from_bits(TRIPLE_COORD[1][sign]);
    }
    if term_k.is_fixed() {
        let sign = term_k.sign();
        pair_ik &= PairState::from_bits(PAIR_COORD[1][sign]);
        pair_jk &= PairState::from_bits(PAIR_COORD[1][sign]);
        triple &= TripleState::from_bits(TRIPLE_COORD[2][sign]);
    }

    triple &= TripleState::from_bits(PAIR_TO_TRIPLE[0][pair_ij.bits() as usize]);
    triple &= TripleState::from_bits(PAIR_TO_TRIPLE[1][pair_ik.bits() as usize]);
    triple &= TripleState::from_bits(PAIR_TO_TRIPLE[2][pair_jk.bits() as usize]);

    let factors = &TRIPLE_FACTORS[triple.bits() as usize];
    pair_ij &= PairState::from_bits(factors[0]);
    pair_ik &= PairState::from_bits(factors[1]);
    pair_jk &= PairState::from_bits(factors[2]);
    term_i &= TermState::from_bits(factors[3]);
    term_j &= TermState::from_bits(factors[4]);
    term_k &= TermState::from_bits(factors[5]);

    store.set_term(i, term_i);
    store.set_term(j, term_j);
    store.set_term(k, term_k);
    store.set_pair(ij_idx, pair_ij);
    store.set_pair(ik_idx, pair_ik);
    store.set_pair(jk_idx, pair_jk);
    store.set_triple(triple_idx, triple);

    if triple.is_empty()
        || pair_ij.is_empty()
        || pair_ik.is_empty()
        || pair_jk.is_empty()
        || term_i.is_empty()
        || term_j.is_empty()
        || term_k.is_empty()
    {
        return Err(Conflict);
    }

    let new = (
        term_i, term_j, term_k, pair_ij, pair_ik, pair_jk, triple,
    );
    Ok(new != orig)
}
