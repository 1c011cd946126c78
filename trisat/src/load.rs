//! Loading a formula into the solver and applying clauses to a store.
use partial_ref::{partial, PartialRef};

use trisat_formula::{CnfFormula, Lit};

use crate::context::{Context, FormulaP, SolverStateP};
use crate::index::{pair_index, triple_index};
use crate::state::SatState;
use crate::store::{Conflict, PairState, Store, TermState, TripleState};

/// Adds a clause to the current formula.
///
/// An empty clause makes the formula unsatisfiable right away. Apart from that the
/// clause is recorded as given; in particular duplicated literals are not removed.
pub fn load_clause(
    mut ctx: partial!(Context, mut FormulaP, mut SolverStateP),
    lits: &[Lit],
) {
    match ctx.part(SolverStateP).sat_state {
        SatState::Unsat => return,
        SatState::Sat => {
            let state = ctx.part_mut(SolverStateP);
            state.sat_state = SatState::Unknown;
            state.model = None;
        }
        SatState::Unknown => {}
    }

    if lits.is_empty() {
        ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
    }

    ctx.part_mut(FormulaP).add_clause(lits.iter().cloned());
}

/// The sign a variable must avoid for the literal's clause to stay satisfiable, i.e.
/// the sign that falsifies the literal.
fn falsifying_sign(lit: Lit) -> usize {
    lit.is_negative() as usize
}

/// Apply every clause of the formula to the store.
///
/// Clauses of width one to three clear a single term, pair or triple bit. Wider
/// clauses are rewritten into the equisatisfiable three-literal chain
/// `(l1 v l2 v z1), (!z1 v l3 v z2), ..., (!z_m v l_last-1 v l_last)` with fresh
/// auxiliary variables, growing the store on the fly. Auxiliary variables always get
/// the highest indices, so the chain triples stay index-ordered.
pub fn apply_formula(store: &mut Store, formula: &CnfFormula) -> Result<(), Conflict> {
    let mut sorted: Vec<Lit> = vec![];

    for clause in formula.iter() {
        sorted.clear();
        sorted.extend_from_slice(clause);
        sorted.sort_unstable_by_key(|lit| lit.index());

        match sorted[..] {
            [] => return Err(Conflict),
            [a] => {
                let term = store.term(a.index() as u64)
                    & TermState::from_sign(1 - falsifying_sign(a));
                store.set_term(a.index() as u64, term);
                if term.is_empty() {
                    return Err(Conflict);
                }
            }
            [a, b] => {
                let cleared = (falsifying_sign(a) << 1) | falsifying_sign(b);
                let index = pair_index(a.index() as u64, b.index() as u64);
                let pair = store.pair(index) & PairState::from_bits(!(1u8 << cleared) & 0xf);
                store.set_pair(index, pair);
                if pair.is_empty() {
                    return Err(Conflict);
                }
            }
            [a, b, c] => {
                clear_triple_bit(
                    store,
                    [a.index() as u64, b.index() as u64, c.index() as u64],
                    [falsifying_sign(a), falsifying_sign(b), falsifying_sign(c)],
                )?;
            }
            _ => {
                let mut aux = store.var_count() as u64;
                store.grow(store.var_count() + sorted.len() - 3);

                // (l1 v l2 v z1)
                clear_triple_bit(
                    store,
                    [sorted[0].index() as u64, sorted[1].index() as u64, aux],
                    [falsifying_sign(sorted[0]), falsifying_sign(sorted[1]), 0],
                )?;
                aux += 1;

                // (!z_prev v l_t v z_next)
                for t in 2..sorted.len() - 2 {
                    clear_triple_bit(
                        store,
                        [sorted[t].index() as u64, aux - 1, aux],
                        [falsifying_sign(sorted[t]), 1, 0],
                    )?;
                    aux += 1;
                }

                // (!z_last v l_m-1 v l_m)
                let last = sorted.len() - 1;
                clear_triple_bit(
                    store,
                    [
                        sorted[last - 1].index() as u64,
                        sorted[last].index() as u64,
                        aux - 1,
                    ],
                    [
                        falsifying_sign(sorted[last - 1]),
                        falsifying_sign(sorted[last]),
                        1,
                    ],
                )?;
            }
        }
    }

    Ok(())
}

/// Clear the single triple bit for the given joint falsifying signs.
///
/// The variable list must be ascending; the signs are given in the same order.
fn clear_triple_bit(store: &mut Store, vars: [u64; 3], signs: [usize; 3]) -> Result<(), Conflict> {
    let cleared = (signs[0] << 2) | (signs[1] << 1) | signs[2];
    let index = triple_index(vars[0], vars[1], vars[2]);
    let triple = store.triple(index) & TripleState::from_bits(!(1u8 << cleared));
    store.set_triple(index, triple);
    if triple.is_empty() {
        return Err(Conflict);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use trisat_formula::{cnf_formula, lits};

    #[test]
    fn unsat_on_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load_clause(ctx.borrow(), &lits![1, 2]);
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

        load_clause(ctx.borrow(), &[]);
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);

        // Later clauses cannot recover.
        load_clause(ctx.borrow(), &lits![3]);
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn unit_clauses_restrict_terms() {
        let mut store = Store::new(2);
        apply_formula(&mut store, &cnf_formula![1; -2;]).unwrap();

        assert_eq!(store.term(0), TermState::POS);
        assert_eq!(store.term(1), TermState::NEG);
    }

    #[test]
    fn conflicting_units_are_unsat() {
        let mut store = Store::new(1);
        assert_eq!(
            apply_formula(&mut store, &cnf_formula![1; -1;]),
            Err(Conflict)
        );
    }

    #[test]
    fn binary_clause_clears_one_pair_bit() {
        let mut store = Store::new(2);
        apply_formula(&mut store, &cnf_formula![1, -2;]).unwrap();

        // Falsified by (NEG, POS) only.
        assert_eq!(store.pair(pair_index(0, 1)).bits(), 0b1101);
    }

    #[test]
    fn ternary_clause_clears_one_triple_bit() {
        let mut store = Store::new(3);
        apply_formula(&mut store, &cnf_formula![-1, 2, 3;]).unwrap();

        // Falsified by (POS, NEG, NEG) only, which is pattern 4.
        assert_eq!(store.triple(triple_index(0, 1, 2)).bits(), 0b1110_1111);
        assert_eq!(store.pair(pair_index(0, 1)), PairState::ANY);
    }

    #[test]
    fn clause_order_is_normalized_by_variable() {
        let mut direct = Store::new(3);
        apply_formula(&mut direct, &cnf_formula![-1, 2, 3;]).unwrap();

        let mut shuffled = Store::new(3);
        apply_formula(&mut shuffled, &cnf_formula![3, -1, 2;]).unwrap();

        assert_eq!(direct, shuffled);
    }

    #[test]
    fn wide_clause_grows_the_store_and_builds_a_chain() {
        let mut store = Store::new(5);
        apply_formula(&mut store, &cnf_formula![1, 2, 3, 4, 5;]).unwrap();

        // Two auxiliary variables for a width-5 clause.
        assert_eq!(store.var_count(), 7);

        // (x1 v x2 v z1): clears (NEG, NEG, NEG).
        assert_eq!(store.triple(triple_index(0, 1, 5)).bits(), 0b1111_1110);
        // (!z1 v x3 v z2): clears (NEG, POS, NEG), pattern 2.
        assert_eq!(store.triple(triple_index(2, 5, 6)).bits(), 0b1111_1011);
        // (!z2 v x4 v x5): clears (NEG, NEG, POS), pattern 1.
        assert_eq!(store.triple(triple_index(3, 4, 6)).bits(), 0b1111_1101);

        // Everything else is untouched.
        assert_eq!(store.triple(triple_index(0, 1, 2)), TripleState::ANY);
        assert_eq!(store.term(5), TermState::ANY);
    }

    #[test]
    fn two_wide_clauses_get_disjoint_auxiliaries() {
        let mut store = Store::new(4);
        apply_formula(&mut store, &cnf_formula![1, 2, 3, 4; -1, -2, -3, -4;]).unwrap();

        assert_eq!(store.var_count(), 6);
        // First chain uses z1 = index 4, second chain z2 = index 5.
        // (x1 v x2 v z1) clears (NEG, NEG, NEG); (x3 v x4 v !z1) clears (NEG, NEG, POS).
        assert_eq!(store.triple(triple_index(0, 1, 4)).bits(), 0b1111_1110);
        assert_eq!(store.triple(triple_index(2, 3, 4)).bits(), 0b1111_1101);
        // (!x1 v !x2 v z2) clears (POS, POS, NEG); (!x3 v !x4 v !z2) clears (POS, POS, POS).
        assert_eq!(store.triple(triple_index(0, 1, 5)).bits(), 0b1011_1111);
        assert_eq!(store.triple(triple_index(2, 3, 5)).bits(), 0b0111_1111);
    }
}
