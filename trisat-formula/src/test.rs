use proptest::{collection, prelude::*};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::Lit;

/// Generate a satisfiable formula.
///
/// This generates a random full assignment and then only generates clauses compatible
/// with that assignment. Every clause uses distinct variables.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    max_width: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, max_width).prop_flat_map(|(vars, clause_count, max_width)| {
        collection::vec(proptest::bool::ANY, vars.max(1)).prop_perturb(move |polarity, mut rng| {
            let vars = polarity.len();
            let mut clauses: Vec<Vec<Lit>> = vec![];

            for _ in 0..clause_count {
                let width = rng.gen_range(1..=max_width.max(1).min(vars));
                let chosen = rand::seq::index::sample(&mut rng, vars, width);

                let mut clause: Vec<Lit> = chosen
                    .iter()
                    .map(|index| Lit::from_index(index, rng.gen()))
                    .collect();

                // Force one literal to agree with the hidden assignment.
                let pick = rng.gen_range(0..clause.len());
                let index = clause[pick].index();
                clause[pick] = Lit::from_index(index, polarity[index]);

                clause.shuffle(&mut rng);
                clauses.push(clause);
            }

            clauses.shuffle(&mut rng);
            let mut formula = CnfFormula::from(clauses);
            formula.set_var_count(vars);
            formula
        })
    })
}

/// Generate a random formula of bounded clause width.
///
/// Unlike [`sat_formula`] this makes no promise about satisfiability. Every clause
/// uses distinct variables.
pub fn random_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    max_width: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, max_width).prop_flat_map(|(vars, clause_count, max_width)| {
        Just(()).prop_perturb(move |_, mut rng| {
            let vars = vars.max(1);
            let mut clauses: Vec<Vec<Lit>> = vec![];

            for _ in 0..clause_count {
                let width = rng.gen_range(1..=max_width.max(1).min(vars));
                let chosen = rand::seq::index::sample(&mut rng, vars, width);

                let mut clause: Vec<Lit> = chosen
                    .iter()
                    .map(|index| Lit::from_index(index, rng.gen()))
                    .collect();

                clause.shuffle(&mut rng);
                clauses.push(clause);
            }

            clauses.shuffle(&mut rng);
            let mut formula = CnfFormula::from(clauses);
            formula.set_var_count(vars);
            formula
        })
    })
}

/// All eight sign combinations over three variables, which is unsatisfiable.
pub fn blocked_triple(a: Lit, b: Lit, c: Lit) -> CnfFormula {
    let mut formula = CnfFormula::new();
    for signs in 0..8u32 {
        formula.add_clause([
            a ^ (signs & 4 != 0),
            b ^ (signs & 2 != 0),
            c ^ (signs & 1 != 0),
        ]);
    }
    formula
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn satisfies(formula: &CnfFormula, assignment: impl Fn(usize) -> bool) -> bool {
        formula.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| assignment(lit.index()) == lit.is_positive())
        })
    }

    proptest! {
        #[test]
        fn sat_formula_has_a_model(formula in sat_formula(1..12usize, 0..40usize, 1..6usize)) {
            let n = formula.var_count();
            prop_assume!(n <= 12);

            let mut found = false;
            for bits in 0u32..(1 << n) {
                if satisfies(&formula, |index| bits & (1 << index) != 0) {
                    found = true;
                    break;
                }
            }
            prop_assert!(found);
        }

        #[test]
        fn random_formula_respects_width(formula in random_formula(1..20usize, 0..40usize, 1..6usize)) {
            for clause in formula.iter() {
                prop_assert!(!clause.is_empty() && clause.len() < 6);
                let mut vars: Vec<_> = clause.iter().map(|lit| lit.index()).collect();
                vars.sort_unstable();
                vars.dedup();
                prop_assert_eq!(vars.len(), clause.len());
            }
        }
    }

    #[test]
    fn blocked_triple_is_unsat() {
        let formula = blocked_triple(lit!(1), lit!(2), lit!(3));
        assert_eq!(formula.len(), 8);
        for bits in 0u32..8 {
            assert!(!satisfies(&formula, |index| bits & (1 << index) != 0));
        }
    }
}
