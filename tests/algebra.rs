//! End-to-end properties of the explicit backend.

use std::collections::BTreeSet;
use test_log::test;

use parcalc::{
    Calculator, Conf, CsId, ExplCalculator, MinAlgo, ParetoErrorKind, Value,
};

fn fill(calc: &mut ExplCalculator, rows: &[&[f64]]) -> CsId {
    let set = calc.new_confset();

    for row in rows {
        calc.add(set, Conf::from_reals(row.iter().copied())).unwrap();
    }

    set
}

fn confs_of(calc: &mut ExplCalculator, c: CsId) -> Vec<Conf> {
    calc.confs(c).unwrap()
}

const SAMPLE: &[&[f64]] = &[
    &[1.0, 5.0, 2.0],
    &[2.0, 4.0, 2.0],
    &[3.0, 3.0, 9.0],
    &[1.0, 6.0, 1.0],
    &[4.0, 1.0, 4.0],
    &[4.0, 2.0, 4.0],
    &[0.5, 9.0, 9.0],
    &[2.0, 4.0, 1.0],
];

#[test]
fn dominance_is_a_preorder() {
    let confs: Vec<Conf> =
        SAMPLE.iter().map(|row| Conf::from_reals(row.iter().copied())).collect();

    for a in &confs {
        assert!(a.dominates(a), "reflexivity fails at {}", a);
    }

    let visible: BTreeSet<usize> = [0, 2].iter().copied().collect();

    for a in &confs {
        for b in &confs {
            for c in &confs {
                if a.dominates(b) && b.dominates(c) {
                    assert!(a.dominates(c), "transitivity fails at {} {} {}", a, b, c);
                }
                if a.dominates_masked(b, &visible) && b.dominates_masked(c, &visible) {
                    assert!(a.dominates_masked(c, &visible));
                }
            }
        }
    }
}

#[test]
fn minimise_returns_a_dominance_complete_antichain() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, SAMPLE);
    let input = confs_of(&mut calc, c);

    calc.minimise(c).unwrap();
    let min = confs_of(&mut calc, c);

    // antichain: no two distinct members mutually dominate
    for a in &min {
        for b in &min {
            if !a.equals(b) {
                assert!(!a.dominates(b), "{} dominates {}", a, b);
            }
        }
    }

    // completeness: every input conf is dominated by some survivor
    for a in &input {
        assert!(
            min.iter().any(|b| b.dominates(a)),
            "{} is not dominated by any survivor",
            a
        );
    }
}

#[test]
fn minimise_is_idempotent() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, SAMPLE);

    calc.minimise(c).unwrap();
    let once = confs_of(&mut calc, c);
    calc.minimise(c).unwrap();

    assert_eq!(once, confs_of(&mut calc, c));
}

#[test]
fn divide_and_conquer_minimisation_agrees() {
    let mut sc = ExplCalculator::new();
    let c0 = fill(&mut sc, SAMPLE);
    sc.minimise(c0).unwrap();

    let mut dc = ExplCalculator::with_min_algo(MinAlgo::DivideConquer);
    let c1 = fill(&mut dc, SAMPLE);
    dc.minimise(c1).unwrap();

    assert_eq!(confs_of(&mut sc, c0), confs_of(&mut dc, c1));
}

#[test]
fn scenario_antichain_is_a_fixpoint() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0]]);
    let before = confs_of(&mut calc, c);

    calc.minimise(c).unwrap();

    assert_eq!(before, confs_of(&mut calc, c));
}

#[test]
fn multiply_has_exact_cardinality() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, SAMPLE);
    let d = fill(&mut calc, &[&[0.1], &[0.2], &[0.3]]);

    let p = calc.multiply(c, d).unwrap();

    assert_eq!(calc.size(p).unwrap(), SAMPLE.len() * 3);
    assert_eq!(calc.width(p).unwrap(), 4);
}

#[test]
fn abstract_removes_exactly_the_span() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0, 2.0, 3.0, 4.0, 5.0]]);

    calc.abstract_range(c, 1, 4).unwrap();

    assert_eq!(calc.width(c).unwrap(), 2);
    assert_eq!(confs_of(&mut calc, c), vec![Conf::from_reals(vec![1.0, 5.0])]);
}

#[test]
fn join_contains_exactly_the_matching_pairs() {
    let c_rows: &[&[f64]] = &[&[1.0, 10.0], &[2.0, 20.0], &[2.0, 25.0], &[3.0, 30.0]];
    let d_rows: &[&[f64]] = &[&[2.0, 0.2], &[2.0, 0.25], &[4.0, 0.4]];

    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, c_rows);
    let d = fill(&mut calc, d_rows);

    let j = calc.join(c, 0, d, 0, false).unwrap();
    let got: BTreeSet<Conf> = confs_of(&mut calc, j).into_iter().collect();

    // brute force over the full product
    let mut expected = BTreeSet::new();
    for cr in c_rows {
        for dr in d_rows {
            if cr[0] == dr[0] {
                let row: Vec<f64> =
                    cr.iter().chain(dr.iter()).copied().collect();
                expected.insert(Conf::from_reals(row));
            }
        }
    }

    assert_eq!(got, expected);
    assert_eq!(got.len(), 4);
}

#[test]
fn join_and_abstract_drops_one_column() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0, 10.0], &[2.0, 20.0]]);
    let d = fill(&mut calc, &[&[2.0, 0.2], &[3.0, 0.3]]);

    let j = calc.join(c, 0, d, 0, false).unwrap();
    let ja = calc.join_and_abstract(c, 0, d, 0).unwrap();

    assert_eq!(calc.width(j).unwrap(), 4);
    assert_eq!(calc.width(ja).unwrap(), 3);
    assert_eq!(calc.size(j).unwrap(), calc.size(ja).unwrap());
}

#[test]
fn prodcons_contains_exactly_the_compatible_pairs() {
    let v_rows: &[&[f64]] = &[&[1.0, 0.8], &[3.0, 0.5], &[5.0, 0.4], &[8.0, 0.3]];
    let h_rows: &[&[f64]] = &[&[2.0, 0.8], &[4.0, 0.4], &[6.0, 0.2], &[8.0, 0.1]];

    let mut calc = ExplCalculator::new();
    let v = fill(&mut calc, v_rows);
    let h = fill(&mut calc, h_rows);

    let prod = calc.multiply(h, v).unwrap();
    assert_eq!(calc.size(prod).unwrap(), 16);

    let pc = calc
        .prodcons(h, 1, v, 0, &|val| Value::Real(1.0 / val.as_f64()))
        .unwrap();
    let got: BTreeSet<Conf> = confs_of(&mut calc, pc).into_iter().collect();

    // brute force: the consumer's first coordinate dominates 1/h[1]
    let mut expected = BTreeSet::new();
    for hr in h_rows {
        for vr in v_rows {
            if vr[0] <= 1.0 / hr[1] {
                let row: Vec<f64> =
                    hr.iter().chain(vr.iter()).copied().collect();
                expected.insert(Conf::from_reals(row));
            }
        }
    }

    assert_eq!(got, expected);
    assert_eq!(got.len(), 9);
}

#[test]
fn prodcons_handles_value_ties() {
    // two producers delivering the same quality must both pair with
    // every consumer the shared offer satisfies
    let p_rows: &[&[f64]] = &[&[1.0, 0.5], &[2.0, 0.5], &[3.0, 0.1]];
    let c_rows: &[&[f64]] = &[&[1.0, 7.0], &[2.0, 8.0], &[9.0, 9.0]];

    let mut calc = ExplCalculator::new();
    let p = fill(&mut calc, p_rows);
    let c = fill(&mut calc, c_rows);

    let pc = calc
        .prodcons(p, 1, c, 0, &|val| Value::Real(1.0 / val.as_f64()))
        .unwrap();
    let got: BTreeSet<Conf> = confs_of(&mut calc, pc).into_iter().collect();

    let mut expected = BTreeSet::new();
    for pr in p_rows {
        for cr in c_rows {
            if cr[0] <= 1.0 / pr[1] {
                let row: Vec<f64> =
                    pr.iter().chain(cr.iter()).copied().collect();
                expected.insert(Conf::from_reals(row));
            }
        }
    }

    assert_eq!(got, expected);
}

#[test]
fn unite_and_constrain_roundtrip() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0, 2.0], &[3.0, 4.0]]);
    let d = fill(&mut calc, &[&[5.0, 6.0], &[3.0, 4.0]]);

    let u = calc.unite(c, d).unwrap();
    assert_eq!(calc.size(u).unwrap(), 3);

    // constraining the union with one operand recovers that operand
    calc.constrain(u, d).unwrap();
    assert_eq!(confs_of(&mut calc, u), confs_of(&mut calc, d));
}

#[test]
fn packed_conf_rejects_foreign_value_before_mutation() {
    let mut conf = Conf::from_reals(vec![1.0, 2.0]);

    let err = conf.append_value(Value::UnorderedInt(3)).unwrap_err();
    match err.kind() {
        ParetoErrorKind::SignatureMismatch(_) => {}
        other => panic!("unexpected error kind {:?}", other),
    }

    assert_eq!(conf.len(), 2);
}

#[test]
fn derived_quantities_extend_the_space() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0, 2.0], &[3.0, 4.0]]);

    calc.add_derived_vector(c, &|conf| {
        let sum: f64 = (0..conf.len()).map(|i| conf.get(i).unwrap().as_f64()).sum();
        Conf::from_reals(vec![sum, sum / 2.0])
    })
    .unwrap();

    assert_eq!(calc.width(c).unwrap(), 4);
    assert!(confs_of(&mut calc, c)
        .contains(&Conf::from_reals(vec![1.0, 2.0, 3.0, 1.5])));
}

#[test]
fn lazy_product_generation_with_incremental_cull() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0], &[2.0]]);
    let d = fill(&mut calc, &[&[0.5], &[0.6]]);

    let product: Vec<Conf> = calc.prodgen(&[c, d]).unwrap().collect();
    assert_eq!(product.len(), 4);

    // feeding the generator into an incrementally minimised set
    let min = calc.new_confset();
    for conf in product {
        calc.add_and_min(min, conf).unwrap();
    }

    assert_eq!(confs_of(&mut calc, min), vec![Conf::from_reals(vec![1.0, 0.5])]);
}

#[test]
fn renders_fixed_point_tuples_and_empty_marker() {
    let mut calc = ExplCalculator::new();
    let c = fill(&mut calc, &[&[1.0, 0.25]]);

    assert_eq!(calc.render(c).unwrap(), "(1.000, 0.250)\n");

    let empty = calc.new_confset();
    assert_eq!(calc.render(empty).unwrap(), parcalc::EMPTY_CONFSET_STR);
}
