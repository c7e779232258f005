//! End-to-end tests for the AEB controller verification.
//!
//! Tests cover zone priority, totality of the decision table, the safe and the
//! priority-inverted configurations, zone boundaries and repeatability.

use aeb_verify::calibration::Calibration;
use aeb_verify::controller::{build_controller_formula, build_zone_predicates, TableLayout, Thresholds, Zone};
use aeb_verify::formula::Formula;
use aeb_verify::solver::{CheckResult, SolverConfig};
use aeb_verify::term::Term;
use aeb_verify::verify::{verify, VerificationCase, VerificationResult};
use num_bigint::BigInt;
use num_rational::BigRational;

fn rat(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn check(formulas: &[Formula]) -> CheckResult {
    verify(formulas, &SolverConfig::default()).check_result()
}

/// Controller, calibrated parameters and pinned thresholds, without the property.
fn controller_with_parameters(case: &VerificationCase) -> Vec<Formula> {
    let mut formulas = vec![case.controller.clone()];
    formulas.extend(case.parameter_constraints.iter().cloned());
    formulas
}

// ─── Priority Determinism ──────────────────────────────────────────────────────

#[test]
fn priority_selects_most_urgent_zone() {
    let case = VerificationCase::new(&Calibration::reference());
    let samples = [
        (rat(-1, 10), case.params.fb_decel.clone()),
        (rat(-59, 100), case.params.fb_decel.clone()),
        (rat(-3, 5), case.params.pb2_decel.clone()),
        (rat(-7, 10), case.params.pb2_decel.clone()),
        (rat(-1, 1), case.params.pb1_decel.clone()),
        (rat(-6, 5), Term::zero()),
        (rat(-19, 10), Term::zero()),
        (rat(-2, 1), Term::zero()),
        (rat(-5, 1), Term::zero()),
        (rat(0, 1), Term::zero()),
        (rat(1, 2), Term::zero()),
    ];

    for (ttc, expected) in samples {
        let mut formulas = controller_with_parameters(&case);
        formulas.push(case.signals.ttc.clone().eq(Term::constant(ttc.clone())));

        let mut selected = formulas.clone();
        selected.push(case.signals.decel.clone().eq(expected.clone()));
        assert_eq!(check(&selected), CheckResult::Sat, "TTC = {}", ttc);

        let mut other = formulas;
        other.push(case.signals.decel.clone().ne(expected));
        assert_eq!(check(&other), CheckResult::Unsat, "TTC = {}", ttc);
    }
}

#[test]
fn priority_holds_symbolically() {
    // Whenever a zone is the first one whose guard holds, its consequence is in force.
    let case = VerificationCase::new(&Calibration::reference());
    let rules = case.table.rules();
    for (i, rule) in rules.iter().enumerate() {
        let fires = Formula::and(
            rules[..i]
                .iter()
                .map(|higher| !higher.guard.clone())
                .chain([rule.guard.clone()]),
        );
        let mut formulas = controller_with_parameters(&case);
        formulas.push(!fires.implies(rule.consequence.clone()));
        assert_eq!(check(&formulas), CheckResult::Unsat, "rule {}", rule.label);
    }
}

#[test]
fn overlapping_guards_resolve_to_full_braking() {
    // Inside the full-braking zone every other zone guard holds too.
    let case = VerificationCase::new(&Calibration::reference());
    let mut formulas = controller_with_parameters(&case);
    formulas.push(case.zones.get(Zone::FullBraking).clone());
    formulas.push(case.zones.get(Zone::PartialBraking2).clone());
    formulas.push(case.signals.decel.clone().ne(case.params.fb_decel.clone()));
    assert_eq!(check(&formulas), CheckResult::Unsat);
}

// ─── Totality ──────────────────────────────────────────────────────────────────

#[test]
fn controller_is_total() {
    // Free thresholds: two outputs of the same inputs always agree.
    let case = VerificationCase::new(&Calibration::default());
    let other = Term::var("decel2");
    let mut formulas = controller_with_parameters(&case);
    formulas.push(build_controller_formula(&case.zones, &other, &case.params));
    formulas.push(case.signals.decel.clone().ne(other));
    assert_eq!(check(&formulas), CheckResult::Unsat);
}

#[test]
fn controller_always_commands_something() {
    let case = VerificationCase::new(&Calibration::default());
    for ttc in [rat(-100, 1), rat(-1, 3), rat(0, 1), rat(7, 2)] {
        for threshold in [rat(-1, 1), rat(0, 1), rat(1, 2), rat(50, 1)] {
            let mut formulas = controller_with_parameters(&case);
            formulas.push(case.signals.ttc.clone().eq(Term::constant(ttc.clone())));
            formulas.push(case.thresholds.fb_time.clone().eq(Term::constant(threshold.clone())));
            formulas.push(case.thresholds.pb2_time.clone().eq(Term::constant(threshold.clone())));
            assert_eq!(check(&formulas), CheckResult::Sat, "TTC = {}, threshold = {}", ttc, threshold);
        }
    }
}

// ─── Known-Safe Configuration ──────────────────────────────────────────────────

#[test]
fn reference_configuration_is_proved() {
    let case = VerificationCase::new(&Calibration::reference());
    let result = case.verify(&SolverConfig::default());
    assert_eq!(result, VerificationResult::Proved);
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn free_thresholds_are_proved() {
    let case = VerificationCase::new(&Calibration::default());
    assert_eq!(case.verify(&SolverConfig::default()), VerificationResult::Proved);
}

// ─── Priority Inversion ────────────────────────────────────────────────────────

#[test]
fn priority_inversion_is_found() {
    let case = VerificationCase::with_layout(&Calibration::reference(), TableLayout::PriorityInverted);
    let result = case.verify(&SolverConfig::default());
    assert_eq!(result.check_result(), CheckResult::Sat);
    assert_eq!(result.exit_code(), 1);

    let model = result.counterexample().unwrap();
    let ttc = model.get("TTC").unwrap();
    assert!(ttc > &rat(-4, 5) && ttc <= &rat(-3, 5), "TTC = {}", ttc);
    assert!(model.eval(case.zones.get(Zone::PartialBraking2)));
    assert!(!model.eval(case.zones.get(Zone::FullBraking)));
    assert_eq!(model.get("decel"), Some(&rat(49, 5)));

    for formula in case.formulas() {
        assert!(model.eval(&formula), "{} is false in {}", formula, model);
    }
    let rule = case.table.select(model).unwrap();
    assert_eq!(rule.label, Zone::PartialBraking2.name());
}

#[test]
fn priority_inversion_with_free_thresholds_is_found() {
    let case = VerificationCase::with_layout(&Calibration::default(), TableLayout::PriorityInverted);
    let result = case.verify(&SolverConfig::default());
    let model = result.counterexample().unwrap();
    assert!(model.eval(case.zones.get(Zone::PartialBraking2)));
    assert!(!model.eval(case.zones.get(Zone::FullBraking)));
}

// ─── Boundary ──────────────────────────────────────────────────────────────────

#[test]
fn boundary_is_not_in_full_braking_zone() {
    let ttc = Term::var("TTC");
    let thresholds = Thresholds::default();
    let zones = build_zone_predicates(&ttc, &thresholds);
    let on_boundary = ttc.eq(-thresholds.fb_time.clone());
    assert_eq!(
        check(&[zones.get(Zone::FullBraking).clone(), on_boundary]),
        CheckResult::Unsat
    );
}

#[test]
fn boundary_does_not_trigger_full_braking() {
    let case = VerificationCase::new(&Calibration::reference());
    let mut formulas = controller_with_parameters(&case);
    formulas.push(case.signals.ttc.clone().eq(-case.thresholds.fb_time.clone()));
    formulas.push(case.signals.decel.clone().eq(case.params.fb_decel.clone()));
    assert_eq!(check(&formulas), CheckResult::Unsat);
}

#[test]
fn boundary_witness_is_outside_full_braking_zone() {
    // Force the counterexample onto TTC = -FBtime.
    for calibration in [Calibration::reference(), Calibration::default()] {
        let case = VerificationCase::with_layout(&calibration, TableLayout::PriorityInverted);
        let mut formulas = case.formulas();
        formulas.push(case.signals.ttc.clone().eq(-case.thresholds.fb_time.clone()));

        let result = verify(&formulas, &SolverConfig::default());
        let model = result.counterexample().unwrap();
        let ttc = model.get("TTC").unwrap();
        let fb_time = model.get("FBtime").unwrap();
        assert_eq!(ttc, &-fb_time.clone());
        assert!(!model.eval(case.zones.get(Zone::FullBraking)), "{}", model);
        assert!(model.eval(case.zones.get(Zone::PartialBraking2)), "{}", model);
        for formula in &formulas {
            assert!(model.eval(formula), "{} is false in {}", formula, model);
        }
    }
}

#[test]
fn default_witness_is_off_boundary() {
    let case = VerificationCase::with_layout(&Calibration::reference(), TableLayout::PriorityInverted);
    let result = case.verify(&SolverConfig::default());
    let model = result.counterexample().unwrap();
    assert_ne!(model.get("TTC").unwrap(), &-model.get("FBtime").unwrap().clone());
    assert!(!model.eval(case.zones.get(Zone::FullBraking)));
}

// ─── Idempotence ───────────────────────────────────────────────────────────────

#[test]
fn repeated_verification_agrees() {
    for layout in [TableLayout::Standard, TableLayout::PriorityInverted] {
        let case = VerificationCase::with_layout(&Calibration::reference(), layout);
        let first = case.verify(&SolverConfig::default());
        let second = case.verify(&SolverConfig::default());
        assert_eq!(first.check_result(), second.check_result());
        if let Some(model) = second.counterexample() {
            for formula in case.formulas() {
                assert!(model.eval(&formula));
            }
        }
        assert_eq!(first, second);
    }
}

#[test]
fn exhausted_budget_is_not_a_proof() {
    let case = VerificationCase::new(&Calibration::reference());
    let config = SolverConfig {
        max_theory_checks: 0,
        ..SolverConfig::default()
    };
    let result = case.verify(&config);
    assert_eq!(result.check_result(), CheckResult::Unknown);
    assert!(!result.is_proved());
    assert_eq!(result.exit_code(), 2);
}
