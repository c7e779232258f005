//! Verification cases and their verdicts.

use std::fmt;

use log::info;

use crate::calibration::Calibration;
use crate::controller::{
    build_property_formula, build_zone_predicates, BrakingParams, DecisionTable, Signals, TableLayout, Thresholds,
    Zone, ZonePredicates,
};
use crate::formula::Formula;
use crate::model::Model;
use crate::solver::{CheckResult, Solver, SolverConfig};
use crate::term::Term;

/// Every symbolic declaration of one verification query.
#[derive(Debug, Clone)]
pub struct VerificationCase {
    pub signals: Signals,
    pub thresholds: Thresholds,
    pub params: BrakingParams,
    pub zones: ZonePredicates,
    pub table: DecisionTable,
    pub controller: Formula,
    /// Parameter equalities followed by pinned thresholds.
    pub parameter_constraints: Vec<Formula>,
    pub property: Formula,
}

impl VerificationCase {
    pub fn new(calibration: &Calibration) -> Self {
        Self::with_layout(calibration, TableLayout::Standard)
    }

    pub fn with_layout(calibration: &Calibration, layout: TableLayout) -> Self {
        let signals = Signals::default();
        let thresholds = Thresholds::default();
        let params = BrakingParams::default();

        let zones = build_zone_predicates(&signals.ttc, &thresholds);
        let table = layout.build(&zones, &signals.decel, &params);
        let controller = table.to_formula();

        let mut parameter_constraints = vec![
            params.fb_decel.clone().eq(Term::constant(calibration.fb_decel.clone())),
            params.pb2_decel.clone().eq(Term::constant(calibration.pb2_decel.clone())),
            params.pb1_decel.clone().eq(Term::constant(calibration.pb1_decel.clone())),
        ];
        let pinned = [
            (&thresholds.fb_time, &calibration.thresholds.fb_time),
            (&thresholds.pb2_time, &calibration.thresholds.pb2_time),
            (&thresholds.pb1_time, &calibration.thresholds.pb1_time),
            (&thresholds.fcw_time, &calibration.thresholds.fcw_time),
        ];
        for (threshold, value) in pinned {
            if let Some(value) = value {
                parameter_constraints.push(threshold.clone().eq(Term::constant(value.clone())));
            }
        }

        let property = build_property_formula(&signals.decel, &params.fb_decel, &zones);

        Self {
            signals,
            thresholds,
            params,
            zones,
            table,
            controller,
            parameter_constraints,
            property,
        }
    }

    /// Controller, parameter constraints and property, in assertion order.
    pub fn formulas(&self) -> Vec<Formula> {
        let mut formulas = Vec::with_capacity(self.parameter_constraints.len() + 2);
        formulas.push(self.controller.clone());
        formulas.extend(self.parameter_constraints.iter().cloned());
        formulas.push(self.property.clone());
        formulas
    }

    pub fn verify(&self, config: &SolverConfig) -> VerificationResult {
        verify(&self.formulas(), config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The property can be violated; the model is a counterexample.
    Violated(Model),
    /// No assignment violates the property.
    Proved,
    /// The solver gave up before reaching a verdict.
    Inconclusive { theory_checks: usize },
}

impl VerificationResult {
    pub fn check_result(&self) -> CheckResult {
        match self {
            VerificationResult::Violated(_) => CheckResult::Sat,
            VerificationResult::Proved => CheckResult::Unsat,
            VerificationResult::Inconclusive { .. } => CheckResult::Unknown,
        }
    }

    pub fn counterexample(&self) -> Option<&Model> {
        match self {
            VerificationResult::Violated(model) => Some(model),
            _ => None,
        }
    }

    pub fn is_proved(&self) -> bool {
        matches!(self, VerificationResult::Proved)
    }

    /// Process exit code: 0 proved, 1 violated, 2 inconclusive.
    pub fn exit_code(&self) -> u8 {
        match self {
            VerificationResult::Proved => 0,
            VerificationResult::Violated(_) => 1,
            VerificationResult::Inconclusive { .. } => 2,
        }
    }
}

/// Assert all formulas in one fresh solver and check once.
pub fn verify(formulas: &[Formula], config: &SolverConfig) -> VerificationResult {
    let mut solver = Solver::new(config.clone());
    solver.add_all(formulas.iter().cloned());
    let result = match solver.check() {
        CheckResult::Sat => VerificationResult::Violated(solver.model().cloned().unwrap_or_default()),
        CheckResult::Unsat => VerificationResult::Proved,
        CheckResult::Unknown => VerificationResult::Inconclusive {
            theory_checks: solver.stats().theory_checks,
        },
    };
    info!("verify: {} formulas, verdict {}", formulas.len(), result.check_result());
    result
}

/// Human-readable account of a verification run.
pub struct Report<'a> {
    pub case: &'a VerificationCase,
    pub result: &'a VerificationResult,
}

impl<'a> Report<'a> {
    pub fn new(case: &'a VerificationCase, result: &'a VerificationResult) -> Self {
        Self { case, result }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- AEB Controller Logic Verification ---")?;
        writeln!(f)?;
        writeln!(
            f,
            "[INFO] Verifying property: 'The system should NOT apply full brakes when the situation is safe.'"
        )?;
        writeln!(f, "[INFO] Searching for a counterexample where:")?;
        match &self.case.property {
            Formula::And(items) => {
                for (i, item) in items.iter().enumerate() {
                    let prefix = if i == 0 { "" } else { "AND " };
                    writeln!(f, "[INFO]   {}{}. {}", prefix, i + 1, item)?;
                }
            }
            other => writeln!(f, "[INFO]   1. {}", other)?,
        }
        writeln!(f)?;
        writeln!(f, "--- Solver Result ---")?;
        writeln!(f, "Result: {}", self.result.check_result())?;
        writeln!(f)?;

        match self.result {
            VerificationResult::Violated(model) => {
                writeln!(f, "[BUG FOUND!] A scenario violating the safety property exists.")?;
                writeln!(f, "The system can apply full brakes under unsafe conditions.")?;
                writeln!(f, "Model that triggers the bug:")?;
                for (x, value) in model.iter() {
                    writeln!(f, "  {} = {}", x, value)?;
                }
            }
            VerificationResult::Proved => {
                writeln!(f, "[PROPERTY VERIFIED!] No counterexample exists.")?;
                writeln!(f, "The system applies full brakes ONLY when the condition")?;
                writeln!(f, "'{}' is met.", self.case.zones.get(Zone::FullBraking))?;
            }
            VerificationResult::Inconclusive { theory_checks } => {
                writeln!(
                    f,
                    "[INCONCLUSIVE] Search budget exhausted after {} theory checks; nothing was proved.",
                    theory_checks
                )?;
            }
        }
        Ok(())
    }
}
