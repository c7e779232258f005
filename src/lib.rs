//! # aeb-verify: satisfiability-based checking of AEB controller logic
//!
//! **`aeb-verify`** encodes the threshold logic of an Automatic Emergency Braking (AEB) controller
//! as constraints over real-valued variables and asks whether a safety property can be violated:
//! *full braking is commanded only inside the full-braking zone*.
//!
//! ## How it works
//!
//! The controller is a priority-ordered decision table over four zones, each guarded by
//! `And(Abs(TTC) < threshold, TTC < 0)`. The table is reduced into one nested `If` formula and
//! conjoined with the braking parameters and the *negation* of the property. A satisfying
//! assignment of that conjunction is a counterexample; unsatisfiability is a proof.
//!
//! Satisfiability is decided by a small in-crate solver for linear real arithmetic:
//!
//! - The Boolean structure lives in a reduced ordered **BDD** over theory atoms `e < 0`.
//! - Each path of the BDD is a conjunction of linear constraints, decided exactly with
//!   **Fourier-Motzkin** elimination over big rationals.
//! - Paths refuted by the theory are blocked and the search continues.
//!
//! ## Basic Usage
//!
//! ```rust
//! use aeb_verify::calibration::Calibration;
//! use aeb_verify::controller::TableLayout;
//! use aeb_verify::solver::SolverConfig;
//! use aeb_verify::verify::{VerificationCase, VerificationResult};
//!
//! // The production table is safe.
//! let case = VerificationCase::new(&Calibration::reference());
//! assert_eq!(case.verify(&SolverConfig::default()), VerificationResult::Proved);
//!
//! // Checking the PB2 guard first breaks it.
//! let broken = VerificationCase::with_layout(&Calibration::reference(), TableLayout::PriorityInverted);
//! let result = broken.verify(&SolverConfig::default());
//! assert!(result.counterexample().is_some());
//! ```
//!
//! ## Core Components
//!
//! - **[`controller`]**: zones, the decision table and the property formula.
//! - **[`verify`]**: [`VerificationCase`][crate::verify::VerificationCase], verdicts and the report.
//! - **[`solver`]**: the lazy BDD + linear arithmetic search loop.
//! - **[`bdd`]**: the [`Bdd`][crate::bdd::Bdd] manager used for the Boolean skeleton.

pub mod atoms;
pub mod bdd;
pub mod cache;
pub mod calibration;
pub mod controller;
pub mod decimal;
pub mod formula;
pub mod linear;
pub mod model;
pub mod reference;
pub mod solver;
pub mod table;
pub mod term;
pub mod theory;
pub mod types;
pub mod utils;
pub mod verify;
