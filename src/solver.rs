//! Satisfiability checking for quantifier-free linear real arithmetic.
//!
//! Assertions are accumulated conjunctively into one skeleton BDD over theory atoms.
//! [`Solver::check`] then alternates between the skeleton and the theory: pick one
//! satisfying path, decide its literals with Fourier-Motzkin, and either return the
//! witness or block the path and try again.
//!
//! # Example
//!
//! ```
//! use aeb_verify::solver::{CheckResult, Solver, SolverConfig};
//! use aeb_verify::term::Term;
//!
//! let x = Term::var("x");
//! let mut solver = Solver::new(SolverConfig::default());
//! solver.add(x.clone().abs().lt(Term::int(1)));
//! solver.add(x.clone().gt(Term::zero()));
//! assert_eq!(solver.check(), CheckResult::Sat);
//!
//! solver.add(x.ge(Term::int(1)));
//! assert_eq!(solver.check(), CheckResult::Unsat);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, info, warn};
use num_rational::BigRational;
use num_traits::Zero;

use crate::atoms::{AtomTable, Encoder};
use crate::bdd::Bdd;
use crate::formula::Formula;
use crate::model::Model;
use crate::reference::Ref;
use crate::term::Real;
use crate::theory::{self, Constraint, TheoryResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Theory checks allowed per `check` before giving up with `unknown`.
    pub max_theory_checks: usize,
    /// Unique table size of the skeleton manager, in bits.
    pub bucket_bits: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_theory_checks: 10_000,
            bucket_bits: 12,
        }
    }
}

/// Result of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// The assertions are satisfiable
    Sat,
    /// The assertions are unsatisfiable
    Unsat,
    /// The search budget ran out before a verdict was reached
    Unknown,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Sat => write!(f, "sat"),
            CheckResult::Unsat => write!(f, "unsat"),
            CheckResult::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Distinct theory atoms.
    pub atoms: usize,
    /// Nodes in the conjunction of all assertions.
    pub skeleton_size: u64,
    /// Theory checks performed by the last `check`.
    pub theory_checks: usize,
    /// Computed-table hits of the skeleton manager.
    pub cache_hits: usize,
    /// Computed-table misses of the skeleton manager.
    pub cache_misses: usize,
}

pub struct Solver {
    config: SolverConfig,
    bdd: Bdd,
    atoms: AtomTable,
    assertions: Vec<Formula>,
    root: Ref,
    reals: BTreeSet<Real>,
    model: Option<Model>,
    theory_checks: usize,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        let bdd = Bdd::new(config.bucket_bits);
        let root = bdd.one;
        Self {
            config,
            bdd,
            atoms: AtomTable::new(),
            assertions: Vec::new(),
            root,
            reals: BTreeSet::new(),
            model: None,
            theory_checks: 0,
        }
    }

    /// Assert a formula; assertions are accumulated conjunctively.
    pub fn add(&mut self, formula: Formula) {
        debug!("add({})", formula);
        self.reals.extend(formula.reals());
        let f = Encoder::new(&self.bdd, &mut self.atoms).encode(&formula);
        self.root = self.bdd.apply_and(self.root, f);
        self.assertions.push(formula);
    }

    pub fn add_all(&mut self, formulas: impl IntoIterator<Item = Formula>) {
        for formula in formulas {
            self.add(formula);
        }
    }

    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }

    /// Decide the conjunction of all assertions.
    ///
    /// On `Sat` the witness is available through [`Solver::model`].
    pub fn check(&mut self) -> CheckResult {
        self.model = None;
        self.theory_checks = 0;

        let mut f = self.root;
        let result = loop {
            let Some(path) = self.bdd.one_sat(f) else {
                break CheckResult::Unsat;
            };
            if self.theory_checks >= self.config.max_theory_checks {
                warn!("giving up after {} theory checks", self.theory_checks);
                break CheckResult::Unknown;
            }
            self.theory_checks += 1;

            let constraints: Vec<Constraint> = path.iter().map(|&lit| self.atoms.constraint(lit)).collect();
            debug!(
                "theory check #{} on path [{}]",
                self.theory_checks,
                path.iter().map(|lit| lit.to_string()).collect::<Vec<_>>().join(", ")
            );

            match theory::check(&constraints) {
                TheoryResult::Sat(mut values) => {
                    for x in &self.reals {
                        values.entry(x.clone()).or_insert_with(BigRational::zero);
                    }
                    self.model = Some(Model::new(values));
                    break CheckResult::Sat;
                }
                TheoryResult::Unsat => {
                    let cube = self.bdd.mk_cube(path);
                    f = self.bdd.apply_and(f, -cube);
                }
            }
        };

        let stats = self.stats();
        info!(
            "check: {} ({} atoms, skeleton of {} nodes, {} theory checks, cache {}/{} hits)",
            result,
            stats.atoms,
            stats.skeleton_size,
            stats.theory_checks,
            stats.cache_hits,
            stats.cache_hits + stats.cache_misses
        );
        result
    }

    /// Witness of the last `check`, if it returned `Sat`.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn stats(&self) -> SolverStats {
        let (cache_hits, cache_misses) = self.bdd.cache_stats();
        SolverStats {
            atoms: self.atoms.len(),
            skeleton_size: self.bdd.size(self.root),
            theory_checks: self.theory_checks,
            cache_hits,
            cache_misses,
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverConfig::default())
    }
}
