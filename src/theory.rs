//! Feasibility of conjunctions of linear constraints over the reals.
//!
//! Variables are eliminated one at a time with Fourier-Motzkin, tracking strictness.
//! When no contradiction shows up, a witness is built by back-substitution through
//! the recorded elimination stages.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::linear::LinExpr;
use crate::term::Real;

/// `expr < 0` when strict, `expr <= 0` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constraint {
    pub expr: LinExpr,
    pub strict: bool,
}

impl Constraint {
    pub fn lt_zero(expr: LinExpr) -> Self {
        Constraint { expr, strict: true }
    }

    pub fn le_zero(expr: LinExpr) -> Self {
        Constraint { expr, strict: false }
    }

    pub fn holds(&self, values: &BTreeMap<Real, BigRational>) -> bool {
        let v = self.expr.eval(values);
        if self.strict {
            v.is_negative()
        } else {
            !v.is_positive()
        }
    }

    fn normalized(self) -> Self {
        Constraint {
            expr: self.expr.normalized(),
            strict: self.strict,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.expr, if self.strict { "<" } else { "<=" })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryResult {
    /// Feasible, with a witness for every variable in the constraints.
    Sat(BTreeMap<Real, BigRational>),
    Unsat,
}

/// Decide a conjunction of constraints.
pub fn check(constraints: &[Constraint]) -> TheoryResult {
    let order: Vec<Real> = constraints
        .iter()
        .flat_map(|c| c.expr.vars().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut current = BTreeSet::new();
    for c in constraints {
        if !absorb(&mut current, c.clone().normalized()) {
            debug!("ground constraint {} is violated", c);
            return TheoryResult::Unsat;
        }
    }

    // stages[i] holds the system right before eliminating order[i].
    let mut stages = Vec::with_capacity(order.len());
    for x in &order {
        let next = eliminate(&current, x);
        stages.push(std::mem::take(&mut current));
        for c in next {
            if !absorb(&mut current, c) {
                debug!("eliminating {} yields a contradiction", x);
                return TheoryResult::Unsat;
            }
        }
    }

    let mut values = BTreeMap::new();
    for (x, stage) in order.iter().zip(&stages).rev() {
        let mut lower: Option<Bound> = None;
        let mut upper: Option<Bound> = None;
        for c in stage {
            let Some(a) = c.expr.coeff(x) else {
                continue;
            };
            // a·x + rest ⋈ 0
            let rest = c.expr.without(x).eval(&values);
            let bound = Bound {
                value: -rest / a,
                strict: c.strict,
            };
            if a.is_positive() {
                upper = Some(tighten_upper(upper, bound));
            } else {
                lower = Some(tighten_lower(lower, bound));
            }
        }
        let value = pick_value(lower.as_ref(), upper.as_ref());
        debug!("{} = {} (lower = {:?}, upper = {:?})", x, value, lower, upper);
        values.insert(x.clone(), value);
    }

    TheoryResult::Sat(values)
}

/// Insert a constraint, folding ground ones. Returns `false` on a violated ground constraint.
fn absorb(set: &mut BTreeSet<Constraint>, c: Constraint) -> bool {
    if c.expr.is_constant() {
        return c.holds(&BTreeMap::new());
    }
    set.insert(c);
    true
}

fn eliminate(constraints: &BTreeSet<Constraint>, x: &Real) -> Vec<Constraint> {
    let mut kept = Vec::new();
    let mut uppers = Vec::new();
    let mut lowers = Vec::new();
    for c in constraints {
        match c.expr.coeff(x) {
            None => kept.push(c.clone()),
            Some(a) if a.is_positive() => uppers.push((a, c)),
            Some(b) => lowers.push((b, c)),
        }
    }

    for (a, up) in &uppers {
        for (b, low) in &lowers {
            // a > 0 > b, so (-b)·up + a·low cancels x and keeps the direction.
            let expr = up.expr.scaled(&-*b) + low.expr.scaled(a);
            kept.push(
                Constraint {
                    expr,
                    strict: up.strict || low.strict,
                }
                .normalized(),
            );
        }
    }
    kept
}

#[derive(Debug, Clone)]
struct Bound {
    value: BigRational,
    strict: bool,
}

impl Bound {
    /// `v` lies above this lower bound.
    fn admits_above(&self, v: &BigRational) -> bool {
        v > &self.value || (!self.strict && v == &self.value)
    }

    /// `v` lies below this upper bound.
    fn admits_below(&self, v: &BigRational) -> bool {
        v < &self.value || (!self.strict && v == &self.value)
    }
}

fn tighten_lower(current: Option<Bound>, new: Bound) -> Bound {
    match current {
        Some(cur) if cur.value > new.value => cur,
        Some(cur) if cur.value == new.value => Bound {
            value: cur.value,
            strict: cur.strict || new.strict,
        },
        _ => new,
    }
}

fn tighten_upper(current: Option<Bound>, new: Bound) -> Bound {
    match current {
        Some(cur) if cur.value < new.value => cur,
        Some(cur) if cur.value == new.value => Bound {
            value: cur.value,
            strict: cur.strict || new.strict,
        },
        _ => new,
    }
}

/// Choose a witness inside the bounds: zero, else an integer, else the midpoint.
fn pick_value(lower: Option<&Bound>, upper: Option<&Bound>) -> BigRational {
    let admits = |v: &BigRational| {
        lower.map_or(true, |l| l.admits_above(v)) && upper.map_or(true, |u| u.admits_below(v))
    };

    let zero = BigRational::zero();
    if admits(&zero) {
        return zero;
    }

    let one = BigRational::one();
    match (lower, upper) {
        (Some(l), None) => {
            if l.strict {
                l.value.floor() + one
            } else {
                l.value.ceil()
            }
        }
        (None, Some(u)) => {
            if u.strict {
                u.value.ceil() - one
            } else {
                u.value.floor()
            }
        }
        (Some(l), Some(u)) => {
            if l.value == u.value {
                return l.value.clone();
            }
            let candidate = l.value.floor() + one;
            if admits(&candidate) {
                candidate
            } else {
                (&l.value + &u.value) / BigRational::from_integer(BigInt::from(2))
            }
        }
        (None, None) => zero,
    }
}
