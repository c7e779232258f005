//! Lowering of formulas onto the Boolean skeleton.
//!
//! Every comparison is rewritten over a single kind of theory atom, `e < 0`, where
//! `e` is a normalised linear expression:
//!
//! ```text
//! a <  b   =>   [a - b < 0]
//! a <= b   =>  ¬[b - a < 0]
//! a == b   =>  ¬[a - b < 0] ∧ ¬[b - a < 0]
//! ```
//!
//! `Abs` and term-level `If` are case-split into guarded linear pieces whose guards
//! partition the space.

use std::collections::HashMap;

use log::debug;
use num_traits::Signed;

use crate::bdd::Bdd;
use crate::formula::{Formula, Rel};
use crate::linear::LinExpr;
use crate::reference::Ref;
use crate::term::Term;
use crate::theory::Constraint;
use crate::types::Lit;

/// Bidirectional map between theory atoms `e < 0` and skeleton variables.
#[derive(Debug, Default)]
pub struct AtomTable {
    atoms: Vec<LinExpr>,
    index: HashMap<LinExpr, u32>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Skeleton variable standing for `expr < 0`.
    pub fn intern(&mut self, expr: LinExpr) -> u32 {
        assert!(!expr.is_constant(), "Ground atoms must be folded");
        if let Some(&v) = self.index.get(&expr) {
            return v;
        }
        self.atoms.push(expr.clone());
        let v = self.atoms.len() as u32;
        debug!("atom x{}: {} < 0", v, expr);
        self.index.insert(expr, v);
        v
    }

    pub fn atom(&self, var: u32) -> &LinExpr {
        assert_ne!(var, 0, "Variable index should not be zero");
        &self.atoms[var as usize - 1]
    }

    /// Theory constraint asserted by a skeleton literal.
    pub fn constraint(&self, lit: Lit) -> Constraint {
        let e = self.atom(lit.var()).clone();
        if lit.is_positive() {
            Constraint::lt_zero(e)
        } else {
            // ¬(e < 0)  <=>  -e <= 0
            Constraint::le_zero(-e)
        }
    }
}

pub struct Encoder<'a> {
    bdd: &'a Bdd,
    atoms: &'a mut AtomTable,
}

impl<'a> Encoder<'a> {
    pub fn new(bdd: &'a Bdd, atoms: &'a mut AtomTable) -> Self {
        Self { bdd, atoms }
    }

    pub fn encode(&mut self, formula: &Formula) -> Ref {
        match formula {
            Formula::True => self.bdd.one,
            Formula::False => self.bdd.zero,
            Formula::Cmp(lhs, rel, rhs) => self.encode_cmp(lhs, *rel, rhs),
            Formula::Not(a) => -self.encode(a),
            Formula::And(items) => {
                let refs: Vec<_> = items.iter().map(|f| self.encode(f)).collect();
                self.bdd.apply_and_many(refs)
            }
            Formula::Or(items) => {
                let refs: Vec<_> = items.iter().map(|f| self.encode(f)).collect();
                self.bdd.apply_or_many(refs)
            }
            Formula::Implies(a, b) => {
                let a = self.encode(a);
                let b = self.encode(b);
                self.bdd.apply_imply(a, b)
            }
            Formula::Ite(c, a, b) => {
                let c = self.encode(c);
                let a = self.encode(a);
                let b = self.encode(b);
                self.bdd.apply_ite(c, a, b)
            }
        }
    }

    fn encode_cmp(&mut self, lhs: &Term, rel: Rel, rhs: &Term) -> Ref {
        let left = self.cases(lhs);
        let right = self.cases(rhs);
        let mut res = self.bdd.zero;
        for (gl, el) in &left {
            for (gr, er) in &right {
                let guard = self.bdd.apply_and(*gl, *gr);
                if self.bdd.is_zero(guard) {
                    continue;
                }
                let cmp = self.compare(el.clone() - er.clone(), rel);
                let piece = self.bdd.apply_and(guard, cmp);
                res = self.bdd.apply_or(res, piece);
            }
        }
        res
    }

    /// `d ⋈ 0`
    fn compare(&mut self, d: LinExpr, rel: Rel) -> Ref {
        match rel {
            Rel::Lt => self.less_than_zero(d),
            Rel::Gt => self.less_than_zero(-d),
            Rel::Le => -self.less_than_zero(-d),
            Rel::Ge => -self.less_than_zero(d),
            Rel::Eq => self.equal_zero(d),
            Rel::Ne => -self.equal_zero(d),
        }
    }

    fn equal_zero(&mut self, d: LinExpr) -> Ref {
        let below = self.less_than_zero(d.clone());
        let above = self.less_than_zero(-d);
        self.bdd.apply_and(-below, -above)
    }

    fn less_than_zero(&mut self, e: LinExpr) -> Ref {
        if e.is_constant() {
            return if e.constant_term().is_negative() {
                self.bdd.one
            } else {
                self.bdd.zero
            };
        }
        let v = self.atoms.intern(e.normalized());
        self.bdd.mk_var(v)
    }

    /// Guarded linear pieces of a term. Guards are pairwise disjoint and cover everything.
    fn cases(&mut self, term: &Term) -> Vec<(Ref, LinExpr)> {
        match term {
            Term::Var(x) => vec![(self.bdd.one, LinExpr::var(x.clone()))],
            Term::Const(c) => vec![(self.bdd.one, LinExpr::constant(c.clone()))],
            Term::Add(a, b) => self.combine(a, b, |x, y| x + y),
            Term::Sub(a, b) => self.combine(a, b, |x, y| x - y),
            Term::Neg(a) => self.cases(a).into_iter().map(|(g, e)| (g, -e)).collect(),
            Term::Scale(c, a) => self.cases(a).into_iter().map(|(g, e)| (g, e.scaled(c))).collect(),
            Term::Abs(a) => {
                let mut res = Vec::new();
                for (g, e) in self.cases(a) {
                    let negative = self.less_than_zero(e.clone());
                    self.push_case(&mut res, g, -negative, e.clone());
                    self.push_case(&mut res, g, negative, -e);
                }
                res
            }
            Term::Ite(c, a, b) => {
                let c = self.encode(c);
                let mut res = Vec::new();
                for (g, e) in self.cases(a) {
                    self.push_case(&mut res, g, c, e);
                }
                for (g, e) in self.cases(b) {
                    self.push_case(&mut res, g, -c, e);
                }
                res
            }
        }
    }

    fn combine(&mut self, a: &Term, b: &Term, op: impl Fn(LinExpr, LinExpr) -> LinExpr) -> Vec<(Ref, LinExpr)> {
        let left = self.cases(a);
        let right = self.cases(b);
        let mut res = Vec::new();
        for (gl, el) in &left {
            for (gr, er) in &right {
                self.push_case(&mut res, *gl, *gr, op(el.clone(), er.clone()));
            }
        }
        res
    }

    fn push_case(&self, out: &mut Vec<(Ref, LinExpr)>, guard: Ref, condition: Ref, e: LinExpr) {
        let g = self.bdd.apply_and(guard, condition);
        if !self.bdd.is_zero(g) {
            out.push((g, e));
        }
    }
}
