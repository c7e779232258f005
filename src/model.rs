use std::collections::BTreeMap;
use std::fmt;

use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::formula::{Formula, Rel};
use crate::term::{Real, Term};

/// A satisfying assignment: every symbolic constant of the query mapped to an exact value.
///
/// Constants the model does not mention evaluate to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    values: BTreeMap<Real, BigRational>,
}

impl Model {
    pub fn new(values: BTreeMap<Real, BigRational>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&BigRational> {
        self.values.get(name)
    }

    pub fn value(&self, x: &Real) -> BigRational {
        self.values.get(x).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Real, &BigRational)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn eval_term(&self, term: &Term) -> BigRational {
        match term {
            Term::Var(x) => self.value(x),
            Term::Const(c) => c.clone(),
            Term::Add(a, b) => self.eval_term(a) + self.eval_term(b),
            Term::Sub(a, b) => self.eval_term(a) - self.eval_term(b),
            Term::Neg(a) => -self.eval_term(a),
            Term::Scale(c, a) => c * self.eval_term(a),
            Term::Abs(a) => self.eval_term(a).abs(),
            Term::Ite(c, a, b) => {
                if self.eval(c) {
                    self.eval_term(a)
                } else {
                    self.eval_term(b)
                }
            }
        }
    }

    pub fn eval(&self, formula: &Formula) -> bool {
        match formula {
            Formula::True => true,
            Formula::False => false,
            Formula::Cmp(a, rel, b) => {
                let a = self.eval_term(a);
                let b = self.eval_term(b);
                match rel {
                    Rel::Lt => a < b,
                    Rel::Le => a <= b,
                    Rel::Gt => a > b,
                    Rel::Ge => a >= b,
                    Rel::Eq => a == b,
                    Rel::Ne => a != b,
                }
            }
            Formula::Not(a) => !self.eval(a),
            Formula::And(items) => items.iter().all(|f| self.eval(f)),
            Formula::Or(items) => items.iter().any(|f| self.eval(f)),
            Formula::Implies(a, b) => !self.eval(a) || self.eval(b),
            Formula::Ite(c, a, b) => {
                if self.eval(c) {
                    self.eval(a)
                } else {
                    self.eval(b)
                }
            }
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (x, v)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", x, v)?;
        }
        write!(f, "]")
    }
}
