//! Real-valued terms.
//!
//! Only linear terms can be built: constants scale terms, but two terms are never
//! multiplied together.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::formula::{Formula, Rel};

/// A named real-valued symbolic constant.
///
/// Two `Real`s with the same name denote the same constant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Real(Rc<str>);

impl Real {
    pub fn new(name: &str) -> Self {
        Real(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Real {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Symbolic constant
    Var(Real),
    /// Rational literal
    Const(BigRational),
    /// Addition: t1 + t2
    Add(Box<Term>, Box<Term>),
    /// Subtraction: t1 - t2
    Sub(Box<Term>, Box<Term>),
    /// Negation: -t
    Neg(Box<Term>),
    /// Scaling by a rational: c * t
    Scale(BigRational, Box<Term>),
    /// Absolute value: |t|
    Abs(Box<Term>),
    /// Term-level conditional: if c then t1 else t2
    Ite(Box<Formula>, Box<Term>, Box<Term>),
}

impl Term {
    pub fn var(name: &str) -> Self {
        Term::Var(Real::new(name))
    }

    pub fn constant(value: BigRational) -> Self {
        Term::Const(value)
    }

    pub fn int(value: i64) -> Self {
        Term::Const(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn zero() -> Self {
        Term::Const(BigRational::zero())
    }

    pub fn abs(self) -> Self {
        Term::Abs(Box::new(self))
    }

    pub fn scale(self, factor: BigRational) -> Self {
        Term::Scale(factor, Box::new(self))
    }

    pub fn ite(condition: Formula, then_term: Term, else_term: Term) -> Self {
        Term::Ite(Box::new(condition), Box::new(then_term), Box::new(else_term))
    }

    /// Less than: self < other
    pub fn lt(self, other: Term) -> Formula {
        Formula::Cmp(self, Rel::Lt, other)
    }

    /// Less or equal: self <= other
    pub fn le(self, other: Term) -> Formula {
        Formula::Cmp(self, Rel::Le, other)
    }

    /// Greater than: self > other
    pub fn gt(self, other: Term) -> Formula {
        Formula::Cmp(self, Rel::Gt, other)
    }

    /// Greater or equal: self >= other
    pub fn ge(self, other: Term) -> Formula {
        Formula::Cmp(self, Rel::Ge, other)
    }

    /// Equality: self == other
    pub fn eq(self, other: Term) -> Formula {
        Formula::Cmp(self, Rel::Eq, other)
    }

    /// Disequality: self != other
    pub fn ne(self, other: Term) -> Formula {
        Formula::Cmp(self, Rel::Ne, other)
    }

    /// Collect every symbolic constant occurring in the term.
    pub fn collect_reals(&self, out: &mut BTreeSet<Real>) {
        match self {
            Term::Var(x) => {
                out.insert(x.clone());
            }
            Term::Const(_) => {}
            Term::Add(a, b) | Term::Sub(a, b) => {
                a.collect_reals(out);
                b.collect_reals(out);
            }
            Term::Neg(a) | Term::Scale(_, a) | Term::Abs(a) => a.collect_reals(out),
            Term::Ite(c, a, b) => {
                c.collect_reals(out);
                a.collect_reals(out);
                b.collect_reals(out);
            }
        }
    }

    fn is_atomic(&self) -> bool {
        matches!(self, Term::Var(_) | Term::Const(_) | Term::Abs(_) | Term::Ite(..))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atomic() {
            write!(f, "{}", self)
        } else {
            write!(f, "({})", self)
        }
    }
}

impl From<Real> for Term {
    fn from(x: Real) -> Self {
        Term::Var(x)
    }
}

impl From<BigRational> for Term {
    fn from(value: BigRational) -> Self {
        Term::Const(value)
    }
}

impl Add for Term {
    type Output = Term;

    fn add(self, rhs: Term) -> Term {
        Term::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Term {
    type Output = Term;

    fn sub(self, rhs: Term) -> Term {
        Term::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term::Neg(Box::new(self))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(x) => write!(f, "{}", x),
            Term::Const(c) => write!(f, "{}", c),
            Term::Add(a, b) => write!(f, "{} + {}", a, b),
            Term::Sub(a, b) => {
                write!(f, "{} - ", a)?;
                b.fmt_operand(f)
            }
            Term::Neg(a) => {
                write!(f, "-")?;
                a.fmt_operand(f)
            }
            Term::Scale(c, a) => {
                write!(f, "{}*", c)?;
                a.fmt_operand(f)
            }
            Term::Abs(a) => write!(f, "Abs({})", a),
            Term::Ite(c, a, b) => write!(f, "If({}, {}, {})", c, a, b),
        }
    }
}
