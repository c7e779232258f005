//! Linear expressions with exact rational coefficients.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::term::Real;

/// `Σ cᵢ·xᵢ + k`, with no zero coefficients stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinExpr {
    coeffs: BTreeMap<Real, BigRational>,
    constant: BigRational,
}

impl LinExpr {
    pub fn zero() -> Self {
        LinExpr {
            coeffs: BTreeMap::new(),
            constant: BigRational::zero(),
        }
    }

    pub fn constant(value: BigRational) -> Self {
        LinExpr {
            coeffs: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn var(x: Real) -> Self {
        LinExpr {
            coeffs: BTreeMap::from([(x, BigRational::one())]),
            constant: BigRational::zero(),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn constant_term(&self) -> &BigRational {
        &self.constant
    }

    pub fn coeff(&self, x: &Real) -> Option<&BigRational> {
        self.coeffs.get(x)
    }

    pub fn vars(&self) -> impl Iterator<Item = &Real> {
        self.coeffs.keys()
    }

    /// The same expression with the `x` term dropped.
    pub fn without(&self, x: &Real) -> LinExpr {
        let mut res = self.clone();
        res.coeffs.remove(x);
        res
    }

    pub fn scaled(&self, factor: &BigRational) -> LinExpr {
        if factor.is_zero() {
            return LinExpr::zero();
        }
        LinExpr {
            coeffs: self.coeffs.iter().map(|(x, c)| (x.clone(), c * factor)).collect(),
            constant: &self.constant * factor,
        }
    }

    /// Scale by a positive factor so that the leading coefficient has magnitude one.
    ///
    /// The sign of the expression is preserved, so `e < 0` and `e <= 0` keep their meaning.
    pub fn normalized(&self) -> LinExpr {
        match self.coeffs.values().next() {
            Some(lead) if !lead.abs().is_one() => self.scaled(&lead.abs().recip()),
            _ => self.clone(),
        }
    }

    /// Evaluate under `values`; missing variables count as zero.
    pub fn eval(&self, values: &BTreeMap<Real, BigRational>) -> BigRational {
        let mut res = self.constant.clone();
        for (x, c) in &self.coeffs {
            if let Some(v) = values.get(x) {
                res += c * v;
            }
        }
        res
    }

    fn add_term(&mut self, x: &Real, c: &BigRational) {
        let entry = self.coeffs.entry(x.clone()).or_insert_with(BigRational::zero);
        *entry += c;
        if entry.is_zero() {
            self.coeffs.remove(x);
        }
    }
}

impl Add for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: LinExpr) -> LinExpr {
        for (x, c) in &rhs.coeffs {
            self.add_term(x, c);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        self + (-rhs)
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        LinExpr {
            coeffs: self.coeffs.into_iter().map(|(x, c)| (x, -c)).collect(),
            constant: -self.constant,
        }
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (x, c) in &self.coeffs {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            if c.is_one() {
                write!(f, "{}", x)?;
            } else if (-c).is_one() {
                write!(f, "-{}", x)?;
            } else {
                write!(f, "{}*{}", c, x)?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if !self.constant.is_zero() {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}
