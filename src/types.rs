//! Literals over skeleton variables.
//!
//! Skeleton variables are 1-indexed (0 is reserved for the terminal node), so a literal
//! can be stored DIMACS-style as a signed integer.
use std::fmt;
use std::ops::Neg;

/// A literal: a skeleton variable together with its polarity.
///
/// # Invariants
///
/// - The variable is always `>= 1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    /// Positive literal of variable `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var == 0`.
    pub fn pos(var: u32) -> Self {
        assert_ne!(var, 0, "Variable index should not be zero");
        Lit(var as i32)
    }

    /// Negative literal of variable `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var == 0`.
    pub fn neg(var: u32) -> Self {
        assert_ne!(var, 0, "Variable index should not be zero");
        Lit(-(var as i32))
    }

    pub fn var(self) -> u32 {
        self.0.unsigned_abs()
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positive() {
            write!(f, "x{}", self.var())
        } else {
            write!(f, "~x{}", self.var())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit_creation() {
        let p = Lit::pos(3);
        let n = Lit::neg(3);
        assert!(p.is_positive());
        assert!(!n.is_positive());
        assert_eq!(p.var(), 3);
        assert_eq!(n.var(), 3);
        assert_eq!(-p, n);
    }

    #[test]
    #[should_panic(expected = "Variable index should not be zero")]
    fn test_lit_zero_panics() {
        Lit::pos(0);
    }

    #[test]
    fn test_lit_display() {
        assert_eq!(Lit::pos(2).to_string(), "x2");
        assert_eq!(Lit::neg(2).to_string(), "~x2");
    }
}
