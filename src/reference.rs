use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// A reference to a skeleton node, potentially negated (complement edge).
///
/// The least significant bit holds the negation flag, the remaining bits the node index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ref(u32);

impl Ref {
    pub const fn new(index: u32, negated: bool) -> Self {
        Self((index << 1) | negated as u32)
    }

    pub const fn positive(index: u32) -> Self {
        Self::new(index, false)
    }

    pub const fn negative(index: u32) -> Self {
        Self::new(index, true)
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> u32 {
        self.0 >> 1
    }

    pub const fn is_negated(self) -> bool {
        self.0 & 1 != 0
    }

    /// Return the raw representation, suitable for hashing.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_roundtrip() {
        let r = Ref::positive(7);
        assert!(!r.is_negated());
        assert!((-r).is_negated());
        assert_eq!(-(-r), r);
        assert_eq!((-r).index(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::positive(3).to_string(), "@3");
        assert_eq!(Ref::negative(3).to_string(), "~@3");
    }
}
