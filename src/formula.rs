//! Boolean formulas over real terms.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Not;

use crate::term::{Real, Term};

/// Comparison relation between two terms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Rel {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl fmt::Display for Rel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rel::Lt => "<",
            Rel::Le => "<=",
            Rel::Gt => ">",
            Rel::Ge => ">=",
            Rel::Eq => "==",
            Rel::Ne => "!=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    /// Comparison of two real terms
    Cmp(Term, Rel, Term),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    /// Formula-level conditional: if c then f1 else f2
    Ite(Box<Formula>, Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn and(items: impl IntoIterator<Item = Formula>) -> Self {
        Formula::And(items.into_iter().collect())
    }

    pub fn or(items: impl IntoIterator<Item = Formula>) -> Self {
        Formula::Or(items.into_iter().collect())
    }

    pub fn implies(self, consequent: Formula) -> Self {
        Formula::Implies(Box::new(self), Box::new(consequent))
    }

    pub fn ite(condition: Formula, then_formula: Formula, else_formula: Formula) -> Self {
        Formula::Ite(Box::new(condition), Box::new(then_formula), Box::new(else_formula))
    }

    /// All symbolic constants the formula mentions.
    pub fn reals(&self) -> BTreeSet<Real> {
        let mut out = BTreeSet::new();
        self.collect_reals(&mut out);
        out
    }

    pub(crate) fn collect_reals(&self, out: &mut BTreeSet<Real>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Cmp(a, _, b) => {
                a.collect_reals(out);
                b.collect_reals(out);
            }
            Formula::Not(a) => a.collect_reals(out),
            Formula::And(items) | Formula::Or(items) => {
                for item in items {
                    item.collect_reals(out);
                }
            }
            Formula::Implies(a, b) => {
                a.collect_reals(out);
                b.collect_reals(out);
            }
            Formula::Ite(c, a, b) => {
                c.collect_reals(out);
                a.collect_reals(out);
                b.collect_reals(out);
            }
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        Formula::Not(Box::new(self))
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, items: &[Formula]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "True"),
            Formula::False => write!(f, "False"),
            Formula::Cmp(a, rel, b) => write!(f, "{} {} {}", a, rel, b),
            Formula::Not(a) => write!(f, "Not({})", a),
            Formula::And(items) => write_list(f, "And", items),
            Formula::Or(items) => write_list(f, "Or", items),
            Formula::Implies(a, b) => write!(f, "Implies({}, {})", a, b),
            Formula::Ite(c, a, b) => write!(f, "If({}, {}, {})", c, a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zone_guard() {
        let ttc = Term::var("TTC");
        let guard = Formula::and([ttc.clone().abs().lt(Term::var("FBtime")), ttc.lt(Term::zero())]);
        assert_eq!(guard.to_string(), "And(Abs(TTC) < FBtime, TTC < 0)");
        assert_eq!((!guard).to_string(), "Not(And(Abs(TTC) < FBtime, TTC < 0))");
    }

    #[test]
    fn test_display_ite() {
        let decel = Term::var("decel");
        let f = Formula::ite(
            Term::var("x").gt(Term::int(1)),
            decel.clone().eq(Term::var("FBdecel")),
            decel.eq(Term::zero()),
        );
        assert_eq!(f.to_string(), "If(x > 1, decel == FBdecel, decel == 0)");
    }

    #[test]
    fn test_reals() {
        let f = Term::var("b").le(Term::var("a")).implies(Term::var("c").ne(Term::int(0)));
        let names: Vec<_> = f.reals().into_iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
