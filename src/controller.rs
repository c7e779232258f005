//! Symbolic model of the AEB controller's decision logic.
//!
//! The controller classifies the time to collision into nested zones and commands a
//! deceleration for the most urgent zone whose guard holds:
//!
//! ```text
//! If(is_full_braking_zone, decel == FBdecel,
//!    If(is_pb2_braking_zone, decel == PB2decel,
//!       If(is_pb1_braking_zone, decel == PB1decel,
//!          If(is_fcw_zone, decel == 0, decel == 0))))
//! ```
//!
//! Guards are not disjoint (the full-braking zone lies inside the PB2 zone whenever
//! `FBtime < PB2time`), so the order of the rules is part of the semantics.

use std::collections::BTreeMap;
use std::fmt;

use crate::formula::Formula;
use crate::model::Model;
use crate::term::Term;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Zone {
    FullBraking,
    PartialBraking2,
    PartialBraking1,
    ForwardCollisionWarning,
}

impl Zone {
    /// All zones, most urgent first.
    pub const PRIORITY: [Zone; 4] = [
        Zone::FullBraking,
        Zone::PartialBraking2,
        Zone::PartialBraking1,
        Zone::ForwardCollisionWarning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Zone::FullBraking => "is_full_braking_zone",
            Zone::PartialBraking2 => "is_pb2_braking_zone",
            Zone::PartialBraking1 => "is_pb1_braking_zone",
            Zone::ForwardCollisionWarning => "is_fcw_zone",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Controller input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signals {
    pub ttc: Term,
    pub decel: Term,
}

impl Default for Signals {
    fn default() -> Self {
        Self {
            ttc: Term::var("TTC"),
            decel: Term::var("decel"),
        }
    }
}

/// Time-to-collision threshold of every zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds {
    pub fb_time: Term,
    pub pb2_time: Term,
    pub pb1_time: Term,
    pub fcw_time: Term,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fb_time: Term::var("FBtime"),
            pb2_time: Term::var("PB2time"),
            pb1_time: Term::var("PB1time"),
            fcw_time: Term::var("FCWtime"),
        }
    }
}

impl Thresholds {
    pub fn get(&self, zone: Zone) -> &Term {
        match zone {
            Zone::FullBraking => &self.fb_time,
            Zone::PartialBraking2 => &self.pb2_time,
            Zone::PartialBraking1 => &self.pb1_time,
            Zone::ForwardCollisionWarning => &self.fcw_time,
        }
    }
}

/// Deceleration commanded in each braking zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrakingParams {
    pub fb_decel: Term,
    pub pb2_decel: Term,
    pub pb1_decel: Term,
}

impl Default for BrakingParams {
    fn default() -> Self {
        Self {
            fb_decel: Term::var("FBdecel"),
            pb2_decel: Term::var("PB2decel"),
            pb1_decel: Term::var("PB1decel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePredicates(BTreeMap<Zone, Formula>);

impl ZonePredicates {
    pub fn get(&self, zone: Zone) -> &Formula {
        &self.0[&zone]
    }

    /// Predicates in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Zone, &Formula)> {
        self.0.iter().map(|(&zone, f)| (zone, f))
    }
}

/// `And(Abs(TTC) < threshold, TTC < 0)`
pub fn zone_predicate(ttc: &Term, threshold: &Term) -> Formula {
    Formula::and([ttc.clone().abs().lt(threshold.clone()), ttc.clone().lt(Term::zero())])
}

pub fn build_zone_predicates(ttc: &Term, thresholds: &Thresholds) -> ZonePredicates {
    ZonePredicates(
        Zone::PRIORITY
            .iter()
            .map(|&zone| (zone, zone_predicate(ttc, thresholds.get(zone))))
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub label: String,
    pub guard: Formula,
    pub consequence: Formula,
}

/// Ordered guard/consequence rules with a fallback; the first rule whose guard holds wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTable {
    rules: Vec<Rule>,
    default: Formula,
}

impl DecisionTable {
    pub fn new(default: Formula) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    /// Append a rule below all existing ones.
    pub fn rule(mut self, label: impl Into<String>, guard: Formula, consequence: Formula) -> Self {
        self.rules.push(Rule {
            label: label.into(),
            guard,
            consequence,
        });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_consequence(&self) -> &Formula {
        &self.default
    }

    /// Right-nested `If` chain, built from the last rule upwards.
    pub fn to_formula(&self) -> Formula {
        self.rules.iter().rfold(self.default.clone(), |acc, rule| {
            Formula::ite(rule.guard.clone(), rule.consequence.clone(), acc)
        })
    }

    /// The rule that fires under `model`, or `None` when the default applies.
    pub fn select(&self, model: &Model) -> Option<&Rule> {
        self.rules.iter().find(|rule| model.eval(&rule.guard))
    }

    /// Consequence in force under `model`.
    pub fn consequence(&self, model: &Model) -> &Formula {
        self.select(model).map_or(&self.default, |rule| &rule.consequence)
    }
}

/// The production decision table.
pub fn controller_table(zones: &ZonePredicates, decel: &Term, params: &BrakingParams) -> DecisionTable {
    let no_braking = decel.clone().eq(Term::zero());
    DecisionTable::new(no_braking.clone())
        .rule(
            Zone::FullBraking.name(),
            zones.get(Zone::FullBraking).clone(),
            decel.clone().eq(params.fb_decel.clone()),
        )
        .rule(
            Zone::PartialBraking2.name(),
            zones.get(Zone::PartialBraking2).clone(),
            decel.clone().eq(params.pb2_decel.clone()),
        )
        .rule(
            Zone::PartialBraking1.name(),
            zones.get(Zone::PartialBraking1).clone(),
            decel.clone().eq(params.pb1_decel.clone()),
        )
        .rule(
            Zone::ForwardCollisionWarning.name(),
            zones.get(Zone::ForwardCollisionWarning).clone(),
            no_braking,
        )
}

/// A mis-prioritised table: full braking is keyed on the PB2 guard, ahead of the
/// full-braking guard.
pub fn priority_inverted_table(zones: &ZonePredicates, decel: &Term, params: &BrakingParams) -> DecisionTable {
    let no_braking = decel.clone().eq(Term::zero());
    let full_braking = decel.clone().eq(params.fb_decel.clone());
    DecisionTable::new(no_braking.clone())
        .rule(
            Zone::PartialBraking2.name(),
            zones.get(Zone::PartialBraking2).clone(),
            full_braking.clone(),
        )
        .rule(
            Zone::FullBraking.name(),
            zones.get(Zone::FullBraking).clone(),
            full_braking,
        )
        .rule(
            Zone::PartialBraking1.name(),
            zones.get(Zone::PartialBraking1).clone(),
            decel.clone().eq(params.pb1_decel.clone()),
        )
        .rule(
            Zone::ForwardCollisionWarning.name(),
            zones.get(Zone::ForwardCollisionWarning).clone(),
            no_braking,
        )
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TableLayout {
    #[default]
    Standard,
    PriorityInverted,
}

impl TableLayout {
    pub fn build(self, zones: &ZonePredicates, decel: &Term, params: &BrakingParams) -> DecisionTable {
        match self {
            TableLayout::Standard => controller_table(zones, decel, params),
            TableLayout::PriorityInverted => priority_inverted_table(zones, decel, params),
        }
    }
}

pub fn build_controller_formula(zones: &ZonePredicates, decel: &Term, params: &BrakingParams) -> Formula {
    controller_table(zones, decel, params).to_formula()
}

/// Negation of "full braking is commanded only inside the full-braking zone".
pub fn build_property_formula(decel: &Term, fb_decel: &Term, zones: &ZonePredicates) -> Formula {
    Formula::and([
        decel.clone().eq(fb_decel.clone()),
        !zones.get(Zone::FullBraking).clone(),
    ])
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use num_rational::BigRational;

    use super::*;
    use crate::term::Real;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn setup() -> (Signals, BrakingParams, ZonePredicates) {
        let signals = Signals::default();
        let zones = build_zone_predicates(&signals.ttc, &Thresholds::default());
        (signals, BrakingParams::default(), zones)
    }

    fn model(ttc: BigRational) -> Model {
        Model::new(BTreeMap::from([
            (Real::new("TTC"), ttc),
            (Real::new("FBtime"), rat(3, 5)),
            (Real::new("PB2time"), rat(4, 5)),
            (Real::new("PB1time"), rat(6, 5)),
            (Real::new("FCWtime"), rat(2, 1)),
        ]))
    }

    #[test]
    fn test_zone_predicate_display() {
        let (_, _, zones) = setup();
        assert_eq!(
            zones.get(Zone::FullBraking).to_string(),
            "And(Abs(TTC) < FBtime, TTC < 0)"
        );
        assert_eq!(
            zones.get(Zone::ForwardCollisionWarning).to_string(),
            "And(Abs(TTC) < FCWtime, TTC < 0)"
        );
        let order: Vec<Zone> = zones.iter().map(|(zone, _)| zone).collect();
        assert_eq!(order, Zone::PRIORITY);
    }

    #[test]
    fn test_controller_formula_is_nested_in_priority_order() {
        let (signals, params, zones) = setup();
        let f = build_controller_formula(&zones, &signals.decel, &params);
        let expected = Formula::ite(
            zones.get(Zone::FullBraking).clone(),
            Term::var("decel").eq(Term::var("FBdecel")),
            Formula::ite(
                zones.get(Zone::PartialBraking2).clone(),
                Term::var("decel").eq(Term::var("PB2decel")),
                Formula::ite(
                    zones.get(Zone::PartialBraking1).clone(),
                    Term::var("decel").eq(Term::var("PB1decel")),
                    Formula::ite(
                        zones.get(Zone::ForwardCollisionWarning).clone(),
                        Term::var("decel").eq(Term::zero()),
                        Term::var("decel").eq(Term::zero()),
                    ),
                ),
            ),
        );
        assert_eq!(f, expected);
    }

    #[test]
    fn test_empty_table_is_default() {
        let table = DecisionTable::new(Formula::True);
        assert_eq!(table.to_formula(), Formula::True);
        assert!(table.select(&Model::default()).is_none());
    }

    #[test]
    fn test_select_picks_most_urgent_zone() {
        let (signals, params, zones) = setup();
        let table = controller_table(&zones, &signals.decel, &params);
        let label = |ttc| table.select(&model(ttc)).map(|rule| rule.label.as_str());
        assert_eq!(label(rat(-1, 2)), Some("is_full_braking_zone"));
        assert_eq!(label(rat(-7, 10)), Some("is_pb2_braking_zone"));
        assert_eq!(label(rat(-1, 1)), Some("is_pb1_braking_zone"));
        assert_eq!(label(rat(-3, 2)), Some("is_fcw_zone"));
        assert_eq!(label(rat(-3, 1)), None);
        assert_eq!(label(rat(1, 2)), None);
    }

    #[test]
    fn test_boundary_is_outside_zone() {
        let (signals, params, zones) = setup();
        let table = controller_table(&zones, &signals.decel, &params);
        let m = model(rat(-3, 5));
        assert!(!m.eval(zones.get(Zone::FullBraking)));
        assert_eq!(table.select(&m).unwrap().label, "is_pb2_braking_zone");
    }

    #[test]
    fn test_priority_inverted_table() {
        let (signals, params, zones) = setup();
        let table = TableLayout::PriorityInverted.build(&zones, &signals.decel, &params);
        let rule = table.select(&model(rat(-7, 10))).unwrap();
        assert_eq!(rule.label, "is_pb2_braking_zone");
        assert_eq!(rule.consequence, Term::var("decel").eq(Term::var("FBdecel")));
        assert_eq!(table.consequence(&model(rat(-3, 1))), table.default_consequence());
    }

    #[test]
    fn test_property_formula() {
        let (signals, params, zones) = setup();
        let p = build_property_formula(&signals.decel, &params.fb_decel, &zones);
        assert_eq!(
            p.to_string(),
            "And(decel == FBdecel, Not(And(Abs(TTC) < FBtime, TTC < 0)))"
        );
    }
}
