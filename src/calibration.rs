//! Calibrated braking parameters and zone thresholds.

use num_rational::BigRational;

use crate::decimal::Decimal;

pub const DEFAULT_FB_DECEL: Decimal = Decimal::new(98, 1);
pub const DEFAULT_PB2_DECEL: Decimal = Decimal::new(53, 1);
pub const DEFAULT_PB1_DECEL: Decimal = Decimal::new(38, 1);

/// Reference threshold table with a strictly nested zone layout.
pub const REFERENCE_FB_TIME: Decimal = Decimal::new(6, 1);
pub const REFERENCE_PB2_TIME: Decimal = Decimal::new(8, 1);
pub const REFERENCE_PB1_TIME: Decimal = Decimal::new(12, 1);
pub const REFERENCE_FCW_TIME: Decimal = Decimal::new(20, 1);

/// Values a verification case is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calibration {
    pub fb_decel: BigRational,
    pub pb2_decel: BigRational,
    pub pb1_decel: BigRational,
    pub thresholds: ThresholdValues,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            fb_decel: DEFAULT_FB_DECEL.to_rational(),
            pb2_decel: DEFAULT_PB2_DECEL.to_rational(),
            pb1_decel: DEFAULT_PB1_DECEL.to_rational(),
            thresholds: ThresholdValues::default(),
        }
    }
}

impl Calibration {
    pub fn with_thresholds(self, thresholds: ThresholdValues) -> Self {
        Self { thresholds, ..self }
    }

    /// Default braking magnitudes with the reference threshold table pinned.
    pub fn reference() -> Self {
        Self::default().with_thresholds(ThresholdValues::reference())
    }
}

/// Pinned zone thresholds. `None` leaves the threshold a free variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdValues {
    pub fb_time: Option<BigRational>,
    pub pb2_time: Option<BigRational>,
    pub pb1_time: Option<BigRational>,
    pub fcw_time: Option<BigRational>,
}

impl ThresholdValues {
    pub fn pinned(fb_time: BigRational, pb2_time: BigRational, pb1_time: BigRational, fcw_time: BigRational) -> Self {
        Self {
            fb_time: Some(fb_time),
            pb2_time: Some(pb2_time),
            pb1_time: Some(pb1_time),
            fcw_time: Some(fcw_time),
        }
    }

    pub fn reference() -> Self {
        Self::pinned(
            REFERENCE_FB_TIME.to_rational(),
            REFERENCE_PB2_TIME.to_rational(),
            REFERENCE_PB1_TIME.to_rational(),
            REFERENCE_FCW_TIME.to_rational(),
        )
    }

    pub fn is_free(&self) -> bool {
        self.fb_time.is_none() && self.pb2_time.is_none() && self.pb1_time.is_none() && self.fcw_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    #[test]
    fn test_default_calibration() {
        let c = Calibration::default();
        assert_eq!(c.fb_decel, BigRational::new(BigInt::from(49), BigInt::from(5)));
        assert_eq!(c.pb2_decel, BigRational::new(BigInt::from(53), BigInt::from(10)));
        assert_eq!(c.pb1_decel, BigRational::new(BigInt::from(19), BigInt::from(5)));
        assert!(c.thresholds.is_free());
    }

    #[test]
    fn test_reference_thresholds_are_nested() {
        let t = ThresholdValues::reference();
        let fb = t.fb_time.unwrap();
        let pb2 = t.pb2_time.unwrap();
        let pb1 = t.pb1_time.unwrap();
        let fcw = t.fcw_time.unwrap();
        assert!(fb < pb2 && pb2 < pb1 && pb1 < fcw);
        assert!(!Calibration::reference().thresholds.is_free());
    }
}
