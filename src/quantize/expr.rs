//! Typed `gdal_calc.py` expressions.
//!
//! The calculator only ever sees a single band bound to `A`, so the expression
//! space is tiny. Keeping it as an enum means the rendered text and the
//! in-process evaluation can never drift apart.

use std::fmt;

/// Band variable name bound by `gdal_calc.py -A <file>`.
pub const BAND_VAR: &str = "A";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalcExpr {
    /// `step*floor((1/step)*A)`
    Floor { step: f64 },
    /// `A*factor`
    Scale { factor: f64 },
    /// `step*floor((1/step)*A)*factor`
    FloorScaled { step: f64, factor: f64 },
}

impl CalcExpr {
    /// Evaluate the expression for a single pixel value, exactly as numpy would.
    pub fn evaluate(&self, a: f64) -> f64 {
        match *self {
            CalcExpr::Floor { step } => step * ((1.0 / step) * a).floor(),
            CalcExpr::Scale { factor } => a * factor,
            CalcExpr::FloorScaled { step, factor } => step * ((1.0 / step) * a).floor() * factor,
        }
    }
}

impl fmt::Display for CalcExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `1.0*` forces float arithmetic on integer bands. Multiplying by the
        // reciprocal keeps exact multiples of a decimal step in their own
        // bucket (0.3/0.1 is 2.999..., (1.0/0.1)*0.3 is 3.000...).
        match *self {
            CalcExpr::Floor { step } => write!(f, "1.0*{step}*floor((1.0/{step})*{BAND_VAR})"),
            CalcExpr::Scale { factor } => write!(f, "1.0*{BAND_VAR}*{factor}"),
            CalcExpr::FloorScaled { step, factor } => {
                write!(f, "1.0*{step}*floor((1.0/{step})*{BAND_VAR})*{factor}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_numpy_expressions() {
        assert_eq!(CalcExpr::Floor { step: 5.0 }.to_string(), "1.0*5*floor((1.0/5)*A)");
        assert_eq!(CalcExpr::Scale { factor: 1000.0 }.to_string(), "1.0*A*1000");
        assert_eq!(
            CalcExpr::FloorScaled { step: 0.25, factor: 100.0 }.to_string(),
            "1.0*0.25*floor((1.0/0.25)*A)*100"
        );
    }

    #[test]
    fn floor_handles_negative_values() {
        let expr = CalcExpr::Floor { step: 10.0 };
        assert_eq!(expr.evaluate(-3.0), -10.0);
        assert_eq!(expr.evaluate(-10.0), -10.0);
        assert_eq!(expr.evaluate(19.9), 10.0);
    }

    #[test]
    fn decimal_multiples_stay_in_their_bucket() {
        let expr = CalcExpr::Floor { step: 0.1 };
        for (value, bucket) in [(0.3, 0.3), (0.7, 0.7), (2.3, 2.3), (5.1, 5.1)] {
            assert!(
                (expr.evaluate(value) - bucket).abs() < 1e-9,
                "{value} -> {}",
                expr.evaluate(value)
            );
        }
    }
}
