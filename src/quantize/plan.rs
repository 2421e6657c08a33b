//! Quantization planning.
//!
//! Given a granularity (`round`) and a decimal precision, derive:
//!
//! - the forward transform the raster calculator applies before region
//!   extraction (its result is truncated to an integer attribute)
//! - the inverse transform the attribute rewrite applies afterwards
//! - the semantic type of the final attribute
//!
//! Three regimes:
//!
//! | round        | forward                         | inverse       | type    |
//! |--------------|---------------------------------|---------------|---------|
//! | `>= 1`       | `round*floor((1/round)*v)`      | identity      | integer |
//! | `== 0`       | `v*10^p`                        | identity      | integer |
//! | `(0, 1)`     | `round*floor((1/round)*v)*10^p` | `g / 10^p`    | real    |
//!
//! The `round == 0` row never divides the precision factor back out; values
//! stay scaled by `10^p`.

use crate::domain::FieldType;
use crate::quantize::expr::CalcExpr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanKind {
    /// Integer-step grouping; results are already whole numbers.
    Grouped { step: f64 },
    /// No grouping; values are only scaled by the precision factor.
    Unrounded { factor: f64 },
    /// Fractional grouping, carried through the integer stage as `value * factor`.
    Fractional { step: f64, factor: f64, precision: u32 },
}

/// Read-only output of the planner. Pure function of `(round, precision)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationPlan {
    kind: PlanKind,
}

impl QuantizationPlan {
    /// Build the plan. `round` must be finite and non-negative (the validator
    /// guarantees it); `precision` is only consulted when `round < 1`.
    pub fn new(round: f64, precision: u32) -> Self {
        let factor = precision_factor(precision);
        let kind = if round >= 1.0 {
            PlanKind::Grouped { step: round }
        } else if round == 0.0 {
            PlanKind::Unrounded { factor }
        } else {
            PlanKind::Fractional {
                step: round,
                factor,
                precision,
            }
        };
        Self { kind }
    }

    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    /// Expression handed to the raster calculator.
    pub fn calc_expr(&self) -> CalcExpr {
        match self.kind {
            PlanKind::Grouped { step } => CalcExpr::Floor { step },
            PlanKind::Unrounded { factor } => CalcExpr::Scale { factor },
            PlanKind::Fractional { step, factor, .. } => CalcExpr::FloorScaled { step, factor },
        }
    }

    /// Raw pixel value -> group identifier.
    pub fn forward(&self, value: f64) -> f64 {
        self.calc_expr().evaluate(value)
    }

    /// Group identifier -> final attribute value.
    pub fn inverse(&self, group: f64) -> f64 {
        group / self.rescale_factor()
    }

    /// Divisor applied by the attribute rewrite (1 unless fractional).
    pub fn rescale_factor(&self) -> f64 {
        match self.kind {
            PlanKind::Fractional { factor, .. } => factor,
            PlanKind::Grouped { .. } | PlanKind::Unrounded { .. } => 1.0,
        }
    }

    /// Integer divisor for the SQL rescale, `None` when no rescale is needed.
    pub fn rescale_divisor(&self) -> Option<u64> {
        match self.kind {
            PlanKind::Fractional { precision, .. } => Some(10u64.pow(precision)),
            PlanKind::Grouped { .. } | PlanKind::Unrounded { .. } => None,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self.kind {
            PlanKind::Fractional { .. } => FieldType::Real,
            PlanKind::Grouped { .. } | PlanKind::Unrounded { .. } => FieldType::Integer,
        }
    }
}

fn precision_factor(precision: u32) -> f64 {
    10f64.powi(precision as i32)
}
