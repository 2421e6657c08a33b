//! Pixel value quantization (forward transform) and attribute rescaling
//! (inverse transform).

pub mod expr;
pub mod plan;

pub use expr::CalcExpr;
pub use plan::{PlanKind, QuantizationPlan};
