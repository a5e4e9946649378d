// 🧮 Calculators
// Small deterministic formulas behind the everyday tools: health, money, fun

pub mod expression;
pub mod health;
pub mod love;
pub mod money;

pub use expression::{calculate, evaluate, Calculation, ScientificFn};
pub use health::{
    body_fat_navy, bmi_imperial, bmi_metric, Bmi, BmiCategory, BodyFat, BodyFatClass, LengthUnit,
    Sex,
};
pub use love::{compatibility, compatibility_percent, Compatibility};
pub use money::{
    apply_discount, compound_interest, loan_emi, percent_of, reverse_discount, simple_interest,
    tax_flat, tax_slabs, value_from_percent, Discount, Interest, LoanPayment, TaxBand, TaxReport,
    TaxSlab,
};

use crate::error::{ToolError, ToolResult};

/// Rejects NaN/infinite input before any formula sees it
pub(crate) fn finite(value: f64, message: &str) -> ToolResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ToolError::invalid(message))
    }
}

/// Rounds to two decimals for display-ready results
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(22.857142), 22.86);
        assert_eq!(round2(-1.005), -1.0);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn test_finite_rejects_nan() {
        assert!(finite(f64::NAN, "bad").is_err());
        assert!(finite(f64::INFINITY, "bad").is_err());
        assert_eq!(finite(1.5, "bad").unwrap(), 1.5);
    }
}
