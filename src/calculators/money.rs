// 💰 Money Calculators
// Loan EMI, interest, discounts, percentages and income tax

use super::{finite, round2};
use crate::error::{ToolError, ToolResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// LOAN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanPayment {
    pub emi: f64,
    pub total_payable: f64,
    pub total_interest: f64,
    pub months: f64,
}

/// Equated monthly instalment for a fixed-rate loan
pub fn loan_emi(principal: f64, annual_rate_pct: f64, years: f64) -> ToolResult<LoanPayment> {
    if !(principal.is_finite() && principal > 0.0) {
        return Err(ToolError::invalid("Enter a valid loan amount."));
    }
    if !(annual_rate_pct.is_finite() && annual_rate_pct > 0.0) {
        return Err(ToolError::invalid("Enter a valid interest rate."));
    }
    if !(years.is_finite() && years > 0.0) {
        return Err(ToolError::invalid("Enter a valid loan tenure (years)."));
    }

    let monthly_rate = annual_rate_pct / 12.0 / 100.0;
    let months = years * 12.0;
    let growth = (1.0 + monthly_rate).powf(months);
    let emi = principal * monthly_rate * growth / (growth - 1.0);
    let total_payable = emi * months;
    if !(emi.is_finite() && total_payable.is_finite()) {
        return Err(ToolError::invalid(
            "Could not calculate the monthly payment for this rate and tenure.",
        ));
    }

    Ok(LoanPayment {
        emi: round2(emi),
        total_payable: round2(total_payable),
        total_interest: round2(total_payable - principal),
        months,
    })
}

// ============================================================================
// INTEREST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interest {
    pub principal: f64,
    pub interest: f64,
    pub total: f64,
    /// Compounding periods per year; `None` for simple interest
    pub periods_per_year: Option<u32>,
}

fn validate_interest(principal: f64, annual_rate_pct: f64, years: f64) -> ToolResult<()> {
    if !(principal.is_finite() && principal > 0.0) {
        return Err(ToolError::invalid("Enter a valid principal (> 0)."));
    }
    if !(annual_rate_pct.is_finite() && annual_rate_pct >= 0.0) {
        return Err(ToolError::invalid("Enter a valid annual rate (≥ 0)."));
    }
    if !(years.is_finite() && years > 0.0) {
        return Err(ToolError::invalid("Enter a valid time in years (> 0)."));
    }
    Ok(())
}

pub fn simple_interest(principal: f64, annual_rate_pct: f64, years: f64) -> ToolResult<Interest> {
    validate_interest(principal, annual_rate_pct, years)?;
    let interest = principal * annual_rate_pct * years / 100.0;
    Ok(Interest {
        principal,
        interest: round2(interest),
        total: round2(principal + interest),
        periods_per_year: None,
    })
}

/// `A = P(1 + r/n)^(n·t)`
pub fn compound_interest(
    principal: f64,
    annual_rate_pct: f64,
    years: f64,
    periods_per_year: u32,
) -> ToolResult<Interest> {
    validate_interest(principal, annual_rate_pct, years)?;
    if periods_per_year == 0 {
        return Err(ToolError::invalid("Compounding periods per year must be at least 1."));
    }
    let n = periods_per_year;
    let rate = annual_rate_pct / 100.0;
    let total = principal * (1.0 + rate / f64::from(n)).powf(f64::from(n) * years);
    if !total.is_finite() {
        return Err(ToolError::invalid("Could not calculate compound interest for these inputs."));
    }
    Ok(Interest {
        principal,
        interest: round2(total - principal),
        total: round2(total),
        periods_per_year: Some(n),
    })
}

// ============================================================================
// DISCOUNT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Discount {
    pub original: f64,
    pub percent: f64,
    pub savings: f64,
    pub final_price: f64,
}

fn valid_price(price: f64) -> ToolResult<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ToolError::invalid("Enter a valid original price."))
    }
}

/// Price after taking `percent` off
pub fn apply_discount(price: f64, percent: f64) -> ToolResult<Discount> {
    let price = valid_price(price)?;
    if !(percent.is_finite() && (0.0..=100.0).contains(&percent)) {
        return Err(ToolError::invalid("Enter a discount between 0 and 100."));
    }
    let savings = price * percent / 100.0;
    Ok(Discount {
        original: round2(price),
        percent: round2(percent),
        savings: round2(savings),
        final_price: round2(price - savings),
    })
}

/// Discount percentage that turns `price` into `final_price`
pub fn reverse_discount(price: f64, final_price: f64) -> ToolResult<Discount> {
    let price = valid_price(price)?;
    if !(final_price.is_finite() && final_price >= 0.0 && final_price <= price) {
        return Err(ToolError::invalid(
            "Enter a valid final price (≤ original price).",
        ));
    }
    let savings = price - final_price;
    Ok(Discount {
        original: round2(price),
        percent: round2(savings / price * 100.0),
        savings: round2(savings),
        final_price: round2(final_price),
    })
}

// ============================================================================
// PERCENTAGE
// ============================================================================

/// What percent `value` is of `total`
pub fn percent_of(value: f64, total: f64) -> ToolResult<f64> {
    let value = finite(value, "Enter both value and total.")?;
    let total = finite(total, "Enter both value and total.")?;
    if total == 0.0 {
        return Err(ToolError::invalid("Total must not be zero."));
    }
    Ok(round2(value / total * 100.0))
}

/// `percent` % of `total`
pub fn value_from_percent(percent: f64, total: f64) -> ToolResult<f64> {
    let percent = finite(percent, "Enter both percent and total.")?;
    let total = finite(total, "Enter both percent and total.")?;
    Ok(round2(percent / 100.0 * total))
}

// ============================================================================
// TAX
// ============================================================================

/// One band: the next `upto` of income is taxed at `rate` percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub upto: f64,
    pub rate: f64,
}

/// Parses `UPTO:RATE`, e.g. `50000:10`
impl FromStr for TaxSlab {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (upto, rate) = s
            .split_once(':')
            .ok_or_else(|| ToolError::invalid(format!("tax slab '{}' is not UPTO:RATE", s)))?;
        let parse = |field: &str| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|_| ToolError::invalid(format!("tax slab '{}' is not UPTO:RATE", s)))
        };
        Ok(TaxSlab {
            upto: parse(upto)?,
            rate: parse(rate)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBand {
    pub on: f64,
    pub rate: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxReport {
    pub tax: f64,
    pub effective_rate: f64,
    pub breakdown: Vec<TaxBand>,
}

fn valid_income(income: f64) -> ToolResult<f64> {
    if income.is_finite() && income > 0.0 {
        Ok(income)
    } else {
        Err(ToolError::invalid("Enter a valid income."))
    }
}

pub fn tax_flat(income: f64, rate: f64) -> ToolResult<TaxReport> {
    let income = valid_income(income)?;
    if !(rate.is_finite() && rate > 0.0) {
        return Err(ToolError::invalid("Enter a valid flat tax rate."));
    }
    let tax = income * rate / 100.0;
    Ok(TaxReport {
        tax: round2(tax),
        effective_rate: round2(tax / income * 100.0),
        breakdown: vec![TaxBand {
            on: income,
            rate,
            tax: round2(tax),
        }],
    })
}

/// Applies slabs in order. Slabs with no width or no rate are skipped;
/// income left after the last slab shows up as an untaxed band.
pub fn tax_slabs(income: f64, slabs: &[TaxSlab]) -> ToolResult<TaxReport> {
    let income = valid_income(income)?;
    let usable = |slab: &&TaxSlab| {
        slab.upto.is_finite() && slab.rate.is_finite() && slab.upto > 0.0 && slab.rate > 0.0
    };
    if !slabs.iter().any(|slab| usable(&slab)) {
        return Err(ToolError::invalid("Add at least one valid tax slab."));
    }

    let mut remaining = income;
    let mut total = 0.0;
    let mut breakdown = Vec::new();

    for slab in slabs.iter().filter(usable) {
        let taxable = remaining.min(slab.upto);
        let tax = taxable * slab.rate / 100.0;
        total += tax;
        remaining -= taxable;
        breakdown.push(TaxBand {
            on: taxable,
            rate: slab.rate,
            tax: round2(tax),
        });
        if remaining <= 0.0 {
            break;
        }
    }

    if remaining > 0.0 {
        breakdown.push(TaxBand {
            on: remaining,
            rate: 0.0,
            tax: 0.0,
        });
    }

    Ok(TaxReport {
        tax: round2(total),
        effective_rate: round2(total / income * 100.0),
        breakdown,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_emi() {
        let loan = loan_emi(100_000.0, 10.0, 1.0).unwrap();
        assert_eq!(loan.emi, 8791.59);
        assert_eq!(loan.total_payable, 105_499.06);
        assert_eq!(loan.total_interest, 5499.06);
        assert_eq!(loan.months, 12.0);
    }

    #[test]
    fn test_loan_rejects_zero_rate() {
        let err = loan_emi(100_000.0, 0.0, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "Enter a valid interest rate.");
        assert!(loan_emi(0.0, 5.0, 1.0).is_err());
        assert!(loan_emi(1000.0, 5.0, 0.0).is_err());
    }

    #[test]
    fn test_loan_rejects_non_finite_payment() {
        // (1 + r)^n rounds to exactly 1.0
        let tiny_rate = loan_emi(1000.0, 1e-15, 1.0).unwrap_err();
        assert!(matches!(tiny_rate, ToolError::InvalidInput(_)));

        assert!(loan_emi(1000.0, 1e300, 1e300).is_err());
    }

    #[test]
    fn test_simple_interest() {
        let result = simple_interest(1000.0, 5.0, 3.0).unwrap();
        assert_eq!(result.interest, 150.0);
        assert_eq!(result.total, 1150.0);
        assert_eq!(result.periods_per_year, None);
    }

    #[test]
    fn test_compound_interest_monthly() {
        let result = compound_interest(1000.0, 5.0, 3.0, 12).unwrap();
        assert_eq!(result.total, 1161.47);
        assert_eq!(result.interest, 161.47);
        assert_eq!(result.periods_per_year, Some(12));
    }

    #[test]
    fn test_compound_interest_needs_a_period() {
        let err = compound_interest(1000.0, 5.0, 1.0, 0).unwrap_err();
        assert_eq!(err.to_string(), "Compounding periods per year must be at least 1.");

        let yearly = compound_interest(1000.0, 5.0, 1.0, 1).unwrap();
        assert_eq!(yearly.total, 1050.0);
    }

    #[test]
    fn test_zero_rate_interest_is_allowed() {
        let result = compound_interest(500.0, 0.0, 2.0, 4).unwrap();
        assert_eq!(result.total, 500.0);
        assert!(simple_interest(500.0, -1.0, 2.0).is_err());
    }

    #[test]
    fn test_discounts() {
        let applied = apply_discount(200.0, 25.0).unwrap();
        assert_eq!(applied.savings, 50.0);
        assert_eq!(applied.final_price, 150.0);

        let reversed = reverse_discount(200.0, 150.0).unwrap();
        assert_eq!(reversed.percent, 25.0);
        assert_eq!(reversed.savings, 50.0);

        assert!(apply_discount(200.0, 101.0).is_err());
        assert!(reverse_discount(200.0, 250.0).is_err());
    }

    #[test]
    fn test_percentages() {
        assert_eq!(percent_of(50.0, 200.0).unwrap(), 25.0);
        assert_eq!(value_from_percent(15.0, 80.0).unwrap(), 12.0);
        assert!(percent_of(5.0, 0.0).is_err());
    }

    #[test]
    fn test_flat_tax() {
        let report = tax_flat(50_000.0, 10.0).unwrap();
        assert_eq!(report.tax, 5000.0);
        assert_eq!(report.effective_rate, 10.0);
        assert_eq!(report.breakdown.len(), 1);
    }

    #[test]
    fn test_slab_tax_with_leftover() {
        let slabs = [
            TaxSlab { upto: 50_000.0, rate: 10.0 },
            TaxSlab { upto: 0.0, rate: 15.0 },
            TaxSlab { upto: 30_000.0, rate: 20.0 },
        ];
        let report = tax_slabs(100_000.0, &slabs).unwrap();

        assert_eq!(report.tax, 11_000.0);
        assert_eq!(report.effective_rate, 11.0);
        assert_eq!(
            report.breakdown,
            vec![
                TaxBand { on: 50_000.0, rate: 10.0, tax: 5000.0 },
                TaxBand { on: 30_000.0, rate: 20.0, tax: 6000.0 },
                TaxBand { on: 20_000.0, rate: 0.0, tax: 0.0 },
            ]
        );
    }

    #[test]
    fn test_slab_tax_stops_when_income_exhausted() {
        let slabs = [
            TaxSlab { upto: 10_000.0, rate: 5.0 },
            TaxSlab { upto: 50_000.0, rate: 10.0 },
            TaxSlab { upto: 50_000.0, rate: 30.0 },
        ];
        let report = tax_slabs(20_000.0, &slabs).unwrap();
        assert_eq!(report.tax, 1500.0);
        assert_eq!(report.breakdown.len(), 2);
    }

    #[test]
    fn test_slab_tax_needs_a_valid_slab() {
        let err = tax_slabs(1000.0, &[TaxSlab { upto: 0.0, rate: 0.0 }]).unwrap_err();
        assert_eq!(err.to_string(), "Add at least one valid tax slab.");
    }

    #[test]
    fn test_slab_parsing() {
        let slab: TaxSlab = "50000:10".parse().unwrap();
        assert_eq!(slab, TaxSlab { upto: 50_000.0, rate: 10.0 });
        assert!("50000".parse::<TaxSlab>().is_err());
        assert!("a:b".parse::<TaxSlab>().is_err());
    }
}
