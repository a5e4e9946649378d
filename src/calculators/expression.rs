// 🧮 Expression Calculator
// Arithmetic expressions, optionally fed through one scientific function

use crate::error::{ToolError, ToolResult};
use meval::{Context, Expr};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The single-argument keys of scientific mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScientificFn {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Square,
    Log10,
}

impl ScientificFn {
    pub fn label(&self) -> &'static str {
        match self {
            ScientificFn::Sin => "sin",
            ScientificFn::Cos => "cos",
            ScientificFn::Tan => "tan",
            ScientificFn::Sqrt => "√",
            ScientificFn::Square => "x²",
            ScientificFn::Log10 => "log",
        }
    }

    /// Angles are radians
    pub fn apply(self, x: f64) -> ToolResult<f64> {
        let value = match self {
            ScientificFn::Sin => x.sin(),
            ScientificFn::Cos => x.cos(),
            ScientificFn::Tan => x.tan(),
            ScientificFn::Sqrt => x.sqrt(),
            ScientificFn::Square => x * x,
            ScientificFn::Log10 => x.log10(),
        };
        real(value)
    }
}

impl fmt::Display for ScientificFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScientificFn {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sin" => Ok(ScientificFn::Sin),
            "cos" => Ok(ScientificFn::Cos),
            "tan" => Ok(ScientificFn::Tan),
            "sqrt" | "√" => Ok(ScientificFn::Sqrt),
            "square" | "sq" | "x2" | "x²" => Ok(ScientificFn::Square),
            "log" | "log10" => Ok(ScientificFn::Log10),
            other => Err(ToolError::invalid(format!(
                "unknown function '{}' (expected sin, cos, tan, sqrt, square or log)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub expression: String,
    pub function: Option<ScientificFn>,
    pub result: f64,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.function {
            Some(func) => write!(f, "{}({}) = {}", func, self.expression, self.result),
            None => write!(f, "{} = {}", self.expression, self.result),
        }
    }
}

fn real(value: f64) -> ToolResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ToolError::invalid("Error: result is not a finite number."))
    }
}

/// Evaluates `+ - * / ^`, decimals and parentheses in floating point.
///
/// Division by zero and other non-finite results are errors.
pub fn evaluate(expression: &str) -> ToolResult<f64> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ToolError::invalid("Enter an expression."));
    }

    let expr: Expr = expression
        .parse()
        .map_err(|err| ToolError::invalid(format!("Error: {}", err)))?;

    let mut context = Context::new();
    context.func("log10", f64::log10);
    let value = expr
        .eval_with_context(context)
        .map_err(|err| ToolError::invalid(format!("Error: {}", err)))?;

    debug!(expression, value, "evaluated expression");
    real(value)
}

/// Evaluates `expression`, then applies `function` to the result
pub fn calculate(expression: &str, function: Option<ScientificFn>) -> ToolResult<Calculation> {
    let value = evaluate(expression)?;
    let result = match function {
        Some(func) => func.apply(value)?,
        None => value,
    };
    Ok(Calculation {
        expression: expression.trim().to_string(),
        function,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("7/2").unwrap(), 3.5);
        assert_eq!(evaluate(" 1.5 - 0.25 ").unwrap(), 1.25);
        assert_eq!(evaluate("(1+2)*-3").unwrap(), -9.0);
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let err = evaluate("1/0").unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(evaluate("0/0").is_err());
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(evaluate("   ").unwrap_err().to_string(), "Enter an expression.");
        assert!(matches!(evaluate("2+"), Err(ToolError::InvalidInput(_))));
        assert!(evaluate("2 +* 3").is_err());
        assert!(evaluate("unknown(3)").is_err());
    }

    #[test]
    fn test_scientific_functions() {
        assert_eq!(calculate("16", Some(ScientificFn::Sqrt)).unwrap().result, 4.0);
        assert_eq!(calculate("1.5", Some(ScientificFn::Square)).unwrap().result, 2.25);
        assert_eq!(calculate("1000", Some(ScientificFn::Log10)).unwrap().result, 3.0);
        assert_eq!(calculate("0", Some(ScientificFn::Sin)).unwrap().result, 0.0);
        assert_eq!(calculate("0", Some(ScientificFn::Cos)).unwrap().result, 1.0);
        assert_eq!(evaluate("log10(100)").unwrap(), 2.0);
    }

    #[test]
    fn test_scientific_domain_errors() {
        assert!(calculate("-4", Some(ScientificFn::Sqrt)).is_err());
        assert!(calculate("0", Some(ScientificFn::Log10)).is_err());
    }

    #[test]
    fn test_function_parsing_and_display() {
        assert_eq!("SQRT".parse::<ScientificFn>().unwrap(), ScientificFn::Sqrt);
        assert_eq!("log".parse::<ScientificFn>().unwrap(), ScientificFn::Log10);
        assert!("cot".parse::<ScientificFn>().is_err());

        let calc = calculate("3*3", Some(ScientificFn::Sqrt)).unwrap();
        assert_eq!(calc.to_string(), "√(3*3) = 3");
        assert_eq!(calculate("2^10", None).unwrap().to_string(), "2^10 = 1024");
    }
}
