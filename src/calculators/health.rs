// ❤️‍🩹 Health Calculators
// BMI and U.S. Navy body-fat estimate

use super::{finite, round2};
use crate::error::{ToolError, ToolResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KG_PER_POUND: f64 = 0.45359237;
const CM_PER_INCH: f64 = 2.54;

// ============================================================================
// BMI
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obesity,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::NormalWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obesity
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

pub fn bmi_metric(height_cm: f64, weight_kg: f64) -> ToolResult<Bmi> {
    let height_cm = finite(height_cm, "Please enter a valid height.")?;
    let weight_kg = finite(weight_kg, "Please enter a valid weight.")?;
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return Err(ToolError::invalid(
            "Please enter positive numbers for height and weight.",
        ));
    }
    bmi_from_si(height_cm / 100.0, weight_kg)
}

pub fn bmi_imperial(feet: f64, inches: f64, pounds: f64) -> ToolResult<Bmi> {
    let feet = finite(feet, "Please enter a valid height.")?;
    let inches = finite(inches, "Please enter a valid height.")?;
    let pounds = finite(pounds, "Please enter a valid weight.")?;
    if feet < 0.0 || inches < 0.0 || pounds <= 0.0 {
        return Err(ToolError::invalid(
            "Please enter valid non-negative height and a positive weight.",
        ));
    }
    let total_inches = feet * 12.0 + inches;
    bmi_from_si(total_inches * CM_PER_INCH / 100.0, pounds * KG_PER_POUND)
}

fn bmi_from_si(height_m: f64, weight_kg: f64) -> ToolResult<Bmi> {
    if height_m <= 0.0 {
        return Err(ToolError::invalid("Height must be greater than zero."));
    }
    let value = weight_kg / (height_m * height_m);
    if !value.is_finite() {
        return Err(ToolError::invalid("Could not calculate BMI."));
    }
    Ok(Bmi {
        value: round2(value),
        category: BmiCategory::from_bmi(value),
    })
}

// ============================================================================
// BODY FAT (U.S. NAVY)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(ToolError::invalid(format!(
                "unknown sex '{}' (expected male or female)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyFatClass {
    EssentialFat,
    Athletes,
    Fitness,
    Average,
    Obese,
}

impl BodyFatClass {
    pub fn classify(sex: Sex, percent: f64) -> Self {
        let bounds = match sex {
            Sex::Male => [6.0, 14.0, 18.0, 25.0],
            Sex::Female => [14.0, 21.0, 25.0, 32.0],
        };
        if percent < bounds[0] {
            BodyFatClass::EssentialFat
        } else if percent < bounds[1] {
            BodyFatClass::Athletes
        } else if percent < bounds[2] {
            BodyFatClass::Fitness
        } else if percent < bounds[3] {
            BodyFatClass::Average
        } else {
            BodyFatClass::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodyFatClass::EssentialFat => "Essential fat",
            BodyFatClass::Athletes => "Athletes",
            BodyFatClass::Fitness => "Fitness",
            BodyFatClass::Average => "Average",
            BodyFatClass::Obese => "Obese",
        }
    }
}

impl fmt::Display for BodyFatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyFat {
    pub percent: f64,
    pub class: BodyFatClass,
}

/// Unit the Navy tape measurements were taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Cm,
    In,
}

impl LengthUnit {
    fn to_inches(self, value: f64) -> f64 {
        match self {
            LengthUnit::Cm => value / CM_PER_INCH,
            LengthUnit::In => value,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimetres" | "centimeters" => Ok(LengthUnit::Cm),
            "in" | "inch" | "inches" => Ok(LengthUnit::In),
            other => Err(ToolError::invalid(format!(
                "unknown length unit '{}' (expected cm or in)",
                other
            ))),
        }
    }
}

/// Navy method. The formula constants are the inch form, so centimetre
/// measurements are converted before the logs are taken.
pub fn body_fat_navy(
    sex: Sex,
    unit: LengthUnit,
    height: f64,
    neck: f64,
    waist: f64,
    hip: Option<f64>,
) -> ToolResult<BodyFat> {
    let message = "Please enter valid positive numbers for height, neck and waist.";
    let height = finite(height, message)?;
    let neck = finite(neck, message)?;
    let waist = finite(waist, message)?;
    if height <= 0.0 || neck <= 0.0 || waist <= 0.0 {
        return Err(ToolError::invalid(message));
    }

    let to_in = |value: f64| unit.to_inches(value);
    let percent = match sex {
        Sex::Male => {
            86.010 * (to_in(waist - neck)).max(1.0).log10() - 70.041 * to_in(height).max(1.0).log10()
                + 36.76
        }
        Sex::Female => {
            let hip = match hip {
                Some(hip) if hip.is_finite() && hip > 0.0 => hip,
                _ => {
                    return Err(ToolError::invalid(
                        "Please enter hip circumference for female (Navy method).",
                    ))
                }
            };
            163.205 * to_in(waist + hip - neck).max(1.0).log10()
                - 97.684 * to_in(height).max(1.0).log10()
                - 78.387
        }
    };

    Ok(BodyFat {
        percent: round2(percent),
        class: BodyFatClass::classify(sex, percent),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_metric() {
        let bmi = bmi_metric(175.0, 70.0).unwrap();
        assert_eq!(bmi.value, 22.86);
        assert_eq!(bmi.category, BmiCategory::NormalWeight);
    }

    #[test]
    fn test_bmi_imperial() {
        let bmi = bmi_imperial(5.0, 9.0, 150.0).unwrap();
        assert_eq!(bmi.value, 22.15);
        assert_eq!(bmi.category.to_string(), "Normal weight");
    }

    #[test]
    fn test_bmi_rejects_bad_input() {
        assert!(bmi_metric(0.0, 70.0).is_err());
        assert!(bmi_metric(170.0, -1.0).is_err());
        assert!(bmi_metric(f64::NAN, 70.0).is_err());
        assert!(bmi_imperial(0.0, 0.0, 150.0).is_err());
    }

    #[test]
    fn test_bmi_categories() {
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(24.99), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::from_bmi(29.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obesity);
    }

    #[test]
    fn test_navy_male() {
        let result = body_fat_navy(Sex::Male, LengthUnit::Cm, 180.0, 38.0, 90.0, None).unwrap();
        assert_eq!(result.percent, 19.93);
        assert_eq!(result.class, BodyFatClass::Average);
    }

    #[test]
    fn test_navy_female_requires_hip() {
        let result = body_fat_navy(Sex::Female, LengthUnit::Cm, 165.0, 32.0, 75.0, Some(100.0)).unwrap();
        assert_eq!(result.percent, 30.24);
        assert_eq!(result.class, BodyFatClass::Average);

        assert!(body_fat_navy(Sex::Female, LengthUnit::Cm, 165.0, 32.0, 75.0, None).is_err());
    }

    #[test]
    fn test_navy_accepts_inches() {
        let result = body_fat_navy(Sex::Male, LengthUnit::In, 70.0, 15.0, 34.0, None).unwrap();
        assert_eq!(result.percent, 17.51);
        assert_eq!(result.class, BodyFatClass::Fitness);

        let cm = body_fat_navy(Sex::Male, LengthUnit::Cm, 180.0, 38.0, 90.0, None).unwrap();
        let inches =
            body_fat_navy(Sex::Male, LengthUnit::In, 180.0 / 2.54, 38.0 / 2.54, 90.0 / 2.54, None).unwrap();
        assert_eq!(cm, inches);
    }

    #[test]
    fn test_length_unit_parsing() {
        assert_eq!("CM".parse::<LengthUnit>().unwrap(), LengthUnit::Cm);
        assert_eq!("inches".parse::<LengthUnit>().unwrap(), LengthUnit::In);
        assert!("ft".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn test_body_fat_classes() {
        assert_eq!(BodyFatClass::classify(Sex::Male, 5.0), BodyFatClass::EssentialFat);
        assert_eq!(BodyFatClass::classify(Sex::Female, 5.0), BodyFatClass::EssentialFat);
        assert_eq!(BodyFatClass::classify(Sex::Male, 15.0), BodyFatClass::Fitness);
        assert_eq!(BodyFatClass::classify(Sex::Female, 15.0), BodyFatClass::Athletes);
        assert_eq!(BodyFatClass::classify(Sex::Male, 40.0), BodyFatClass::Obese);
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("Male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("f".parse::<Sex>().unwrap(), Sex::Female);
        assert!("other".parse::<Sex>().is_err());
    }
}
