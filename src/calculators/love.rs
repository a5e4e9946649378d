// 💘 Love Calculator
// Deterministic "compatibility" from two names. Same names, same answer.

use crate::error::{ToolError, ToolResult};
use serde::Serialize;

const DJB2_SEED: u32 = 5381;
const FLOOR_PERCENT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    pub percent: u32,
    pub message: &'static str,
}

/// Trim, lower-case, keep only ASCII letters, digits and whitespace
fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect()
}

/// djb2 with XOR mixing over UTF-16 code units, 32-bit wrapping
fn djb2_xor(text: &str) -> u32 {
    text.encode_utf16()
        .fold(DJB2_SEED, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// 5..=100, order-sensitive in the two names
pub fn compatibility_percent(name_a: &str, name_b: &str) -> u32 {
    let key = format!("{}|{}", normalize(name_a), normalize(name_b));
    (djb2_xor(&key) % 101).max(FLOOR_PERCENT)
}

fn message_for(percent: u32) -> &'static str {
    match percent {
        90.. => "A magical match — chemistry is through the roof!",
        75..=89 => "Strong connection — lots of shared potential.",
        60..=74 => "Good match — worth exploring.",
        40..=59 => "Some compatibility — could work with effort.",
        _ => "Tough match — differences may be significant, but surprises happen!",
    }
}

pub fn compatibility(name_a: &str, name_b: &str) -> ToolResult<Compatibility> {
    if name_a.trim().is_empty() || name_b.trim().is_empty() {
        return Err(ToolError::invalid("Please enter both names."));
    }
    let percent = compatibility_percent(name_a, name_b);
    Ok(Compatibility {
        percent,
        message: message_for(percent),
    })
}
