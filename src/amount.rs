//! Normalizes the raw amount token captured by the classifier.

use std::fmt;

/// The raw amount token could not be turned into a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountError {
    raw: String,
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid amount '{}'", self.raw)
    }
}

impl std::error::Error for AmountError {}

/// Strip `.` and `,` from the token and parse what remains as a number.
///
/// Both characters are treated purely as grouping noise, so `"25.000"`
/// becomes `25000` and `"25,000.00"` becomes `2500000`. That inflates
/// decimal amounts like `"25,50"`; group members write whole Rupiah
/// amounts, where separators only ever group thousands.
pub fn normalize_amount(raw: &str) -> Result<f64, AmountError> {
    let stripped: String = raw.chars().filter(|c| *c != '.' && *c != ',').collect();

    if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return Err(AmountError { raw: raw.to_string() });
    }

    stripped
        .parse::<f64>()
        .map_err(|_| AmountError { raw: raw.to_string() })
}
