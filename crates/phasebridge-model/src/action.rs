//! Output post-processing and the action-line encoding.
//!
//! Game processes read one action per line: the output values in index order, separated by
//! single spaces. The numbers use the shortest decimal that round-trips a 64-bit float, with
//! scientific notation below `1e-4` and from `1e16` upward, and exponents written with a sign
//! and at least two digits:
//!
//! ```text
//! [0.0, 0.25, 1.0]   → "0.0 0.25 1.0"
//! [1e-05, 1.0]       → "1e-05 1.0"
//! ```
//!
//! Every game interface parses this exact shape, so the formatting must not depend on locale
//! or precision settings.

use std::fmt;

/// Rescales `values` in place to `[0, 1]` using their own minimum and maximum.
///
/// A constant vector (including a single value) is left unchanged.
pub fn normalize(values: &mut [f64]) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if values.is_empty() || range == 0.0 {
        return;
    }
    for v in values {
        *v = (*v - min) / range;
    }
}

/// Formats a single value the way game processes expect it.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// Encodes `values` as a single space-separated line (without a trailing newline).
#[must_use]
pub fn encode_line(values: &[f64]) -> String {
    let mut line = String::with_capacity(values.len() * 8);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&format_value(*v));
    }
    line
}

/// The output of a forward model for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    values: Vec<f64>,
}

impl Action {
    /// Wraps values that are already in their final form.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Min–max normalizes raw network outputs.
    #[must_use]
    pub fn from_raw(mut values: Vec<f64>) -> Self {
        normalize(&mut values);
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encodes this action as a game input line.
    #[must_use]
    pub fn to_line(&self) -> String {
        encode_line(&self.values)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
