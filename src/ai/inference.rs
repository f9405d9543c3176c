use std::collections::HashMap;

use regex::Regex;

pub const DEFAULT_TOKEN_PATTERN: &str = "[A-Za-z]+";

/// Counts the tokens of `url` matched by `pattern`, the way the model was vectorized.
pub fn token_counts(pattern: &Regex, url: &str, lowercase: bool) -> HashMap<String, u32> {
    let source = if lowercase {
        url.to_lowercase()
    } else {
        url.to_string()
    };

    let mut counts = HashMap::new();
    for token in pattern.find_iter(&source) {
        *counts.entry(token.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Linear decision value `intercept + Σ count·weight`; unknown tokens contribute nothing.
pub fn decision_value(
    counts: &HashMap<String, u32>,
    coefficients: &HashMap<String, f64>,
    intercept: f64,
) -> f64 {
    counts.iter().fold(intercept, |acc, (token, count)| {
        acc + coefficients
            .get(token)
            .map_or(0.0, |weight| weight * f64::from(*count))
    })
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
