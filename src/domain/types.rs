use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Phishing,
    Legitimate,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "Phishing",
            Label::Legitimate => "Legitimate",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of probing a submitted URL before it is handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessOutcome {
    /// Connection, DNS, TLS or timeout failure, or a URL that cannot be requested at all.
    Unreachable,
    NonOkStatus(u16),
    Ok,
}

/// Confidences are percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub url: String,
    pub label: Label,
    pub phishing_confidence: f64,
    pub legitimate_confidence: f64,
}

impl ClassificationResult {
    /// Fail-closed verdict for targets that did not answer with HTTP 200.
    pub fn unreachable(url: &str) -> Self {
        Self {
            url: url.to_string(),
            label: Label::Phishing,
            phishing_confidence: 100.0,
            legitimate_confidence: 0.0,
        }
    }
}
