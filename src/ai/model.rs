use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::domain::Label;

use super::{
    inference::{decision_value, sigmoid, token_counts, DEFAULT_TOKEN_PATTERN},
    UrlClassifier,
};

/// On-disk form of a trained bag-of-tokens logistic regression over URL strings.
#[derive(Debug, Deserialize)]
struct ModelFile {
    classes: Vec<String>,
    intercept: f64,
    coefficients: HashMap<String, f64>,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_lowercase() -> bool {
    true
}

#[derive(Debug)]
pub struct LinearUrlModel {
    classes: [String; 2],
    intercept: f64,
    coefficients: HashMap<String, f64>,
    pattern: Regex,
    lowercase: bool,
}

impl LinearUrlModel {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read model file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid model file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(raw)?;
        let classes: [String; 2] = match file.classes.try_into() {
            Ok(classes) => classes,
            Err(classes) => bail!("expected exactly two classes, found {}", classes.len()),
        };
        let pattern = Regex::new(&file.token_pattern)
            .with_context(|| format!("invalid token pattern {:?}", file.token_pattern))?;

        Ok(Self {
            classes,
            intercept: file.intercept,
            coefficients: file.coefficients,
            pattern,
            lowercase: file.lowercase,
        })
    }

    pub fn classes(&self) -> &[String; 2] {
        &self.classes
    }

    pub fn vocabulary_size(&self) -> usize {
        self.coefficients.len()
    }

    fn decision(&self, url: &str) -> f64 {
        let counts = token_counts(&self.pattern, url, self.lowercase);
        decision_value(&counts, &self.coefficients, self.intercept)
    }
}

impl UrlClassifier for LinearUrlModel {
    fn predict(&self, url: &str) -> Label {
        // The positive side of the decision boundary is the second (legitimate) class.
        if self.decision(url) > 0.0 {
            Label::Legitimate
        } else {
            Label::Phishing
        }
    }

    fn predict_proba(&self, url: &str) -> [f64; 2] {
        let legitimate = sigmoid(self.decision(url));
        [1.0 - legitimate, legitimate]
    }
}
