mod inference;
pub mod model;

pub use model::LinearUrlModel;

use crate::domain::Label;

/// A pre-trained binary URL classifier.
pub trait UrlClassifier: Send + Sync {
    fn predict(&self, url: &str) -> Label;

    /// `[p_phishing, p_legitimate]`, each in `[0, 1]`.
    fn predict_proba(&self, url: &str) -> [f64; 2];
}
