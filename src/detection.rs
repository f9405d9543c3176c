use std::{sync::Arc, time::Duration};

use crate::{
    ai::UrlClassifier,
    cache::ResultCache,
    domain::{ClassificationResult, Label, LivenessOutcome},
    liveness::LivenessProbe,
    web::templates,
};

/// Phishing confidence, in percent, above which a URL is labelled phishing.
pub const PHISHING_THRESHOLD: f64 = 50.0;

pub fn decide(phishing_confidence: f64) -> Label {
    if phishing_confidence > PHISHING_THRESHOLD {
        Label::Phishing
    } else {
        Label::Legitimate
    }
}

pub struct DetectionService {
    cache: Arc<dyn ResultCache>,
    probe: Arc<dyn LivenessProbe>,
    classifier: Arc<dyn UrlClassifier>,
    ttl: Duration,
}

impl DetectionService {
    pub fn new(
        cache: Arc<dyn ResultCache>,
        probe: Arc<dyn LivenessProbe>,
        classifier: Arc<dyn UrlClassifier>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            probe,
            classifier,
            ttl,
        }
    }

    /// Returns the rendered result page for `url`, served from cache when present.
    pub async fn detect(&self, url: &str) -> String {
        match self.cache.get(url).await {
            Ok(Some(payload)) => {
                tracing::debug!(target: "detect", url, "cache hit");
                return payload;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(target: "cache", error = %err, url, "cache read failed; treating as miss");
            }
        }

        let result = self.classify(url).await;
        tracing::info!(
            target: "detect",
            url,
            label = %result.label,
            phishing = result.phishing_confidence,
            "url classified"
        );

        let payload = templates::render_result(&result);
        if let Err(err) = self.cache.set(url, &payload, self.ttl).await {
            tracing::warn!(target: "cache", error = %err, url, "cache write failed");
        }
        payload
    }

    /// Liveness check followed by model inference. Any failure to reach the target
    /// yields the fixed phishing verdict without consulting the model.
    pub async fn classify(&self, url: &str) -> ClassificationResult {
        match self.probe.check(url).await {
            LivenessOutcome::Ok => {}
            outcome => {
                tracing::debug!(target: "detect", url, ?outcome, "target not live");
                return ClassificationResult::unreachable(url);
            }
        }

        let model_label = self.classifier.predict(url);
        let [p_phishing, p_legitimate] = self.classifier.predict_proba(url);
        let phishing_confidence = p_phishing * 100.0;
        let legitimate_confidence = p_legitimate * 100.0;
        tracing::debug!(target: "detect", url, %model_label, phishing_confidence, "model scored url");

        ClassificationResult {
            url: url.to_string(),
            label: decide(phishing_confidence),
            phishing_confidence,
            legitimate_confidence,
        }
    }
}
