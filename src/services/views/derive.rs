//! Pure derivations over a `ClassificationResult`. Nothing here holds state.

use crate::models::classify_types::{ClassificationResult, Label};
use crate::models::view_types::{
    ActivationTile, ActivationView, ClinicalReport, ConfidenceView, FeatureView, Findings, Margin,
    MarginStrength, MetricEntry, ProbabilityBar, QuantumView, ReliabilityTier, RiskTier,
    SeriesPoint, SummaryView,
};
use crate::services::content::ContentTables;
use crate::services::preview_service;
use crate::services::views::tabs::Tab;
use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<K> {
    pub key: K,
    pub value: f64,
}

/// Descending by value. Equal values keep their input order.
pub fn rank_entries<K: Clone>(entries: &[(K, f64)]) -> Vec<RankedEntry<K>> {
    let mut ranked: Vec<RankedEntry<K>> = entries
        .iter()
        .map(|(key, value)| RankedEntry {
            key: key.clone(),
            value: *value,
        })
        .collect();
    // `sort_by` is stable
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked
}

/// The result's probabilities ranked, ties in label enumeration order.
pub fn ranked_probabilities(result: &ClassificationResult) -> Vec<RankedEntry<Label>> {
    let entries: Vec<(Label, f64)> = result.class_probabilities.iter().collect();
    rank_entries(&entries)
}

pub fn classify_margin(value: f64) -> MarginStrength {
    if value > 0.5 {
        MarginStrength::Strong
    } else if value > 0.2 {
        MarginStrength::Moderate
    } else {
        MarginStrength::Weak
    }
}

/// Top minus runner-up. A single entry is its own margin; no entries is zero.
pub fn margin_of<K>(ranked: &[RankedEntry<K>]) -> Margin {
    let top = ranked.first().map(|e| e.value).unwrap_or(0.0);
    let second = ranked.get(1).map(|e| e.value).unwrap_or(0.0);
    let value = top - second;
    Margin {
        value,
        strength: classify_margin(value),
    }
}

pub fn reliability_tier(confidence: f64) -> ReliabilityTier {
    if confidence >= 0.90 {
        ReliabilityTier::VeryHigh
    } else if confidence >= 0.70 {
        ReliabilityTier::High
    } else if confidence >= 0.50 {
        ReliabilityTier::Moderate
    } else {
        ReliabilityTier::Low
    }
}

/// Map the service's color tag to a risk tier.
///
/// Unknown tags fall back to `Low` for compatibility. That fallback can hide a
/// high-risk result, so it is logged.
pub fn risk_tier(color_tag: &str) -> RiskTier {
    match color_tag.trim().to_ascii_lowercase().as_str() {
        "red" => RiskTier::High,
        "amber" | "yellow" => RiskTier::Moderate,
        "green" => RiskTier::Low,
        other => {
            tracing::warn!(
                color_tag = other,
                "unrecognized risk color from service, treating as low risk"
            );
            RiskTier::Low
        }
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}", value * 100.0)
}

fn to_base36(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(std::char::from_digit((n % 36) as u32, 36).unwrap_or('0'));
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Display-only report id and timestamp. Not unique across sessions.
pub fn report_identity(now: DateTime<Local>) -> (String, String) {
    let millis = now.timestamp_millis().max(0) as u64;
    let id = format!("RPT-{}", to_base36(millis).to_uppercase());
    let timestamp = now.format("%B %-d, %Y, %I:%M %p").to_string();
    (id, timestamp)
}

fn metric(entry: &RankedEntry<Label>) -> MetricEntry {
    MetricEntry {
        label: entry.key,
        name: entry.key.display_name().to_uppercase(),
        value: entry.value,
    }
}

fn series(ranked: &[RankedEntry<Label>]) -> Vec<SeriesPoint> {
    ranked
        .iter()
        .map(|e| SeriesPoint {
            name: e.key.as_str().to_string(),
            value: e.value,
        })
        .collect()
}

/// Content of one tab, ready for a renderer.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "tab", rename_all = "snake_case")]
pub enum TabContent {
    #[serde(rename = "gradcam")]
    ActivationMaps(ActivationView),
    Quantum(QuantumView),
    Features(FeatureView),
    Confidence(ConfidenceView),
    Clinical(ClinicalReport),
}

/// Every view model for one result, built in a single pass.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultViews {
    pub summary: SummaryView,
    pub probability_chart: Vec<ProbabilityBar>,
    pub activation: ActivationView,
    pub quantum: QuantumView,
    pub features: FeatureView,
    pub confidence: ConfidenceView,
    pub clinical: ClinicalReport,
    /// The service's echo of the analysed image, as raw bytes.
    #[serde(skip)]
    pub uploaded_image: Option<Vec<u8>>,
}

impl ResultViews {
    pub fn derive(
        result: &ClassificationResult,
        content: &ContentTables,
        now: DateTime<Local>,
    ) -> Self {
        let ranked = ranked_probabilities(result);
        let predicted = result.predicted_class;
        let risk = risk_tier(&result.risk_level.color_tag);

        let summary = SummaryView {
            prediction: predicted.display_name().to_uppercase(),
            confidence: result.confidence,
            model_accuracy: result.model_accuracy,
            risk_level: result.risk_level.level.clone(),
            risk_tier: risk,
            risk_description: result.risk_level.description.clone(),
        };

        let probability_chart = ranked
            .iter()
            .map(|e| ProbabilityBar {
                label: e.key,
                name: e.key.display_name().to_uppercase(),
                value: e.value,
                percentage: format_percent(e.value),
                is_predicted: e.key == predicted,
            })
            .collect();

        let tiles = result
            .activation_maps
            .as_ref()
            .map(|maps| {
                maps.iter()
                    .map(|(label, bytes)| ActivationTile {
                        label,
                        name: label.display_name(),
                        probability: result.class_probabilities.get(label),
                        is_predicted: label == predicted,
                        dimensions: preview_service::image_dimensions(bytes),
                        image: bytes.to_vec(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let activation = ActivationView {
            title: content.activation.title.clone(),
            intro: content.activation.intro.clone(),
            tiles,
        };

        let confidence = ConfidenceView {
            top: ranked.first().map(metric).unwrap_or_else(|| MetricEntry {
                label: predicted,
                name: predicted.display_name().to_uppercase(),
                value: result.confidence,
            }),
            runner_up: ranked.get(1).map(metric),
            margin: margin_of(&ranked),
            confidence: result.confidence,
            reliability: reliability_tier(result.confidence),
            distribution: series(&ranked),
        };

        let narrative = content.narrative(predicted.as_str());
        let (report_id, generated_at) = report_identity(now);
        let clinical = ClinicalReport {
            report_id,
            generated_at,
            title: content.report.title.clone(),
            subtitle: content.report.subtitle.clone(),
            findings: Findings {
                predicted_classification: predicted.display_name(),
                confidence: result.confidence,
                risk_level: result.risk_level.level.clone(),
                risk_tier: risk,
                model_accuracy: result.model_accuracy,
            },
            description: narrative.description.clone(),
            recommendation: narrative.recommendation.clone(),
            disclaimer: content.report.disclaimer.clone(),
        };

        ResultViews {
            summary,
            probability_chart,
            activation,
            quantum: QuantumView {
                specs: content.quantum_specs.clone(),
                circuit: content.quantum_circuit.clone(),
                gates: content.quantum_gates.clone(),
            },
            features: FeatureView {
                intro: content.feature_intro.clone(),
                steps: content.feature_steps.clone(),
            },
            confidence,
            clinical,
            uploaded_image: result.uploaded_image.clone(),
        }
    }

    pub fn content_for(&self, tab: Tab) -> TabContent {
        match tab {
            Tab::ActivationMaps => TabContent::ActivationMaps(self.activation.clone()),
            Tab::Quantum => TabContent::Quantum(self.quantum.clone()),
            Tab::Features => TabContent::Features(self.features.clone()),
            Tab::Confidence => TabContent::Confidence(self.confidence.clone()),
            Tab::Clinical => TabContent::Clinical(self.clinical.clone()),
        }
    }
}
