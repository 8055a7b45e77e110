use crate::models::classify_types::Label;
use serde::Serialize;

/// Chart input: the renderer only ever sees `{name, value}` pairs.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum MarginStrength {
    Strong,
    Moderate,
    Weak,
}

impl MarginStrength {
    pub fn describe(&self) -> &'static str {
        match self {
            MarginStrength::Strong => "Strong separation",
            MarginStrength::Moderate => "Moderate separation",
            MarginStrength::Weak => "Weak separation",
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Margin {
    pub value: f64,
    pub strength: MarginStrength,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityTier {
    VeryHigh,
    High,
    Moderate,
    Low,
}

impl ReliabilityTier {
    pub fn describe(&self) -> &'static str {
        match self {
            ReliabilityTier::VeryHigh => "Very High",
            ReliabilityTier::High => "High",
            ReliabilityTier::Moderate => "Moderate",
            ReliabilityTier::Low => "Low",
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryView {
    pub prediction: String,
    pub confidence: f64,
    pub model_accuracy: f64,
    pub risk_level: String,
    pub risk_tier: RiskTier,
    pub risk_description: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: Label,
    pub name: String,
    pub value: f64,
    pub percentage: String,
    pub is_predicted: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivationTile {
    pub label: Label,
    pub name: String,
    pub probability: f64,
    pub is_predicted: bool,
    /// `[width, height]` when the map decodes as an image.
    pub dimensions: Option<[u32; 2]>,
    #[serde(skip)]
    pub image: Vec<u8>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivationView {
    pub title: String,
    pub intro: String,
    /// Empty when the service sent no activation maps.
    pub tiles: Vec<ActivationTile>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetricEntry {
    pub label: Label,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ConfidenceView {
    pub top: MetricEntry,
    pub runner_up: Option<MetricEntry>,
    pub margin: Margin,
    pub confidence: f64,
    pub reliability: ReliabilityTier,
    pub distribution: Vec<SeriesPoint>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Findings {
    pub predicted_classification: String,
    pub confidence: f64,
    pub risk_level: String,
    pub risk_tier: RiskTier,
    pub model_accuracy: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ClinicalReport {
    pub report_id: String,
    pub generated_at: String,
    pub title: String,
    pub subtitle: String,
    pub findings: Findings,
    pub description: String,
    pub recommendation: String,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct KeyValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NamedDescription {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct QuantumView {
    pub specs: Vec<KeyValue>,
    pub circuit: Vec<String>,
    pub gates: Vec<NamedDescription>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FeatureView {
    pub intro: String,
    pub steps: Vec<NamedDescription>,
}
